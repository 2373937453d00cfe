/*
 * The pedestrian head: red man, steady green man, then a flashing green man
 * that ends dark before the red man comes back.
 *
 * A grant runs start to finish in one call. Nothing else at the junction
 * moves while it does, which is exactly what makes it safe.
 */

use core::fmt;

use enum_ordinalize::Ordinalize;

use super::head::{CROSSING_HEAD, OutputLines, SignalHead};
use crate::timing::{Clock, Timings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinalize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum CrossingAspect {
    Wait,
    Cross,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrossingPhase {
    Wait,
    Cross,
    Flash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrossingSnapshot {
    pub phase: CrossingPhase,
    pub aspect: CrossingAspect,
}

impl fmt::Display for CrossingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            CrossingPhase::Flash => write!(f, "crossing: {:?} (flashing)", self.aspect),
            _ => write!(f, "crossing: {:?}", self.aspect),
        }
    }
}

#[derive(Debug)]
pub struct CrossingSignal<L> {
    head: SignalHead<CrossingAspect, 2>,
    lines: L,
    phase: CrossingPhase,
    aspect: CrossingAspect,
}

impl<L: OutputLines<2>> CrossingSignal<L> {
    /// Creates the crossing showing the red man.
    pub fn new(lines: L) -> Self {
        let mut crossing = CrossingSignal {
            head: CROSSING_HEAD,
            lines,
            phase: CrossingPhase::Wait,
            aspect: CrossingAspect::Wait,
        };
        crossing.wait();
        crossing
    }

    pub fn phase(&self) -> CrossingPhase {
        self.phase
    }

    pub fn aspect(&self) -> CrossingAspect {
        self.aspect
    }

    pub fn snapshot(&self) -> CrossingSnapshot {
        CrossingSnapshot {
            phase: self.phase,
            aspect: self.aspect,
        }
    }

    /// Red man. Safe to call in any state; the lamps are driven regardless.
    pub fn wait(&mut self) {
        self.show(CrossingPhase::Wait, CrossingAspect::Wait);
    }

    /// Runs a whole crossing: green man, flashing, dark, red man.
    pub async fn grant<C: Clock>(&mut self, clock: &mut C, timings: &Timings) {
        assert!(
            self.phase == CrossingPhase::Wait,
            "crossing can only be granted from wait"
        );

        self.show(CrossingPhase::Cross, CrossingAspect::Cross);
        clock.sleep(timings.cross).await;

        for _ in 0..timings.flash_cycles {
            self.show(CrossingPhase::Flash, CrossingAspect::Blank);
            clock.sleep(timings.flash_period).await;
            self.show(CrossingPhase::Flash, CrossingAspect::Cross);
            clock.sleep(timings.flash_period).await;
        }
        self.show(CrossingPhase::Flash, CrossingAspect::Blank);
        clock.sleep(timings.flash_period).await;

        self.wait();
    }

    fn show(&mut self, phase: CrossingPhase, aspect: CrossingAspect) {
        self.phase = phase;
        self.aspect = aspect;
        self.lines.drive(self.head.set(aspect));
        // Flashing is chatty, keep it out of the normal log.
        if phase == CrossingPhase::Flash {
            trace!("{}", self.snapshot());
        } else {
            info!("{}", self.snapshot());
        }
    }
}
