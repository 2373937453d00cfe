pub mod crossing;
pub mod head;

use core::fmt;

use embassy_time::Instant;
use enum_ordinalize::Ordinalize;
use rand::RngCore;

use crate::timing::{Clock, Timings};
use head::{OutputLines, SignalHead, WAY_HEAD};

/// What a traffic head shows. Ordinals index the head table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinalize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Aspect {
    Red,
    RedAmber,
    Green,
    Amber,
}

/// Where a way is in its stop/go cycle. The green deadline only exists while
/// the way is actually at green.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Stop,
    Starting,
    Go { hold_until: Instant },
    Stopping,
}

impl Phase {
    pub fn aspect(&self) -> Aspect {
        match self {
            Phase::Stop => Aspect::Red,
            Phase::Starting => Aspect::RedAmber,
            Phase::Go { .. } => Aspect::Green,
            Phase::Stopping => Aspect::Amber,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaySnapshot {
    pub index: usize,
    pub aspect: Aspect,
}

impl fmt::Display for WaySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "way {}: {:?}", self.index, self.aspect)
    }
}

/// One direction of traffic and its three-lamp head.
#[derive(Debug)]
pub struct WaySignal<L> {
    index: usize,
    head: SignalHead<Aspect, 3>,
    lines: L,
    phase: Phase,
}

impl<L: OutputLines<3>> WaySignal<L> {
    /// Creates the way at red and drives its lamps accordingly.
    pub fn new(index: usize, lines: L) -> Self {
        let mut way = WaySignal {
            index,
            head: WAY_HEAD,
            lines,
            phase: Phase::Stop,
        };
        way.enter(Phase::Stop);
        way
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn aspect(&self) -> Aspect {
        self.phase.aspect()
    }

    pub fn snapshot(&self) -> WaySnapshot {
        WaySnapshot {
            index: self.index,
            aspect: self.aspect(),
        }
    }

    /// Deadline of the current green, if the way is at green.
    pub fn hold_until(&self) -> Option<Instant> {
        match self.phase {
            Phase::Go { hold_until } => Some(hold_until),
            _ => None,
        }
    }

    /// Red, through red+amber, to green. Returns once the way is at green,
    /// with a fresh randomised hold.
    pub async fn begin_go<C, R>(&mut self, clock: &mut C, rng: &mut R, timings: &Timings)
    where
        C: Clock,
        R: RngCore + ?Sized,
    {
        assert!(self.phase == Phase::Stop, "way can only start from red");

        // Instant red to red+amber looks wrong from the kerb.
        clock.sleep(timings.clearance).await;

        self.enter(Phase::Starting);
        clock.sleep(timings.red_amber).await;

        let hold = timings.draw_green_hold(rng);
        self.enter(Phase::Go {
            hold_until: clock.now() + hold,
        });
        debug!("way {} holds green for {}s", self.index, hold.as_secs());
    }

    /// Only meaningful at green; anywhere else this is a caller bug and the
    /// answer is `false`, never "expired".
    pub fn is_hold_expired(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Go { hold_until } => now > hold_until,
            _ => {
                if cfg!(debug_assertions) {
                    panic!("hold queried while way {} not at green", self.index);
                }
                false
            }
        }
    }

    /// Green, through amber, to red.
    pub async fn begin_stop<C: Clock>(&mut self, clock: &mut C, timings: &Timings) {
        assert!(
            matches!(self.phase, Phase::Go { .. }),
            "way can only stop from green"
        );

        self.enter(Phase::Stopping);
        clock.sleep(timings.amber).await;

        self.enter(Phase::Stop);
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.lines.drive(self.head.set(phase.aspect()));
        info!("{}", self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::tests::SimClock;
    use embassy_futures::block_on;
    use embassy_time::Duration;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder(Vec<[bool; 3]>);

    impl OutputLines<3> for Recorder {
        fn drive(&mut self, levels: [bool; 3]) {
            self.0.push(levels);
        }
    }

    #[test]
    fn starts_at_red() {
        let way = WaySignal::new(2, Recorder::default());
        assert_eq!(way.phase(), Phase::Stop);
        assert_eq!(way.lines.0, [[true, false, false]]);
        assert_eq!(way.snapshot().index, 2);
        assert_eq!(way.hold_until(), None);
    }

    #[test]
    fn go_then_stop_walks_the_uk_sequence() {
        let mut clock = SimClock::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let timings = Timings::UK;
        let mut way = WaySignal::new(0, Recorder::default());

        block_on(way.begin_go(&mut clock, &mut rng, &timings));
        assert_eq!(way.aspect(), Aspect::Green);
        assert_eq!(clock.slept, Duration::from_millis(3_500));

        block_on(way.begin_stop(&mut clock, &timings));
        assert_eq!(way.phase(), Phase::Stop);
        assert_eq!(clock.slept, Duration::from_millis(6_500));

        assert_eq!(
            way.lines.0,
            [
                [true, false, false],
                [true, true, false],
                [false, false, true],
                [false, true, false],
                [true, false, false],
            ]
        );
    }

    #[test]
    fn hold_expires_only_after_deadline() {
        let mut clock = SimClock::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let timings = Timings::UK.with_green_hold(10, 10);
        let mut way = WaySignal::new(0, ());

        block_on(way.begin_go(&mut clock, &mut rng, &timings));
        let deadline = way.hold_until().unwrap();
        assert_eq!(deadline, clock.now() + Duration::from_secs(10));

        assert!(!way.is_hold_expired(clock.now()));
        assert!(!way.is_hold_expired(deadline));
        assert!(way.is_hold_expired(deadline + Duration::from_millis(1)));
    }

    #[test]
    fn every_drawn_hold_is_within_range() {
        let mut clock = SimClock::new();
        let mut rng = SmallRng::seed_from_u64(0xdead_beef);
        let timings = Timings::UK;
        let mut way = WaySignal::new(0, ());

        for _ in 0..1000 {
            block_on(way.begin_go(&mut clock, &mut rng, &timings));
            let hold = way.hold_until().unwrap() - clock.now();
            assert!(
                (Duration::from_secs(8)..=Duration::from_secs(12)).contains(&hold),
                "hold of {}ms",
                hold.as_millis()
            );
            block_on(way.begin_stop(&mut clock, &timings));
            assert_eq!(way.phase(), Phase::Stop);
        }
    }

    #[test]
    #[should_panic(expected = "only start from red")]
    fn go_twice_is_a_bug() {
        let mut clock = SimClock::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut way = WaySignal::new(0, ());
        block_on(way.begin_go(&mut clock, &mut rng, &Timings::UK));
        block_on(way.begin_go(&mut clock, &mut rng, &Timings::UK));
    }

    #[test]
    #[should_panic(expected = "only stop from green")]
    fn stop_at_red_is_a_bug() {
        let mut clock = SimClock::new();
        let mut way = WaySignal::new(0, ());
        block_on(way.begin_stop(&mut clock, &Timings::UK));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn hold_at_red_is_never_expired() {
        let way = WaySignal::new(0, ());
        assert!(!way.is_hold_expired(Instant::from_secs(1_000)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not at green")]
    fn hold_at_red_trips_debug_builds() {
        let way = WaySignal::new(0, ());
        let _ = way.is_hold_expired(Instant::from_secs(1_000));
    }

    #[test]
    fn snapshot_reads_well() {
        let way = WaySignal::new(1, ());
        assert_eq!(std::format!("{}", way.snapshot()), "way 1: Red");
    }
}
