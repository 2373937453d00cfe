/*
 * The junction controller.
 *
 * Ways take turns at green in a fixed order. When the green way's hold runs
 * out it is stopped, and for that one tick every way is red: that is the
 * only moment a waiting pedestrian request is granted, and the moment the
 * next way in the rotation is started.
 *
 * Every dwell is awaited in place, so at most one light is ever changing.
 * Mutual exclusion between the ways and the crossing is a property of the
 * loop's shape rather than of any lock.
 */

use rand::RngCore;

use crate::latch::{EdgeDetector, PolledButton, RequestLatch};
use crate::timing::{Clock, Timings};
use crate::trafficlight::crossing::CrossingSignal;
use crate::trafficlight::head::OutputLines;
use crate::trafficlight::{WaySignal, WaySnapshot};

/// What one tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// The way whose green ended this tick.
    pub stopped: Option<usize>,
    /// A pedestrian crossing ran to completion.
    pub crossed: bool,
    /// A request is pending but vehicles are still moving.
    pub deferred: bool,
    /// The way that went to green this tick.
    pub started: Option<usize>,
}

pub struct Controller<'a, W, X, C, R, const N: usize> {
    ways: [WaySignal<W>; N],
    crossing: Option<CrossingSignal<X>>,
    latch: &'a RequestLatch,
    clock: C,
    rng: R,
    timings: Timings,
    active: usize,
    advance_pending: bool,
    started: bool,
}

impl<'a, W, C, R, const N: usize> Controller<'a, W, (), C, R, N>
where
    W: OutputLines<3>,
    C: Clock,
    R: RngCore,
{
    /// A junction with no pedestrian head. Requests are still accepted and
    /// consumed at all-red, there is just nothing to show for them.
    pub fn without_crossing(
        ways: [W; N],
        latch: &'a RequestLatch,
        clock: C,
        rng: R,
        timings: Timings,
    ) -> Self {
        Self::new(ways, None, latch, clock, rng, timings)
    }
}

impl<'a, W, X, C, R, const N: usize> Controller<'a, W, X, C, R, N>
where
    W: OutputLines<3>,
    X: OutputLines<2>,
    C: Clock,
    R: RngCore,
{
    /// `ways` are in rotation order; the i-th one becomes way i. All heads
    /// are driven to red (and red man) straight away.
    pub fn new(
        ways: [W; N],
        crossing: Option<X>,
        latch: &'a RequestLatch,
        clock: C,
        rng: R,
        timings: Timings,
    ) -> Self {
        const { assert!(N > 0, "a junction needs at least one way") };

        let mut index = 0;
        let ways = ways.map(|lines| {
            let way = WaySignal::new(index, lines);
            index += 1;
            way
        });

        Controller {
            ways,
            crossing: crossing.map(CrossingSignal::new),
            latch,
            clock,
            rng,
            timings,
            active: 0,
            advance_pending: false,
            started: false,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn advance_pending(&self) -> bool {
        self.advance_pending
    }

    pub fn way(&self, index: usize) -> &WaySignal<W> {
        &self.ways[index]
    }

    pub fn ways(&self) -> impl Iterator<Item = WaySnapshot> + '_ {
        self.ways.iter().map(WaySignal::snapshot)
    }

    pub fn crossing(&self) -> Option<&CrossingSignal<X>> {
        self.crossing.as_ref()
    }

    pub fn latch(&self) -> &'a RequestLatch {
        self.latch
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Red man up, way 0 to green.
    pub async fn start(&mut self) {
        assert!(!self.started, "controller already started");
        self.started = true;

        info!("starting {}-way junction", N);
        if let Some(crossing) = self.crossing.as_mut() {
            crossing.wait();
        }

        self.active = 0;
        self.ways[0]
            .begin_go(&mut self.clock, &mut self.rng, &self.timings)
            .await;
    }

    /// One pass of the control loop. Returns after any dwell it caused.
    pub async fn tick(&mut self) -> TickReport {
        assert!(self.started, "controller ticked before start");
        let mut report = TickReport::default();
        let active = self.active;

        if self.ways[active].is_hold_expired(self.clock.now()) {
            self.ways[active]
                .begin_stop(&mut self.clock, &self.timings)
                .await;
            self.advance_pending = true;
            report.stopped = Some(active);
        }

        if self.latch.is_pending() {
            if self.advance_pending {
                // Every way is at red here.
                if let Some(crossing) = self.crossing.as_mut() {
                    info!("crossing granted");
                    crossing.grant(&mut self.clock, &self.timings).await;
                    report.crossed = true;
                } else {
                    warn!("crossing requested but no crossing head fitted");
                }
                self.latch.take_and_clear();
            } else {
                trace!("crossing request waiting for all red");
                report.deferred = true;
            }
        }

        if self.advance_pending {
            self.active = (self.active + 1) % N;
            let next = self.active;
            self.ways[next]
                .begin_go(&mut self.clock, &mut self.rng, &self.timings)
                .await;
            self.advance_pending = false;
            report.started = Some(next);
        }

        report
    }

    /// The pause between ticks.
    pub async fn idle(&mut self) {
        self.clock.sleep(self.timings.poll_interval).await;
    }

    /// Runs forever. Requests come from whoever else holds the latch, be it an
    /// interrupt handler or another task.
    pub async fn run(&mut self) -> ! {
        self.start().await;
        loop {
            self.tick().await;
            self.idle().await;
        }
    }

    /// Runs forever, sampling `button` once per tick. Holding the button down
    /// counts as one request.
    pub async fn run_polled<B: PolledButton>(&mut self, mut button: B) -> ! {
        let mut edges = EdgeDetector::new();
        self.start().await;
        loop {
            edges.sample(button.is_pressed(), self.latch);
            self.tick().await;
            self.idle().await;
        }
    }
}
