/*
 * Dwell times and the time source.
 *
 * The sequencing code never reads a hardware timer itself. It asks a `Clock`
 * for the current instant and to sleep, which keeps the state machines
 * testable: tests hand in a clock whose `sleep` merely advances virtual time.
 */

use embassy_time::{Duration, Instant};
use rand::{Rng, RngCore};

/// Every fixed interval used by the junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timings {
    /// All-red pause before a way starts its red+amber.
    pub clearance: Duration,
    pub red_amber: Duration,
    pub amber: Duration,
    /// Inclusive bounds of the randomised green, whole seconds.
    pub green_hold_min_secs: u64,
    pub green_hold_max_secs: u64,
    /// Steady green man.
    pub cross: Duration,
    /// Half-period of the flashing green man.
    pub flash_period: Duration,
    /// Number of blank/green pairs in the flashing phase.
    pub flash_cycles: u8,
    pub poll_interval: Duration,
}

impl Timings {
    // https://www.legislation.gov.uk/uksi/2016/362/schedule/14/made
    pub const UK: Timings = Timings {
        clearance: Duration::from_millis(1_000),
        red_amber: Duration::from_millis(2_500),
        amber: Duration::from_millis(3_000),
        green_hold_min_secs: 8,
        green_hold_max_secs: 12,
        cross: Duration::from_secs(8),
        flash_period: Duration::from_secs(1),
        flash_cycles: 3,
        poll_interval: Duration::from_millis(100),
    };

    /// Replaces the green-hold bounds. An empty range is a configuration bug
    /// and fails at compile time when used in a `const`.
    pub const fn with_green_hold(mut self, min_secs: u64, max_secs: u64) -> Self {
        assert!(min_secs <= max_secs, "green hold range is empty");
        self.green_hold_min_secs = min_secs;
        self.green_hold_max_secs = max_secs;
        self
    }

    pub fn draw_green_hold<R: RngCore + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_secs(rng.gen_range(self.green_hold_min_secs..=self.green_hold_max_secs))
    }

    /// Wall time a crossing grant occupies, from green man to red man.
    pub fn crossing_duration(&self) -> Duration {
        // Each cycle is a blank and a green half-period, then one closing blank.
        self.cross + self.flash_period * (2 * u32::from(self.flash_cycles) + 1)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::UK
    }
}

/// Source of time for the sequencing code.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Instant;

    async fn sleep(&mut self, duration: Duration);
}

/// The embassy time driver, for use on the board.
#[cfg(target_os = "none")]
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

#[cfg(target_os = "none")]
impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&mut self, duration: Duration) {
        embassy_time::Timer::after(duration).await
    }
}
