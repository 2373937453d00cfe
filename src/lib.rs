#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Signal sequencing for a small UK junction: a handful of traffic-light ways
//! that take turns at green, plus an optional pelican crossing that is only
//! granted while every way shows red.
//!
//! Nothing in here touches hardware. Lamps are driven through
//! [`OutputLines`], time comes from a [`Clock`] and the crossing button feeds
//! a [`RequestLatch`], so the same [`Controller`] runs on the board, in the
//! console simulator and in the tests.

// Must stay first: the logging macros are textually scoped.
mod fmt;

pub mod controller;
pub mod latch;
pub mod timing;
pub mod trafficlight;

pub use controller::{Controller, TickReport};
pub use latch::{EdgeDetector, PolledButton, RequestLatch};
pub use timing::{Clock, Timings};
pub use trafficlight::crossing::{CrossingAspect, CrossingPhase, CrossingSignal, CrossingSnapshot};
pub use trafficlight::head::{CROSSING_HEAD, OutputLines, SignalHead, WAY_HEAD};
pub use trafficlight::{Aspect, Phase, WaySignal, WaySnapshot};

#[cfg(target_os = "none")]
pub use timing::EmbassyClock;
