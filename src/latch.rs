/*
 * The crossing request.
 *
 * A press can arrive at any moment: from an interrupt, from another task, or
 * from the controller polling a pin between ticks. Whatever the source, all
 * it does is set a sticky flag. Only the controller clears it, and only once
 * the crossing has actually been given, so a press is never lost however long
 * the junction makes the pedestrian wait.
 */

use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct RequestLatch {
    pending: AtomicBool,
}

impl RequestLatch {
    pub const fn new() -> Self {
        RequestLatch {
            pending: AtomicBool::new(false),
        }
    }

    /// Never blocks, so it is fine to call from an interrupt handler.
    pub fn set(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn take_and_clear(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// A button the controller samples once per tick.
pub trait PolledButton {
    fn is_pressed(&mut self) -> bool;
}

impl<F: FnMut() -> bool> PolledButton for F {
    fn is_pressed(&mut self) -> bool {
        self()
    }
}

/// Turns a sampled level into requests: one per press, however long it is
/// held down.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeDetector {
    was_pressed: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        EdgeDetector { was_pressed: false }
    }

    /// Returns true if this sample was a fresh press.
    pub fn sample(&mut self, pressed: bool, latch: &RequestLatch) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if edge {
            latch.set();
        }
        edge
    }
}
