/*
 * The I/O module for the junction.
 *
 * This is the only device-specific part of the firmware besides pin
 * assignment in `main`. It provides lamp drivers for the signal heads and the
 * tasks that turn presses of the on-board button into crossing requests.
 *
 * The button path is a small pipeline of channels: the button task reports
 * raw falling edges, the debouncer collapses bursts of them, and the request
 * task sets the latch the controller watches.
 */

use embassy_futures::select::{Either, select};
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output},
};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::{Duration, Timer};

use pelican::{OutputLines, RequestLatch};

pub const CHANNEL_CAPACITY: usize = 4;

/// The GPIO lines of one signal head, in head table order.
pub struct Lamps<const N: usize> {
    outputs: [Output<'static>; N],
    active_low: bool,
}

impl<const N: usize> Lamps<N> {
    pub fn new(outputs: [Output<'static>; N], active_low: bool) -> Self {
        Self {
            outputs,
            active_low,
        }
    }
}

impl<const N: usize> OutputLines<N> for Lamps<N> {
    fn drive(&mut self, levels: [bool; N]) {
        for (output, on) in self.outputs.iter_mut().zip(levels) {
            light(output, on, self.active_low);
        }
    }
}

// Deal with active-high or active-low here, so that the state machines can
// just use `true` for on.
fn light(output: &mut Output, on: bool, active_low: bool) {
    output.set_level(if on != active_low { Level::High } else { Level::Low });
}

#[embassy_executor::task]
pub async fn button_task(
    mut button: ExtiInput<'static>,
    raw: Sender<'static, ThreadModeRawMutex, bool, CHANNEL_CAPACITY>,
) -> ! {
    loop {
        button.wait_for_falling_edge().await;
        raw.send(true).await;
    }
}

// Contacts bounce, and a pedestrian will happily press three times in a
// row. Buffer the last value until the input has been quiet for `debounce`,
// then pass it on once.
#[embassy_executor::task]
pub async fn debounce_task(
    input: Receiver<'static, ThreadModeRawMutex, bool, CHANNEL_CAPACITY>,
    output: Sender<'static, ThreadModeRawMutex, bool, CHANNEL_CAPACITY>,
    debounce: Duration,
) -> ! {
    loop {
        let mut value: bool = input.receive().await;

        'debounce_loop: loop {
            match select(input.receive(), Timer::after(debounce)).await {
                Either::First(new_value) => value = new_value,
                Either::Second(_) => break 'debounce_loop,
            }
        }

        output.send(value).await;
    }
}

/*
 * Sets the crossing request and keeps the on-board LED lit ("WAIT") for as
 * long as the request is pending. The controller clears the latch, so the LED
 * follows the latch rather than the button.
 */
#[embassy_executor::task]
pub async fn request_task(
    presses: Receiver<'static, ThreadModeRawMutex, bool, CHANNEL_CAPACITY>,
    latch: &'static RequestLatch,
    mut wait_led: Output<'static>,
    refresh: Duration,
) -> ! {
    loop {
        if let Either::First(true) = select(presses.receive(), Timer::after(refresh)).await {
            latch.set();
        }

        // the on-board LED is active-low
        light(&mut wait_led, latch.is_pending(), true);
    }
}
