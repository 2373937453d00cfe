//! Runs the junction controller on the console, in real time.
//!
//! Three ways and a crossing, as on the bench prototype. Every lamp change is
//! printed; press Enter to push the crossing button. The button is read on
//! its own thread and only ever sets the latch, just as the interrupt does on
//! the board.

use std::io::{self, BufRead};
use std::thread;
use std::time::Instant as StdInstant;

use embassy_futures::block_on;
use embassy_time::{Duration, Instant};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use pelican::{Clock, Controller, OutputLines, RequestLatch, Timings};

static CROSSING_REQUEST: RequestLatch = RequestLatch::new();

struct WallClock {
    origin: StdInstant,
}

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.origin.elapsed().as_micros() as u64)
    }

    async fn sleep(&mut self, duration: Duration) {
        thread::sleep(std::time::Duration::from_micros(duration.as_micros()));
    }
}

/// Prints a head's lamps as letters, dots for the dark ones.
struct Console {
    name: String,
    letters: &'static [char],
    origin: StdInstant,
}

impl Console {
    fn way(index: usize, origin: StdInstant) -> Self {
        Console {
            name: format!("way {index}"),
            letters: &['R', 'A', 'G'],
            origin,
        }
    }

    fn crossing(origin: StdInstant) -> Self {
        Console {
            name: "crossing".into(),
            letters: &['W', 'X'],
            origin,
        }
    }
}

impl<const N: usize> OutputLines<N> for Console {
    fn drive(&mut self, levels: [bool; N]) {
        let lamps: String = levels
            .iter()
            .zip(self.letters)
            .map(|(on, letter)| if *on { *letter } else { '.' })
            .collect();
        println!(
            "{:>8.1}s  {:<8}  {}",
            self.origin.elapsed().as_secs_f32(),
            self.name,
            lamps
        );
    }
}

fn main() {
    let origin = StdInstant::now();

    thread::spawn(|| {
        for line in io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
            println!("          button    pressed");
            CROSSING_REQUEST.set();
        }
    });

    let mut controller = Controller::new(
        [0, 1, 2].map(|index| Console::way(index, origin)),
        Some(Console::crossing(origin)),
        &CROSSING_REQUEST,
        WallClock { origin },
        SmallRng::from_entropy(),
        Timings::UK,
    );

    println!("3-way junction with crossing; press Enter to request the crossing");
    block_on(controller.run())
}
