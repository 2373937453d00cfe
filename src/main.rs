#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

// Firmware for a pelican-crossing junction on the DESPI-M02 (STM32F103VE):
// two traffic legs sharing one pedestrian crossing.
//
// https://dev.to/theembeddedrustacean/embedded-rust-embassy-gpio-button-controlled-blinking-3ee6
// https://www.youtube.com/watch?v=dab_vzVDr_M

#[cfg(target_os = "none")]
mod io;

#[cfg(target_os = "none")]
mod firmware {
    use embassy_executor::Spawner;
    use embassy_stm32::exti::{Channel as _, ExtiInput};
    use embassy_stm32::gpio::{Level, Output, Pin, Pull, Speed};
    use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel};
    use embassy_time::Duration;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use {defmt_rtt as _, panic_halt as _};

    use pelican::{Controller, EmbassyClock, RequestLatch, Timings};

    use crate::io::{self, CHANNEL_CAPACITY, Lamps};

    type ButtonChannel = Channel<ThreadModeRawMutex, bool, CHANNEL_CAPACITY>;

    static CROSSING_REQUEST: RequestLatch = RequestLatch::new();
    static BUTTON_RAW: ButtonChannel = ButtonChannel::new();
    static BUTTON_DEBOUNCED: ButtonChannel = ButtonChannel::new();

    const DEBOUNCE: Duration = Duration::from_millis(50);
    const WAIT_LED_REFRESH: Duration = Duration::from_millis(100);

    // The lamps on the board are wired active-high.
    const LAMPS_ACTIVE_LOW: bool = false;

    // No hardware RNG on this part; the factory-programmed unique ID at least
    // makes each board's green times differ.
    fn rng_seed() -> u64 {
        embassy_stm32::uid::uid()
            .chunks(4)
            .fold(0x5EED_u64, |seed, word| {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(word);
                seed.rotate_left(21) ^ u64::from(u32::from_le_bytes(bytes))
            })
    }

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        let p = embassy_stm32::init(Default::default());

        // Left-right lane A and up-down lane B: red, amber, green.
        let ways = [
            Lamps::new(
                [
                    Output::new(p.PE1.degrade(), Level::Low, Speed::Low),
                    Output::new(p.PB9.degrade(), Level::Low, Speed::Low),
                    Output::new(p.PB7.degrade(), Level::Low, Speed::Low),
                ],
                LAMPS_ACTIVE_LOW,
            ),
            Lamps::new(
                [
                    Output::new(p.PB6.degrade(), Level::Low, Speed::Low),
                    Output::new(p.PB8.degrade(), Level::Low, Speed::Low),
                    Output::new(p.PE0.degrade(), Level::Low, Speed::Low),
                ],
                LAMPS_ACTIVE_LOW,
            ),
        ];

        // Pedestrian red, pedestrian green.
        let crossing = Lamps::new(
            [
                Output::new(p.PE2.degrade(), Level::Low, Speed::Low),
                Output::new(p.PE3.degrade(), Level::Low, Speed::Low),
            ],
            LAMPS_ACTIVE_LOW,
        );

        let button = ExtiInput::new(p.PE11.degrade(), p.EXTI11.degrade(), Pull::Up);
        let wait_led = Output::new(p.PE12, Level::High, Speed::Low);

        spawner
            .spawn(io::button_task(button, BUTTON_RAW.sender()))
            .unwrap();
        spawner
            .spawn(io::debounce_task(
                BUTTON_RAW.receiver(),
                BUTTON_DEBOUNCED.sender(),
                DEBOUNCE,
            ))
            .unwrap();
        spawner
            .spawn(io::request_task(
                BUTTON_DEBOUNCED.receiver(),
                &CROSSING_REQUEST,
                wait_led,
                WAIT_LED_REFRESH,
            ))
            .unwrap();

        let mut controller = Controller::new(
            ways,
            Some(crossing),
            &CROSSING_REQUEST,
            EmbassyClock,
            SmallRng::seed_from_u64(rng_seed()),
            Timings::UK,
        );

        controller.run().await
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!(
        "This is the DESPI-M02 firmware; build it with \
         `--target thumbv7m-none-eabi --features defmt`. \
         To watch the junction on this machine run \
         `cargo run --features std --bin simulate`."
    );
}
