//! serial2hid firmware entry point (nRF52840).
//!
//! Task layout:
//!
//! - `uart_task`: buffered UARTE0 receiver, bytes into [`serial::BYTES`]
//! - `usb_task`: USB device stack
//! - `hid_task`: keyboard reports to the HID endpoint
//! - `console_task`: `?`/`c` debug console on CDC-ACM
//! - main: 1 ms ticker running [`Relay::tick`], buttons and LEDs

#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::{SpawnError, Spawner};
use embassy_nrf::config::HfclkSource;
use embassy_nrf::gpio::Pin;
use embassy_time::{Duration, Instant, Ticker, Timer};
use embassy_usb::UsbDevice;
use panic_probe as _;

use serial2hid::config;
use serial2hid::console::{self, Command};
use serial2hid::error::Error;
use serial2hid::hid::keyboard::KeyboardState;
use serial2hid::serial::{self, SerialPins, SerialPort};
use serial2hid::ui::buttons::Buttons;
use serial2hid::ui::leds::Leds;
use serial2hid::usb::console::{self as usb_console, STATS};
use serial2hid::usb::hid_device::{self, ConsoleClass, KeyboardWriter, UsbDriver};
use serial2hid::{Clock, Millis, Relay, Scheduler, SchedulerConfig};

/// Millisecond clock on top of the embassy time driver.
///
/// Truncated to 32 bits, so it wraps after ~49.7 days like the scheduler
/// expects.
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        Millis(Instant::now().as_millis() as u32)
    }
}

#[embassy_executor::task]
async fn uart_task(port: SerialPort) -> ! {
    serial::run_reader(port).await
}

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_task(keyboard: KeyboardWriter) -> ! {
    hid_device::hid_writer_task(keyboard).await
}

#[embassy_executor::task]
async fn console_task(class: ConsoleClass) -> ! {
    usb_console::console_task(class, SchedulerConfig::DEFAULT).await
}

fn spawned(task: &str, result: Result<(), SpawnError>) {
    if result.is_err() {
        error!("Failed to spawn {=str}", task);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    info!("serial2hid starting");

    let scheduler = match Scheduler::with_observer(SchedulerConfig::DEFAULT, &STATS) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("{}", Error::from(e));
            return;
        }
    };

    // - USB (keyboard + console) ---------------------------
    let usb = hid_device::init(p.USBD);
    spawned("usb", spawner.spawn(usb_task(usb.device)));
    spawned("hid", spawner.spawn(hid_task(usb.keyboard)));
    spawned("console", spawner.spawn(console_task(usb.console)));

    // Give the host time to enumerate before the first key.
    Timer::after_millis(config::STARTUP_DELAY_MS).await;

    // - Serial input ---------------------------------------
    let port = serial::init(SerialPins {
        uarte: p.UARTE0,
        timer: p.TIMER0,
        ppi_ch0: p.PPI_CH0,
        ppi_ch1: p.PPI_CH1,
        ppi_group: p.PPI_GROUP0,
        rxd: p.P0_08.degrade(),
        txd: p.P0_06.degrade(),
    });
    spawned("uart", spawner.spawn(uart_task(port)));

    // - Front panel ----------------------------------------
    let buttons = Buttons::new([
        p.P0_11.degrade(),
        p.P0_12.degrade(),
        p.P0_24.degrade(),
        p.P0_25.degrade(),
    ]);
    let mut leds = Leds::new(p.P0_13.degrade(), p.P0_14.degrade());

    let mut banner: heapless::String<192> = heapless::String::new();
    if console::write_banner(&mut banner, scheduler.config()).is_ok() {
        info!("{=str}", banner.as_str());
    }

    // - Relay loop -----------------------------------------
    let clock = SystemClock;
    let mut relay = Relay::new(scheduler);
    let mut keyboard = KeyboardState::new();
    let mut ticker = Ticker::every(Duration::from_micros(config::TICK_PERIOD_US));

    loop {
        let now = clock.now();

        usb_console::drain_commands(|command| {
            if command == Command::Clear {
                relay.clear(&mut keyboard);
            }
        });

        let outcome = relay.tick(now, serial::try_next, buttons.levels(), &mut keyboard);
        if !outcome.controls.is_empty() {
            info!("Controls fired: {}", outcome.controls);
        }

        if let Some(report) = keyboard.take_report() {
            if !hid_device::try_queue(report) {
                // Retry with the latest state next tick.
                keyboard.mark_dirty();
            }
        }

        leds.show(relay.scheduler().indicators(now), now);
        ticker.next().await;
    }
}
