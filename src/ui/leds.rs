//! Indicator LEDs.

use crate::clock::Millis;
use crate::config::PAUSED_BLINK_MS;
use crate::scheduler::Indicators;
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};

/// Green/red LED pair on the interface board (active high).
pub struct Leds {
    green: Output<'static>,
    red: Output<'static>,
}

impl Leds {
    pub fn new(green: AnyPin, red: AnyPin) -> Self {
        Self {
            green: Output::new(green, Level::Low, OutputDrive::Standard),
            red: Output::new(red, Level::Low, OutputDrive::Standard),
        }
    }

    /// Reflect the scheduler state.
    ///
    /// Pressure wins over the paused blink on the red LED.
    pub fn show(&mut self, indicators: Indicators, now: Millis) {
        self.green.set_level(indicators.active.into());

        let blink_on = (now.as_ms() / PAUSED_BLINK_MS) % 2 == 0;
        let red = indicators.pressure || (indicators.paused && blink_on);
        self.red.set_level(red.into());
    }
}
