//! GPIO button inputs.
//!
//! Four buttons, active-low with internal pull-up:
//!   - TEST KEY - type one test character
//!   - LOAD A   - start/stop synthetic load A
//!   - LOAD B   - start/stop synthetic load B
//!   - PAUSE    - pause/resume key-downs
//!
//! The relay loop samples them every tick; debouncing happens in
//! [`super::controls::ControlPanel`].

use super::controls::BUTTON_COUNT;
use embassy_nrf::gpio::{AnyPin, Input, Pull};

/// The four panel inputs.
pub struct Buttons {
    pins: [Input<'static>; BUTTON_COUNT],
}

impl Buttons {
    /// Pins in [`super::ControlEvent::ALL`] order.
    pub fn new(pins: [AnyPin; BUTTON_COUNT]) -> Self {
        Self {
            pins: pins.map(|pin| Input::new(pin, Pull::Up)),
        }
    }

    /// True for every button currently held down.
    pub fn levels(&self) -> [bool; BUTTON_COUNT] {
        core::array::from_fn(|i| self.pins[i].is_low())
    }
}
