//! User interface subsystem - front-panel buttons + indicator LEDs.
//!
//! ## Components
//!
//! - **Buttons**: 4 tactile switches (TEST KEY, LOAD A, LOAD B, PAUSE),
//!   sampled once per relay tick and debounced in [`controls`]
//! - **LEDs**: green = key activity, red = backpressure, red blinking =
//!   paused
//! - **Load generator**: synthetic keystroke runs started from the panel

pub mod controls;
pub mod loadgen;

#[cfg(feature = "embedded")]
pub mod buttons;
#[cfg(feature = "embedded")]
pub mod leds;

pub use controls::{ControlEvent, ControlPanel, Fired, BUTTON_COUNT};
pub use loadgen::{LoadGenerator, LoadProfile};
