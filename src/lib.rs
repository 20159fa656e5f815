//! serial2hid - serial-to-USB keyboard relay.
//!
//! Characters arriving on a UART are turned into USB HID key presses with
//! anti-spam filtering, global pacing and a bounded number of keys down at
//! once. All of the relay logic is plain `no_std` code that runs on the
//! host; the board bring-up in `main.rs` only wires it to the peripherals.
//!
//! Usage: `cargo test` on the host, `cargo build --release --features
//! embedded --target thumbv7em-none-eabihf` for the board.
//!
//! ## Layout
//!
//! - [`clock`]: wraparound-aware millisecond timestamps
//! - [`scheduler`]: admission, timing ledger and key release
//! - [`relay`]: one polling-loop iteration around the scheduler
//! - [`hid`]: key codes, the HID sink seam and the boot keyboard report
//! - [`stats`], [`console`]: counters and the `?`/`c` debug console
//! - [`ui`]: buttons, load generator and indicator LEDs
//! - `serial`, `usb`: UART and USB tasks (feature `embedded`)

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod hid;
pub mod relay;
pub mod scheduler;
pub mod stats;
pub mod ui;

#[cfg(feature = "embedded")]
pub mod serial;
#[cfg(feature = "embedded")]
pub mod usb;

pub use clock::{Clock, Millis};
pub use error::{ConfigError, Error};
pub use hid::{HidSink, KeyCode};
pub use relay::{Relay, TickOutcome};
pub use scheduler::{Admission, Scheduler, SchedulerConfig};
pub use stats::{Observer, Stats};
