//! USB Device subsystem - presents a composite device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with two functions:
//!
//! - HID keyboard (boot protocol) carrying the relayed key presses
//! - CDC-ACM serial port carrying the debug console
//!
//! The relay loop queues keyboard reports on [`hid_device::REPORTS`]; the
//! writer task forwards them to the HID endpoint.

pub mod console;
pub mod hid_device;
