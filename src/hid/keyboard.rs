//! USB HID keyboard report (boot protocol compatible).
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```
//!
//! Characters are mapped with a fixed US layout.

use super::{HidSink, KeyCode};
use crate::config::USB_BOOT_KEY_LIMIT;

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Left Shift bit in the modifier byte.
pub const MODIFIER_LEFT_SHIFT: u8 = 0x02;

const KEY_SLOTS: usize = USB_BOOT_KEY_LIMIT as usize;

/// Standard USB HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte (always 0x00 per HID spec).
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (8, or 0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Returns `true` if no keys are pressed (release event).
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

/// HID usage and shift state for a printable ASCII character (US layout).
pub const fn ascii_to_usage(c: u8) -> Option<(u8, bool)> {
    let mapped = match c {
        b'a'..=b'z' => (0x04 + (c - b'a'), false),
        b'A'..=b'Z' => (0x04 + (c - b'A'), true),
        b'1'..=b'9' => (0x1E + (c - b'1'), false),
        b'0' => (0x27, false),
        b' ' => (0x2C, false),
        b'!' => (0x1E, true),
        b'@' => (0x1F, true),
        b'#' => (0x20, true),
        b'$' => (0x21, true),
        b'%' => (0x22, true),
        b'^' => (0x23, true),
        b'&' => (0x24, true),
        b'*' => (0x25, true),
        b'(' => (0x26, true),
        b')' => (0x27, true),
        b'-' => (0x2D, false),
        b'_' => (0x2D, true),
        b'=' => (0x2E, false),
        b'+' => (0x2E, true),
        b'[' => (0x2F, false),
        b'{' => (0x2F, true),
        b']' => (0x30, false),
        b'}' => (0x30, true),
        b'\\' => (0x31, false),
        b'|' => (0x31, true),
        b';' => (0x33, false),
        b':' => (0x33, true),
        b'\'' => (0x34, false),
        b'"' => (0x34, true),
        b'`' => (0x35, false),
        b'~' => (0x35, true),
        b',' => (0x36, false),
        b'<' => (0x36, true),
        b'.' => (0x37, false),
        b'>' => (0x37, true),
        b'/' => (0x38, false),
        b'?' => (0x38, true),
        0x7F => (0x4C, false), // DEL -> Delete Forward
        _ => return None,
    };
    Some(mapped)
}

/// Logical keyboard state behind the USB endpoint.
///
/// Tracks which characters are down and renders them into boot reports.
/// Every change marks the state dirty; the HID writer picks up the latest
/// report with [`KeyboardState::take_report`].
///
/// A boot report has one modifier byte for all keys, so overlapping
/// characters interfere:
///
/// - Shift is held while any pressed character needs it. `B` then `a`
///   reaches the host as `B` `A`.
/// - Characters on the same key (`a` and `A`) share one usage. Pressing the
///   second while the first is down changes at most the Shift bit, so the
///   host sees no new key-down for it.
///
/// The scheduler still counts such characters as emitted.
#[derive(Clone, Debug, Default)]
pub struct KeyboardState {
    pressed: [Option<KeyCode>; KEY_SLOTS],
    dirty: bool,
}

impl KeyboardState {
    pub const fn new() -> Self {
        Self {
            pressed: [None; KEY_SLOTS],
            dirty: false,
        }
    }

    /// Number of characters currently held.
    pub fn pressed_count(&self) -> usize {
        self.pressed.iter().flatten().count()
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&Some(key))
    }

    /// Render the current state as a boot report.
    ///
    /// Characters sharing a usage ('a' and 'A') occupy one report slot;
    /// Shift is held while any pressed character needs it.
    pub fn report(&self) -> KeyboardReport {
        let mut report = KeyboardReport::empty();
        let mut next = 0;
        for key in self.pressed.iter().flatten() {
            let Some((usage, shift)) = ascii_to_usage(key.as_byte()) else {
                continue;
            };
            if shift {
                report.modifier |= MODIFIER_LEFT_SHIFT;
            }
            if !report.keycodes[..next].contains(&usage) {
                report.keycodes[next] = usage;
                next += 1;
            }
        }
        report
    }

    /// Latest report if anything changed since the last call.
    pub fn take_report(&mut self) -> Option<KeyboardReport> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.report())
    }

    /// Force the next [`take_report`](Self::take_report) to yield a report,
    /// e.g. after the previous one could not be queued.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl HidSink for KeyboardState {
    fn press(&mut self, key: KeyCode) {
        if self.is_pressed(key) {
            return;
        }
        match self.pressed.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(key);
                self.dirty = true;
            }
            None => warn!("Keyboard report full, dropping {}", key),
        }
    }

    fn release(&mut self, key: KeyCode) {
        for slot in self.pressed.iter_mut() {
            if *slot == Some(key) {
                *slot = None;
                self.dirty = true;
            }
        }
    }
}

// USB HID report descriptor for a boot-protocol keyboard

/// USB HID Report Descriptor for a standard keyboard.
///
/// This descriptor tells the USB host that we are a keyboard with:
///   - 8 modifier key bits (input)
///   - 1 reserved byte
///   - 5 LED indicators (output)
///   - 6 key code bytes (input)
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant) - padding
    //
    //   - LED output (5 bits + 3 padding) -
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant) - padding
    //
    //   - Key codes (6 bytes) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];
