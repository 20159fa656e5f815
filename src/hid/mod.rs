//! Key codes and the HID output boundary.
//!
//! The scheduler only ever talks to the host through [`HidSink`]; what a
//! "press" means on the wire (boot report, layout) is the sink's business.

pub mod keyboard;

use crate::config::{END_KEY, FIRST_KEY, KEY_COUNT};

/// A character code inside the supported range `[32, 128)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyCode(u8);

impl KeyCode {
    /// Range-check a raw byte from the serial link.
    pub const fn new(byte: u8) -> Option<Self> {
        if byte >= FIRST_KEY && byte < END_KEY {
            Some(Self(byte))
        } else {
            None
        }
    }

    /// Key for ledger slot `index`.
    pub(crate) const fn from_index(index: usize) -> Self {
        debug_assert!(index < KEY_COUNT);
        Self(FIRST_KEY + index as u8)
    }

    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Ledger slot of this key.
    pub const fn index(self) -> usize {
        (self.0 - FIRST_KEY) as usize
    }

    /// Iterate all supported keys in code order.
    pub fn all() -> impl Iterator<Item = KeyCode> {
        (0..KEY_COUNT).map(KeyCode::from_index)
    }
}

/// Receiver of key-down / key-up events.
///
/// Calls arrive strictly in order, and a `release` is only ever issued for
/// a key that was pressed; the scheduler is the source of truth for which
/// keys are down.
pub trait HidSink {
    fn press(&mut self, key: KeyCode);
    fn release(&mut self, key: KeyCode);
}

impl<S: HidSink + ?Sized> HidSink for &mut S {
    fn press(&mut self, key: KeyCode) {
        (**self).press(key)
    }

    fn release(&mut self, key: KeyCode) {
        (**self).release(key)
    }
}
