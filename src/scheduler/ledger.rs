//! Per-key timing ledger.

use crate::clock::Millis;
use crate::config::KEY_COUNT;
use crate::hid::KeyCode;

/// Timing record of one key.
///
/// `None` timestamps mean "never" (fresh ledger or after a reset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeySlot {
    /// Last admission attempt that got past global pacing.
    pub last_received_at: Option<Millis>,
    /// Last key-down forwarded to the host.
    pub last_sent_at: Option<Millis>,
    /// Key-down sent, key-up not yet.
    pub pressed: bool,
}

impl KeySlot {
    pub const IDLE: KeySlot = KeySlot {
        last_received_at: None,
        last_sent_at: None,
        pressed: false,
    };

    /// How long the key has been down, if it is.
    pub fn held(&self, now: Millis) -> Option<u32> {
        if !self.pressed {
            return None;
        }
        self.last_sent_at.map(|sent| now.wrapping_since(sent))
    }
}

/// Timing state shared by admission and release.
///
/// `occupancy` always equals the number of pressed slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    slots: [KeySlot; KEY_COUNT],
    last_emit_at: Option<Millis>,
    occupancy: u8,
}

impl Ledger {
    pub const fn new() -> Self {
        Self {
            slots: [KeySlot::IDLE; KEY_COUNT],
            last_emit_at: None,
            occupancy: 0,
        }
    }

    pub fn slot(&self, key: KeyCode) -> &KeySlot {
        &self.slots[key.index()]
    }

    pub(crate) fn slot_mut(&mut self, key: KeyCode) -> &mut KeySlot {
        &mut self.slots[key.index()]
    }

    /// Keys currently down.
    pub fn occupancy(&self) -> u8 {
        self.occupancy
    }

    /// Time of the last admission that passed global pacing.
    pub fn last_emit_at(&self) -> Option<Millis> {
        self.last_emit_at
    }

    pub(crate) fn set_last_emit_at(&mut self, now: Millis) {
        self.last_emit_at = Some(now);
    }

    /// Pressed keys in code order.
    pub fn pressed(&self) -> impl Iterator<Item = (KeyCode, &KeySlot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pressed)
            .map(|(i, slot)| (KeyCode::from_index(i), slot))
    }

    pub(crate) fn mark_pressed(&mut self, key: KeyCode, now: Millis) {
        let slot = &mut self.slots[key.index()];
        debug_assert!(!slot.pressed);
        slot.last_sent_at = Some(now);
        slot.pressed = true;
        self.occupancy += 1;
    }

    pub(crate) fn mark_released(&mut self, key: KeyCode) {
        let slot = &mut self.slots[key.index()];
        if slot.pressed {
            slot.pressed = false;
            self.occupancy -= 1;
        }
    }

    /// Forget all timestamps and pressed flags.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// True when nothing has been recorded since creation or the last clear.
    pub fn is_clear(&self) -> bool {
        self.last_emit_at.is_none()
            && self.occupancy == 0
            && self.slots.iter().all(|slot| *slot == KeySlot::IDLE)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
