//! Key-up scheduling.

use super::Scheduler;
use crate::clock::Millis;
use crate::hid::{HidSink, KeyCode};
use crate::stats::Observer;

/// A key-up sent by [`Scheduler::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Release {
    pub key: KeyCode,
    /// How long the key was down.
    pub held_ms: u32,
    /// Cut short to make room for another key.
    pub forced: bool,
}

impl<O: Observer> Scheduler<O> {
    /// Release at most one key.
    ///
    /// The first key held for the nominal time is released. Otherwise, in
    /// `fast` mode with every slot in use, the longest-held key is released
    /// early if it has been down for at least the minimum time. Returning
    /// after a single key-up keeps each tick short, so new input is picked
    /// up sooner.
    pub fn tick<S: HidSink>(&mut self, now: Millis, fast: bool, sink: &mut S) -> Option<Release> {
        let mut expired = None;
        let mut longest: Option<(KeyCode, u32)> = None;

        for (key, slot) in self.ledger.pressed() {
            let Some(held) = slot.held(now) else {
                continue;
            };
            if held >= self.config.keypress_max_ms {
                expired = Some((key, held));
                break;
            }
            if longest.map_or(true, |(_, best)| held > best) {
                longest = Some((key, held));
            }
        }

        if let Some((key, held_ms)) = expired {
            return Some(self.release(key, held_ms, false, sink));
        }

        let (key, held_ms) = longest?;
        let full = self.ledger.occupancy() >= self.config.capacity;
        if fast && full && held_ms >= self.config.keypress_min_ms {
            trace!("Releasing {} early after {=u32} ms", key, held_ms);
            return Some(self.release(key, held_ms, true, sink));
        }
        None
    }

    fn release<S: HidSink>(&mut self, key: KeyCode, held_ms: u32, forced: bool, sink: &mut S) -> Release {
        sink.release(key);
        self.ledger.mark_released(key);
        self.observer.released(key, held_ms, forced);
        Release {
            key,
            held_ms,
            forced,
        }
    }
}
