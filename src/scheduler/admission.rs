//! Admission of incoming characters.

use super::{ResetCause, Scheduler};
use crate::clock::Millis;
use crate::config::Backpressure;
use crate::hid::{HidSink, KeyCode};
use crate::stats::Observer;

/// Why a character was not forwarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SuppressReason {
    /// Outside the supported range `[32, 128)`.
    OutOfRange,
    /// Same key received again inside the anti-spam window.
    TooSoonSameKey,
    /// Key is still down. Cannot happen while the hold time is shorter
    /// than the anti-spam window; reported as a diagnostic.
    AlreadyPressed,
    /// All key slots stayed occupied.
    CapacityExceeded,
    /// Relay is paused.
    Paused,
}

/// What the relay is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockReason {
    /// The global pacing interval has not elapsed yet.
    Pacing,
    /// Every key slot is in use and none may be released yet.
    Capacity,
}

/// An admission that could not finish yet.
///
/// Hand it back to [`Scheduler::resume`] on a later tick. Until then no new
/// input should be admitted, or keys would be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pending {
    key: KeyCode,
    reason: BlockReason,
    since: Millis,
}

impl Pending {
    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn reason(&self) -> BlockReason {
        self.reason
    }

    /// When the admission first had to wait.
    pub fn since(&self) -> Millis {
        self.since
    }
}

/// Outcome of one admission step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Admission {
    /// Key-down was sent to the host.
    Emitted(KeyCode),
    /// Character dropped.
    Suppressed(SuppressReason),
    /// Not decided yet; resume later.
    Blocked(Pending),
}

impl Admission {
    pub fn is_emitted(&self) -> bool {
        matches!(self, Admission::Emitted(_))
    }

    pub fn suppress_reason(&self) -> Option<SuppressReason> {
        match self {
            Admission::Suppressed(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<Pending> {
        match self {
            Admission::Blocked(pending) => Some(*pending),
            _ => None,
        }
    }
}

impl<O: Observer> Scheduler<O> {
    /// Run a newly received byte through admission.
    pub fn admit<S: HidSink>(&mut self, byte: u8, now: Millis, sink: &mut S) -> Admission {
        let Some(key) = KeyCode::new(byte) else {
            debug!("Unsupported char received: {=u8}", byte);
            return self.suppress(byte, SuppressReason::OutOfRange);
        };
        self.pace(key, now, now, sink)
    }

    /// Continue an admission that returned [`Admission::Blocked`].
    ///
    /// A pacing wait restarts from the pacing check. A capacity wait only
    /// repeats the capacity check: the anti-spam ledger was already updated
    /// for this key and must not see it twice.
    pub fn resume<S: HidSink>(&mut self, pending: Pending, now: Millis, sink: &mut S) -> Admission {
        match pending.reason {
            BlockReason::Pacing => self.pace(pending.key, pending.since, now, sink),
            BlockReason::Capacity => self.claim_slot(pending, now, sink),
        }
    }

    fn pace<S: HidSink>(&mut self, key: KeyCode, since: Millis, now: Millis, sink: &mut S) -> Admission {
        if let Some(last) = self.ledger.last_emit_at() {
            match now.checked_since(last) {
                None => {
                    info!("millis() overflow, reset timers");
                    self.reset(sink, ResetCause::ClockWrap);
                }
                Some(elapsed) if elapsed < self.config.min_emit_interval_ms => {
                    return Admission::Blocked(Pending {
                        key,
                        reason: BlockReason::Pacing,
                        since,
                    });
                }
                Some(_) => {}
            }
        }
        self.ledger.set_last_emit_at(now);

        let window = self.config.player_delay_ms;
        let slot = self.ledger.slot_mut(key);
        let previous = slot.last_received_at.replace(now);
        let too_soon = previous.is_some_and(|prev| now.checked_since(prev).map_or(true, |d| d < window));
        if too_soon {
            trace!("Suppressed repeated key {}", key);
            return self.suppress(key.as_byte(), SuppressReason::TooSoonSameKey);
        }

        if slot.pressed {
            warn!("Key {} is already pressed, should not happen!", key);
            return self.suppress(key.as_byte(), SuppressReason::AlreadyPressed);
        }

        self.claim_slot(
            Pending {
                key,
                reason: BlockReason::Capacity,
                since: now,
            },
            now,
            sink,
        )
    }

    fn claim_slot<S: HidSink>(&mut self, pending: Pending, now: Millis, sink: &mut S) -> Admission {
        let key = pending.key;

        if self.ledger.occupancy() >= self.config.capacity {
            // Try to free the longest-held key early.
            self.tick(now, true, sink);
        }

        if self.ledger.occupancy() >= self.config.capacity {
            let stalled = self
                .config
                .stall_limit_ms
                .is_some_and(|limit| now.wrapping_since(pending.since) >= limit);

            if self.config.backpressure == Backpressure::Buffer && !stalled {
                self.under_pressure = true;
                return Admission::Blocked(pending);
            }

            self.under_pressure = false;
            debug!("Maximum keys pressed, discard key {}", key);
            return self.suppress(key.as_byte(), SuppressReason::CapacityExceeded);
        }
        self.under_pressure = false;

        self.last_activity = Some(now);
        if self.paused {
            return self.suppress(key.as_byte(), SuppressReason::Paused);
        }

        sink.press(key);
        self.ledger.mark_pressed(key, now);
        self.observer.emitted(key, self.ledger.occupancy());
        Admission::Emitted(key)
    }

    fn suppress(&mut self, byte: u8, reason: SuppressReason) -> Admission {
        self.observer.suppressed(byte, reason);
        Admission::Suppressed(reason)
    }
}
