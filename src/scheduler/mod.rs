//! Keystroke admission and release scheduler.
//!
//! Every byte from the serial link goes through [`Scheduler::admit`], which
//! decides whether the key is pressed now, held back, or dropped.
//! [`Scheduler::tick`] independently releases keys that have been down
//! long enough. Both share one [`Ledger`] owned by the scheduler.
//!
//! ## Rules
//!
//! - At most one processed admission per `min_emit_interval_ms` (global
//!   pacing, 1000 keys/s with the default of 1 ms).
//! - The same key is accepted at most once per `player_delay_ms`
//!   (anti-spam). Repeats inside the window keep extending it.
//! - At most `capacity` keys are down at once (USB boot keyboard limit).
//!   When full, the longest-held key may be released early, but never
//!   after less than `keypress_min_ms`.
//! - Keys are released after `keypress_max_ms`.
//! - Pausing stops key-downs only; the timing ledger keeps running so a
//!   resume cannot be used to bypass the anti-spam window.
//!
//! The scheduler never blocks. Where the relay has to wait (pacing, or a
//! full key set under [`Backpressure::Buffer`]) it returns
//! [`Admission::Blocked`] and the caller resumes the admission on a later
//! tick.

mod admission;
mod ledger;
mod release;


pub use admission::{Admission, BlockReason, Pending, SuppressReason};
pub use ledger::{KeySlot, Ledger};
pub use release::Release;

use crate::clock::Millis;
use crate::config::{self, Backpressure};
use crate::error::ConfigError;
use crate::hid::HidSink;
use crate::stats::Observer;

/// Why the ledger was wiped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// The millisecond counter wrapped around.
    ClockWrap,
    /// Explicit "clear" request from the console.
    Command,
}

/// Scheduler timing and capacity parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Global pacing floor between processed admissions.
    pub min_emit_interval_ms: u32,
    /// Anti-spam window per key.
    pub player_delay_ms: u32,
    /// Nominal key-down duration.
    pub keypress_max_ms: u32,
    /// Shortest allowed key-down when releasing early under pressure.
    pub keypress_min_ms: u32,
    /// Maximum keys down at once.
    pub capacity: u8,
    pub backpressure: Backpressure,
    /// Buffered keys waiting this long are dropped (`None` = no limit).
    pub stall_limit_ms: Option<u32>,
}

impl SchedulerConfig {
    /// Built-in configuration from [`crate::config`].
    pub const DEFAULT: SchedulerConfig = SchedulerConfig {
        min_emit_interval_ms: config::MIN_EMIT_INTERVAL_MS,
        player_delay_ms: config::PLAYER_DELAY_MS,
        keypress_max_ms: config::KEYPRESS_MAX_TIME_MS,
        keypress_min_ms: config::KEYPRESS_MIN_TIME_MS,
        capacity: config::MAX_KEYS_SAME_TIME,
        backpressure: config::BACKPRESSURE,
        stall_limit_ms: config::BUFFER_STALL_LIMIT_MS,
    };

    /// Check `min hold <= nominal hold < anti-spam window` and the
    /// capacity bounds.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.min_emit_interval_ms == 0 {
            return Err(ConfigError::ZeroPacing);
        }
        if self.keypress_max_ms >= self.player_delay_ms {
            return Err(ConfigError::HoldNotBelowWindow);
        }
        if self.keypress_min_ms > self.keypress_max_ms {
            return Err(ConfigError::MinHoldAboveHold);
        }
        if self.capacity == 0 || self.capacity > config::USB_BOOT_KEY_LIMIT {
            return Err(ConfigError::CapacityOutOfRange);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const _: () = match SchedulerConfig::DEFAULT.validate() {
    Ok(()) => (),
    Err(_) => panic!("built-in scheduler configuration is invalid"),
};

/// State of the three indicator LEDs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators {
    /// A key is down or an admission just went through.
    pub active: bool,
    /// Input is held back because all key slots are in use.
    pub pressure: bool,
    /// Key-downs are paused.
    pub paused: bool,
}

/// The admission/release state machine.
pub struct Scheduler<O = ()> {
    config: SchedulerConfig,
    ledger: Ledger,
    paused: bool,
    under_pressure: bool,
    last_activity: Option<Millis>,
    observer: O,
}

impl Scheduler<()> {
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        Self::with_observer(config, ())
    }
}

impl<O: Observer> Scheduler<O> {
    /// Create a scheduler that reports every decision to `observer`.
    pub fn with_observer(config: SchedulerConfig, observer: O) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ledger: Ledger::new(),
            paused: false,
            under_pressure: false,
            last_activity: None,
            observer,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Keys currently down.
    pub fn occupancy(&self) -> u8 {
        self.ledger.occupancy()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!("Relay {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Flip the pause flag, returning the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    /// Release every key that is down and wipe the ledger.
    ///
    /// The sink sees a key-up for each pressed key, so the host never keeps
    /// a key that the scheduler has forgotten about.
    pub fn reset<S: HidSink>(&mut self, sink: &mut S, cause: ResetCause) {
        for (key, _) in self.ledger.pressed() {
            sink.release(key);
        }
        self.ledger.clear();
        self.under_pressure = false;
        self.observer.reset(cause);
        info!("Timers reset ({})", cause);
    }

    pub fn indicators(&self, now: Millis) -> Indicators {
        let recent = self
            .last_activity
            .is_some_and(|at| now.wrapping_since(at) < config::ACTIVE_BLINK_MS);
        Indicators {
            active: self.ledger.occupancy() > 0 || recent,
            pressure: self.under_pressure,
            paused: self.paused,
        }
    }
}
