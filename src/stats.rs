//! Relay statistics.
//!
//! The scheduler reports every decision to an [`Observer`]. Observers only
//! watch; nothing they do feeds back into scheduling. `()` is the no-op
//! observer used when statistics are not wanted.

use crate::config::{KEYPRESS_MAX_TIME_MS, KEY_COUNT};
use crate::hid::KeyCode;
use crate::scheduler::{ResetCause, SuppressReason};

#[cfg(any(test, feature = "embedded"))]
use core::cell::RefCell;
#[cfg(any(test, feature = "embedded"))]
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
#[cfg(any(test, feature = "embedded"))]
use embassy_sync::blocking_mutex::Mutex;

/// Receives scheduler events.
#[allow(unused_variables)]
pub trait Observer {
    /// A key-down was forwarded; `keys_down` includes it.
    fn emitted(&mut self, key: KeyCode, keys_down: u8) {}

    /// An incoming byte was not forwarded.
    fn suppressed(&mut self, byte: u8, reason: SuppressReason) {}

    /// A key-up was forwarded after `held_ms`. `forced` is set when the key
    /// was cut short to make room for another one.
    fn released(&mut self, key: KeyCode, held_ms: u32, forced: bool) {}

    /// The timing ledger was wiped.
    fn reset(&mut self, cause: ResetCause) {}
}

impl Observer for () {}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn emitted(&mut self, key: KeyCode, keys_down: u8) {
        (**self).emitted(key, keys_down)
    }

    fn suppressed(&mut self, byte: u8, reason: SuppressReason) {
        (**self).suppressed(byte, reason)
    }

    fn released(&mut self, key: KeyCode, held_ms: u32, forced: bool) {
        (**self).released(key, held_ms, forced)
    }

    fn reset(&mut self, cause: ResetCause) {
        (**self).reset(cause)
    }
}

/// Counters behind the `?` console command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    sent: [u32; KEY_COUNT],
    suppressed: [u32; KEY_COUNT],
    out_of_range: u32,
    shortest_keypress_ms: u32,
    max_keys_down: u8,
    nominal_hold_ms: u32,
}

impl Stats {
    pub const fn new() -> Self {
        Self::with_nominal_hold(KEYPRESS_MAX_TIME_MS)
    }

    /// Shortest-keypress tracking starts from `nominal_hold_ms`, the
    /// longest a key is ever held.
    pub const fn with_nominal_hold(nominal_hold_ms: u32) -> Self {
        Self {
            sent: [0; KEY_COUNT],
            suppressed: [0; KEY_COUNT],
            out_of_range: 0,
            shortest_keypress_ms: nominal_hold_ms,
            max_keys_down: 0,
            nominal_hold_ms,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::with_nominal_hold(self.nominal_hold_ms);
    }

    pub fn sent(&self, key: KeyCode) -> u32 {
        self.sent[key.index()]
    }

    pub fn suppressed_count(&self, key: KeyCode) -> u32 {
        self.suppressed[key.index()]
    }

    pub fn out_of_range(&self) -> u32 {
        self.out_of_range
    }

    /// Shortest forced keypress seen so far.
    pub fn shortest_keypress_ms(&self) -> u32 {
        self.shortest_keypress_ms
    }

    pub fn max_keys_down(&self) -> u8 {
        self.max_keys_down
    }

    /// Keys that were received at least once, with (sent, suppressed).
    pub fn seen_keys(&self) -> impl Iterator<Item = (KeyCode, u32, u32)> + '_ {
        KeyCode::all()
            .map(|k| (k, self.sent[k.index()], self.suppressed[k.index()]))
            .filter(|&(_, sent, suppressed)| sent > 0 || suppressed > 0)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for Stats {
    fn emitted(&mut self, key: KeyCode, keys_down: u8) {
        let count = &mut self.sent[key.index()];
        *count = count.saturating_add(1);
        self.max_keys_down = self.max_keys_down.max(keys_down);
    }

    fn suppressed(&mut self, byte: u8, _reason: SuppressReason) {
        let count = match KeyCode::new(byte) {
            Some(key) => &mut self.suppressed[key.index()],
            None => &mut self.out_of_range,
        };
        *count = count.saturating_add(1);
    }

    fn released(&mut self, _key: KeyCode, held_ms: u32, forced: bool) {
        if forced {
            self.shortest_keypress_ms = self.shortest_keypress_ms.min(held_ms);
        }
    }

    fn reset(&mut self, _cause: ResetCause) {
        self.clear();
    }
}

/// [`Stats`] shared between the relay loop (writer, through [`Observer`])
/// and the debug console (reader).
///
/// Every access holds the lock, so readers take a [`snapshot`] and format
/// that; with a critical-section mutex the lock masks interrupts.
///
/// [`snapshot`]: SharedStats::snapshot
#[cfg(any(test, feature = "embedded"))]
pub struct SharedStats<M: RawMutex = CriticalSectionRawMutex>(Mutex<M, RefCell<Stats>>);

#[cfg(any(test, feature = "embedded"))]
impl<M: RawMutex> SharedStats<M> {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(Stats::new())))
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> Stats {
        self.0.lock(|stats| stats.borrow().clone())
    }

    /// Render the `?` report from a snapshot, outside the lock.
    pub fn write_report<W: core::fmt::Write>(&self, out: &mut W) -> core::fmt::Result {
        let snapshot = self.snapshot();
        crate::console::write_report(out, &snapshot)
    }

    fn update(&self, f: impl FnOnce(&mut Stats)) {
        self.0.lock(|stats| f(&mut stats.borrow_mut()))
    }
}

#[cfg(any(test, feature = "embedded"))]
impl<M: RawMutex> Default for SharedStats<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "embedded"))]
impl<M: RawMutex> Observer for &SharedStats<M> {
    fn emitted(&mut self, key: KeyCode, keys_down: u8) {
        self.update(|s| s.emitted(key, keys_down))
    }

    fn suppressed(&mut self, byte: u8, reason: SuppressReason) {
        self.update(|s| s.suppressed(byte, reason))
    }

    fn released(&mut self, key: KeyCode, held_ms: u32, forced: bool) {
        self.update(|s| s.released(key, held_ms, forced))
    }

    fn reset(&mut self, cause: ResetCause) {
        self.update(|s| s.reset(cause))
    }
}
