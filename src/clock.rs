//! Millisecond time base.
//!
//! The scheduler runs on a 32-bit millisecond counter that wraps after
//! about 49.7 days. [`Millis`] keeps the arithmetic explicit about that:
//! durations between two readings are either wrapping (hold times, which
//! are always short) or checked (ordering, used to detect the wrap).

use core::cell::Cell;

/// A reading of the wrapping millisecond counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    pub const fn as_ms(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, modulo 2^32.
    ///
    /// Correct across a single counter wrap as long as the real distance
    /// is below 2^32 ms.
    pub const fn wrapping_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Milliseconds from `earlier` to `self`, or `None` if `self` reads
    /// lower than `earlier` (the counter wrapped in between).
    pub const fn checked_since(self, earlier: Millis) -> Option<u32> {
        self.0.checked_sub(earlier.0)
    }

    pub const fn wrapping_add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }

    /// True once `self` is at or past `deadline`, for deadlines less than
    /// 2^31 ms away.
    pub const fn has_reached(self, deadline: Millis) -> bool {
        (self.wrapping_since(deadline) as i32) >= 0
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Millis {
        (**self).now()
    }
}

/// Clock driven by hand, for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    /// Move the clock forward, wrapping like the hardware counter.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.now.get())
    }
}
