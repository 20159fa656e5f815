//! Unified error type for serial2hid.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.
//!
//! Keys that are not forwarded to the host are *not* errors; those are
//! reported as [`crate::scheduler::SuppressReason`].

use core::fmt;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Scheduler timing/capacity configuration is inconsistent.
    Config(ConfigError),

    // USB
    /// USB stack returned an error (endpoint disabled, host gone).
    Usb,

    // Serial
    /// UART framing/overrun error on the input link.
    Uart,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Violations of the scheduler timing invariant
/// `min hold <= nominal hold < anti-spam window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Nominal hold time is not shorter than the anti-spam window.
    HoldNotBelowWindow,
    /// Minimum forced hold time is longer than the nominal hold time.
    MinHoldAboveHold,
    /// Capacity is zero or above the USB boot keyboard limit.
    CapacityOutOfRange,
    /// Global pacing interval of zero would allow unbounded throughput.
    ZeroPacing,
}

// Convenience conversions

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::HoldNotBelowWindow => "keypress time must be below the anti-spam window",
            ConfigError::MinHoldAboveHold => "minimum keypress time exceeds keypress time",
            ConfigError::CapacityOutOfRange => "key capacity must be between 1 and 6",
            ConfigError::ZeroPacing => "emit interval must be at least 1 ms",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "invalid configuration: {e}"),
            Error::Usb => f.write_str("USB error"),
            Error::Uart => f.write_str("UART error"),
            Error::BufferOverflow => f.write_str("buffer overflow"),
        }
    }
}
