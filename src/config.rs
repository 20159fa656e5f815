//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, capacity limits, pin assignments and protocol
//! constants live here so they can be tuned in one place.

// Key range

/// First supported character code (space).
pub const FIRST_KEY: u8 = 32;

/// One past the last supported character code.
pub const END_KEY: u8 = 128;

/// Number of key slots in the timing ledger.
pub const KEY_COUNT: usize = (END_KEY - FIRST_KEY) as usize;

// Scheduler timing

/// Minimum spacing between two processed admissions (ms).
/// 1 ms caps the relay at 1000 key events per second.
pub const MIN_EMIT_INTERVAL_MS: u32 = 1;

/// When the same key is received again within this window it is not sent
/// (prevents spamming, cheating and backlog floods).
pub const PLAYER_DELAY_MS: u32 = 50;

/// Nominal time between key-down and key-up. Must be smaller than
/// `PLAYER_DELAY_MS` so every key is up before it may be pressed again.
pub const KEYPRESS_MAX_TIME_MS: u32 = 40;

/// When all key slots are in use, a key may be released early, but never
/// after less than this.
pub const KEYPRESS_MIN_TIME_MS: u32 = 20;

/// Maximum keys pressed at the same time (USB boot keyboard limit).
/// Max rate = 1000 * MAX_KEYS_SAME_TIME / KEYPRESS_MIN_TIME_MS keys/sec.
pub const MAX_KEYS_SAME_TIME: u8 = 6;

/// Hard limit imposed by the 6-byte key array of a boot keyboard report.
pub const USB_BOOT_KEY_LIMIT: u8 = 6;

/// What to do with a key when all slots stay occupied.
pub const BACKPRESSURE: Backpressure = Backpressure::Drop;

/// Give up on a buffered key after this long (`None` = wait forever).
pub const BUFFER_STALL_LIMIT_MS: Option<u32> = None;

const _: () = assert!(
    KEYPRESS_MAX_TIME_MS < PLAYER_DELAY_MS,
    "keypress time must be shorter than the anti-spam window"
);
const _: () = assert!(
    KEYPRESS_MIN_TIME_MS <= KEYPRESS_MAX_TIME_MS,
    "minimum keypress time exceeds the nominal keypress time"
);
const _: () = assert!(MAX_KEYS_SAME_TIME >= 1 && MAX_KEYS_SAME_TIME <= USB_BOOT_KEY_LIMIT);

/// Backpressure policy applied when the key capacity is exhausted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backpressure {
    /// Discard the key.
    Drop,
    /// Hold the key back until a slot frees up, stalling further input.
    Buffer,
}

// Indicators

/// How long the "active" LED stays lit after an admission (ms).
pub const ACTIVE_BLINK_MS: u32 = 10;

/// Blink period of the "paused" indication (ms).
pub const PAUSED_BLINK_MS: u32 = 500;

// Manual controls

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u32 = 20;

/// Key sent by the "test key" button.
pub const TEST_KEY: u8 = b't';

/// Synthetic load A: interval between generated characters (ms), 500 chars/s.
pub const LOAD_A_INTERVAL_MS: u32 = 2;

/// Synthetic load B: interval between generated characters (ms), 1000 chars/s.
pub const LOAD_B_INTERVAL_MS: u32 = 1;

/// Characters generated per load run.
pub const LOAD_B_LENGTH: u32 = 2000;

/// Repeats of each character in the load A pattern.
pub const LOAD_A_REPEAT: u32 = 2000;

// Serial link

/// Baud rate of the link from the matrix-scanning microcontroller.
pub const UART_BAUDRATE: u32 = 115_200;

/// Depth of the received-byte queue between the UART task and the relay loop.
pub const UART_QUEUE_DEPTH: usize = 64;

/// DMA receive ring (bytes). About 20 ms of input at 115200 baud.
pub const UART_RX_RING_SIZE: usize = 256;

/// DMA transmit ring (bytes). The relay never transmits.
pub const UART_TX_RING_SIZE: usize = 16;

/// Relay loop period (µs). One input byte and one release pass per tick.
pub const TICK_PERIOD_US: u64 = 1000;

/// Delay before the relay starts processing input after power-up (ms).
pub const STARTUP_DELAY_MS: u64 = 1000;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "serial2hid";
pub const USB_PRODUCT: &str = "Serial-to-USB Keyboard Relay";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

/// Depth of the report queue between the relay loop and the HID writer.
pub const HID_REPORT_QUEUE_DEPTH: usize = 16;

/// Packet size of the CDC-ACM debug console.
pub const CONSOLE_PACKET_SIZE: u16 = 64;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; the actual `embassy_nrf::peripherals::*` are
// picked in `main.rs`. Adjust for your interface board.
//
//   UART RX (from matrix MCU) → P0.08
//   UART TX                   → P0.06
//   Button TEST KEY           → P0.11
//   Button LOAD A             → P0.12
//   Button LOAD B             → P0.24
//   Button PAUSE              → P0.25
//   LED green (active)        → P0.13
//   LED red (pressure/pause)  → P0.14
