//! Debug console.
//!
//! Single-character commands on the CDC-ACM port:
//!
//! | Byte | Action                                 |
//! |------|----------------------------------------|
//! | `?`  | print the relay statistics             |
//! | `c`  | clear statistics and the timing ledger |
//!
//! Anything else is ignored. Output is plain text with CRLF line endings,
//! written through `core::fmt::Write` so it can target any buffer.

use core::fmt::{self, Write};

use crate::config::USB_BOOT_KEY_LIMIT;
use crate::scheduler::SchedulerConfig;
use crate::stats::Stats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Report,
    Clear,
}

impl Command {
    pub const fn parse(byte: u8) -> Option<Self> {
        match byte {
            b'?' => Some(Command::Report),
            b'c' => Some(Command::Clear),
            _ => None,
        }
    }
}

/// Startup line describing the active timing.
pub fn write_banner<W: Write>(out: &mut W, config: &SchedulerConfig) -> fmt::Result {
    write!(
        out,
        "Serial to HID Ready!\r\nUsing anti-spam delay of {}ms and a keypress time between {}ms and {}ms.\r\n",
        config.player_delay_ms, config.keypress_min_ms, config.keypress_max_ms
    )
}

/// Statistics report for the `?` command.
pub fn write_report<W: Write>(out: &mut W, stats: &Stats) -> fmt::Result {
    write!(
        out,
        "\r\nStats (c=clear):\r\nShortest keypress: {}ms\r\nMax keys down: {} (USB limit={})\r\n",
        stats.shortest_keypress_ms(),
        stats.max_keys_down(),
        USB_BOOT_KEY_LIMIT
    )?;
    for (key, sent, suppressed) in stats.seen_keys() {
        write!(
            out,
            "Key '{}': Send: {}: Supr: {}\r\n",
            key.as_byte() as char,
            sent,
            suppressed
        )?;
    }
    if stats.out_of_range() > 0 {
        write!(out, "Unsupported: {}\r\n", stats.out_of_range())?;
    }
    out.write_str("------\r\nPress c to clear\r\n")
}

/// Reply to the `c` command. `accepted` is false when the clear request
/// could not be handed to the relay loop; nothing was cleared then.
pub fn write_cleared<W: Write>(out: &mut W, accepted: bool) -> fmt::Result {
    if accepted {
        out.write_str("Stats cleared.\r\n")
    } else {
        out.write_str("Clear failed: relay busy, try again.\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::KeyCode;
    use crate::scheduler::SuppressReason;
    use crate::stats::Observer;

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse(b'?'), Some(Command::Report));
        assert_eq!(Command::parse(b'c'), Some(Command::Clear));
        assert_eq!(Command::parse(b'C'), None);
        assert_eq!(Command::parse(b'\r'), None);
    }

    #[test]
    fn banner_lists_timing() {
        let mut out: heapless::String<256> = heapless::String::new();
        write_banner(&mut out, &SchedulerConfig::DEFAULT).unwrap();
        assert!(out.contains("anti-spam delay of 50ms"));
        assert!(out.contains("between 20ms and 40ms"));
    }

    #[test]
    fn report_lists_seen_keys_only() {
        let mut stats = Stats::new();
        stats.emitted(KeyCode::new(b'G').unwrap(), 2);
        stats.suppressed(b'G', SuppressReason::TooSoonSameKey);
        stats.suppressed(b'G', SuppressReason::TooSoonSameKey);
        stats.released(KeyCode::new(b'G').unwrap(), 23, true);

        let mut out: heapless::String<512> = heapless::String::new();
        write_report(&mut out, &stats).unwrap();

        assert!(out.contains("Shortest keypress: 23ms\r\n"));
        assert!(out.contains("Max keys down: 2 (USB limit=6)\r\n"));
        assert!(out.contains("Key 'G': Send: 1: Supr: 2\r\n"));
        assert!(!out.contains("Key 'a'"));
        assert!(!out.contains("Unsupported"));
        assert!(out.ends_with("Press c to clear\r\n"));
    }

    #[test]
    fn clear_reply_depends_on_acceptance() {
        let mut out: heapless::String<64> = heapless::String::new();
        write_cleared(&mut out, true).unwrap();
        assert_eq!(out.as_str(), "Stats cleared.\r\n");

        out.clear();
        write_cleared(&mut out, false).unwrap();
        assert!(!out.contains("cleared."));
        assert!(out.starts_with("Clear failed"));
    }

    #[test]
    fn report_overflow_is_an_error() {
        let stats = Stats::new();
        let mut out: heapless::String<16> = heapless::String::new();
        assert!(write_report(&mut out, &stats).is_err());
    }
}
