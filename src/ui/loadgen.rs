//! Synthetic keystroke load for bench testing the relay.
//!
//! Generated characters enter the same admission path as bytes from the
//! serial link, so a run shows exactly what the host would receive from a
//! flooding matrix controller.

use crate::clock::Millis;
use crate::config::{LOAD_A_INTERVAL_MS, LOAD_A_REPEAT, LOAD_B_INTERVAL_MS, LOAD_B_LENGTH};

/// The two load patterns on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadProfile {
    /// 500 chars/s: a long run of 'G' then a long run of 'a'. Almost all
    /// of it must be eaten by the anti-spam window.
    A,
    /// 1000 chars/s cycling through the alphabet. Keeps all key slots busy.
    B,
}

impl LoadProfile {
    pub const fn interval_ms(self) -> u32 {
        match self {
            LoadProfile::A => LOAD_A_INTERVAL_MS,
            LoadProfile::B => LOAD_B_INTERVAL_MS,
        }
    }

    /// Characters in one run.
    pub const fn length(self) -> u32 {
        match self {
            LoadProfile::A => 2 * LOAD_A_REPEAT,
            LoadProfile::B => LOAD_B_LENGTH,
        }
    }

    /// The `n`th character of a run.
    pub const fn char_at(self, n: u32) -> u8 {
        match self {
            LoadProfile::A if n < LOAD_A_REPEAT => b'G',
            LoadProfile::A => b'a',
            LoadProfile::B => b'a' + (n % 26) as u8,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Run {
    profile: LoadProfile,
    sent: u32,
    next_at: Millis,
}

/// Emits load characters on schedule.
#[derive(Clone, Debug, Default)]
pub struct LoadGenerator {
    run: Option<Run>,
}

impl LoadGenerator {
    pub const fn new() -> Self {
        Self { run: None }
    }

    /// Profile currently running.
    pub fn running(&self) -> Option<LoadProfile> {
        self.run.map(|r| r.profile)
    }

    /// Start `profile`, or stop it if it is already running.
    pub fn toggle(&mut self, profile: LoadProfile, now: Millis) {
        if self.running() == Some(profile) {
            info!("Load {} stopped", profile);
            self.run = None;
            return;
        }
        info!("Load {} started", profile);
        self.run = Some(Run {
            profile,
            sent: 0,
            next_at: now,
        });
    }

    /// Next character if one is due at `now`.
    pub fn next_char(&mut self, now: Millis) -> Option<u8> {
        let run = self.run.as_mut()?;
        if !now.has_reached(run.next_at) {
            return None;
        }

        let c = run.profile.char_at(run.sent);
        run.sent += 1;
        run.next_at = now.wrapping_add(run.profile.interval_ms());

        if run.sent >= run.profile.length() {
            info!("Load {} finished", run.profile);
            self.run = None;
        }
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_a_pattern() {
        assert_eq!(LoadProfile::A.char_at(0), b'G');
        assert_eq!(LoadProfile::A.char_at(LOAD_A_REPEAT - 1), b'G');
        assert_eq!(LoadProfile::A.char_at(LOAD_A_REPEAT), b'a');
        assert_eq!(LoadProfile::A.length(), 2 * LOAD_A_REPEAT);
    }

    #[test]
    fn profile_b_cycles_alphabet() {
        assert_eq!(LoadProfile::B.char_at(0), b'a');
        assert_eq!(LoadProfile::B.char_at(25), b'z');
        assert_eq!(LoadProfile::B.char_at(26), b'a');
    }

    #[test]
    fn emits_at_profile_rate() {
        let mut load = LoadGenerator::new();
        load.toggle(LoadProfile::A, Millis(10));

        assert_eq!(load.next_char(Millis(10)), Some(b'G'));
        assert_eq!(load.next_char(Millis(11)), None);
        assert_eq!(load.next_char(Millis(12)), Some(b'G'));
    }

    #[test]
    fn toggle_same_profile_stops() {
        let mut load = LoadGenerator::new();
        load.toggle(LoadProfile::B, Millis(0));
        assert_eq!(load.running(), Some(LoadProfile::B));
        load.toggle(LoadProfile::A, Millis(1));
        assert_eq!(load.running(), Some(LoadProfile::A));
        load.toggle(LoadProfile::A, Millis(2));
        assert_eq!(load.running(), None);
        assert_eq!(load.next_char(Millis(3)), None);
    }

    #[test]
    fn run_ends_after_length() {
        let mut load = LoadGenerator::new();
        load.toggle(LoadProfile::B, Millis(0));
        let mut count = 0;
        for t in 0..(LOAD_B_LENGTH + 100) {
            if load.next_char(Millis(t)).is_some() {
                count += 1;
            }
        }
        assert_eq!(count, LOAD_B_LENGTH);
        assert_eq!(load.running(), None);
    }
}
