//! Debounced manual controls.
//!
//! The four front-panel buttons are sampled once per relay tick. A press
//! counts once the level has been stable for the debounce time; it fires a
//! single [`ControlEvent`] and the button stays inert until it has been
//! stably released. Holding PAUSE therefore toggles exactly once.

use crate::clock::Millis;
use crate::config::BUTTON_DEBOUNCE_MS;

/// Number of buttons on the panel.
pub const BUTTON_COUNT: usize = 4;

/// Action requested through a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// Type the test key once.
    TestKey,
    /// Start/stop synthetic load A.
    LoadA,
    /// Start/stop synthetic load B.
    LoadB,
    /// Pause or resume key-downs.
    TogglePause,
}

impl ControlEvent {
    /// Button order: index `i` of the sampled levels fires `ALL[i]`.
    pub const ALL: [ControlEvent; BUTTON_COUNT] = [
        ControlEvent::TestKey,
        ControlEvent::LoadA,
        ControlEvent::LoadB,
        ControlEvent::TogglePause,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Events fired by one [`ControlPanel::poll`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fired(u8);

impl Fired {
    pub fn contains(self, event: ControlEvent) -> bool {
        self.0 & event.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ControlEvent> {
        ControlEvent::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Debouncer {
    stable: bool,
    candidate: bool,
    since: Millis,
}

impl Debouncer {
    /// Feed one sample; true on a debounced press.
    fn update(&mut self, pressed: bool, now: Millis, debounce_ms: u32) -> bool {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.since = now;
        }
        if self.candidate == self.stable || now.wrapping_since(self.since) < debounce_ms {
            return false;
        }
        self.stable = self.candidate;
        self.stable
    }
}

/// Debounce state of all buttons.
#[derive(Clone, Debug)]
pub struct ControlPanel {
    buttons: [Debouncer; BUTTON_COUNT],
    debounce_ms: u32,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::with_debounce(BUTTON_DEBOUNCE_MS)
    }

    pub fn with_debounce(debounce_ms: u32) -> Self {
        Self {
            buttons: [Debouncer::default(); BUTTON_COUNT],
            debounce_ms,
        }
    }

    /// Sample all buttons. `levels[i]` is true while button `i` is held.
    pub fn poll(&mut self, levels: [bool; BUTTON_COUNT], now: Millis) -> Fired {
        let mut fired = Fired::default();
        for ((button, pressed), event) in self.buttons.iter_mut().zip(levels).zip(ControlEvent::ALL) {
            if button.update(pressed, now, self.debounce_ms) {
                fired.0 |= event.bit();
            }
        }
        fired
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}
