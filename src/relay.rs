//! The relay loop body.
//!
//! [`Relay::tick`] is one iteration of the firmware's polling loop:
//!
//! 1. finish a blocked admission, or admit one new character (test key,
//!    then synthetic load, then the serial link);
//! 2. one normal release pass;
//! 3. sample the buttons and act on them.
//!
//! While an admission is blocked no new character is read, so the order
//! in which keys reach the host matches the order they arrived in.

use crate::clock::Millis;
use crate::config::TEST_KEY;
use crate::hid::HidSink;
use crate::scheduler::{Admission, Pending, Release, ResetCause, Scheduler};
use crate::stats::Observer;
use crate::ui::{ControlEvent, ControlPanel, Fired, LoadGenerator, LoadProfile, BUTTON_COUNT};

/// What happened during one [`Relay::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Admission step run this tick, if any.
    pub admission: Option<Admission>,
    /// Key released by the normal release pass.
    pub release: Option<Release>,
    /// Buttons that fired.
    pub controls: Fired,
}

/// Scheduler plus the loop state around it.
pub struct Relay<O = ()> {
    scheduler: Scheduler<O>,
    pending: Option<Pending>,
    injected: Option<u8>,
    load: LoadGenerator,
    controls: ControlPanel,
}

impl<O: Observer> Relay<O> {
    pub fn new(scheduler: Scheduler<O>) -> Self {
        Self::with_controls(scheduler, ControlPanel::new())
    }

    pub fn with_controls(scheduler: Scheduler<O>, controls: ControlPanel) -> Self {
        Self {
            scheduler,
            pending: None,
            injected: None,
            load: LoadGenerator::new(),
            controls,
        }
    }

    pub fn scheduler(&self) -> &Scheduler<O> {
        &self.scheduler
    }

    /// Admission waiting to be resumed.
    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn load(&self) -> &LoadGenerator {
        &self.load
    }

    /// Run one loop iteration.
    ///
    /// `next_byte` is only called when the relay is ready for a new
    /// character from the serial link.
    pub fn tick<S, F>(&mut self, now: Millis, next_byte: F, buttons: [bool; BUTTON_COUNT], sink: &mut S) -> TickOutcome
    where
        S: HidSink,
        F: FnOnce() -> Option<u8>,
    {
        let admission = match self.pending.take() {
            Some(pending) => Some(self.scheduler.resume(pending, now, sink)),
            None => self
                .injected
                .take()
                .or_else(|| self.load.next_char(now))
                .or_else(next_byte)
                .map(|byte| self.scheduler.admit(byte, now, sink)),
        };
        self.pending = admission.and_then(|a| a.pending());

        let release = self.scheduler.tick(now, false, sink);

        let controls = self.controls.poll(buttons, now);
        for event in controls.iter() {
            self.handle(event, now);
        }

        TickOutcome {
            admission,
            release,
            controls,
        }
    }

    /// Console `c` command: wipe timers and statistics.
    ///
    /// A blocked admission survives; it only waits for a free slot.
    pub fn clear<S: HidSink>(&mut self, sink: &mut S) {
        self.scheduler.reset(sink, ResetCause::Command);
    }

    fn handle(&mut self, event: ControlEvent, now: Millis) {
        match event {
            ControlEvent::TestKey => self.injected = Some(TEST_KEY),
            ControlEvent::LoadA => self.load.toggle(LoadProfile::A, now),
            ControlEvent::LoadB => self.load.toggle(LoadProfile::B, now),
            ControlEvent::TogglePause => {
                self.scheduler.toggle_pause();
            }
        }
    }
}
