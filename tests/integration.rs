//! Integration tests for serial2hid host-testable logic.

use serial2hid::clock::ManualClock;
use serial2hid::config::Backpressure;
use serial2hid::console;
use serial2hid::hid::keyboard::{KeyboardReport, KeyboardState, MODIFIER_LEFT_SHIFT};
use serial2hid::scheduler::SuppressReason;
use serial2hid::ui::ControlPanel;
use serial2hid::{Admission, Clock, KeyCode, Relay, Scheduler, SchedulerConfig, Stats};

const IDLE: [bool; 4] = [false; 4];

fn key(c: u8) -> KeyCode {
    KeyCode::new(c).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// Scheduler → keyboard reports
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keystroke_becomes_press_then_release_report() {
    let clock = ManualClock::new(1_000);
    let mut scheduler = Scheduler::new(SchedulerConfig::DEFAULT).unwrap();
    let mut keyboard = KeyboardState::new();

    let admission = scheduler.admit(b'h', clock.now(), &mut keyboard);
    assert_eq!(admission, Admission::Emitted(key(b'h')));

    let pressed = keyboard.take_report().expect("press report");
    let mut buf = [0u8; 8];
    assert_eq!(pressed.serialize(&mut buf), 8);
    assert_eq!(buf, [0x00, 0x00, 0x0B, 0x00, 0x00, 0x00, 0x00, 0x00]);
    assert!(keyboard.take_report().is_none());

    clock.advance(39);
    assert!(scheduler.tick(clock.now(), false, &mut keyboard).is_none());
    clock.advance(1);
    let release = scheduler.tick(clock.now(), false, &mut keyboard).unwrap();
    assert_eq!(release.held_ms, 40);
    assert_eq!(keyboard.take_report(), Some(KeyboardReport::empty()));
}

#[test]
fn repeated_key_inside_window_never_reaches_host() {
    let mut scheduler = Scheduler::new(SchedulerConfig::DEFAULT).unwrap();
    let mut keyboard = KeyboardState::new();

    let results: Vec<Admission> = b"abca"
        .iter()
        .zip(0u32..)
        .map(|(&c, t)| scheduler.admit(c, serial2hid::Millis(t), &mut keyboard))
        .collect();

    assert!(results[..3].iter().all(Admission::is_emitted));
    assert_eq!(results[3].suppress_reason(), Some(SuppressReason::TooSoonSameKey));
    assert_eq!(keyboard.report().keycodes, [0x04, 0x05, 0x06, 0, 0, 0]);
}

#[test]
fn shifted_character_sets_modifier() {
    let mut scheduler = Scheduler::new(SchedulerConfig::DEFAULT).unwrap();
    let mut keyboard = KeyboardState::new();

    scheduler.admit(b'A', serial2hid::Millis(0), &mut keyboard);
    let report = keyboard.report();
    assert_eq!(report.modifier, MODIFIER_LEFT_SHIFT);
    assert_eq!(report.keycodes[0], 0x04);
}

#[test]
fn clock_wrap_releases_keys_and_restarts() {
    let clock = ManualClock::new(u32::MAX - 5);
    let mut scheduler = Scheduler::new(SchedulerConfig::DEFAULT).unwrap();
    let mut keyboard = KeyboardState::new();

    assert!(scheduler.admit(b'x', clock.now(), &mut keyboard).is_emitted());
    clock.advance(9);
    assert_eq!(clock.now().as_ms(), 3);

    assert!(scheduler.admit(b'y', clock.now(), &mut keyboard).is_emitted());
    assert!(!keyboard.is_pressed(key(b'x')));
    assert!(keyboard.is_pressed(key(b'y')));
    assert_eq!(scheduler.occupancy(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Relay loop + statistics
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn flood_is_capped_and_reported() {
    let mut stats = Stats::new();
    let scheduler = Scheduler::with_observer(SchedulerConfig::DEFAULT, &mut stats).unwrap();
    let mut relay = Relay::with_controls(scheduler, ControlPanel::new());
    let mut keyboard = KeyboardState::new();
    let mut input = b"abcdefgh".iter().copied();

    for t in 1..=8 {
        relay.tick(serial2hid::Millis(t), || input.next(), IDLE, &mut keyboard);
        assert!(keyboard.pressed_count() <= 6);
    }
    assert_eq!(relay.scheduler().occupancy(), 6);
    drop(relay);

    assert_eq!(stats.max_keys_down(), 6);
    assert_eq!(stats.sent(key(b'f')), 1);
    assert_eq!(stats.suppressed_count(key(b'g')), 1);
    assert_eq!(stats.suppressed_count(key(b'h')), 1);

    let mut out = String::new();
    console::write_report(&mut out, &stats).unwrap();
    assert!(out.contains("Max keys down: 6 (USB limit=6)"));
    assert!(out.contains("Key 'a': Send: 1: Supr: 0\r\n"));
    assert!(out.contains("Key 'h': Send: 0: Supr: 1\r\n"));
}

#[test]
fn buffered_flood_keeps_every_key_in_order() {
    let config = SchedulerConfig {
        backpressure: Backpressure::Buffer,
        ..SchedulerConfig::DEFAULT
    };
    let mut relay = Relay::new(Scheduler::new(config).unwrap());
    let mut keyboard = KeyboardState::new();
    let text = b"abcdefghijklmnop";
    let mut input = text.iter().copied();

    let mut emitted = Vec::new();
    for t in 0..400 {
        let outcome = relay.tick(serial2hid::Millis(t), || input.next(), IDLE, &mut keyboard);
        if let Some(Admission::Emitted(k)) = outcome.admission {
            emitted.push(k.as_byte());
        }
        assert!(relay.scheduler().occupancy() <= 6);
    }

    assert_eq!(emitted.as_slice(), text);
    assert_eq!(keyboard.pressed_count(), 0);
}

#[test]
fn out_of_range_bytes_are_counted() {
    let mut stats = Stats::new();
    let mut scheduler = Scheduler::with_observer(SchedulerConfig::DEFAULT, &mut stats).unwrap();
    let mut keyboard = KeyboardState::new();

    for (t, byte) in [b'\r', b'\n', 0x80, 0xFF].into_iter().enumerate() {
        let admission = scheduler.admit(byte, serial2hid::Millis(t as u32), &mut keyboard);
        assert_eq!(admission.suppress_reason(), Some(SuppressReason::OutOfRange));
    }
    drop(scheduler);

    assert_eq!(stats.out_of_range(), 4);
    assert_eq!(keyboard.pressed_count(), 0);
}
