//! Unit tests for HID report serialization and the report sink.
//!
//! These tests run on the host (not embedded) and verify the byte
//! layouts the descriptors promise and the change-only flush policy.

use super::joystick::JOYSTICK_REPORT_SIZE;
use super::keyboard::KEYBOARD_REPORT_SIZE;
use super::pointer::POINTER_REPORT_SIZE;
use super::*;
use crate::sink::{Axis, OutputButton, OutputMode, OutputSink};

// ═══════════════════════════════════════════════════════════════════════════
// Report Layout Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn pointer_report_layout() {
    let report = PointerReport {
        buttons: 0x05,
        x: 0x1234,
        y: FULL_RANGE,
    };
    let mut buf = [0u8; POINTER_REPORT_SIZE];
    assert_eq!(report.serialize(&mut buf), POINTER_REPORT_SIZE);
    assert_eq!(buf, [0x05, 0x34, 0x12, 0xFF, 0x7F]);
}

#[test]
fn pointer_report_buffer_too_small() {
    let mut buf = [0u8; 4];
    assert_eq!(PointerReport::default().serialize(&mut buf), 0);
}

#[test]
fn joystick_report_layout() {
    let mut report = JoystickReport::centered();
    report.buttons = 0x01;
    report.set_axis(Axis::X, 0);
    report.set_axis(Axis::Ry, 40_000);
    let mut buf = [0u8; JOYSTICK_REPORT_SIZE];
    assert_eq!(report.serialize(&mut buf), JOYSTICK_REPORT_SIZE);
    assert_eq!(buf, [0x01, 0x00, 0x00, 0x00, 0x40, 0x00, 0x40, 0xFF, 0x7F]);
}

#[test]
fn keyboard_press_release_keeps_slots_packed() {
    let mut report = KeyboardReport::empty();
    report.press(0x04);
    report.press(0x45);
    report.press(0x45);
    assert_eq!(report.keycodes, [0x04, 0x45, 0, 0, 0, 0]);

    report.release(0x04);
    assert_eq!(report.keycodes, [0x45, 0, 0, 0, 0, 0]);
    assert!(report.is_pressed(0x45));

    report.release(0x45);
    assert!(report.is_empty());

    let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
    assert_eq!(report.serialize(&mut buf), KEYBOARD_REPORT_SIZE);
    assert_eq!(buf, [0; 8]);
}

#[test]
fn keyboard_ignores_seventh_key() {
    let mut report = KeyboardReport::empty();
    for key in 0x04..0x0B {
        report.press(key);
    }
    assert_eq!(report.keycodes, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    assert!(!report.is_pressed(0x0A));
}

#[test]
fn hid_report_type_checks() {
    let p = HidReport::Pointer(PointerReport::default());
    assert!(p.is_pointer() && !p.is_keyboard() && !p.is_joystick());
    let k = HidReport::Keyboard(KeyboardReport::empty());
    assert!(k.is_keyboard());
    let j = HidReport::Joystick(JoystickReport::centered());
    assert!(j.is_joystick());
    let mut buf = [0u8; MAX_REPORT_SIZE];
    assert_eq!(j.serialize(&mut buf), JOYSTICK_REPORT_SIZE);
}

// ═══════════════════════════════════════════════════════════════════════════
// Report Sink Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn sink_flushes_only_changed_reports() {
    let mut sink = ReportSink::new();
    sink.flush();
    assert!(sink.take_reports().is_empty());

    sink.move_pointer(100, 200);
    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 1);
    assert_eq!(
        out[0],
        HidReport::Pointer(PointerReport {
            buttons: 0,
            x: 100,
            y: 200
        })
    );

    // Same position again: nothing new.
    sink.move_pointer(100, 200);
    sink.flush();
    assert!(sink.take_reports().is_empty());
}

#[test]
fn sink_batches_key_and_click() {
    let mut sink = ReportSink::new();
    sink.press_key(0x45);
    sink.press_button(OutputButton::Primary);
    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 2);
    assert!(out.iter().any(|r| matches!(r, HidReport::Pointer(p) if p.buttons == 0x01)));
    assert!(out.iter().any(|r| matches!(r, HidReport::Keyboard(k) if k.is_pressed(0x45))));

    sink.release_key(0x45);
    sink.release_button(OutputButton::Primary);
    sink.flush();
    assert_eq!(sink.take_reports().len(), 2);
}

#[test]
fn sink_routes_buttons_by_mode() {
    let mut sink = ReportSink::new();
    sink.select_mode(OutputMode::Joystick);
    sink.press_button(OutputButton::Secondary);
    sink.set_axis(Axis::X, 1_000);
    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 1);
    match out[0] {
        HidReport::Joystick(j) => {
            assert_eq!(j.buttons, 0x02);
            assert_eq!(j.x, 1_000);
        }
        other => panic!("expected joystick report, got {:?}", other),
    }
}

#[test]
fn sink_mode_switch_drops_held_buttons() {
    let mut sink = ReportSink::new();
    sink.press_button(OutputButton::Primary);
    sink.flush();
    sink.take_reports();

    sink.select_mode(OutputMode::Joystick);
    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0], HidReport::Pointer(PointerReport::default()));
}

#[test]
fn sink_resends_report_the_transport_dropped() {
    let mut sink = ReportSink::new();
    sink.press_button(OutputButton::Primary);
    sink.flush();
    assert_eq!(sink.take_reports().len(), 1);

    // The release batch is lost on the way to the host.
    sink.release_button(OutputButton::Primary);
    sink.flush();
    for report in sink.take_reports() {
        sink.requeue(report);
    }

    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0], HidReport::Pointer(PointerReport::default()));

    // Delivered now: no repeats.
    sink.flush();
    assert!(sink.take_reports().is_empty());
}

#[test]
fn sink_requeue_resends_only_that_kind() {
    let mut sink = ReportSink::new();
    sink.press_key(0x45);
    sink.move_pointer(10, 20);
    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 2);

    let keyboard = out.iter().copied().find(|r| r.is_keyboard());
    sink.requeue(keyboard.unwrap());
    sink.release_key(0x45);
    sink.flush();
    let out = sink.take_reports();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0], HidReport::Keyboard(KeyboardReport::empty()));
}
