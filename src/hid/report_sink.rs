//! [`OutputSink`] that builds USB HID reports.
//!
//! Sink calls mutate three live reports.  `flush()` compares each with
//! what was last handed out and queues only the ones that changed; the
//! transport then collects them with [`ReportSink::take_reports`].
//! Reports carry full state, so a host that misses one batch is
//! corrected by the next.  A report the transport could not deliver is
//! handed back with [`ReportSink::requeue`] and goes out again on the
//! next flush even if nothing changed in between.

use heapless::Vec;

use super::{HidReport, JoystickReport, KeyboardReport, PointerReport, FULL_RANGE};
use crate::sink::{Axis, OutputButton, OutputMode, OutputSink};

pub struct ReportSink {
    mode: OutputMode,
    pointer: PointerReport,
    keyboard: KeyboardReport,
    joystick: JoystickReport,
    // `None` means the host's copy is unknown and must be re-sent.
    sent_pointer: Option<PointerReport>,
    sent_keyboard: Option<KeyboardReport>,
    sent_joystick: Option<JoystickReport>,
    pending: Vec<HidReport, 3>,
}

impl Default for ReportSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink {
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Pointer,
            pointer: PointerReport::default(),
            keyboard: KeyboardReport::empty(),
            joystick: JoystickReport::centered(),
            sent_pointer: Some(PointerReport::default()),
            sent_keyboard: Some(KeyboardReport::empty()),
            sent_joystick: Some(JoystickReport::centered()),
            pending: Vec::new(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Reports queued by the last `flush()`.
    pub fn take_reports(&mut self) -> Vec<HidReport, 3> {
        core::mem::take(&mut self.pending)
    }

    /// Hand back a report the transport dropped.
    ///
    /// The matching kind is re-emitted, with its current state, by the
    /// next `flush()`, even if nothing changed in between.
    pub fn requeue(&mut self, report: HidReport) {
        match report {
            HidReport::Pointer(_) => self.sent_pointer = None,
            HidReport::Keyboard(_) => self.sent_keyboard = None,
            HidReport::Joystick(_) => self.sent_joystick = None,
        }
    }

    fn buttons_mut(&mut self) -> &mut u8 {
        match self.mode {
            OutputMode::Pointer => &mut self.pointer.buttons,
            OutputMode::Joystick => &mut self.joystick.buttons,
        }
    }

    fn queue(&mut self, report: HidReport) {
        // Each kind appears at most once per flush, so three slots suffice.
        let _ = self.pending.push(report);
    }
}

impl OutputSink for ReportSink {
    fn move_pointer(&mut self, x: u16, y: u16) {
        self.pointer.x = x.min(FULL_RANGE);
        self.pointer.y = y.min(FULL_RANGE);
    }

    fn press_button(&mut self, button: OutputButton) {
        *self.buttons_mut() |= button.mask();
    }

    fn release_button(&mut self, button: OutputButton) {
        *self.buttons_mut() &= !button.mask();
    }

    fn press_key(&mut self, key: u8) {
        self.keyboard.press(key);
    }

    fn release_key(&mut self, key: u8) {
        self.keyboard.release(key);
    }

    fn set_axis(&mut self, axis: Axis, value: u16) {
        self.joystick.set_axis(axis, value);
    }

    fn flush(&mut self) {
        self.pending.clear();
        if self.sent_pointer != Some(self.pointer) {
            self.sent_pointer = Some(self.pointer);
            self.queue(HidReport::Pointer(self.pointer));
        }
        if self.sent_keyboard != Some(self.keyboard) {
            self.sent_keyboard = Some(self.keyboard);
            self.queue(HidReport::Keyboard(self.keyboard));
        }
        if self.sent_joystick != Some(self.joystick) {
            self.sent_joystick = Some(self.joystick);
            self.queue(HidReport::Joystick(self.joystick));
        }
    }

    fn select_mode(&mut self, mode: OutputMode) {
        // Buttons never carry over between devices.
        self.pointer.buttons = 0;
        self.joystick.buttons = 0;
        self.mode = mode;
    }
}
