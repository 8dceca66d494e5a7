//! Output side of the bridge: what the core asks the host to see.

/// Logical output buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputButton {
    /// Driven by the trigger through the scheduled queue.
    Primary,
    /// Driven by controller button A.
    Secondary,
    /// Driven by controller button B.
    Tertiary,
}

impl OutputButton {
    pub const ALL: [OutputButton; 3] = [
        OutputButton::Primary,
        OutputButton::Secondary,
        OutputButton::Tertiary,
    ];

    /// Bit in the HID button bitfield.
    pub const fn mask(self) -> u8 {
        match self {
            OutputButton::Primary => 0x01,
            OutputButton::Secondary => 0x02,
            OutputButton::Tertiary => 0x04,
        }
    }
}

/// Joystick-style output axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Rx,
    Ry,
}

/// Which host-facing device the buttons and coordinates go to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    Pointer,
    Joystick,
}

/// Host-facing output collaborator.
///
/// Calls between two `flush()`es form one host-visible batch.
pub trait OutputSink {
    /// Absolute pointer position, both axes in `0..=FULL_RANGE`.
    fn move_pointer(&mut self, x: u16, y: u16);
    fn press_button(&mut self, button: OutputButton);
    fn release_button(&mut self, button: OutputButton);
    /// Press a keyboard key by HID usage code.
    fn press_key(&mut self, key: u8);
    fn release_key(&mut self, key: u8);
    fn set_axis(&mut self, axis: Axis, value: u16);
    fn flush(&mut self);

    /// Route subsequent button output to `mode`'s device.
    fn select_mode(&mut self, _mode: OutputMode) {}
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn move_pointer(&mut self, x: u16, y: u16) {
        (**self).move_pointer(x, y)
    }
    fn press_button(&mut self, button: OutputButton) {
        (**self).press_button(button)
    }
    fn release_button(&mut self, button: OutputButton) {
        (**self).release_button(button)
    }
    fn press_key(&mut self, key: u8) {
        (**self).press_key(key)
    }
    fn release_key(&mut self, key: u8) {
        (**self).release_key(key)
    }
    fn set_axis(&mut self, axis: Axis, value: u16) {
        (**self).set_axis(axis, value)
    }
    fn flush(&mut self) {
        (**self).flush()
    }
    fn select_mode(&mut self, mode: OutputMode) {
        (**self).select_mode(mode)
    }
}
