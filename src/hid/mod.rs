//! HID report types and the report-building output sink.

pub mod joystick;
pub mod keyboard;
pub mod pointer;
pub mod report_sink;

#[cfg(test)]
mod tests;

pub use joystick::JoystickReport;
pub use keyboard::KeyboardReport;
pub use pointer::PointerReport;
pub use report_sink::ReportSink;

/// Full-scale value of every absolute axis (pointer and joystick).
pub const FULL_RANGE: u16 = 32767;

/// Largest serialized report, for writer buffers.
pub const MAX_REPORT_SIZE: usize = 9;

/// One host-bound report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Pointer(PointerReport),
    Keyboard(KeyboardReport),
    Joystick(JoystickReport),
}

impl HidReport {
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Pointer(p) => p.serialize(buf),
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Joystick(j) => j.serialize(buf),
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, HidReport::Pointer(_))
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, HidReport::Keyboard(_))
    }

    pub fn is_joystick(&self) -> bool {
        matches!(self, HidReport::Joystick(_))
    }
}
