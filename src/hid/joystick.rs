//! USB HID joystick report.
//!
//! Layout (9 bytes):
//! ```text
//! Byte 0:   Button bitfield (bits 0-2)
//! Byte 1-2: X  (LE u16, gun aim)
//! Byte 3-4: Y  (LE u16, gun aim)
//! Byte 5-6: Rx (LE u16, analog stick)
//! Byte 7-8: Ry (LE u16, analog stick)
//! ```

use super::FULL_RANGE;
use crate::sink::Axis;

/// Joystick report size in bytes.
pub const JOYSTICK_REPORT_SIZE: usize = 9;

const CENTER: u16 = FULL_RANGE / 2 + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickReport {
    pub buttons: u8,
    pub x: u16,
    pub y: u16,
    pub rx: u16,
    pub ry: u16,
}

impl Default for JoystickReport {
    fn default() -> Self {
        Self::centered()
    }
}

impl JoystickReport {
    /// All axes centred, no buttons.
    pub const fn centered() -> Self {
        Self {
            buttons: 0,
            x: CENTER,
            y: CENTER,
            rx: CENTER,
            ry: CENTER,
        }
    }

    pub fn set_axis(&mut self, axis: Axis, value: u16) {
        let value = value.min(FULL_RANGE);
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Rx => self.rx = value,
            Axis::Ry => self.ry = value,
        }
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (always 9).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < JOYSTICK_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.buttons;
        buf[1..3].copy_from_slice(&self.x.to_le_bytes());
        buf[3..5].copy_from_slice(&self.y.to_le_bytes());
        buf[5..7].copy_from_slice(&self.rx.to_le_bytes());
        buf[7..9].copy_from_slice(&self.ry.to_le_bytes());
        JOYSTICK_REPORT_SIZE
    }
}

/// USB HID Report Descriptor for a 3-button, 4-axis joystick.
pub const JOYSTICK_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    //   - Buttons (3 bits + 5 padding) -
    0x05, 0x09, //   Usage Page (Buttons)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x03, //   Usage Maximum (Button 3)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x03, //   Report Count (3)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x05, //   Report Size (5)
    0x81, 0x01, //   Input (Constant) - padding
    //
    //   - X, Y, Rx, Ry -
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x7F, // Logical Maximum (32767)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];
