//! USB HID absolute pointer report (tablet-style mouse).
//!
//! Layout (5 bytes):
//! ```text
//! Byte 0:   Button bitfield
//!           Bit 0 = Left (trigger), Bit 1 = Right (A), Bit 2 = Middle (B)
//! Byte 1-2: X position (LE u16, 0..=32767)
//! Byte 3-4: Y position (LE u16, 0..=32767)
//! ```

/// Pointer report size in bytes.
pub const POINTER_REPORT_SIZE: usize = 5;

/// Absolute pointer report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Absolute X position.
    pub x: u16,
    /// Absolute Y position.
    pub y: u16,
}

impl PointerReport {
    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (always 5).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < POINTER_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.buttons;
        buf[1..3].copy_from_slice(&self.x.to_le_bytes());
        buf[3..5].copy_from_slice(&self.y.to_le_bytes());
        POINTER_REPORT_SIZE
    }
}

/// USB HID Report Descriptor for a 3-button absolute pointer.
pub const POINTER_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    //
    //   - Buttons (3 bits + 5 padding) -
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    //
    //   - X, Y absolute position -
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x00, //     Logical Minimum (0)
    0x26, 0xFF, 0x7F, // Logical Maximum (32767)
    0x75, 0x10, //     Report Size (16)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    //
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];
