//! USB HID keyboard report (boot protocol compatible).
//!
//! Carries the auxiliary key pulsed on every shot.
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield, unused here)
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Standard USB HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte, always 0x00.
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Add `key` to the pressed set. Ignored if already held or all slots are taken.
    pub fn press(&mut self, key: u8) {
        if key == 0 || self.keycodes.contains(&key) {
            return;
        }
        if let Some(slot) = self.keycodes.iter_mut().find(|k| **k == 0) {
            *slot = key;
        }
    }

    /// Remove `key` from the pressed set, keeping the rest packed to the front.
    pub fn release(&mut self, key: u8) {
        let mut packed = [0u8; 6];
        let mut n = 0;
        for &k in self.keycodes.iter().filter(|&&k| k != 0 && k != key) {
            packed[n] = k;
            n += 1;
        }
        self.keycodes = packed;
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        key != 0 && self.keycodes.contains(&key)
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (always 8).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Returns `true` if no keys are pressed.
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

/// Keyboard report descriptor: modifier bits, a padding byte and six key
/// slots.  No LED output report; the host's lock-key state is never used.
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x03, //   Input (Constant)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (Application)
    0x25, 0x65, //   Logical Maximum (101)
    0x95, 0x06, //   Report Count (6)
    0x81, 0x00, //   Input (Data, Array)
    0xC0,       // End Collection
];
