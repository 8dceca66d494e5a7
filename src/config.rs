//! Application-wide constants and runtime tuning.
//!
//! Hardware pin assignments, USB identity and the default timing
//! parameters live here so they can be tuned in one place.  Every
//! timing threshold the core uses is also carried in [`Tuning`], so a
//! build can override one variant's numbers without touching the logic.

use crate::error::TuningError;
use crate::hid::FULL_RANGE;
use crate::time::{ms, Micros};

// Timing defaults

/// Minimum interval between accepted trigger edges.
pub const DEBOUNCE_MS: u64 = 5;

/// Width of the auxiliary-key pulse sent on every accepted trigger press.
pub const PULSE_WIDTH_MS: u64 = 20;

/// Delay between a trigger edge and the matching primary-click event.
pub const BUFFER_DELAY_MS: u64 = 40;

/// How long the last coordinate is held after the sensor loses light.
pub const HOLD_WINDOW_MS: u64 = 50;

/// Consecutive no-light coordinate cycles before a loss counts as confirmed.
pub const LOSS_CONFIRM_CYCLES: u8 = 3;

/// Trigger presses after which calibration bounds are frozen.
pub const CALIBRATION_LOCK_PRESSES: u8 = 10;

/// How long A+B must be held to toggle infinite hold.
pub const COMBO_HOLD_MS: u64 = 2_000;

/// Coordinate scan period (500 Hz, one display refresh point).
pub const COORDINATE_PERIOD_US: u64 = 2_000;

/// Pause after the disable combo so the same press is not re-read.
pub const DISABLE_PAUSE_MS: u64 = 1_000;

/// Outer poll loop period.
pub const POLL_PERIOD_US: u64 = 250;

/// Scheduled event queue capacity.
pub const EVENT_QUEUE_CAPACITY: usize = 8;

// Sensor

/// Raw GunCon coordinates outside this window are treated as no light.
/// The GunCon reports X roughly 70..460 and Y roughly 20..300 on a
/// 240p display.
pub const SENSOR_X_MIN: u16 = 0x0040;
pub const SENSOR_X_MAX: u16 = 0x01E0;
pub const SENSOR_Y_MIN: u16 = 0x0010;
pub const SENSOR_Y_MAX: u16 = 0x0140;

/// Output position committed when light is lost for longer than the hold window.
pub const OFFSCREEN_X: u16 = 0;
pub const OFFSCREEN_Y: u16 = 0;

// Keys

/// HID usage of the auxiliary key pulsed on every shot (F12).
pub const AUX_KEY_USAGE: u8 = 0x45;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "lightgun";
pub const USB_PRODUCT: &str = "GunCon-to-USB HID Bridge";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

// GPIO pin assignments (nRF52840-DK defaults)
//
// PSX controller bus on SPIM3, LSB first, mode 3:
//
//   CLK        → P0.13
//   CMD (MOSI) → P0.14
//   DATA (MISO)→ P0.15  (open drain on the pad, needs the internal pull-up)
//   ATT        → P0.16  (active low chip select)

/// PSX bus clock (kHz).
pub const PSX_BUS_KHZ: u32 = 250;

/// Inclusive raw coordinate window accepted as a valid on-screen sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorWindow {
    pub x_min: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_max: u16,
}

impl SensorWindow {
    /// `(0, 0)` is never a real hit; it doubles as the "no coordinate" sentinel.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        (x, y) != (0, 0)
            && (self.x_min..=self.x_max).contains(&x)
            && (self.y_min..=self.y_max).contains(&y)
    }
}

impl Default for SensorWindow {
    fn default() -> Self {
        Self {
            x_min: SENSOR_X_MIN,
            x_max: SENSOR_X_MAX,
            y_min: SENSOR_Y_MIN,
            y_max: SENSOR_Y_MAX,
        }
    }
}

/// Runtime copy of every threshold and window the core uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuning {
    pub debounce_us: Micros,
    pub pulse_width_us: Micros,
    pub buffer_delay_us: Micros,
    pub hold_window_us: Micros,
    pub loss_confirm_cycles: u8,
    pub calibration_lock_presses: u8,
    pub combo_hold_us: Micros,
    pub coordinate_period_us: Micros,
    pub disable_pause_ms: u64,
    /// Retract the buffered press and click at once when light is already present.
    pub instant_shot: bool,
    pub sensor_window: SensorWindow,
    /// Normalized output position reported once light loss is committed.
    pub offscreen: (u16, u16),
    pub aux_key: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            debounce_us: ms(DEBOUNCE_MS),
            pulse_width_us: ms(PULSE_WIDTH_MS),
            buffer_delay_us: ms(BUFFER_DELAY_MS),
            hold_window_us: ms(HOLD_WINDOW_MS),
            loss_confirm_cycles: LOSS_CONFIRM_CYCLES,
            calibration_lock_presses: CALIBRATION_LOCK_PRESSES,
            combo_hold_us: ms(COMBO_HOLD_MS),
            coordinate_period_us: COORDINATE_PERIOD_US,
            disable_pause_ms: DISABLE_PAUSE_MS,
            instant_shot: cfg!(feature = "instant-shot"),
            sensor_window: SensorWindow::default(),
            offscreen: (OFFSCREEN_X, OFFSCREEN_Y),
            aux_key: AUX_KEY_USAGE,
        }
    }
}

impl Tuning {
    /// Reject configurations the state machines cannot honour.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.debounce_us == 0 {
            return Err(TuningError::ZeroDebounce);
        }
        if self.coordinate_period_us == 0 {
            return Err(TuningError::ZeroCoordinatePeriod);
        }
        if self.calibration_lock_presses == 0 {
            return Err(TuningError::ZeroLockThreshold);
        }
        let w = &self.sensor_window;
        if w.x_min >= w.x_max || w.y_min >= w.y_max {
            return Err(TuningError::EmptySensorWindow);
        }
        if self.offscreen.0 > FULL_RANGE || self.offscreen.1 > FULL_RANGE {
            return Err(TuningError::OffscreenOutOfRange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn default_instant_shot_follows_feature() {
        assert_eq!(Tuning::default().instant_shot, cfg!(feature = "instant-shot"));
    }

    #[test]
    fn rejects_zero_debounce_and_period() {
        let t = Tuning {
            debounce_us: 0,
            ..Tuning::default()
        };
        assert_eq!(t.validate(), Err(TuningError::ZeroDebounce));

        let t = Tuning {
            coordinate_period_us: 0,
            ..Tuning::default()
        };
        assert_eq!(t.validate(), Err(TuningError::ZeroCoordinatePeriod));
    }

    #[test]
    fn rejects_degenerate_window_and_offscreen() {
        let t = Tuning {
            sensor_window: SensorWindow {
                x_min: 100,
                x_max: 100,
                ..SensorWindow::default()
            },
            ..Tuning::default()
        };
        assert_eq!(t.validate(), Err(TuningError::EmptySensorWindow));

        let t = Tuning {
            offscreen: (FULL_RANGE + 1, 0),
            ..Tuning::default()
        };
        assert_eq!(t.validate(), Err(TuningError::OffscreenOutOfRange));
    }

    #[test]
    fn window_excludes_sentinel_and_edges() {
        let w = SensorWindow::default();
        assert!(!w.contains(0, 0));
        assert!(w.contains(SENSOR_X_MIN, SENSOR_Y_MIN));
        assert!(w.contains(SENSOR_X_MAX, SENSOR_Y_MAX));
        assert!(!w.contains(SENSOR_X_MAX + 1, 100));
        assert!(!w.contains(100, SENSOR_Y_MIN - 1));
    }
}
