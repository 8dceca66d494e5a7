//! Raw sensor coordinate → full-scale output axis value.

use crate::hid::FULL_RANGE;

/// Scale `value` from the calibrated `min..=max` span onto `0..=FULL_RANGE`.
///
/// Values outside the span clamp to the ends.  Returns `None` while the
/// axis is degenerate (`max <= min`), i.e. not calibrated yet; callers
/// skip output for that axis instead of guessing a scale.
pub fn scale_axis(value: u16, min: u16, max: u16) -> Option<u16> {
    if max <= min {
        return None;
    }
    let span = u32::from(max - min);
    let offset = u32::from(value.saturating_sub(min));
    let scaled = offset * u32::from(FULL_RANGE) / span;
    Some(scaled.min(u32::from(FULL_RANGE)) as u16)
}

/// Scale an 8-bit analog stick reading (0..=255) onto `0..=FULL_RANGE`.
pub fn scale_stick(value: u8) -> u16 {
    (u32::from(value) * u32::from(FULL_RANGE) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_of_span_hit_ends_of_range() {
        assert_eq!(scale_axis(100, 100, 400), Some(0));
        assert_eq!(scale_axis(400, 100, 400), Some(FULL_RANGE));
        assert_eq!(scale_axis(250, 100, 400), Some(FULL_RANGE / 2));
    }

    #[test]
    fn clamps_outside_span() {
        assert_eq!(scale_axis(50, 100, 400), Some(0));
        assert_eq!(scale_axis(u16::MAX, 100, 400), Some(FULL_RANGE));
    }

    #[test]
    fn degenerate_span_is_uncalibrated() {
        assert_eq!(scale_axis(100, 100, 100), None);
        assert_eq!(scale_axis(100, u16::MAX, 0), None);
    }

    #[test]
    fn stick_spans_full_range() {
        assert_eq!(scale_stick(0), 0);
        assert_eq!(scale_stick(255), FULL_RANGE);
        assert_eq!(scale_stick(128), 16447);
    }
}
