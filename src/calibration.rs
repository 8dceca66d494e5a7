//! Observed coordinate bounds, frozen after enough trigger presses.
//!
//! While unlocked every valid sample can only widen the bounds.  The
//! trigger press counter drives the lock; once locked the bounds stay
//! put until the controller disconnects and [`Calibration::reset`] runs.

use crate::normalize::scale_axis;

/// Sentinel bounds: min above any sample, max below any sample.
const UNSET_MIN: u16 = u16::MAX;
const UNSET_MAX: u16 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub min_x: u16,
    pub max_x: u16,
    pub min_y: u16,
    pub max_y: u16,
    pub press_count: u8,
    pub locked: bool,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration {
    pub const fn new() -> Self {
        Self {
            min_x: UNSET_MIN,
            max_x: UNSET_MAX,
            min_y: UNSET_MIN,
            max_y: UNSET_MAX,
            press_count: 0,
            locked: false,
        }
    }

    /// `true` once at least one sample has been folded in.
    pub fn has_samples(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Widen the bounds to include `(x, y)`. No-op once locked.
    pub fn observe(&mut self, x: u16, y: u16) {
        if self.locked {
            return;
        }
        if !self.has_samples() {
            self.min_x = x;
            self.max_x = x;
            self.min_y = y;
            self.max_y = y;
            return;
        }
        widen(&mut self.min_x, &mut self.max_x, x);
        widen(&mut self.min_y, &mut self.max_y, y);
    }

    /// Count one accepted trigger press; lock at `threshold`.
    ///
    /// Returns `true` on the press that locks.
    pub fn register_press(&mut self, threshold: u8) -> bool {
        if self.locked {
            return false;
        }
        self.press_count = self.press_count.saturating_add(1);
        if self.press_count >= threshold {
            self.locked = true;
            #[cfg(feature = "defmt")]
            defmt::info!(
                "Calibration: locked x={}..{} y={}..{}",
                self.min_x,
                self.max_x,
                self.min_y,
                self.max_y
            );
            return true;
        }
        false
    }

    /// Back to sentinels, unlocked, zero presses.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Normalized output position for a raw sample, if both axes are calibrated.
    pub fn normalize(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        let nx = scale_axis(x, self.min_x, self.max_x)?;
        let ny = scale_axis(y, self.min_y, self.max_y)?;
        Some((nx, ny))
    }
}

// One-sided: raise max if exceeded, otherwise lower min if undercut.
fn widen(min: &mut u16, max: &mut u16, v: u16) {
    if v > *max {
        *max = v;
    } else if v < *min {
        *min = v;
    }
}
