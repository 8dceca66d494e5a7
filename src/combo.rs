//! Level-based "hold two buttons for N seconds" detector.

use crate::time::{elapsed, Micros};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComboPhase {
    /// Waiting for both buttons to be held.
    Armed,
    /// Both held since the contained timestamp.
    Timing(Micros),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComboHold {
    phase: ComboPhase,
}

impl Default for ComboHold {
    fn default() -> Self {
        Self::new()
    }
}

impl ComboHold {
    pub const fn new() -> Self {
        Self {
            phase: ComboPhase::Armed,
        }
    }

    pub fn phase(&self) -> ComboPhase {
        self.phase
    }

    /// Sample the held condition once per cycle.
    ///
    /// Returns `true` on the cycle where the hold reaches `threshold`; the
    /// detector then re-arms.  Any cycle without `held` drops the start
    /// time, so separate partial holds never add up.
    pub fn update(&mut self, held: bool, now: Micros, threshold: Micros) -> bool {
        match (self.phase, held) {
            (_, false) => {
                self.phase = ComboPhase::Armed;
                false
            }
            (ComboPhase::Armed, true) => {
                self.phase = ComboPhase::Timing(now);
                false
            }
            (ComboPhase::Timing(start), true) => {
                if elapsed(start, now) >= threshold {
                    self.phase = ComboPhase::Armed;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = ComboPhase::Armed;
    }
}
