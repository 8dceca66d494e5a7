//! Light acquisition and hold-XY.
//!
//! ```text
//!   NoLight --hit--> HaveLight --miss--> Holding --window--> NoLight (off-screen)
//!                        ^                  |  \
//!                        +------hit---------+   +--window, infinite hold--> HeldIndefinitely
//! ```
//!
//! The sensor drops out for a scan or two during display blanking or
//! when aimed past a dark area.  A miss therefore does not move the
//! pointer: the last coordinate keeps being re-sent until the hold window
//! runs out.  Independently, a streak of consecutive misses confirms the
//! loss and forgets the remembered coordinate (unless infinite hold is
//! on), so a stale position is never resurrected.  The off-screen
//! position is committed once, when the window expires.

use crate::config::Tuning;
use crate::time::{elapsed, Micros};

/// Remembered-coordinate sentinel.
const NO_COORD: (u16, u16) = (0, 0);

/// One coordinate-cycle input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightSample {
    /// Valid in-range raw coordinate.
    Hit(u16, u16),
    /// No light, sensor error, or out-of-window coordinate.
    Miss,
}

/// What the coordinate path should output this cycle (raw coordinates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightAction {
    /// Fresh coordinate.
    Track(u16, u16),
    /// Re-send of the remembered coordinate during a dropout.
    Hold(u16, u16),
    /// Light loss committed: report the off-screen position.
    Offscreen,
    /// Nothing to report.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightPhase {
    NoLight,
    HaveLight,
    Holding,
    HeldIndefinitely,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightHold {
    pub have_light: bool,
    pub last_x: u16,
    pub last_y: u16,
    pub hold_active: bool,
    pub hold_start: Micros,
    pub no_light_streak: u8,
    indefinite: bool,
}

impl Default for LightHold {
    fn default() -> Self {
        Self::new()
    }
}

impl LightHold {
    pub const fn new() -> Self {
        Self {
            have_light: false,
            last_x: NO_COORD.0,
            last_y: NO_COORD.1,
            hold_active: false,
            hold_start: 0,
            no_light_streak: 0,
            indefinite: false,
        }
    }

    pub fn phase(&self) -> LightPhase {
        match (self.have_light, self.hold_active, self.indefinite) {
            (false, _, _) => LightPhase::NoLight,
            (true, false, _) => LightPhase::HaveLight,
            (true, true, false) => LightPhase::Holding,
            (true, true, true) => LightPhase::HeldIndefinitely,
        }
    }

    /// Remembered raw coordinate, if any.
    pub fn remembered(&self) -> Option<(u16, u16)> {
        let c = (self.last_x, self.last_y);
        (c != NO_COORD).then_some(c)
    }

    pub fn update(
        &mut self,
        sample: LightSample,
        now: Micros,
        tuning: &Tuning,
        infinite_hold: bool,
    ) -> LightAction {
        match sample {
            LightSample::Hit(x, y) => self.on_hit(x, y),
            LightSample::Miss => self.on_miss(now, tuning, infinite_hold),
        }
    }

    fn on_hit(&mut self, x: u16, y: u16) -> LightAction {
        self.last_x = x;
        self.last_y = y;
        self.have_light = true;
        self.hold_active = false;
        self.indefinite = false;
        self.no_light_streak = 0;
        LightAction::Track(x, y)
    }

    fn on_miss(&mut self, now: Micros, tuning: &Tuning, infinite_hold: bool) -> LightAction {
        self.no_light_streak = self.no_light_streak.saturating_add(1);

        if !self.have_light {
            return LightAction::Idle;
        }

        if !self.hold_active {
            self.hold_active = true;
            self.hold_start = now;
        }

        if self.no_light_streak > tuning.loss_confirm_cycles && !infinite_hold {
            self.forget();
        }

        if elapsed(self.hold_start, now) >= tuning.hold_window_us {
            match self.remembered() {
                Some((x, y)) if infinite_hold => {
                    self.indefinite = true;
                    return LightAction::Hold(x, y);
                }
                _ => {
                    self.have_light = false;
                    self.hold_active = false;
                    self.indefinite = false;
                    self.forget();
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Light: lost, off-screen");
                    return LightAction::Offscreen;
                }
            }
        }

        match self.remembered() {
            Some((x, y)) => LightAction::Hold(x, y),
            None => LightAction::Idle,
        }
    }

    fn forget(&mut self) {
        self.last_x = NO_COORD.0;
        self.last_y = NO_COORD.1;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
