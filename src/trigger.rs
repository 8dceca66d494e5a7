//! Trigger debounce, auxiliary-key pulse and buffered primary click.
//!
//! ```text
//!   Idle --(press edge, debounced)--> Down --(release edge, debounced)--> Idle
//! ```
//!
//! Both edge polarities share one re-arm interval measured from the last
//! accepted edge.  The raw level is compared against the debounced state
//! every cycle, so a bounce inside the window is ignored and a level that
//! stays changed past the window is accepted on the next cycle.
//!
//! Every accepted press schedules a PRESS and every accepted release
//! schedules a RELEASE, without exception, so the primary output button
//! cannot be left held.

use crate::calibration::Calibration;
use crate::config::Tuning;
use crate::queue::{EventKind, EventQueue};
use crate::sink::{OutputButton, OutputSink};
use crate::time::{after, elapsed, Micros};

/// Debounced edge accepted during an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerEdge {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerState {
    pub down: bool,
    pub last_edge: Micros,
    pub pulse_active: bool,
    pub pulse_start: Micros,
    /// The primary click for the current press has already gone out.
    pub shot_fired: bool,
}

impl TriggerState {
    pub const fn new() -> Self {
        Self {
            down: false,
            last_edge: 0,
            pulse_active: false,
            pulse_start: 0,
            shot_fired: false,
        }
    }

    /// Feed the raw trigger level for this cycle.
    pub fn update<S, const N: usize>(
        &mut self,
        pressed: bool,
        now: Micros,
        tuning: &Tuning,
        queue: &mut EventQueue<N>,
        calibration: &mut Calibration,
        sink: &mut S,
    ) -> Option<TriggerEdge>
    where
        S: OutputSink + ?Sized,
    {
        let edge = self.accept_edge(pressed, now, tuning.debounce_us);

        match edge {
            Some(TriggerEdge::Pressed) => {
                sink.press_key(tuning.aux_key);
                self.pulse_active = true;
                self.pulse_start = now;
                self.shot_fired = false;
                queue.schedule(EventKind::Press, after(now, tuning.buffer_delay_us));
                calibration.register_press(tuning.calibration_lock_presses);
            }
            Some(TriggerEdge::Released) => {
                queue.schedule(EventKind::Release, after(now, tuning.buffer_delay_us));
            }
            None => {}
        }

        self.service_pulse(now, tuning, sink);
        edge
    }

    fn accept_edge(&mut self, pressed: bool, now: Micros, debounce: Micros) -> Option<TriggerEdge> {
        if pressed == self.down || elapsed(self.last_edge, now) < debounce {
            return None;
        }
        self.down = pressed;
        self.last_edge = now;
        Some(if pressed {
            TriggerEdge::Pressed
        } else {
            TriggerEdge::Released
        })
    }

    /// Release the auxiliary key once its pulse width has elapsed.
    pub fn service_pulse<S: OutputSink + ?Sized>(&mut self, now: Micros, tuning: &Tuning, sink: &mut S) {
        if self.pulse_active && elapsed(self.pulse_start, now) >= tuning.pulse_width_us {
            sink.release_key(tuning.aux_key);
            self.pulse_active = false;
        }
    }

    /// Light arrived while the trigger is held: pull the buffered PRESS
    /// back out of the queue and click now.
    ///
    /// Only the most recent queue entry is eligible, and only if it is
    /// still a PRESS.  Returns `true` if the click went out immediately.
    pub fn fire_on_light<S, const N: usize>(&mut self, queue: &mut EventQueue<N>, sink: &mut S) -> bool
    where
        S: OutputSink + ?Sized,
    {
        if !self.down || self.shot_fired {
            return false;
        }
        if queue.pop_last_if(EventKind::Press).is_none() {
            return false;
        }
        sink.press_button(OutputButton::Primary);
        self.shot_fired = true;
        true
    }

    /// Adopt the current level without producing an edge.
    ///
    /// Used when a button press is consumed elsewhere (mode selection) and
    /// must not also count as a shot.
    pub fn sync(&mut self, pressed: bool, now: Micros) {
        self.down = pressed;
        self.last_edge = now;
        self.shot_fired = pressed;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::{Recorder, SinkCall};
    use crate::time::ms;

    struct Rig {
        trigger: TriggerState,
        queue: EventQueue,
        calibration: Calibration,
        sink: Recorder,
        tuning: Tuning,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                trigger: TriggerState::new(),
                queue: EventQueue::new(),
                calibration: Calibration::new(),
                sink: Recorder::default(),
                tuning: Tuning::default(),
            }
        }

        fn step(&mut self, pressed: bool, now: Micros) -> Option<TriggerEdge> {
            self.trigger.update(
                pressed,
                now,
                &self.tuning,
                &mut self.queue,
                &mut self.calibration,
                &mut self.sink,
            )
        }
    }

    const T0: Micros = 1_000_000;

    #[test]
    fn press_pulses_aux_key_and_buffers_click() {
        let mut rig = Rig::new();
        let aux = rig.tuning.aux_key;

        assert_eq!(rig.step(true, T0), Some(TriggerEdge::Pressed));
        assert_eq!(rig.sink.take(), [SinkCall::KeyDown(aux)]);
        let pending = rig.queue.peek_last().copied();
        assert_eq!(
            pending.map(|e| (e.kind, e.due)),
            Some((EventKind::Press, T0 + rig.tuning.buffer_delay_us))
        );

        rig.step(true, T0 + rig.tuning.pulse_width_us - 1);
        assert!(rig.sink.calls.is_empty());
        rig.step(true, T0 + rig.tuning.pulse_width_us);
        assert_eq!(rig.sink.take(), [SinkCall::KeyUp(aux)]);
        assert!(!rig.trigger.pulse_active);
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let mut rig = Rig::new();
        assert_eq!(rig.step(true, T0), Some(TriggerEdge::Pressed));
        assert_eq!(rig.step(false, T0 + ms(1)), None);
        assert_eq!(rig.step(true, T0 + ms(2)), None);
        assert_eq!(rig.step(false, T0 + ms(3)), None);
        assert_eq!(rig.step(true, T0 + ms(4)), None);
        assert_eq!(rig.step(true, T0 + ms(6)), None);

        let presses = rig
            .sink
            .calls
            .iter()
            .filter(|c| matches!(c, SinkCall::KeyDown(_)))
            .count();
        assert_eq!(presses, 1);
        assert_eq!(rig.queue.len(), 1);
    }

    #[test]
    fn short_tap_still_releases() {
        let mut rig = Rig::new();
        rig.step(true, T0);
        // Released after 2 ms, held released: accepted once the window passes.
        assert_eq!(rig.step(false, T0 + ms(2)), None);
        assert_eq!(rig.step(false, T0 + ms(5)), Some(TriggerEdge::Released));

        let kinds: heapless::Vec<EventKind, 8> = rig.queue.iter().map(|e| e.kind).collect();
        assert_eq!(kinds.as_slice(), &[EventKind::Press, EventKind::Release]);
    }

    #[test]
    fn every_press_gets_exactly_one_release() {
        let mut rig = Rig::new();
        let mut now = T0;
        for _ in 0..3 {
            rig.step(true, now);
            now += ms(6);
            rig.step(false, now);
            now += ms(6);
        }
        let presses = rig.queue.iter().filter(|e| e.kind == EventKind::Press).count();
        let releases = rig.queue.iter().filter(|e| e.kind == EventKind::Release).count();
        assert_eq!(presses, 3);
        assert_eq!(releases, 3);
    }

    #[test]
    fn presses_drive_calibration_lock() {
        let mut rig = Rig::new();
        rig.tuning.calibration_lock_presses = 2;
        rig.step(true, T0);
        rig.step(false, T0 + ms(10));
        assert!(!rig.calibration.locked);
        rig.step(true, T0 + ms(20));
        assert!(rig.calibration.locked);
    }

    #[test]
    fn fire_on_light_retracts_pending_press() {
        let mut rig = Rig::new();
        rig.step(true, T0);
        rig.sink.take();

        assert!(rig.trigger.fire_on_light(&mut rig.queue, &mut rig.sink));
        assert_eq!(rig.sink.take(), [SinkCall::Press(OutputButton::Primary)]);
        assert!(rig.queue.is_empty());

        // Only once per press.
        assert!(!rig.trigger.fire_on_light(&mut rig.queue, &mut rig.sink));
    }

    #[test]
    fn fire_on_light_skips_when_press_already_executed() {
        let mut rig = Rig::new();
        rig.step(true, T0);
        rig.step(false, T0 + ms(10));
        rig.step(true, T0 + ms(20));
        assert_eq!(rig.queue.len(), 3);
        let fired = rig
            .queue
            .drain_due(T0 + rig.tuning.buffer_delay_us + ms(20), &mut rig.sink);
        assert_eq!(fired, 3);
        assert!(!rig.trigger.fire_on_light(&mut rig.queue, &mut rig.sink));
    }

    #[test]
    fn sync_swallows_selection_press() {
        let mut rig = Rig::new();
        rig.trigger.sync(true, T0);
        assert_eq!(rig.step(true, T0 + ms(10)), None);
        assert!(rig.sink.calls.is_empty());
        assert_eq!(rig.step(false, T0 + ms(20)), Some(TriggerEdge::Released));
    }
}
