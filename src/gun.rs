//! Poll-driven orchestrator.
//!
//! [`LightGun::cycle`] is called from the firmware's fixed-period loop.
//! One cycle:
//!
//! 1. (re)connect and poll the controller; a failed poll resets
//!    calibration and all transient state
//! 2. the disable combo (all three buttons) wins over everything
//! 3. while reporting is off, wait for a mode-selecting press
//! 4. trigger, A/B buttons and the A+B hold combo, every cycle
//! 5. sensor coordinates, only when the coordinate period has elapsed
//! 6. drain due queue entries, then flush one report batch
//!
//! Due entries are also drained before the trigger runs, so the edge
//! accepted in a cycle never evicts a click that is due in that cycle.
//!
//! Buffered clicks are drained on every cycle, not only on coordinate
//! cycles, so their timing follows the poll rate rather than the scan rate.

use crate::calibration::Calibration;
use crate::combo::ComboHold;
use crate::config::{Tuning, EVENT_QUEUE_CAPACITY};
use crate::controller::{Button, Controller, LightStatus};
use crate::error::Error;
use crate::light::{LightAction, LightHold, LightPhase, LightSample};
use crate::normalize::scale_stick;
use crate::queue::EventQueue;
use crate::sink::{Axis, OutputButton, OutputMode, OutputSink};
use crate::time::{elapsed, Micros};
use crate::trigger::TriggerState;

/// Process-wide mode switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeFlags {
    pub report_enabled: bool,
    pub pointer_mode: bool,
    pub joystick_mode: bool,
    pub infinite_hold: bool,
}

impl ModeFlags {
    pub fn output_mode(&self) -> Option<OutputMode> {
        if self.pointer_mode {
            Some(OutputMode::Pointer)
        } else if self.joystick_mode {
            Some(OutputMode::Joystick)
        } else {
            None
        }
    }
}

/// Outcome of one [`LightGun::cycle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cycle {
    /// No controller, or it just dropped.
    Disconnected,
    /// Reporting is off; waiting for trigger (pointer) or A (joystick).
    AwaitingMode,
    ModeSelected(OutputMode),
    Active,
    /// Disable combo handled. The caller should pause for
    /// `Tuning::disable_pause_ms` before the next cycle.
    Disabled,
}

pub struct LightGun<const N: usize = EVENT_QUEUE_CAPACITY> {
    tuning: Tuning,
    modes: ModeFlags,
    calibration: Calibration,
    trigger: TriggerState,
    queue: EventQueue<N>,
    light: LightHold,
    combo: ComboHold,
    connected: bool,
    last_scan: Micros,
}

impl<const N: usize> LightGun<N> {
    pub fn new(tuning: Tuning) -> Result<Self, Error> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            modes: ModeFlags::default(),
            calibration: Calibration::new(),
            trigger: TriggerState::new(),
            queue: EventQueue::new(),
            light: LightHold::new(),
            combo: ComboHold::new(),
            connected: false,
            last_scan: 0,
        })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn modes(&self) -> ModeFlags {
        self.modes
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn trigger(&self) -> &TriggerState {
        &self.trigger
    }

    pub fn queue(&self) -> &EventQueue<N> {
        &self.queue
    }

    pub fn light_phase(&self) -> LightPhase {
        self.light.phase()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Run one poll cycle at `now`.
    pub fn cycle<C, S>(&mut self, now: Micros, controller: &mut C, sink: &mut S) -> Cycle
    where
        C: Controller + ?Sized,
        S: OutputSink + ?Sized,
    {
        if !self.connected {
            if !controller.connect() {
                return Cycle::Disconnected;
            }
            self.connected = true;
            // First coordinate scan runs on this cycle.
            self.last_scan = now.wrapping_sub(self.tuning.coordinate_period_us);
            #[cfg(feature = "defmt")]
            defmt::info!("Gun: controller connected");
        }

        if !controller.poll() {
            self.on_disconnect(sink);
            return Cycle::Disconnected;
        }

        let trigger = controller.button_pressed(Button::Trigger);
        let a = controller.button_pressed(Button::A);
        let b = controller.button_pressed(Button::B);

        if trigger && a && b {
            self.disable(sink);
            return Cycle::Disabled;
        }

        if !self.modes.report_enabled {
            return self.await_mode(now, controller, sink);
        }

        // Free the slots of clicks that are due before scheduling new ones,
        // so a full queue never evicts an entry that could fire now.
        self.queue.drain_due(now, sink);
        self.trigger.update(
            trigger,
            now,
            &self.tuning,
            &mut self.queue,
            &mut self.calibration,
            sink,
        );
        self.update_side_buttons(controller, sink);

        if self.combo.update(a && b, now, self.tuning.combo_hold_us) {
            self.modes.infinite_hold = !self.modes.infinite_hold;
            #[cfg(feature = "defmt")]
            defmt::info!("Gun: infinite hold {}", self.modes.infinite_hold);
        }

        if elapsed(self.last_scan, now) >= self.tuning.coordinate_period_us {
            self.last_scan = now;
            self.scan(now, controller, sink);
        }

        self.queue.drain_due(now, sink);
        sink.flush();
        Cycle::Active
    }

    fn await_mode<C, S>(&mut self, now: Micros, controller: &mut C, sink: &mut S) -> Cycle
    where
        C: Controller + ?Sized,
        S: OutputSink + ?Sized,
    {
        let mode = if controller.button_just_pressed(Button::Trigger) {
            OutputMode::Pointer
        } else if controller.button_just_pressed(Button::A) {
            OutputMode::Joystick
        } else {
            return Cycle::AwaitingMode;
        };

        self.modes.report_enabled = true;
        self.modes.pointer_mode = mode == OutputMode::Pointer;
        self.modes.joystick_mode = mode == OutputMode::Joystick;
        sink.select_mode(mode);
        // The selecting press is spent; it must not also fire.
        self.trigger.sync(controller.button_pressed(Button::Trigger), now);
        sink.flush();

        #[cfg(feature = "defmt")]
        defmt::info!("Gun: mode {:?} selected", mode);
        Cycle::ModeSelected(mode)
    }

    fn update_side_buttons<C, S>(&self, controller: &C, sink: &mut S)
    where
        C: Controller + ?Sized,
        S: OutputSink + ?Sized,
    {
        for (input, output) in [
            (Button::A, OutputButton::Secondary),
            (Button::B, OutputButton::Tertiary),
        ] {
            if controller.button_just_pressed(input) {
                sink.press_button(output);
            } else if controller.button_just_released(input) {
                sink.release_button(output);
            }
        }
    }

    fn scan<C, S>(&mut self, now: Micros, controller: &C, sink: &mut S)
    where
        C: Controller + ?Sized,
        S: OutputSink + ?Sized,
    {
        let sample = match controller.light_status() {
            LightStatus::Ok { x, y } if self.tuning.sensor_window.contains(x, y) => {
                self.calibration.observe(x, y);
                LightSample::Hit(x, y)
            }
            _ => LightSample::Miss,
        };

        let action = self
            .light
            .update(sample, now, &self.tuning, self.modes.infinite_hold);

        match action {
            LightAction::Track(x, y) | LightAction::Hold(x, y) => self.emit_position(x, y, sink),
            LightAction::Offscreen => {
                let (x, y) = self.tuning.offscreen;
                self.emit_output(x, y, sink);
            }
            LightAction::Idle => {}
        }

        if self.tuning.instant_shot && matches!(action, LightAction::Track(..)) {
            self.trigger.fire_on_light(&mut self.queue, sink);
        }

        if self.modes.joystick_mode {
            let (sx, sy) = controller.analog_stick();
            sink.set_axis(Axis::Rx, scale_stick(sx));
            sink.set_axis(Axis::Ry, scale_stick(sy));
        }
    }

    /// Normalize a raw coordinate and send it; skipped while uncalibrated.
    fn emit_position<S: OutputSink + ?Sized>(&self, x: u16, y: u16, sink: &mut S) {
        if let Some((nx, ny)) = self.calibration.normalize(x, y) {
            self.emit_output(nx, ny, sink);
        }
    }

    fn emit_output<S: OutputSink + ?Sized>(&self, x: u16, y: u16, sink: &mut S) {
        match self.modes.output_mode() {
            Some(OutputMode::Pointer) => sink.move_pointer(x, y),
            Some(OutputMode::Joystick) => {
                sink.set_axis(Axis::X, x);
                sink.set_axis(Axis::Y, y);
            }
            None => {}
        }
    }

    fn release_outputs<S: OutputSink + ?Sized>(&self, sink: &mut S) {
        for button in OutputButton::ALL {
            sink.release_button(button);
        }
        sink.release_key(self.tuning.aux_key);
        sink.flush();
    }

    fn reset_transient(&mut self) {
        self.trigger.reset();
        self.queue.clear();
        self.light.reset();
        self.combo.reset();
    }

    /// Universal disable combo: everything up, reporting off, back to mode selection.
    fn disable<S: OutputSink + ?Sized>(&mut self, sink: &mut S) {
        self.release_outputs(sink);
        self.modes = ModeFlags::default();
        self.reset_transient();
        #[cfg(feature = "defmt")]
        defmt::info!("Gun: disabled, awaiting mode selection");
    }

    fn on_disconnect<S: OutputSink + ?Sized>(&mut self, sink: &mut S) {
        self.release_outputs(sink);
        self.calibration.reset();
        self.reset_transient();
        self.connected = false;
        #[cfg(feature = "defmt")]
        defmt::warn!("Gun: controller lost");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::{Recorder, SinkCall};
    use crate::time::ms;

    #[derive(Default)]
    struct Pad {
        present: bool,
        buttons: [bool; 3],
        previous: [bool; 3],
        light: Option<(u16, u16)>,
        sensor_error: bool,
    }

    fn idx(b: Button) -> usize {
        match b {
            Button::Trigger => 0,
            Button::A => 1,
            Button::B => 2,
        }
    }

    impl Pad {
        fn set(&mut self, trigger: bool, a: bool, b: bool) {
            self.buttons = [trigger, a, b];
        }
    }

    impl Controller for Pad {
        fn connect(&mut self) -> bool {
            self.present
        }
        fn poll(&mut self) -> bool {
            self.present
        }
        fn button_pressed(&self, b: Button) -> bool {
            self.buttons[idx(b)]
        }
        fn button_just_pressed(&self, b: Button) -> bool {
            self.buttons[idx(b)] && !self.previous[idx(b)]
        }
        fn button_just_released(&self, b: Button) -> bool {
            !self.buttons[idx(b)] && self.previous[idx(b)]
        }
        fn light_status(&self) -> LightStatus {
            match self.light {
                _ if self.sensor_error => LightStatus::Error,
                Some((x, y)) => LightStatus::Ok { x, y },
                None => LightStatus::NoLight,
            }
        }
        fn analog_stick(&self) -> (u8, u8) {
            (0, 255)
        }
    }

    struct Bench {
        gun: LightGun,
        pad: Pad,
        sink: Recorder,
        now: Micros,
    }

    impl Bench {
        fn new(tuning: Tuning) -> Self {
            Self {
                gun: LightGun::new(tuning).unwrap(),
                pad: Pad {
                    present: true,
                    ..Pad::default()
                },
                sink: Recorder::default(),
                now: 1_000_000,
            }
        }

        fn step(&mut self, dt: Micros) -> Cycle {
            self.now += dt;
            let c = self.gun.cycle(self.now, &mut self.pad, &mut self.sink);
            self.pad.previous = self.pad.buttons;
            c
        }

        fn select(&mut self, mode: OutputMode) {
            match mode {
                OutputMode::Pointer => self.pad.set(true, false, false),
                OutputMode::Joystick => self.pad.set(false, true, false),
            }
            assert_eq!(self.step(0), Cycle::ModeSelected(mode));
            self.pad.set(false, false, false);
            self.step(ms(10));
            // Let the release from the spent selection press drain.
            self.step(ms(50));
            self.sink.take();
        }
    }

    /// Pointer mode, calibrated to (100..=300, 100..=200), aimed at (200, 150).
    fn aimed_bench() -> (Bench, (u16, u16)) {
        let mut bench = Bench::new(Tuning::default());
        bench.select(OutputMode::Pointer);
        for hit in [(100, 100), (300, 200), (200, 150)] {
            bench.pad.light = Some(hit);
            bench.step(ms(2));
        }
        let aimed = (
            crate::normalize::scale_axis(200, 100, 300).unwrap(),
            crate::normalize::scale_axis(150, 100, 200).unwrap(),
        );
        assert_eq!(bench.sink.moves().last(), Some(&aimed));
        bench.sink.take();
        (bench, aimed)
    }

    #[test]
    fn out_of_window_sample_counts_as_no_light() {
        let (mut bench, aimed) = aimed_bench();
        let cal = *bench.gun.calibration();

        // Right of SENSOR_X_MAX and below SENSOR_Y_MIN.
        for stray in [(500, 150), (200, 8)] {
            bench.pad.light = Some(stray);
            bench.step(ms(2));
        }

        assert_eq!(bench.sink.moves(), [aimed, aimed]);
        assert_eq!(*bench.gun.calibration(), cal);
        assert_eq!(bench.gun.light_phase(), LightPhase::Holding);
    }

    #[test]
    fn sensor_error_holds_like_no_light() {
        let (mut bench, aimed) = aimed_bench();
        let cal = *bench.gun.calibration();

        bench.pad.sensor_error = true;
        bench.step(ms(2));
        bench.step(ms(2));

        assert_eq!(bench.sink.moves(), [aimed, aimed]);
        assert_eq!(*bench.gun.calibration(), cal);
        assert_eq!(bench.gun.light_phase(), LightPhase::Holding);

        // Still an error at the end of the hold window: off-screen.
        let tuning = *bench.gun.tuning();
        bench.step(tuning.hold_window_us);
        assert_eq!(bench.sink.moves().last(), Some(&tuning.offscreen));
        assert_eq!(bench.gun.light_phase(), LightPhase::NoLight);
    }

    #[test]
    fn fastest_tapping_never_evicts_due_clicks() {
        let mut bench = Bench::new(Tuning::default());
        bench.select(OutputMode::Pointer);

        // One accepted edge per debounce interval, the densest possible.
        let debounce = bench.gun.tuning().debounce_us;
        for i in 0..40 {
            bench.pad.set(i % 2 == 0, false, false);
            bench.step(debounce);
        }
        bench.pad.set(false, false, false);
        bench.step(ms(100));

        assert_eq!(bench.gun.queue().evicted(), 0);
        let primary: std::vec::Vec<_> = bench
            .sink
            .take()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    SinkCall::Press(OutputButton::Primary) | SinkCall::Release(OutputButton::Primary)
                )
            })
            .collect();
        assert_eq!(primary.len(), 40);
        assert_eq!(primary.last(), Some(&SinkCall::Release(OutputButton::Primary)));
    }

    #[test]
    fn starts_awaiting_mode() {
        let mut bench = Bench::new(Tuning::default());
        assert_eq!(bench.step(0), Cycle::AwaitingMode);
        assert!(!bench.gun.modes().report_enabled);
    }

    #[test]
    fn rejects_invalid_tuning() {
        let tuning = Tuning {
            debounce_us: 0,
            ..Tuning::default()
        };
        assert!(LightGun::<8>::new(tuning).is_err());
    }

    #[test]
    fn selecting_press_does_not_shoot() {
        let mut bench = Bench::new(Tuning::default());
        bench.pad.set(true, false, false);
        assert_eq!(bench.step(0), Cycle::ModeSelected(OutputMode::Pointer));
        bench.step(ms(10));
        assert!(!bench.sink.calls.contains(&SinkCall::KeyDown(bench.gun.tuning().aux_key)));
        assert!(bench.gun.queue().is_empty());
    }

    #[test]
    fn disconnect_resets_calibration_and_releases() {
        let mut bench = Bench::new(Tuning::default());
        bench.select(OutputMode::Pointer);
        bench.pad.light = Some((100, 100));
        bench.step(ms(2));
        assert!(bench.gun.calibration().has_samples());

        bench.pad.present = false;
        assert_eq!(bench.step(ms(1)), Cycle::Disconnected);
        assert!(!bench.gun.is_connected());
        assert_eq!(*bench.gun.calibration(), Calibration::new());
        assert!(bench.sink.calls.contains(&SinkCall::Release(OutputButton::Primary)));

        // Retries each cycle and comes back with the same mode.
        assert_eq!(bench.step(ms(1)), Cycle::Disconnected);
        bench.pad.present = true;
        assert_eq!(bench.step(ms(1)), Cycle::Active);
    }

    #[test]
    fn joystick_mode_routes_coordinates_to_axes() {
        let mut bench = Bench::new(Tuning::default());
        bench.select(OutputMode::Joystick);
        bench.pad.light = Some((100, 100));
        bench.step(ms(2));
        bench.pad.light = Some((300, 200));
        bench.step(ms(2));

        let calls = bench.sink.take();
        assert!(calls.contains(&SinkCall::Axis(Axis::X, 32767)));
        assert!(calls.contains(&SinkCall::Axis(Axis::Y, 32767)));
        assert!(calls.contains(&SinkCall::Axis(Axis::Rx, 0)));
        assert!(calls.contains(&SinkCall::Axis(Axis::Ry, 32767)));
        assert!(!calls.iter().any(|c| matches!(c, SinkCall::Move(..))));
    }

    #[test]
    fn side_buttons_follow_edges() {
        let mut bench = Bench::new(Tuning::default());
        bench.select(OutputMode::Pointer);
        bench.pad.set(false, true, false);
        bench.step(ms(1));
        bench.pad.set(false, false, true);
        bench.step(ms(1));
        let calls = bench.sink.take();
        let buttons: std::vec::Vec<_> = calls
            .into_iter()
            .filter(|c| matches!(c, SinkCall::Press(_) | SinkCall::Release(_)))
            .collect();
        assert_eq!(
            buttons,
            [
                SinkCall::Press(OutputButton::Secondary),
                SinkCall::Release(OutputButton::Secondary),
                SinkCall::Press(OutputButton::Tertiary),
            ]
        );
    }

    #[test]
    fn instant_shot_skips_buffer_delay() {
        let tuning = Tuning {
            instant_shot: true,
            ..Tuning::default()
        };
        let mut bench = Bench::new(tuning);
        bench.select(OutputMode::Pointer);

        bench.pad.set(true, false, false);
        bench.step(ms(1));
        assert_eq!(bench.gun.queue().len(), 1);

        bench.pad.light = Some((150, 150));
        bench.step(ms(2));
        assert!(bench.sink.calls.contains(&SinkCall::Press(OutputButton::Primary)));
        assert!(bench.gun.queue().is_empty());
    }

    #[test]
    fn without_instant_shot_click_waits_for_buffer() {
        let mut bench = Bench::new(Tuning {
            instant_shot: false,
            ..Tuning::default()
        });
        bench.select(OutputMode::Pointer);
        bench.pad.set(true, false, false);
        bench.pad.light = Some((150, 150));
        bench.step(ms(1));
        bench.step(ms(2));
        assert!(!bench.sink.calls.contains(&SinkCall::Press(OutputButton::Primary)));
        assert_eq!(bench.gun.queue().len(), 1);
    }
}
