//! Control loop step.
//!
//! [`GuardController`] owns the alarm machine and the tone sequencer. Callers
//! invoke [`GuardController::service`] whenever the previously returned rest
//! has elapsed, and may call [`GuardController::drain_buttons`] early when a
//! press arrives so the operator gets immediate feedback.

use core::time::Duration;

use crate::alarm::{AlarmMachine, ButtonOutcome, DisplayMode, ExcursionChange};
use crate::config::GuardConfig;
use crate::input::{ButtonEvent, ButtonQueueConsumer};
use crate::peripherals::{PeripheralAdapter, Tone};
use crate::presenter::{Frame, render};
use crate::sensors::{IndicatorColor, Readings, SensorChannel, SensorReading};
use crate::telemetry::{EventLog, GuardEvent};
use crate::time::{Scheduler, Timestamp};

/// What a single [`GuardController::service`] call did.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    /// Sampled both channels and refreshed the outputs.
    Sampled,
    /// Advanced the alarm tone sequence.
    Tone(Tone),
}

/// Sampling, alarm and presentation loop for one guard.
#[derive(Clone, Debug)]
pub struct GuardController<I> {
    machine: AlarmMachine<I>,
    config: GuardConfig,
    tone_index: usize,
    tone: Tone,
    last_readings: Option<Readings>,
    last_step: Option<Step>,
}

impl<I: Timestamp> GuardController<I> {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_config(GuardConfig::new())
    }

    #[must_use]
    pub const fn with_config(config: GuardConfig) -> Self {
        Self {
            machine: AlarmMachine::with_config(&config),
            config,
            tone_index: 0,
            tone: Tone::Silence,
            last_readings: None,
            last_step: None,
        }
    }

    pub const fn machine(&self) -> &AlarmMachine<I> {
        &self.machine
    }

    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub const fn is_armed(&self) -> bool {
        self.machine.is_armed()
    }

    pub const fn display_mode(&self) -> DisplayMode {
        self.machine.display_mode()
    }

    /// Tone currently driven on the buzzer.
    pub const fn tone(&self) -> Tone {
        self.tone
    }

    /// Readings from the most recent sampling tick.
    pub const fn last_readings(&self) -> Option<Readings> {
        self.last_readings
    }

    pub const fn last_step(&self) -> Option<Step> {
        self.last_step
    }

    /// Color the indicator shows for the latest readings.
    pub fn indicator_color(&self) -> Option<IndicatorColor> {
        self.last_readings
            .map(|readings| self.machine.indicator_color(readings))
    }

    /// Frame matching the current mode and latest readings.
    pub fn frame(&self) -> Frame {
        let readings = self.last_readings.unwrap_or_default();
        render(
            self.machine.display_mode(),
            readings.temperature,
            readings.current,
        )
    }

    /// Runs one step and returns how long to rest before the next one.
    ///
    /// Pending presses are applied first. While the alarm is armed the step
    /// advances the tone sequence; otherwise it performs a sampling tick.
    pub fn service<A, Q, L>(
        &mut self,
        now: I,
        adapter: &mut A,
        buttons: &mut Q,
        log: &mut L,
    ) -> Duration
    where
        A: PeripheralAdapter + ?Sized,
        Q: ButtonQueueConsumer<Instant = I> + ?Sized,
        L: EventLog<I> + ?Sized,
    {
        self.drain_buttons(now, adapter, buttons, log);

        if self.machine.is_armed() {
            let tone = self.next_alarm_tone();
            self.apply_tone(now, tone, adapter, log);
            self.last_step = Some(Step::Tone(tone));
            self.config.tone_interval
        } else {
            self.sample_tick(now, adapter, log);
            self.last_step = Some(Step::Sampled);
            self.config.sample_interval
        }
    }

    /// Applies every queued press. Returns how many were handled.
    pub fn drain_buttons<A, Q, L>(
        &mut self,
        now: I,
        adapter: &mut A,
        buttons: &mut Q,
        log: &mut L,
    ) -> usize
    where
        A: PeripheralAdapter + ?Sized,
        Q: ButtonQueueConsumer<Instant = I> + ?Sized,
        L: EventLog<I> + ?Sized,
    {
        let mut handled = 0;
        while let Some(event) = buttons.try_dequeue() {
            self.handle_button(now, event, adapter, log);
            handled += 1;
        }
        handled
    }

    /// Applies a single debounced press.
    pub fn handle_button<A, L>(
        &mut self,
        now: I,
        event: ButtonEvent<I>,
        adapter: &mut A,
        log: &mut L,
    ) -> ButtonOutcome
    where
        A: PeripheralAdapter + ?Sized,
        L: EventLog<I> + ?Sized,
    {
        let outcome = self.machine.on_button(event);
        match outcome {
            ButtonOutcome::Disarmed => {
                self.tone_index = 0;
                self.apply_tone(now, Tone::Silence, adapter, log);
                log.record(now, GuardEvent::AlarmCleared { by: event.button });
                self.refresh_outputs(adapter);
            }
            ButtonOutcome::ModeChanged { from, to } => {
                log.record(now, GuardEvent::ModeChanged { from, to });
                if self.last_readings.is_some() {
                    adapter.write_display(&self.frame());
                }
            }
        }
        outcome
    }

    /// Arms the alarm without waiting for a sustained excursion.
    /// Returns `false` when it was already armed.
    pub fn arm<A, L>(&mut self, now: I, adapter: &mut A, log: &mut L) -> bool
    where
        A: PeripheralAdapter + ?Sized,
        L: EventLog<I> + ?Sized,
    {
        if !self.machine.trigger() {
            return false;
        }
        log.record(
            now,
            GuardEvent::AlarmArmed(self.last_readings.unwrap_or_default()),
        );
        self.refresh_outputs(adapter);
        true
    }

    fn sample_tick<A, L>(&mut self, now: I, adapter: &mut A, log: &mut L)
    where
        A: PeripheralAdapter + ?Sized,
        L: EventLog<I> + ?Sized,
    {
        let samples = SensorChannel::ALL
            .map(|channel| SensorReading::new(channel, adapter.sample(channel)));
        let readings = Readings::from_samples(&samples);
        self.last_readings = Some(readings);

        let outcome = self.machine.on_sample(readings, now);
        match outcome.excursion {
            ExcursionChange::Started => log.record(now, GuardEvent::ExcursionStarted(readings)),
            ExcursionChange::Cleared => log.record(now, GuardEvent::ExcursionCleared),
            ExcursionChange::None => {}
        }

        adapter.set_indicator(outcome.color.levels());
        log.record(
            now,
            GuardEvent::Sampled {
                readings,
                color: outcome.color,
            },
        );
        if outcome.armed {
            log.record(now, GuardEvent::AlarmArmed(readings));
        }

        adapter.write_display(&self.frame());
    }

    fn next_alarm_tone(&mut self) -> Tone {
        let tones = self.config.alarm_tones;
        let hz = tones[self.tone_index % tones.len()];
        self.tone_index = self.tone_index.wrapping_add(1);
        Tone::Frequency(hz)
    }

    fn apply_tone<A, L>(&mut self, now: I, tone: Tone, adapter: &mut A, log: &mut L)
    where
        A: PeripheralAdapter + ?Sized,
        L: EventLog<I> + ?Sized,
    {
        if tone == self.tone {
            return;
        }
        self.tone = tone;
        adapter.set_tone(tone);
        log.record(now, GuardEvent::ToneChanged(tone));
    }

    fn refresh_outputs<A>(&self, adapter: &mut A)
    where
        A: PeripheralAdapter + ?Sized,
    {
        if let Some(color) = self.indicator_color() {
            adapter.set_indicator(color.levels());
        } else if self.machine.is_armed() {
            adapter.set_indicator(IndicatorColor::Red.levels());
        }
        adapter.write_display(&self.frame());
    }
}

impl<I: Timestamp> Default for GuardController<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives `controller` for `steps` steps, resting on `scheduler` in between.
pub fn run_steps<S, A, Q, L>(
    controller: &mut GuardController<S::Instant>,
    scheduler: &mut S,
    adapter: &mut A,
    buttons: &mut Q,
    log: &mut L,
    steps: usize,
) where
    S: Scheduler,
    A: PeripheralAdapter + ?Sized,
    Q: ButtonQueueConsumer<Instant = S::Instant> + ?Sized,
    L: EventLog<S::Instant> + ?Sized,
{
    for _ in 0..steps {
        let now = scheduler.now();
        let rest = controller.service(now, adapter, buttons, log);
        scheduler.wait(rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonId, ButtonQueue, ButtonQueueProducer};
    use crate::peripherals::NoopPeripherals;
    use crate::sensors::RgbLevels;
    use crate::telemetry::NoopEventLog;
    use crate::time::{VirtualClock, VirtualInstant};

    struct FixedBoard {
        temperature: u16,
        current: u16,
        indicator: Option<RgbLevels>,
        tone: Tone,
        frames: usize,
    }

    impl FixedBoard {
        fn new(temperature: u16, current: u16) -> Self {
            Self {
                temperature,
                current,
                indicator: None,
                tone: Tone::Silence,
                frames: 0,
            }
        }
    }

    impl PeripheralAdapter for FixedBoard {
        fn sample(&mut self, channel: SensorChannel) -> u16 {
            match channel {
                SensorChannel::Temperature => self.temperature,
                SensorChannel::Current => self.current,
            }
        }

        fn set_indicator(&mut self, levels: RgbLevels) {
            self.indicator = Some(levels);
        }

        fn set_tone(&mut self, tone: Tone) {
            self.tone = tone;
        }

        fn write_display(&mut self, _frame: &Frame) {
            self.frames += 1;
        }
    }

    type Queue = ButtonQueue<VirtualInstant, 4>;

    #[test]
    fn idle_step_samples_and_rests() {
        let mut controller = GuardController::new();
        let mut board = FixedBoard::new(3500, 2000);
        let mut queue = Queue::new();

        let rest = controller.service(
            VirtualInstant::ZERO,
            &mut board,
            &mut queue,
            &mut NoopEventLog,
        );

        assert_eq!(rest, Duration::from_millis(200));
        assert_eq!(controller.last_step(), Some(Step::Sampled));
        assert_eq!(board.indicator, Some(IndicatorColor::Yellow.levels()));
        assert_eq!(board.frames, 1);
    }

    #[test]
    fn samples_are_clamped() {
        let mut controller: GuardController<VirtualInstant> = GuardController::new();
        let mut board = FixedBoard::new(9000, 2000);
        controller.service(
            VirtualInstant::ZERO,
            &mut board,
            &mut Queue::new(),
            &mut NoopEventLog,
        );
        assert_eq!(
            controller.last_readings().map(|readings| readings.temperature),
            Some(4095)
        );
    }

    #[test]
    fn armed_steps_alternate_tones() {
        let mut controller = GuardController::new();
        let mut board = FixedBoard::new(2000, 2000);
        let mut queue = Queue::new();
        assert!(controller.arm(VirtualInstant::ZERO, &mut board, &mut NoopEventLog));
        assert_eq!(board.indicator, Some(IndicatorColor::Red.levels()));

        let mut clock = VirtualClock::new();
        let mut heard = [0_u32; 3];
        for slot in &mut heard {
            let rest =
                controller.service(clock.now(), &mut board, &mut queue, &mut NoopEventLog);
            assert_eq!(rest, Duration::from_millis(300));
            if let Tone::Frequency(hz) = board.tone {
                *slot = hz;
            }
            clock.wait(rest);
        }
        assert_eq!(heard, [1_000, 1_500, 1_000]);
    }

    #[test]
    fn press_silences_and_resumes_sampling() {
        let mut controller = GuardController::new();
        let mut board = FixedBoard::new(2000, 2000);
        let mut queue = Queue::new();
        let mut clock = VirtualClock::new();

        controller.arm(clock.now(), &mut board, &mut NoopEventLog);
        run_steps(&mut controller, &mut clock, &mut board, &mut queue, &mut NoopEventLog, 2);
        assert_eq!(board.tone, Tone::Frequency(1_500));

        queue
            .try_enqueue(ButtonEvent::new(ButtonId::Current, clock.now()))
            .unwrap();
        let rest =
            controller.service(clock.now(), &mut board, &mut queue, &mut NoopEventLog);

        assert!(!controller.is_armed());
        assert_eq!(board.tone, Tone::Silence);
        assert_eq!(rest, Duration::from_millis(200));
        assert_eq!(board.indicator, Some(IndicatorColor::Green.levels()));
    }

    #[test]
    fn mode_change_before_first_sample_waits_for_readings() {
        let mut controller = GuardController::new();
        let mut board = NoopPeripherals;
        let outcome = controller.handle_button(
            VirtualInstant::ZERO,
            ButtonEvent::new(ButtonId::Temperature, VirtualInstant::ZERO),
            &mut board,
            &mut NoopEventLog,
        );
        assert!(matches!(outcome, ButtonOutcome::ModeChanged { .. }));
        assert_eq!(controller.display_mode(), DisplayMode::ShowTemperature);
    }
}
