use core::ops::Add;
use core::time::Duration;

use guard_core::alarm::DisplayMode;
use guard_core::controller::{GuardController, run_steps};
use guard_core::input::{ButtonEvent, ButtonId, ButtonQueue, ButtonQueueProducer};
use guard_core::peripherals::{PeripheralAdapter, Tone};
use guard_core::presenter::Frame;
use guard_core::sensors::{IndicatorColor, RgbLevels, SensorChannel};
use guard_core::telemetry::{EventLog, GuardEvent};
use guard_core::time::Scheduler;

#[test]
fn sustained_excursion_arms_once_at_five_seconds() {
    let mut rig = Rig::new(4100, 2000);

    rig.run_until(MockInstant::millis(5_200));

    let armed: Vec<_> = rig
        .log
        .events
        .iter()
        .filter(|(_, event)| matches!(event, GuardEvent::AlarmArmed(_)))
        .collect();
    assert_eq!(armed.len(), 1, "alarm must arm exactly once");
    assert_eq!(armed[0].0, MockInstant::millis(5_000));
    assert!(rig.controller.is_armed());
    assert_eq!(rig.board.indicator, Some(IndicatorColor::Red.levels()));
    assert!(rig.board.frames.last().is_some_and(|frame| frame.contains("ALARM")));
}

#[test]
fn armed_guard_alternates_tones_every_300_ms() {
    let mut rig = Rig::new(4100, 2000);
    rig.run_until(MockInstant::millis(7_000));

    let tones: Vec<_> = rig
        .log
        .events
        .iter()
        .filter_map(|(at, event)| match event {
            GuardEvent::ToneChanged(tone) => Some((at.as_millis(), *tone)),
            _ => None,
        })
        .collect();

    assert_eq!(
        &tones[..4],
        &[
            (5_200, Tone::Frequency(1_000)),
            (5_500, Tone::Frequency(1_500)),
            (5_800, Tone::Frequency(1_000)),
            (6_100, Tone::Frequency(1_500)),
        ]
    );
    assert_eq!(
        rig.log
            .events
            .iter()
            .filter(|(_, event)| matches!(event, GuardEvent::AlarmArmed(_)))
            .count(),
        1
    );
}

#[test]
fn any_press_clears_alarm_and_silences() {
    let mut rig = Rig::new(4100, 2000);
    rig.run_until(MockInstant::millis(6_000));
    assert!(rig.controller.is_armed());

    rig.board.temperature = 2000;
    rig.queue
        .try_enqueue(ButtonEvent::new(ButtonId::Current, rig.clock.now()))
        .expect("queue has room");
    rig.step();

    assert!(!rig.controller.is_armed());
    assert_eq!(rig.board.tone, Tone::Silence);
    assert!(rig.log.events.iter().any(|(_, event)| matches!(
        event,
        GuardEvent::AlarmCleared {
            by: ButtonId::Current
        }
    )));
    assert_ne!(rig.controller.display_mode(), DisplayMode::AlarmBanner);
}

#[test]
fn recovery_before_window_never_arms() {
    let mut rig = Rig::new(10, 2000);
    rig.run_until(MockInstant::millis(4_800));

    rig.board.temperature = 2000;
    rig.run_until(MockInstant::millis(5_200));
    assert!(
        rig.log
            .events
            .iter()
            .any(|(_, event)| matches!(event, GuardEvent::ExcursionCleared))
    );

    // A new excursion needs its own full window.
    rig.board.temperature = 10;
    rig.run_until(MockInstant::millis(10_000));
    assert!(!rig.controller.is_armed());
    rig.run_until(MockInstant::millis(10_400));
    assert!(rig.controller.is_armed());
}

#[test]
fn excursion_persisting_after_disarm_rearms_on_next_tick() {
    let mut rig = Rig::new(4100, 2000);
    rig.run_until(MockInstant::millis(5_200));
    let pressed_at = rig.clock.now();
    rig.queue
        .try_enqueue(ButtonEvent::new(ButtonId::Temperature, pressed_at))
        .expect("queue has room");
    rig.step();

    assert_eq!(
        rig.controller.machine().excursion_started_at(),
        Some(MockInstant::millis(0))
    );
    let cleared_at: Vec<_> = rig
        .log
        .events
        .iter()
        .filter(|(_, event)| matches!(event, GuardEvent::AlarmCleared { .. }))
        .map(|(at, _)| *at)
        .collect();
    assert_eq!(cleared_at, vec![pressed_at]);

    let armed_at: Vec<_> = rig
        .log
        .events
        .iter()
        .filter(|(_, event)| matches!(event, GuardEvent::AlarmArmed(_)))
        .map(|(at, _)| *at)
        .collect();
    assert_eq!(armed_at, vec![MockInstant::millis(5_000), pressed_at]);
    assert!(rig.controller.is_armed());
}

#[test]
fn run_steps_follows_returned_rest() {
    let mut controller = GuardController::new();
    let mut clock = MockClock::default();
    let mut board = MockBoard::new(2000, 2000);
    let mut queue: ButtonQueue<MockInstant, 4> = ButtonQueue::new();
    let mut log = MockLog::default();

    run_steps(&mut controller, &mut clock, &mut board, &mut queue, &mut log, 5);

    assert_eq!(clock.now(), MockInstant::millis(1_000));
    assert_eq!(board.indicator, Some(IndicatorColor::Green.levels()));
    assert_eq!(board.frames.len(), 5);
    assert!(board.frames.iter().all(Frame::is_blank));
}

struct Rig {
    controller: GuardController<MockInstant>,
    clock: MockClock,
    board: MockBoard,
    queue: ButtonQueue<MockInstant, 4>,
    log: MockLog,
}

impl Rig {
    fn new(temperature: u16, current: u16) -> Self {
        Self {
            controller: GuardController::new(),
            clock: MockClock::default(),
            board: MockBoard::new(temperature, current),
            queue: ButtonQueue::new(),
            log: MockLog::default(),
        }
    }

    fn step(&mut self) {
        let now = self.clock.now();
        let rest = self
            .controller
            .service(now, &mut self.board, &mut self.queue, &mut self.log);
        self.clock.wait(rest);
    }

    /// Steps while the next step is due at or before `deadline`.
    fn run_until(&mut self, deadline: MockInstant) {
        while self.clock.now() <= deadline {
            self.step();
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
struct MockInstant(u64);

impl MockInstant {
    fn millis(value: u64) -> Self {
        Self(value * 1_000)
    }

    fn as_millis(self) -> u64 {
        self.0 / 1_000
    }
}

impl Add<Duration> for MockInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = rhs.as_micros() as u64;
        MockInstant(self.0 + micros)
    }
}

#[derive(Default)]
struct MockClock {
    now: MockInstant,
}

impl Scheduler for MockClock {
    type Instant = MockInstant;

    fn now(&self) -> MockInstant {
        self.now
    }

    fn wait(&mut self, duration: Duration) {
        self.now = self.now + duration;
    }
}

struct MockBoard {
    temperature: u16,
    current: u16,
    indicator: Option<RgbLevels>,
    tone: Tone,
    frames: Vec<Frame>,
}

impl MockBoard {
    fn new(temperature: u16, current: u16) -> Self {
        Self {
            temperature,
            current,
            indicator: None,
            tone: Tone::Silence,
            frames: Vec::new(),
        }
    }
}

impl PeripheralAdapter for MockBoard {
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

    fn write_display(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

#[derive(Default)]
struct MockLog {
    events: Vec<(MockInstant, GuardEvent)>,
}

impl EventLog<MockInstant> for MockLog {
    fn record(&mut self, at: MockInstant, event: GuardEvent) {
        self.events.push((at, event));
    }
}
