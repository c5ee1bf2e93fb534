use core::ops::Add;
use core::time::Duration;

use guard_core::alarm::DisplayMode;
use guard_core::controller::GuardController;
use guard_core::input::{ButtonId, ButtonQueue, DebounceGuard, EdgeOutcome};
use guard_core::peripherals::NoopPeripherals;
use guard_core::presenter::render;
use guard_core::telemetry::{EventHistory, GuardEvent};

type Queue = ButtonQueue<MockInstant, 4>;

#[test]
fn bouncing_contact_yields_single_press() {
    let mut guard = DebounceGuard::new();
    let mut queue = Queue::new();
    let mut controller = GuardController::new();
    let mut log: EventHistory<MockInstant> = EventHistory::new();

    let outcomes: Vec<_> = [0, 3, 40, 199]
        .into_iter()
        .map(|ms| guard.forward(ButtonId::Temperature, MockInstant::millis(ms), &mut queue))
        .collect();
    assert_eq!(
        outcomes,
        [
            EdgeOutcome::Accepted,
            EdgeOutcome::Debounced,
            EdgeOutcome::Debounced,
            EdgeOutcome::Debounced,
        ]
    );

    let handled = controller.drain_buttons(
        MockInstant::millis(200),
        &mut NoopPeripherals,
        &mut queue,
        &mut log,
    );
    assert_eq!(handled, 1);
    assert_eq!(controller.display_mode(), DisplayMode::ShowTemperature);
}

#[test]
fn same_button_twice_returns_to_idle() {
    let mut guard = DebounceGuard::new();
    let mut queue = Queue::new();
    let mut controller = GuardController::new();
    let mut log: EventHistory<MockInstant> = EventHistory::new();

    for ms in [0, 250] {
        let at = MockInstant::millis(ms);
        assert_eq!(
            guard.forward(ButtonId::Current, at, &mut queue),
            EdgeOutcome::Accepted
        );
        controller.drain_buttons(at, &mut NoopPeripherals, &mut queue, &mut log);
    }

    assert_eq!(controller.display_mode(), DisplayMode::Idle);
    let modes: Vec<_> = log
        .iter()
        .filter_map(|record| match record.event {
            GuardEvent::ModeChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        modes,
        [
            (DisplayMode::Idle, DisplayMode::ShowCurrent),
            (DisplayMode::ShowCurrent, DisplayMode::Idle),
        ]
    );
}

#[test]
fn readout_follows_selected_channel() {
    let mut controller = GuardController::new();
    let mut queue = Queue::new();
    let mut log: EventHistory<MockInstant> = EventHistory::new();
    let mut guard = DebounceGuard::new();
    let mut board = NoopPeripherals;

    controller.service(MockInstant::millis(0), &mut board, &mut queue, &mut log);
    guard.forward(ButtonId::Current, MockInstant::millis(10), &mut queue);
    controller.drain_buttons(MockInstant::millis(10), &mut board, &mut queue, &mut log);

    let frame = controller.frame();
    assert!(frame.contains("Current ADC"));
    assert!(frame.contains("2048"));
    assert_eq!(frame, render(DisplayMode::ShowCurrent, 2048, 2048));
}

#[test]
fn selection_survives_alarm() {
    let mut controller = GuardController::new();
    let mut queue = Queue::new();
    let mut log: EventHistory<MockInstant> = EventHistory::new();
    let mut guard = DebounceGuard::new();
    let mut board = NoopPeripherals;

    guard.forward(ButtonId::Temperature, MockInstant::millis(0), &mut queue);
    controller.drain_buttons(MockInstant::millis(0), &mut board, &mut queue, &mut log);
    assert!(controller.arm(MockInstant::millis(100), &mut board, &mut log));
    assert_eq!(controller.display_mode(), DisplayMode::AlarmBanner);

    guard.forward(ButtonId::Current, MockInstant::millis(500), &mut queue);
    controller.drain_buttons(MockInstant::millis(500), &mut board, &mut queue, &mut log);

    assert!(!controller.is_armed());
    assert_eq!(
        controller.display_mode(),
        DisplayMode::ShowTemperature,
        "disarming press must not toggle the readout"
    );
}

#[test]
fn full_queue_drops_newest_press() {
    let mut guard = DebounceGuard::with_window(Duration::from_millis(1));
    let mut queue: ButtonQueue<MockInstant, 2> = ButtonQueue::new();

    let outcomes: Vec<_> = (0..3)
        .map(|ms| guard.forward(ButtonId::Temperature, MockInstant::millis(ms * 10), &mut queue))
        .collect();

    assert_eq!(outcomes[2], EdgeOutcome::Dropped);
    assert_eq!(queue.len(), 2);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
struct MockInstant(u64);

impl MockInstant {
    fn millis(value: u64) -> Self {
        Self(value * 1_000)
    }
}

impl Add<Duration> for MockInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = rhs.as_micros() as u64;
        MockInstant(self.0 + micros)
    }
}
