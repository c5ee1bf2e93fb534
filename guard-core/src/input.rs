//! Debounced button input.
//!
//! Raw falling edges arrive from the interrupt side with a timestamp. The
//! [`DebounceGuard`] accepts at most one edge per button per debounce window
//! and forwards accepted presses into a bounded queue that the control loop
//! drains. Rejected edges leave no trace.

use core::{fmt, time::Duration};

use heapless::Deque;

use crate::config::{DEBOUNCE_WINDOW, GuardConfig};
use crate::time::Timestamp;

/// Number of physical buttons.
pub const BUTTON_COUNT: usize = 2;

/// Buttons wired to the guard (active-low, pulled up).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ButtonId {
    /// Toggles the temperature readout.
    Temperature,
    /// Toggles the current readout.
    Current,
}

impl ButtonId {
    pub const ALL: [Self; BUTTON_COUNT] = [Self::Temperature, Self::Current];

    /// Deterministic index for per-button tables.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Current => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical press produced by the debounce guard.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ButtonEvent<I> {
    pub button: ButtonId,
    pub at: I,
}

impl<I> ButtonEvent<I> {
    pub const fn new(button: ButtonId, at: I) -> Self {
        Self { button, at }
    }
}

/// Result of feeding one raw edge through [`DebounceGuard::forward`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgeOutcome {
    /// The press was queued for the control loop.
    Accepted,
    /// The edge fell inside the debounce window and was ignored.
    Debounced,
    /// The press passed debounce but the queue had no room.
    Dropped,
}

/// Per-button debounce filter.
#[derive(Clone, Debug)]
pub struct DebounceGuard<I> {
    window: Duration,
    last_accepted: [Option<I>; BUTTON_COUNT],
}

impl<I: Timestamp> DebounceGuard<I> {
    /// Creates a guard using [`DEBOUNCE_WINDOW`].
    pub const fn new() -> Self {
        Self::with_window(DEBOUNCE_WINDOW)
    }

    /// Creates a guard using `config.debounce_window`.
    pub const fn with_config(config: &GuardConfig) -> Self {
        Self::with_window(config.debounce_window)
    }

    /// Creates a guard with a custom window.
    pub const fn with_window(window: Duration) -> Self {
        Self {
            window,
            last_accepted: [None; BUTTON_COUNT],
        }
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Timestamp of the last accepted edge for `button`.
    pub fn last_accepted(&self, button: ButtonId) -> Option<I> {
        self.last_accepted[button.as_index()]
    }

    /// Filters a raw edge. Returns the logical press when the edge is accepted.
    ///
    /// Runs in interrupt context on the firmware, so it does constant work
    /// and never blocks.
    pub fn on_edge(&mut self, button: ButtonId, at: I) -> Option<ButtonEvent<I>> {
        let slot = &mut self.last_accepted[button.as_index()];
        if let Some(previous) = *slot
            && at < previous + self.window
        {
            return None;
        }

        *slot = Some(at);
        Some(ButtonEvent::new(button, at))
    }

    /// Filters a raw edge and pushes the accepted press into `queue`.
    pub fn forward<Q>(&mut self, button: ButtonId, at: I, queue: &mut Q) -> EdgeOutcome
    where
        Q: ButtonQueueProducer<Instant = I>,
    {
        match self.on_edge(button, at) {
            None => EdgeOutcome::Debounced,
            Some(event) => match queue.try_enqueue(event) {
                Ok(()) => EdgeOutcome::Accepted,
                Err(_) => EdgeOutcome::Dropped,
            },
        }
    }
}

impl<I: Timestamp> Default for DebounceGuard<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Error surfaced when a press cannot be queued.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonEnqueueError<E = ()> {
    /// Queue has reached its capacity.
    QueueFull,
    /// Transport-specific failure.
    Other(E),
}

/// Producer side of the press queue (interrupt context).
pub trait ButtonQueueProducer {
    type Instant: Copy;
    type Error;

    /// Attempts to enqueue a press without blocking.
    fn try_enqueue(
        &mut self,
        event: ButtonEvent<Self::Instant>,
    ) -> Result<(), ButtonEnqueueError<Self::Error>>;
}

/// Consumer side of the press queue (control loop).
pub trait ButtonQueueConsumer {
    type Instant: Copy;

    /// Pops the oldest pending press, if any.
    fn try_dequeue(&mut self) -> Option<ButtonEvent<Self::Instant>>;
}

/// In-memory press queue used by host harnesses.
#[derive(Clone, Debug)]
pub struct ButtonQueue<I, const N: usize> {
    events: Deque<ButtonEvent<I>, N>,
}

impl<I, const N: usize> ButtonQueue<I, N> {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<I, const N: usize> Default for ButtonQueue<I, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Copy, const N: usize> ButtonQueueProducer for ButtonQueue<I, N> {
    type Instant = I;
    type Error = ();

    fn try_enqueue(&mut self, event: ButtonEvent<I>) -> Result<(), ButtonEnqueueError> {
        self.events
            .push_back(event)
            .map_err(|_| ButtonEnqueueError::QueueFull)
    }
}

impl<I: Copy, const N: usize> ButtonQueueConsumer for ButtonQueue<I, N> {
    type Instant = I;

    fn try_dequeue(&mut self) -> Option<ButtonEvent<I>> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::VirtualInstant;

    fn at(millis: u64) -> VirtualInstant {
        VirtualInstant::from_millis(millis)
    }

    #[test]
    fn first_edge_is_always_accepted() {
        let mut guard = DebounceGuard::new();
        let event = guard.on_edge(ButtonId::Temperature, at(0));
        assert_eq!(event, Some(ButtonEvent::new(ButtonId::Temperature, at(0))));
    }

    #[test]
    fn edges_inside_window_are_dropped() {
        let mut guard = DebounceGuard::new();
        assert!(guard.on_edge(ButtonId::Current, at(1_000)).is_some());
        assert!(guard.on_edge(ButtonId::Current, at(1_050)).is_none());
        assert!(guard.on_edge(ButtonId::Current, at(1_199)).is_none());
        assert_eq!(guard.last_accepted(ButtonId::Current), Some(at(1_000)));
    }

    #[test]
    fn window_boundary_accepts() {
        let mut guard = DebounceGuard::new();
        assert!(guard.on_edge(ButtonId::Current, at(1_000)).is_some());
        assert!(guard.on_edge(ButtonId::Current, at(1_200)).is_some());
    }

    #[test]
    fn rejected_edges_do_not_extend_the_window() {
        let mut guard = DebounceGuard::new();
        guard.on_edge(ButtonId::Temperature, at(0));
        guard.on_edge(ButtonId::Temperature, at(150));
        assert!(guard.on_edge(ButtonId::Temperature, at(200)).is_some());
    }

    #[test]
    fn buttons_debounce_independently() {
        let mut guard = DebounceGuard::new();
        assert!(guard.on_edge(ButtonId::Temperature, at(0)).is_some());
        assert!(guard.on_edge(ButtonId::Current, at(10)).is_some());
    }

    #[test]
    fn window_follows_config() {
        let config = GuardConfig {
            debounce_window: Duration::from_millis(50),
            ..GuardConfig::new()
        };
        let mut short = DebounceGuard::with_config(&config);
        let mut standard = DebounceGuard::with_config(&GuardConfig::new());
        assert_eq!(short.window(), Duration::from_millis(50));

        for guard in [&mut short, &mut standard] {
            assert!(guard.on_edge(ButtonId::Temperature, at(0)).is_some());
        }
        assert!(short.on_edge(ButtonId::Temperature, at(60)).is_some());
        assert!(standard.on_edge(ButtonId::Temperature, at(60)).is_none());
    }

    #[test]
    fn forward_reports_full_queue() {
        let mut guard = DebounceGuard::with_window(Duration::from_millis(10));
        let mut queue: ButtonQueue<VirtualInstant, 1> = ButtonQueue::new();

        assert_eq!(
            guard.forward(ButtonId::Temperature, at(0), &mut queue),
            EdgeOutcome::Accepted
        );
        assert_eq!(
            guard.forward(ButtonId::Temperature, at(5), &mut queue),
            EdgeOutcome::Debounced
        );
        assert_eq!(
            guard.forward(ButtonId::Temperature, at(20), &mut queue),
            EdgeOutcome::Dropped
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.try_dequeue().map(|event| event.at),
            Some(at(0)),
            "oldest press must survive overflow"
        );
    }
}
