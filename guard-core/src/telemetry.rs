//! Structured guard events and the sink they are reported through.
//!
//! The core never prints. The controller emits [`GuardEvent`]s into an
//! [`EventLog`]; the firmware forwards them to `defmt`, the emulator prints
//! them, and tests collect them for assertions.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered};

use crate::alarm::DisplayMode;
use crate::input::ButtonId;
use crate::peripherals::Tone;
use crate::sensors::{IndicatorColor, Readings};

/// Default number of events kept by [`EventHistory`].
pub const EVENT_HISTORY_CAPACITY: usize = 64;

/// Monotonic identifier assigned to recorded events.
pub type EventId = u32;

/// Something worth reporting happened.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GuardEvent {
    /// Periodic sampling tick.
    Sampled {
        readings: Readings,
        color: IndicatorColor,
    },
    /// A reading left the critical band; the excursion timer started.
    ExcursionStarted(Readings),
    /// Readings came back before the alarm armed.
    ExcursionCleared,
    /// The alarm armed.
    AlarmArmed(Readings),
    /// A press cleared the alarm.
    AlarmCleared { by: ButtonId },
    /// Readout selection changed.
    ModeChanged { from: DisplayMode, to: DisplayMode },
    /// Buzzer output changed.
    ToneChanged(Tone),
    /// A debounced press was lost because the queue was full.
    ButtonDropped(ButtonId),
}

/// Severity used by sinks that support levels.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
}

impl GuardEvent {
    #[must_use]
    pub const fn level(&self) -> EventLevel {
        match self {
            Self::Sampled { .. } | Self::ToneChanged(_) => EventLevel::Debug,
            Self::ButtonDropped(_) => EventLevel::Warn,
            Self::ExcursionStarted(_)
            | Self::ExcursionCleared
            | Self::AlarmArmed(_)
            | Self::AlarmCleared { .. }
            | Self::ModeChanged { .. } => EventLevel::Info,
        }
    }
}

impl fmt::Display for GuardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sampled { readings, color } => write!(
                f,
                "sample temperature={} current={} color={color}",
                readings.temperature, readings.current
            ),
            Self::ExcursionStarted(readings) => write!(
                f,
                "excursion-started temperature={} current={}",
                readings.temperature, readings.current
            ),
            Self::ExcursionCleared => f.write_str("excursion-cleared"),
            Self::AlarmArmed(readings) => write!(
                f,
                "alarm-armed temperature={} current={}",
                readings.temperature, readings.current
            ),
            Self::AlarmCleared { by } => write!(f, "alarm-cleared by={by}"),
            Self::ModeChanged { from, to } => write!(f, "mode {from} -> {to}"),
            Self::ToneChanged(tone) => write!(f, "tone {tone}"),
            Self::ButtonDropped(button) => write!(f, "button-dropped {button}"),
        }
    }
}

/// Sink for guard events.
pub trait EventLog<I> {
    fn record(&mut self, at: I, event: GuardEvent);
}

/// Sink that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopEventLog;

impl<I> EventLog<I> for NoopEventLog {
    fn record(&mut self, _at: I, _event: GuardEvent) {}
}

/// Event stored in an [`EventHistory`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord<I> {
    pub id: EventId,
    pub at: I,
    pub event: GuardEvent,
}

/// Fixed-size ring of the most recent events.
pub struct EventHistory<I, const CAPACITY: usize = EVENT_HISTORY_CAPACITY> {
    ring: HistoryBuf<EventRecord<I>, CAPACITY>,
    next_id: EventId,
}

impl<I: Copy, const CAPACITY: usize> EventHistory<I, CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_id: 0,
        }
    }

    /// Stores `event` and returns its id, evicting the oldest when full.
    pub fn push(&mut self, at: I, event: GuardEvent) -> EventId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.ring.write(EventRecord { id, at, event });
        id
    }

    /// Recorded events in chronological order.
    pub fn iter(&self) -> OldestOrdered<'_, EventRecord<I>> {
        self.ring.oldest_ordered()
    }

    pub fn latest(&self) -> Option<&EventRecord<I>> {
        self.ring.recent()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<I: Copy, const CAPACITY: usize> Default for EventHistory<I, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Copy, const CAPACITY: usize> EventLog<I> for EventHistory<I, CAPACITY> {
    fn record(&mut self, at: I, event: GuardEvent) {
        self.push(at, event);
    }
}
