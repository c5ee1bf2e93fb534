//! Clock abstractions shared by firmware and host targets.
//!
//! Policy code is generic over a monotonic timestamp so the firmware can use
//! Embassy's instant while tests and the emulator run on [`VirtualClock`].

use core::{fmt, ops::Add, time::Duration};

/// Monotonic timestamp accepted by the guard state machines.
pub trait Timestamp: Copy + Ord + Add<Duration, Output = Self> {}

impl<T> Timestamp for T where T: Copy + Ord + Add<Duration, Output = T> {}

/// Source of time plus the ability to rest between control-loop steps.
pub trait Scheduler {
    /// Timestamp type produced by this scheduler.
    type Instant: Timestamp;

    /// Returns the current time.
    fn now(&self) -> Self::Instant;

    /// Blocks the caller for `duration`.
    fn wait(&mut self, duration: Duration);
}

/// Microsecond timestamp used by the virtual clock.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualInstant(u64);

impl VirtualInstant {
    /// Instant at boot.
    pub const ZERO: Self = Self(0);

    /// Builds an instant from microseconds since boot.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Builds an instant from milliseconds since boot.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Returns microseconds since boot.
    #[must_use]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Returns milliseconds since boot.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Time elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for VirtualInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(micros))
    }
}

impl fmt::Display for VirtualInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Scheduler whose `wait` advances time instantly.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    now: VirtualInstant,
}

impl VirtualClock {
    /// Creates a clock starting at boot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: VirtualInstant::ZERO,
        }
    }

    /// Creates a clock starting at `start`.
    #[must_use]
    pub const fn starting_at(start: VirtualInstant) -> Self {
        Self { now: start }
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, duration: Duration) {
        self.now = self.now + duration;
    }

    /// Moves the clock to `instant`; earlier instants are ignored.
    pub fn advance_to(&mut self, instant: VirtualInstant) {
        if instant > self.now {
            self.now = instant;
        }
    }
}

impl Scheduler for VirtualClock {
    type Instant = VirtualInstant;

    fn now(&self) -> Self::Instant {
        self.now
    }

    fn wait(&mut self, duration: Duration) {
        self.advance(duration);
    }
}
