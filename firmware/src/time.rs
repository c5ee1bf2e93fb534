//! Embassy clock glue for the guard core.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::ops::Add;

use embassy_time::{Duration as EmbassyDuration, Instant};

/// Embassy instant usable as a guard-core timestamp.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FirmwareInstant(Instant);

impl FirmwareInstant {
    #[cfg(target_os = "none")]
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(Instant::from_micros(micros))
    }

    pub const fn into_embassy(self) -> Instant {
        self.0
    }

    pub fn as_micros(self) -> u64 {
        self.0.as_micros()
    }
}

impl From<Instant> for FirmwareInstant {
    fn from(value: Instant) -> Self {
        Self(value)
    }
}

impl Add<core::time::Duration> for FirmwareInstant {
    type Output = Self;

    fn add(self, rhs: core::time::Duration) -> Self::Output {
        let sum = self
            .0
            .checked_add(core_duration_to_embassy(rhs))
            .unwrap_or(Instant::MAX);
        Self(sum)
    }
}

/// Converts a core duration, saturating at the largest embassy duration.
pub fn core_duration_to_embassy(duration: core::time::Duration) -> EmbassyDuration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    EmbassyDuration::from_micros(micros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_core_durations() {
        let start = FirmwareInstant::from_micros(1_000);
        let later = start + core::time::Duration::from_millis(200);
        assert_eq!(later.as_micros(), 201_000);
    }

    #[test]
    fn addition_saturates_at_max() {
        let late = FirmwareInstant::from(Instant::MAX);
        assert_eq!(
            late + core::time::Duration::from_secs(1),
            FirmwareInstant::from(Instant::MAX)
        );
    }
}
