//! Compile-time tuning for the guard.
//!
//! The guard has no runtime configuration. These constants capture the fixed
//! cadence and windows, and [`GuardConfig`] bundles them so tests can shrink
//! or stretch individual values.

use core::time::Duration;

use crate::sensors::Thresholds;

/// Minimum spacing between accepted edges on the same button.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// How long a critical excursion must persist before the alarm arms.
pub const SUSTAINED_EXCURSION: Duration = Duration::from_secs(5);

/// Rest between sampling ticks while the alarm is idle.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// How long each alarm tone sounds before switching.
pub const TONE_INTERVAL: Duration = Duration::from_millis(300);

/// Alternating alarm frequencies in hertz.
pub const ALARM_TONES: [u32; 2] = [1_000, 1_500];

/// Buzzer duty cycle while a tone sounds.
pub const TONE_DUTY_PERCENT: u8 = 50;

/// Tunable parameters consumed by the controller and the debounce guard.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GuardConfig {
    pub thresholds: Thresholds,
    pub debounce_window: Duration,
    pub sustained_excursion: Duration,
    pub sample_interval: Duration,
    pub tone_interval: Duration,
    pub alarm_tones: [u32; 2],
}

impl GuardConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            thresholds: Thresholds::new(),
            debounce_window: DEBOUNCE_WINDOW,
            sustained_excursion: SUSTAINED_EXCURSION,
            sample_interval: SAMPLE_INTERVAL,
            tone_interval: TONE_INTERVAL,
            alarm_tones: ALARM_TONES,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}
