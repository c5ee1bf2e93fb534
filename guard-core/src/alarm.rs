//! Alarm state machine.
//!
//! The machine has two phases. In `Normal` it watches the readings for a
//! sustained critical excursion and lets the buttons toggle the readout
//! shown on the display. In `Alarm` the indicator is forced red, the display
//! shows the alarm banner, and the first button press disarms.
//!
//! The operator's readout selection is stored separately from the armed flag
//! and is left untouched by the alarm, so whatever was selected before the
//! alarm shows again after it is cleared.

use core::{fmt, time::Duration};

use crate::config::{GuardConfig, SUSTAINED_EXCURSION};
use crate::input::{ButtonEvent, ButtonId};
use crate::sensors::{IndicatorColor, Readings, Thresholds, indicator_color};
use crate::time::Timestamp;

/// What the display currently presents.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DisplayMode {
    Idle,
    ShowTemperature,
    ShowCurrent,
    AlarmBanner,
}

impl DisplayMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ShowTemperature => "temperature",
            Self::ShowCurrent => "current",
            Self::AlarmBanner => "alarm-banner",
        }
    }

    /// Readout toggled by `button`.
    #[must_use]
    pub const fn readout_for(button: ButtonId) -> Self {
        match button {
            ButtonId::Temperature => Self::ShowTemperature,
            ButtonId::Current => Self::ShowCurrent,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Armed flag plus the start of the ongoing critical excursion.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AlarmState<I> {
    pub armed: bool,
    pub out_of_range_since: Option<I>,
}

impl<I> AlarmState<I> {
    pub const fn new() -> Self {
        Self {
            armed: false,
            out_of_range_since: None,
        }
    }
}

impl<I> Default for AlarmState<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Change to the excursion timer observed on a sampling tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExcursionChange {
    /// Nothing changed.
    None,
    /// First critical reading; the timer started.
    Started,
    /// Readings returned to the safe band before the alarm armed.
    Cleared,
}

/// Result of feeding one sampling tick into the machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SampleOutcome {
    /// Color the indicator must show after this tick.
    pub color: IndicatorColor,
    /// Excursion timer transition.
    pub excursion: ExcursionChange,
    /// `true` on the tick that armed the alarm.
    pub armed: bool,
}

/// Result of a button press.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonOutcome {
    /// The press cleared an active alarm.
    Disarmed,
    /// The press toggled the readout selection.
    ModeChanged { from: DisplayMode, to: DisplayMode },
}

/// Armed/disarmed state machine with readout selection.
#[derive(Clone, Debug)]
pub struct AlarmMachine<I> {
    state: AlarmState<I>,
    selected: DisplayMode,
    thresholds: Thresholds,
    sustained: Duration,
}

impl<I: Timestamp> AlarmMachine<I> {
    /// Creates a disarmed machine with the default thresholds and window.
    pub const fn new() -> Self {
        Self {
            state: AlarmState::new(),
            selected: DisplayMode::Idle,
            thresholds: Thresholds::new(),
            sustained: SUSTAINED_EXCURSION,
        }
    }

    /// Creates a disarmed machine using the provided configuration.
    pub const fn with_config(config: &GuardConfig) -> Self {
        Self {
            state: AlarmState::new(),
            selected: DisplayMode::Idle,
            thresholds: config.thresholds,
            sustained: config.sustained_excursion,
        }
    }

    pub const fn state(&self) -> &AlarmState<I> {
        &self.state
    }

    pub const fn is_armed(&self) -> bool {
        self.state.armed
    }

    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// When the current excursion began, if one is in progress.
    pub const fn excursion_started_at(&self) -> Option<I> {
        self.state.out_of_range_since
    }

    /// Readout chosen by the operator, ignoring any alarm override.
    pub const fn selected_mode(&self) -> DisplayMode {
        self.selected
    }

    /// Mode the display must present right now.
    pub const fn display_mode(&self) -> DisplayMode {
        if self.state.armed {
            DisplayMode::AlarmBanner
        } else {
            self.selected
        }
    }

    /// Color for `readings`, forced red while armed.
    pub const fn indicator_color(&self, readings: Readings) -> IndicatorColor {
        if self.state.armed {
            IndicatorColor::Red
        } else {
            indicator_color(readings, &self.thresholds)
        }
    }

    /// Feeds one sampling tick.
    ///
    /// The excursion timer starts on the first critical reading and is never
    /// moved while the excursion persists. The alarm arms once the excursion
    /// has lasted the sustained window. While armed the timer is left alone.
    pub fn on_sample(&mut self, readings: Readings, now: I) -> SampleOutcome {
        if self.state.armed {
            return SampleOutcome {
                color: IndicatorColor::Red,
                excursion: ExcursionChange::None,
                armed: false,
            };
        }

        let mut excursion = ExcursionChange::None;
        let mut armed = false;

        if readings.any_critical(&self.thresholds) {
            let since = match self.state.out_of_range_since {
                Some(since) => since,
                None => {
                    excursion = ExcursionChange::Started;
                    self.state.out_of_range_since = Some(now);
                    now
                }
            };

            if now >= since + self.sustained {
                self.state.armed = true;
                armed = true;
            }
        } else if self.state.out_of_range_since.take().is_some() {
            excursion = ExcursionChange::Cleared;
        }

        SampleOutcome {
            color: self.indicator_color(readings),
            excursion,
            armed,
        }
    }

    /// Applies a debounced press.
    pub fn on_button(&mut self, event: ButtonEvent<I>) -> ButtonOutcome {
        if self.disarm() {
            return ButtonOutcome::Disarmed;
        }

        let from = self.selected;
        let target = DisplayMode::readout_for(event.button);
        self.selected = if from == target {
            DisplayMode::Idle
        } else {
            target
        };

        ButtonOutcome::ModeChanged {
            from,
            to: self.selected,
        }
    }

    /// Arms the alarm immediately. Returns `false` when already armed.
    pub fn trigger(&mut self) -> bool {
        if self.state.armed {
            return false;
        }
        self.state.armed = true;
        true
    }

    /// Clears the alarm. The excursion timer is kept, so a reading that is
    /// still critical re-arms on the next tick.
    /// Returns `false` when the alarm was not armed.
    pub fn disarm(&mut self) -> bool {
        if !self.state.armed {
            return false;
        }
        self.state.armed = false;
        true
    }
}

impl<I: Timestamp> Default for AlarmMachine<I> {
    fn default() -> Self {
        Self::new()
    }
}
