//! Hardware seam between the control loop and the board.
//!
//! The controller only talks to the board through [`PeripheralAdapter`]. The
//! firmware implements it on top of the ADC, timers and I2C display; host
//! harnesses implement it with recorders.

use core::fmt;

use crate::presenter::Frame;
use crate::sensors::{RgbLevels, SensorChannel};

/// Buzzer output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Tone {
    #[default]
    Silence,
    /// Square wave at the given frequency in hertz.
    Frequency(u32),
}

impl Tone {
    #[must_use]
    pub const fn is_silent(self) -> bool {
        matches!(self, Self::Silence)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silence => f.write_str("silence"),
            Self::Frequency(hz) => write!(f, "{hz}Hz"),
        }
    }
}

/// Operations the control loop performs on the board.
///
/// Implementations must not block for longer than a single peripheral
/// transaction; the control loop owns all timing.
pub trait PeripheralAdapter {
    /// Takes one raw 12-bit sample from `channel`.
    fn sample(&mut self, channel: SensorChannel) -> u16;

    /// Drives the RGB indicator.
    fn set_indicator(&mut self, levels: RgbLevels);

    /// Starts or stops the buzzer.
    fn set_tone(&mut self, tone: Tone);

    /// Replaces the display contents with `frame`.
    fn write_display(&mut self, frame: &Frame);
}

/// Adapter that reads mid-scale and discards every output.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopPeripherals;

impl PeripheralAdapter for NoopPeripherals {
    fn sample(&mut self, _channel: SensorChannel) -> u16 {
        2_048
    }

    fn set_indicator(&mut self, _levels: RgbLevels) {}

    fn set_tone(&mut self, _tone: Tone) {}

    fn write_display(&mut self, _frame: &Frame) {}
}

/// Board bring-up failures. Any of these halts the firmware before the
/// control loop starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InitError {
    Display,
    Indicator,
    Buzzer,
    Sensors,
}

impl InitError {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Display => "display initialisation failed",
            Self::Indicator => "indicator PWM initialisation failed",
            Self::Buzzer => "buzzer PWM initialisation failed",
            Self::Sensors => "ADC initialisation failed",
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for InitError {}
