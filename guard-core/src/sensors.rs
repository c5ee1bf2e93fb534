//! Sensor channels, threshold bands, and the indicator color policy.

use core::fmt;

/// Largest raw value produced by the 12-bit ADC.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Below this raw value a reading is critical.
pub const CRITICAL_LOW: u16 = 20;
/// Above this raw value a reading is critical.
pub const CRITICAL_HIGH: u16 = 4000;
/// Lower bound of the ideal band (inclusive).
pub const IDEAL_LOW: u16 = 1000;
/// Upper bound of the ideal band (inclusive).
pub const IDEAL_HIGH: u16 = 3000;

/// Analog inputs watched by the guard.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SensorChannel {
    Temperature,
    Current,
}

impl SensorChannel {
    /// Every channel, in sampling order.
    pub const ALL: [Self; 2] = [Self::Temperature, Self::Current];

    /// Short label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw sample taken on a channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SensorReading {
    pub channel: SensorChannel,
    pub raw: u16,
}

impl SensorReading {
    /// Builds a reading, clamping `raw` to the ADC range.
    #[must_use]
    pub const fn new(channel: SensorChannel, raw: u16) -> Self {
        let raw = if raw > ADC_FULL_SCALE {
            ADC_FULL_SCALE
        } else {
            raw
        };
        Self { channel, raw }
    }
}

/// Both channels sampled on the same tick.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Readings {
    pub temperature: u16,
    pub current: u16,
}

impl Readings {
    #[must_use]
    pub const fn new(temperature: u16, current: u16) -> Self {
        Self {
            temperature,
            current,
        }
    }

    /// Assembles a snapshot from individual readings; missing channels stay at zero.
    #[must_use]
    pub fn from_samples(samples: &[SensorReading]) -> Self {
        samples
            .iter()
            .fold(Self::default(), |mut readings, sample| {
                match sample.channel {
                    SensorChannel::Temperature => readings.temperature = sample.raw,
                    SensorChannel::Current => readings.current = sample.raw,
                }
                readings
            })
    }

    /// Raw value for `channel`.
    #[must_use]
    pub const fn get(&self, channel: SensorChannel) -> u16 {
        match channel {
            SensorChannel::Temperature => self.temperature,
            SensorChannel::Current => self.current,
        }
    }

    /// Returns `true` when either channel is in the critical band.
    #[must_use]
    pub const fn any_critical(&self, thresholds: &Thresholds) -> bool {
        thresholds.is_critical(self.temperature) || thresholds.is_critical(self.current)
    }

    /// Returns `true` when both channels sit inside the ideal band.
    #[must_use]
    pub const fn all_ideal(&self, thresholds: &Thresholds) -> bool {
        thresholds.is_ideal(self.temperature) && thresholds.is_ideal(self.current)
    }
}

/// Severity bands applied to every raw reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Thresholds {
    pub critical_low: u16,
    pub critical_high: u16,
    pub ideal_low: u16,
    pub ideal_high: u16,
}

impl Thresholds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            critical_low: CRITICAL_LOW,
            critical_high: CRITICAL_HIGH,
            ideal_low: IDEAL_LOW,
            ideal_high: IDEAL_HIGH,
        }
    }

    #[must_use]
    pub const fn is_critical(&self, raw: u16) -> bool {
        raw < self.critical_low || raw > self.critical_high
    }

    #[must_use]
    pub const fn is_ideal(&self, raw: u16) -> bool {
        raw >= self.ideal_low && raw <= self.ideal_high
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new()
    }
}

/// Status color shown on the RGB indicator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IndicatorColor {
    Green,
    Yellow,
    Red,
}

impl IndicatorColor {
    /// Duty levels for the red, green and blue channels.
    #[must_use]
    pub const fn levels(self) -> RgbLevels {
        match self {
            Self::Green => RgbLevels::new(0, ADC_FULL_SCALE, 0),
            Self::Yellow => RgbLevels::new(ADC_FULL_SCALE, ADC_FULL_SCALE, 0),
            Self::Red => RgbLevels::new(ADC_FULL_SCALE, 0, 0),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for IndicatorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 12-bit PWM duty per indicator channel (0 = off, 4095 = fully on).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RgbLevels {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl RgbLevels {
    #[must_use]
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }
}

/// Color policy: red when anything is critical, yellow when anything leaves
/// the ideal band, green otherwise.
#[must_use]
pub const fn indicator_color(readings: Readings, thresholds: &Thresholds) -> IndicatorColor {
    if readings.any_critical(thresholds) {
        IndicatorColor::Red
    } else if readings.all_ideal(thresholds) {
        IndicatorColor::Green
    } else {
        IndicatorColor::Yellow
    }
}
