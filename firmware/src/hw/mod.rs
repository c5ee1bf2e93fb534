//! Board bring-up and the hardware implementation of the peripheral seam.
//!
//! Pin map (STM32G0B1):
//! - PA0 / PA1: temperature and current sensors (ADC1 IN0 / IN1)
//! - PA4 / PA5: temperature and current buttons (active low, EXTI4 / EXTI5)
//! - PA8 / PA9 / PA10: RGB indicator (TIM1 CH1 / CH2 / CH3)
//! - PA6: buzzer (TIM3 CH1)
//! - PB6 / PB7: SSD1306 display (I2C1 SCL / SDA)

use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel, AnyAdcChannel, SampleTime};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{OutputType, Pull};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::{ADC1, TIM1, TIM3};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embedded_graphics::Drawable;
use guard_core::config::TONE_DUTY_PERCENT;
use guard_core::peripherals::{InitError, PeripheralAdapter, Tone};
use guard_core::presenter::Frame;
use guard_core::sensors::{ADC_FULL_SCALE, RgbLevels, SensorChannel};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

/// SSD1306 bus clock.
pub const DISPLAY_I2C_FREQUENCY: Hertz = Hertz(400_000);
/// Carrier for the indicator PWM; fast enough to avoid visible flicker.
pub const INDICATOR_PWM_FREQUENCY: Hertz = Hertz(1_000);
/// Buzzer timer frequency before the first tone is requested.
pub const BUZZER_IDLE_FREQUENCY: Hertz = Hertz(1_000);

type Display = Ssd1306<
    I2CInterface<I2c<'static, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// Outputs and sensors driven by the control task.
pub struct GuardHardware {
    adc: Adc<'static, ADC1>,
    temperature: AnyAdcChannel<ADC1>,
    current: AnyAdcChannel<ADC1>,
    indicator: SimplePwm<'static, TIM1>,
    buzzer: SimplePwm<'static, TIM3>,
    display: Display,
}

/// Everything produced by [`init`].
pub struct Board {
    pub hardware: GuardHardware,
    pub temperature_button: ExtiInput<'static>,
    pub current_button: ExtiInput<'static>,
}

/// Brings up every peripheral the guard uses.
///
/// # Errors
///
/// Returns the first peripheral that failed its bring-up check.
pub fn init(p: hal::Peripherals) -> Result<Board, InitError> {
    let mut adc = Adc::new(p.ADC1);
    adc.set_sample_time(SampleTime::CYCLES79_5);
    let mut vrefint = adc.enable_vrefint();
    if adc.blocking_read(&mut vrefint) == 0 {
        return Err(InitError::Sensors);
    }
    let temperature = p.PA0.degrade_adc();
    let current = p.PA1.degrade_adc();

    let mut indicator = SimplePwm::new(
        p.TIM1,
        Some(PwmPin::new(p.PA8, OutputType::PushPull)),
        Some(PwmPin::new(p.PA9, OutputType::PushPull)),
        Some(PwmPin::new(p.PA10, OutputType::PushPull)),
        None,
        INDICATOR_PWM_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    if indicator.max_duty_cycle() == 0 {
        return Err(InitError::Indicator);
    }
    indicator.ch1().set_duty_cycle_fully_off();
    indicator.ch2().set_duty_cycle_fully_off();
    indicator.ch3().set_duty_cycle_fully_off();
    indicator.ch1().enable();
    indicator.ch2().enable();
    indicator.ch3().enable();

    let mut buzzer = SimplePwm::new(
        p.TIM3,
        Some(PwmPin::new(p.PA6, OutputType::PushPull)),
        None,
        None,
        None,
        BUZZER_IDLE_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    if buzzer.max_duty_cycle() == 0 {
        return Err(InitError::Buzzer);
    }
    buzzer.ch1().set_duty_cycle_fully_off();

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = DISPLAY_I2C_FREQUENCY;
    let i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, i2c_config);
    let mut display = Ssd1306::new(
        I2CDisplayInterface::new(i2c),
        DisplaySize128x64,
        DisplayRotation::Rotate0,
    )
    .into_buffered_graphics_mode();
    display.init().map_err(|_| InitError::Display)?;
    display.clear_buffer();
    display.flush().map_err(|_| InitError::Display)?;

    let temperature_button = ExtiInput::new(p.PA4, p.EXTI4, Pull::Up);
    let current_button = ExtiInput::new(p.PA5, p.EXTI5, Pull::Up);

    Ok(Board {
        hardware: GuardHardware {
            adc,
            temperature,
            current,
            indicator,
            buzzer,
            display,
        },
        temperature_button,
        current_button,
    })
}

impl PeripheralAdapter for GuardHardware {
    fn sample(&mut self, channel: SensorChannel) -> u16 {
        match channel {
            SensorChannel::Temperature => self.adc.blocking_read(&mut self.temperature),
            SensorChannel::Current => self.adc.blocking_read(&mut self.current),
        }
    }

    fn set_indicator(&mut self, levels: RgbLevels) {
        self.indicator
            .ch1()
            .set_duty_cycle_fraction(levels.red, ADC_FULL_SCALE);
        self.indicator
            .ch2()
            .set_duty_cycle_fraction(levels.green, ADC_FULL_SCALE);
        self.indicator
            .ch3()
            .set_duty_cycle_fraction(levels.blue, ADC_FULL_SCALE);
    }

    fn set_tone(&mut self, tone: Tone) {
        match tone {
            Tone::Silence => {
                let mut channel = self.buzzer.ch1();
                channel.set_duty_cycle_fully_off();
                channel.disable();
            }
            Tone::Frequency(hz) => {
                self.buzzer.set_frequency(Hertz(hz));
                let mut channel = self.buzzer.ch1();
                channel.set_duty_cycle_percent(TONE_DUTY_PERCENT);
                channel.enable();
            }
        }
    }

    fn write_display(&mut self, frame: &Frame) {
        if frame.draw(&mut self.display).is_err() || self.display.flush().is_err() {
            defmt::warn!("display write failed");
        }
    }
}
