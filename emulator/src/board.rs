//! Simulated board for the host emulator.

use std::convert::Infallible;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use guard_core::peripherals::{PeripheralAdapter, Tone};
use guard_core::presenter::{DISPLAY_HEIGHT, DISPLAY_WIDTH, Frame};
use guard_core::sensors::{Readings, RgbLevels, SensorChannel};

const WIDTH: usize = DISPLAY_WIDTH as usize;
const HEIGHT: usize = DISPLAY_HEIGHT as usize;

/// Reading both channels return until a script sets them.
pub const NOMINAL_RAW: u16 = 2_000;

/// In-memory copy of the 128x64 monochrome panel.
#[derive(Clone, Debug)]
pub struct HostFramebuffer {
    pixels: Box<[[bool; WIDTH]; HEIGHT]>,
}

impl HostFramebuffer {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([[false; WIDTH]; HEIGHT]),
        }
    }

    #[cfg(test)]
    pub fn lit_count(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|lit| **lit).count())
            .sum()
    }

    /// Renders two pixel rows per text line using half blocks.
    pub fn to_text(&self) -> Vec<String> {
        self.pixels
            .chunks(2)
            .map(|pair| {
                let (top, bottom) = (&pair[0], pair.get(1));
                top.iter()
                    .enumerate()
                    .map(|(x, &upper)| {
                        let lower = bottom.is_some_and(|row| row[x]);
                        match (upper, lower) {
                            (false, false) => ' ',
                            (true, false) => '\u{2580}',
                            (false, true) => '\u{2584}',
                            (true, true) => '\u{2588}',
                        }
                    })
                    .collect::<String>()
                    .trim_end()
                    .to_owned()
            })
            .collect()
    }
}

impl Default for HostFramebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for HostFramebuffer {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl DrawTarget for HostFramebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), Self::Error>
    where
        P: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < HEIGHT {
                self.pixels[y][x] = color.is_on();
            }
        }
        Ok(())
    }
}

/// Board whose sensors return script-controlled values and whose outputs
/// are recorded for inspection.
#[derive(Clone, Debug)]
pub struct SimulatedBoard {
    readings: Readings,
    indicator: RgbLevels,
    tone: Tone,
    frame: Option<Frame>,
    framebuffer: HostFramebuffer,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self {
            readings: Readings::new(NOMINAL_RAW, NOMINAL_RAW),
            indicator: RgbLevels::default(),
            tone: Tone::Silence,
            frame: None,
            framebuffer: HostFramebuffer::new(),
        }
    }

    pub fn set_reading(&mut self, channel: SensorChannel, raw: u16) {
        match channel {
            SensorChannel::Temperature => self.readings.temperature = raw,
            SensorChannel::Current => self.readings.current = raw,
        }
    }

    pub const fn indicator(&self) -> RgbLevels {
        self.indicator
    }

    pub const fn tone(&self) -> Tone {
        self.tone
    }

    #[cfg(test)]
    pub const fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub const fn framebuffer(&self) -> &HostFramebuffer {
        &self.framebuffer
    }
}

impl Default for SimulatedBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PeripheralAdapter for SimulatedBoard {
    fn sample(&mut self, channel: SensorChannel) -> u16 {
        self.readings.get(channel)
    }

    fn set_indicator(&mut self, levels: RgbLevels) {
        self.indicator = levels;
    }

    fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    fn write_display(&mut self, frame: &Frame) {
        let Ok(()) = frame.draw(&mut self.framebuffer);
        self.frame = Some(frame.clone());
    }
}
