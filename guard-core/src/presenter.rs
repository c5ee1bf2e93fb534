//! Display presenter.
//!
//! [`render`] turns the current display mode and readings into a [`Frame`], a
//! short list of positioned text lines. Frames are plain data so they can be
//! compared in tests; drawing happens through the [`Drawable`] impl, which
//! works on any monochrome `DrawTarget` (the SSD1306 buffer on the board, a
//! host framebuffer in the emulator).

use core::fmt::Write as _;

use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use heapless::{String, Vec};

use crate::alarm::DisplayMode;

pub const DISPLAY_WIDTH: u32 = 128;
pub const DISPLAY_HEIGHT: u32 = 64;

/// Most lines any frame carries (the alarm banner).
pub const MAX_FRAME_LINES: usize = 5;
/// Longest line in characters; the 6px font fits 21 across, labels need 15.
pub const MAX_LINE_CHARS: usize = 16;

const TEMPERATURE_LABEL: &str = "Temperature ADC";
const TEMPERATURE_LABEL_AT: Point = Point::new(3, 10);
const CURRENT_LABEL: &str = "Current ADC";
const CURRENT_LABEL_AT: Point = Point::new(18, 10);
const VALUE_AT: Point = Point::new(50, 20);

const BANNER_X: i32 = 10;
const BANNER: [&str; MAX_FRAME_LINES] = [
    "ALARM",
    "TRIGGERED",
    "Press any",
    "button to",
    "clear it",
];

/// One line of text anchored at its top-left pixel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextLine {
    pub origin: Point,
    pub text: String<MAX_LINE_CHARS>,
}

impl TextLine {
    /// Builds a line, truncating `text` at [`MAX_LINE_CHARS`].
    #[must_use]
    pub fn new(origin: Point, text: &str) -> Self {
        let mut line = String::new();
        for ch in text.chars() {
            if line.push(ch).is_err() {
                break;
            }
        }
        Self { origin, text: line }
    }

    /// Builds a line holding the decimal rendering of `value`.
    #[must_use]
    pub fn number(origin: Point, value: u16) -> Self {
        let mut text = String::new();
        // Five digits always fit.
        let _ = write!(text, "{value}");
        Self { origin, text }
    }
}

/// Complete display contents.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    lines: Vec<TextLine, MAX_FRAME_LINES>,
}

impl Frame {
    /// Frame with nothing lit.
    #[must_use]
    pub const fn blank() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn is_blank(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns `true` when any line reads exactly `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|line| line.text == text)
    }

    fn push(&mut self, line: TextLine) {
        // Layouts never exceed MAX_FRAME_LINES; extra lines are dropped.
        let _ = self.lines.push(line);
    }
}

/// Builds the frame for `mode`.
#[must_use]
pub fn render(mode: DisplayMode, temperature: u16, current: u16) -> Frame {
    let mut frame = Frame::blank();
    match mode {
        DisplayMode::Idle => {}
        DisplayMode::ShowTemperature => {
            frame.push(TextLine::new(TEMPERATURE_LABEL_AT, TEMPERATURE_LABEL));
            frame.push(TextLine::number(VALUE_AT, temperature));
        }
        DisplayMode::ShowCurrent => {
            frame.push(TextLine::new(CURRENT_LABEL_AT, CURRENT_LABEL));
            frame.push(TextLine::number(VALUE_AT, current));
        }
        DisplayMode::AlarmBanner => {
            for (row, text) in (1_i32..).zip(BANNER) {
                frame.push(TextLine::new(Point::new(BANNER_X, row * 10), text));
            }
        }
    }
    frame
}

impl Drawable for Frame {
    type Color = BinaryColor;
    type Output = ();

    /// Clears the target and draws every line in the 6x10 font.
    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        target.clear(BinaryColor::Off)?;

        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        for line in &self.lines {
            Text::with_baseline(line.text.as_str(), line.origin, style, Baseline::Top)
                .draw(target)?;
        }
        Ok(())
    }
}
