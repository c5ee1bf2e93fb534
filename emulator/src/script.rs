//! Line-oriented command grammar for the emulator.

use std::fmt;
use std::time::Duration;

use guard_core::input::ButtonId;
use guard_core::sensors::SensorChannel;
use winnow::ascii::{Caseless, dec_uint, space0, space1};
use winnow::combinator::{alt, opt, preceded, terminated};
use winnow::prelude::*;

/// One parsed script line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptCommand {
    /// Sets the raw value the simulated sensor returns from now on.
    SetReading { channel: SensorChannel, raw: u16 },
    /// Delivers a press straight to the control loop.
    Press(ButtonId),
    /// Feeds a raw edge through the debounce guard.
    Edge(ButtonId),
    /// Runs the control loop for the given amount of virtual time.
    Advance(Duration),
    Status,
    Frame,
    /// Lists every command, or the usage of one.
    Help(Option<&'static str>),
    Exit,
}

/// Syntax error with the byte offset where parsing stopped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScriptError {
    pub offset: usize,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected input at column {}", self.offset + 1)
    }
}

impl std::error::Error for ScriptError {}

/// Parses a single line. Leading and trailing whitespace is ignored.
pub fn parse_command(line: &str) -> Result<ScriptCommand, ScriptError> {
    terminated(command, space0)
        .parse(line.trim_start())
        .map_err(|error| ScriptError {
            offset: error.offset(),
        })
}

fn command(input: &mut &str) -> ModalResult<ScriptCommand> {
    alt((reading, press, edge, advance, help, keyword)).parse_next(input)
}

fn reading(input: &mut &str) -> ModalResult<ScriptCommand> {
    (channel, preceded(space1, dec_uint::<_, u16, _>))
        .map(|(channel, raw)| ScriptCommand::SetReading { channel, raw })
        .parse_next(input)
}

fn press(input: &mut &str) -> ModalResult<ScriptCommand> {
    preceded((Caseless("press"), space1), button)
        .map(ScriptCommand::Press)
        .parse_next(input)
}

fn edge(input: &mut &str) -> ModalResult<ScriptCommand> {
    preceded((Caseless("edge"), space1), button)
        .map(ScriptCommand::Edge)
        .parse_next(input)
}

fn advance(input: &mut &str) -> ModalResult<ScriptCommand> {
    preceded((Caseless("advance"), space1), duration)
        .map(ScriptCommand::Advance)
        .parse_next(input)
}

fn keyword(input: &mut &str) -> ModalResult<ScriptCommand> {
    alt((
        Caseless("status").value(ScriptCommand::Status),
        Caseless("frame").value(ScriptCommand::Frame),
        Caseless("exit").value(ScriptCommand::Exit),
        Caseless("quit").value(ScriptCommand::Exit),
    ))
    .parse_next(input)
}

fn help(input: &mut &str) -> ModalResult<ScriptCommand> {
    preceded(Caseless("help"), opt(preceded(space1, topic)))
        .map(ScriptCommand::Help)
        .parse_next(input)
}

fn topic(input: &mut &str) -> ModalResult<&'static str> {
    alt((
        Caseless("temperature").value("temp"),
        Caseless("temp").value("temp"),
        Caseless("current").value("current"),
        Caseless("press").value("press"),
        Caseless("edge").value("edge"),
        Caseless("advance").value("advance"),
        Caseless("status").value("status"),
        Caseless("frame").value("frame"),
        Caseless("exit").value("exit"),
    ))
    .parse_next(input)
}

fn channel(input: &mut &str) -> ModalResult<SensorChannel> {
    alt((
        Caseless("temperature").value(SensorChannel::Temperature),
        Caseless("temp").value(SensorChannel::Temperature),
        Caseless("current").value(SensorChannel::Current),
    ))
    .parse_next(input)
}

fn button(input: &mut &str) -> ModalResult<ButtonId> {
    alt((
        Caseless("temperature").value(ButtonId::Temperature),
        Caseless("temp").value(ButtonId::Temperature),
        Caseless("current").value(ButtonId::Current),
    ))
    .parse_next(input)
}

fn duration(input: &mut &str) -> ModalResult<Duration> {
    (
        dec_uint::<_, u64, _>,
        alt((
            Caseless("ms").value(Duration::from_millis as fn(u64) -> Duration),
            Caseless("s").value(Duration::from_secs as fn(u64) -> Duration),
        )),
    )
        .map(|(amount, unit)| unit(amount))
        .parse_next(input)
}
