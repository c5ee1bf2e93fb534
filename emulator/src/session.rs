use std::time::Duration;

use guard_core::config::GuardConfig;
use guard_core::controller::GuardController;
use guard_core::input::{
    ButtonEvent, ButtonId, ButtonQueue, ButtonQueueProducer, DebounceGuard, EdgeOutcome,
};
use guard_core::sensors::{IndicatorColor, SensorChannel};
use guard_core::telemetry::{EventLog, GuardEvent};
use guard_core::time::{Scheduler, VirtualClock, VirtualInstant};

use crate::board::SimulatedBoard;
use crate::script::{ScriptCommand, parse_command};

const BUTTON_QUEUE_DEPTH: usize = 4;

/// Longest window a single `advance` may cover.
const MAX_ADVANCE: Duration = Duration::from_secs(24 * 60 * 60);

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("temp", "temp <raw>              - set the temperature reading"),
    ("current", "current <raw>           - set the current reading"),
    ("press", "press <temp|current>    - deliver a debounced press"),
    ("edge", "edge <temp|current>     - feed a raw edge through the debounce guard"),
    ("advance", "advance <n>ms|<n>s      - run the control loop in virtual time"),
    ("status", "status                  - show alarm, mode, indicator and tone"),
    ("frame", "frame                   - draw the display contents"),
    ("exit", "exit                    - end the session"),
];

/// Result of one script line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reply {
    Lines(Vec<String>),
    Exit,
}

/// Event log that turns controller events into transcript lines.
///
/// Per-tick sample events are kept out of the transcript.
#[derive(Debug, Default)]
struct TranscriptLog {
    pending: Vec<String>,
}

impl TranscriptLog {
    fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl EventLog<VirtualInstant> for TranscriptLog {
    fn record(&mut self, at: VirtualInstant, event: GuardEvent) {
        if matches!(event, GuardEvent::Sampled { .. }) {
            return;
        }
        self.pending.push(format!("[+{} ms] {event}", at.as_millis()));
    }
}

/// Host-side stand-in for the firmware tasks, driven by script commands.
pub struct Session {
    clock: VirtualClock,
    next_step: VirtualInstant,
    controller: GuardController<VirtualInstant>,
    board: SimulatedBoard,
    debounce: DebounceGuard<VirtualInstant>,
    queue: ButtonQueue<VirtualInstant, BUTTON_QUEUE_DEPTH>,
    log: TranscriptLog,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(GuardConfig::new())
    }

    pub fn with_config(config: GuardConfig) -> Self {
        Self {
            clock: VirtualClock::new(),
            next_step: VirtualInstant::ZERO,
            controller: GuardController::with_config(config),
            board: SimulatedBoard::new(),
            debounce: DebounceGuard::with_config(&config),
            queue: ButtonQueue::new(),
            log: TranscriptLog::default(),
        }
    }

    #[cfg(test)]
    pub const fn controller(&self) -> &GuardController<VirtualInstant> {
        &self.controller
    }

    #[cfg(test)]
    pub const fn board(&self) -> &SimulatedBoard {
        &self.board
    }

    /// Executes one script line. Blank lines and `#` comments produce no output.
    pub fn handle_command(&mut self, line: &str) -> Reply {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Reply::Lines(Vec::new());
        }

        let command = match parse_command(trimmed) {
            Ok(command) => command,
            Err(error) => return Reply::Lines(vec![format!("ERR syntax {error}")]),
        };

        let lines = match command {
            ScriptCommand::SetReading { channel, raw } => self.set_reading(channel, raw),
            ScriptCommand::Press(button) => self.press(button),
            ScriptCommand::Edge(button) => self.edge(button),
            ScriptCommand::Advance(duration) => self.advance(duration),
            ScriptCommand::Status => self.status(),
            ScriptCommand::Frame => self.frame(),
            ScriptCommand::Help(topic) => Self::help(topic),
            ScriptCommand::Exit => return Reply::Exit,
        };
        Reply::Lines(lines)
    }

    fn set_reading(&mut self, channel: SensorChannel, raw: u16) -> Vec<String> {
        self.board.set_reading(channel, raw);
        vec![format!("OK {channel}={raw}")]
    }

    /// Runs every control step due within `duration`, then parks the clock
    /// at the end of the window.
    fn advance(&mut self, duration: Duration) -> Vec<String> {
        if duration > MAX_ADVANCE {
            return vec![format!(
                "ERR range advance is limited to {} s",
                MAX_ADVANCE.as_secs()
            )];
        }
        let target = self.clock.now() + duration;

        while self.next_step <= target {
            let now = self.next_step;
            self.clock.advance_to(now);
            let rest = self
                .controller
                .service(now, &mut self.board, &mut self.queue, &mut self.log);
            let next = now + rest;
            if next <= now {
                // Virtual time saturated.
                break;
            }
            self.next_step = next;
        }
        self.clock.advance_to(target);

        let mut lines = self.log.take();
        lines.push(format!("OK t=+{} ms", target.as_millis()));
        lines
    }

    fn press(&mut self, button: ButtonId) -> Vec<String> {
        let now = self.clock.now();
        if self
            .queue
            .try_enqueue(ButtonEvent::new(button, now))
            .is_err()
        {
            self.log.record(now, GuardEvent::ButtonDropped(button));
        }
        self.drain(now);

        let mut lines = self.log.take();
        lines.push(format!("OK press {button}"));
        lines
    }

    fn edge(&mut self, button: ButtonId) -> Vec<String> {
        let now = self.clock.now();
        let outcome = self.debounce.forward(button, now, &mut self.queue);
        let verdict = match outcome {
            EdgeOutcome::Accepted => {
                self.drain(now);
                "accepted"
            }
            EdgeOutcome::Debounced => "debounced",
            EdgeOutcome::Dropped => {
                self.log.record(now, GuardEvent::ButtonDropped(button));
                "dropped"
            }
        };

        let mut lines = self.log.take();
        lines.push(format!("OK edge {button} {verdict}"));
        lines
    }

    fn drain(&mut self, now: VirtualInstant) {
        self.controller
            .drain_buttons(now, &mut self.board, &mut self.queue, &mut self.log);
    }

    fn status(&self) -> Vec<String> {
        let readings = self
            .controller
            .last_readings()
            .map_or_else(|| "none".to_owned(), |r| {
                format!("temperature={} current={}", r.temperature, r.current)
            });
        let color = self
            .controller
            .indicator_color()
            .map_or("off", IndicatorColor::as_str);
        let rgb = self.board.indicator();

        vec![
            format!(
                "t=+{} ms armed={} mode={} selected={}",
                self.clock.now().as_millis(),
                self.controller.is_armed(),
                self.controller.display_mode(),
                self.controller.machine().selected_mode()
            ),
            format!(
                "indicator={color} rgb={}/{}/{} tone={} readings={readings}",
                rgb.red,
                rgb.green,
                rgb.blue,
                self.board.tone()
            ),
        ]
    }

    fn frame(&self) -> Vec<String> {
        let border = format!("+{}+", "-".repeat(128));
        let mut lines = Vec::with_capacity(34);
        lines.push(border.clone());
        lines.extend(
            self.board
                .framebuffer()
                .to_text()
                .into_iter()
                .map(|row| format!("|{row:<128}|")),
        );
        lines.push(border);
        lines
    }

    fn help(topic: Option<&str>) -> Vec<String> {
        if let Some(topic) = topic {
            return HELP_TOPICS
                .iter()
                .filter(|(name, _)| *name == topic)
                .map(|(_, usage)| (*usage).to_owned())
                .collect();
        }

        let mut lines = vec!["Available commands:".to_owned()];
        lines.extend(HELP_TOPICS.iter().map(|(_, usage)| format!("  {usage}")));
        lines
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
