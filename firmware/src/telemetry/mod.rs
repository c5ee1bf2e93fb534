//! Telemetry ring buffer and logging helpers.
//!
//! Keeps the most recent guard events in memory and mirrors each one to
//! defmt on the target (stdout on host builds) at a level chosen by the
//! event kind.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use guard_core::telemetry::{
    EventHistory, EventId, EventLevel, EventLog, EventRecord, GuardEvent,
};

use crate::time::FirmwareInstant;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Records guard events and mirrors them to the console.
pub struct TelemetryRecorder {
    history: EventHistory<FirmwareInstant, TELEMETRY_RING_CAPACITY>,
}

impl TelemetryRecorder {
    pub const fn new() -> Self {
        Self {
            history: EventHistory::new(),
        }
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&EventRecord<FirmwareInstant>> {
        self.history.latest()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Stores `event` and emits it.
    pub fn record_event(&mut self, at: FirmwareInstant, event: GuardEvent) -> EventId {
        let id = self.history.push(at, event);
        emit_log(event.level(), at.as_micros(), &event);
        id
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog<FirmwareInstant> for TelemetryRecorder {
    fn record(&mut self, at: FirmwareInstant, event: GuardEvent) {
        self.record_event(at, event);
    }
}

#[cfg(target_os = "none")]
fn emit_log(level: EventLevel, timestamp_us: u64, event: &GuardEvent) {
    let event = defmt::Display2Format(event);
    match level {
        EventLevel::Debug => defmt::debug!("guard t={}us {}", timestamp_us, event),
        EventLevel::Info => defmt::info!("guard t={}us {}", timestamp_us, event),
        EventLevel::Warn => defmt::warn!("guard t={}us {}", timestamp_us, event),
    }
}

#[cfg(not(target_os = "none"))]
fn emit_log(level: EventLevel, timestamp_us: u64, event: &GuardEvent) {
    let tag = match level {
        EventLevel::Debug => "debug",
        EventLevel::Info => "info",
        EventLevel::Warn => "warn",
    };
    println!("[{tag}] guard t={timestamp_us}us {event}");
}
