#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! The control task owns the controller; these single-word atomics mirror
//! the parts other contexts may want to report (armed flag, last readings,
//! display mode, dropped presses) without touching the controller itself.

use guard_core::alarm::DisplayMode;
use guard_core::controller::GuardController;
use guard_core::sensors::Readings;
use portable_atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};

use crate::time::FirmwareInstant;

/// Raw value stored before the first sample (above the 12-bit range).
const NO_READING: u16 = u16::MAX;

static ARMED: AtomicBool = AtomicBool::new(false);
static TEMPERATURE: AtomicU16 = AtomicU16::new(NO_READING);
static CURRENT: AtomicU16 = AtomicU16::new(NO_READING);
static MODE: AtomicU8 = AtomicU8::new(encode_mode(DisplayMode::Idle));
static DROPPED_PRESSES: AtomicU32 = AtomicU32::new(0);

/// Point-in-time copy of the mirrored status.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub armed: bool,
    pub readings: Option<Readings>,
    pub mode: DisplayMode,
    pub dropped_presses: u32,
}

const fn encode_mode(mode: DisplayMode) -> u8 {
    match mode {
        DisplayMode::Idle => 0,
        DisplayMode::ShowTemperature => 1,
        DisplayMode::ShowCurrent => 2,
        DisplayMode::AlarmBanner => 3,
    }
}

const fn decode_mode(raw: u8) -> DisplayMode {
    match raw {
        1 => DisplayMode::ShowTemperature,
        2 => DisplayMode::ShowCurrent,
        3 => DisplayMode::AlarmBanner,
        _ => DisplayMode::Idle,
    }
}

/// Mirrors the controller state after a control-loop step.
pub fn publish(controller: &GuardController<FirmwareInstant>) {
    ARMED.store(controller.is_armed(), Ordering::Relaxed);
    MODE.store(encode_mode(controller.display_mode()), Ordering::Relaxed);
    if let Some(readings) = controller.last_readings() {
        TEMPERATURE.store(readings.temperature, Ordering::Relaxed);
        CURRENT.store(readings.current, Ordering::Relaxed);
    }
}

/// Counts a debounced press lost to a full channel. Returns the new total.
pub fn record_dropped_press() -> u32 {
    DROPPED_PRESSES.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

pub fn snapshot() -> StatusSnapshot {
    let temperature = TEMPERATURE.load(Ordering::Relaxed);
    let current = CURRENT.load(Ordering::Relaxed);
    let readings = if temperature == NO_READING || current == NO_READING {
        None
    } else {
        Some(Readings::new(temperature, current))
    };

    StatusSnapshot {
        armed: ARMED.load(Ordering::Relaxed),
        readings,
        mode: decode_mode(MODE.load(Ordering::Relaxed)),
        dropped_presses: DROPPED_PRESSES.load(Ordering::Relaxed),
    }
}
