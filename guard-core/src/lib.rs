#![no_std]

// Shared policy for the environmental guard.
//
// Everything that decides what the guard does lives here: threshold bands,
// debounce, the alarm state machine, frame layout and the control loop step.
// The crate avoids the Rust standard library so the STM32 firmware and the
// host emulator drive exactly the same logic.

pub mod alarm;
pub mod config;
pub mod controller;
pub mod input;
pub mod peripherals;
pub mod presenter;
pub mod sensors;
pub mod telemetry;
pub mod time;
