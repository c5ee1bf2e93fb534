use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_sync::channel::Channel;
use guard_core::config::GuardConfig;

use crate::buttons::ButtonChannel;
use crate::hw::{self, Board};
use crate::telemetry::TelemetryRecorder;

mod button_task;
mod control_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static BUTTON_QUEUE: ButtonChannel = Channel::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let peripherals = hal::init(hal::Config::default());

    let Board {
        hardware,
        temperature_button,
        current_button,
    } = match hw::init(peripherals) {
        Ok(board) => board,
        Err(error) => {
            defmt::error!("startup failed: {}", defmt::Display2Format(&error));
            panic!("startup failed");
        }
    };
    defmt::info!("guard: peripherals ready");

    let config = GuardConfig::new();

    spawner
        .spawn(button_task::run(
            temperature_button,
            current_button,
            BUTTON_QUEUE.sender(),
            config,
        ))
        .expect("failed to spawn button task");

    spawner
        .spawn(control_task::run(
            hardware,
            BUTTON_QUEUE.receiver(),
            TelemetryRecorder::new(),
            config,
        ))
        .expect("failed to spawn control task");

    core::future::pending::<()>().await;
}
