use embassy_futures::select::{Either, select};
use embassy_time::Timer;
use guard_core::config::GuardConfig;
use guard_core::controller::GuardController;

use crate::buttons::{ButtonConsumer, ButtonReceiver};
use crate::hw::GuardHardware;
use crate::status;
use crate::telemetry::TelemetryRecorder;
use crate::time::FirmwareInstant;

/// Runs the control loop, waking early whenever a press is queued.
#[embassy_executor::task]
pub async fn run(
    mut hardware: GuardHardware,
    receiver: ButtonReceiver<'static>,
    mut telemetry: TelemetryRecorder,
    config: GuardConfig,
) -> ! {
    let mut controller = GuardController::<FirmwareInstant>::with_config(config);
    let mut buttons = ButtonConsumer::new(receiver);
    let mut next_step = FirmwareInstant::now();

    loop {
        match select(Timer::at(next_step.into_embassy()), buttons.ready()).await {
            Either::First(()) => {
                let now = FirmwareInstant::now();
                let rest = controller.service(now, &mut hardware, &mut buttons, &mut telemetry);
                next_step = now + rest;
            }
            Either::Second(()) => {
                controller.drain_buttons(
                    FirmwareInstant::now(),
                    &mut hardware,
                    &mut buttons,
                    &mut telemetry,
                );
            }
        }

        status::publish(&controller);
    }
}
