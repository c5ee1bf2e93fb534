use embassy_futures::select::{Either, select};
use embassy_stm32::exti::ExtiInput;
use guard_core::config::GuardConfig;
use guard_core::input::{ButtonId, DebounceGuard, EdgeOutcome};

use crate::buttons::{ButtonProducer, ButtonSender};
use crate::status;
use crate::time::FirmwareInstant;

#[embassy_executor::task]
pub async fn run(
    mut temperature: ExtiInput<'static>,
    mut current: ExtiInput<'static>,
    sender: ButtonSender<'static>,
    config: GuardConfig,
) -> ! {
    let mut guard = DebounceGuard::<FirmwareInstant>::with_config(&config);
    let mut producer = ButtonProducer::new(sender);

    loop {
        let button = match select(
            temperature.wait_for_falling_edge(),
            current.wait_for_falling_edge(),
        )
        .await
        {
            Either::First(()) => ButtonId::Temperature,
            Either::Second(()) => ButtonId::Current,
        };

        if guard.forward(button, FirmwareInstant::now(), &mut producer) == EdgeOutcome::Dropped {
            let dropped = status::record_dropped_press();
            let snapshot = status::snapshot();
            defmt::warn!(
                "buttons: {} press dropped (total={}, armed={})",
                button.as_str(),
                dropped,
                snapshot.armed
            );
        }
    }
}
