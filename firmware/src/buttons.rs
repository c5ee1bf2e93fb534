//! Press channel between the button task and the control task.
//!
//! The button task owns the debounce guard and pushes accepted presses with
//! `try_send`, so the edge path never waits on the control loop. The adapters
//! below let the shared core drive the embassy channel through its queue
//! traits.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender, TrySendError};
use guard_core::input::{
    ButtonEnqueueError, ButtonEvent, ButtonQueueConsumer, ButtonQueueProducer,
};

use crate::time::FirmwareInstant;

/// Presses buffered between the two tasks; a full channel drops the newest.
pub const BUTTON_QUEUE_DEPTH: usize = 4;

#[cfg(target_os = "none")]
type GuardMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type GuardMutex = NoopRawMutex;

pub type FirmwareButtonEvent = ButtonEvent<FirmwareInstant>;

pub type ButtonChannel = Channel<GuardMutex, FirmwareButtonEvent, BUTTON_QUEUE_DEPTH>;

pub type ButtonSender<'a> = Sender<'a, GuardMutex, FirmwareButtonEvent, BUTTON_QUEUE_DEPTH>;

pub type ButtonReceiver<'a> = Receiver<'a, GuardMutex, FirmwareButtonEvent, BUTTON_QUEUE_DEPTH>;

/// Producer half used by the button task.
pub struct ButtonProducer<'a> {
    sender: ButtonSender<'a>,
}

impl<'a> ButtonProducer<'a> {
    pub fn new(sender: ButtonSender<'a>) -> Self {
        Self { sender }
    }
}

impl ButtonQueueProducer for ButtonProducer<'_> {
    type Instant = FirmwareInstant;
    type Error = TrySendError<FirmwareButtonEvent>;

    fn try_enqueue(
        &mut self,
        event: FirmwareButtonEvent,
    ) -> Result<(), ButtonEnqueueError<Self::Error>> {
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ButtonEnqueueError::QueueFull),
        }
    }
}

/// Consumer half used by the control task.
pub struct ButtonConsumer<'a> {
    receiver: ButtonReceiver<'a>,
}

impl<'a> ButtonConsumer<'a> {
    pub fn new(receiver: ButtonReceiver<'a>) -> Self {
        Self { receiver }
    }

    /// Resolves once at least one press is waiting.
    #[cfg(target_os = "none")]
    pub async fn ready(&self) {
        self.receiver.ready_to_receive().await;
    }
}

impl ButtonQueueConsumer for ButtonConsumer<'_> {
    type Instant = FirmwareInstant;

    fn try_dequeue(&mut self) -> Option<FirmwareButtonEvent> {
        self.receiver.try_receive().ok()
    }
}
