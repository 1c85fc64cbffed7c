use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use super::EngineEvent;

/// Default number of undelivered events kept before new ones are dropped.
pub const EVENT_CAPACITY: usize = 64;

/// EventBus carries device-side events to the UI without blocking the sender
pub struct EventBus {
    sender: Sender<EngineEvent>,
    receiver: Receiver<EngineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }

    /// Bounded so that `try_send` from the audio callback never allocates or blocks.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        EventBus { sender, receiver }
    }

    /// Get a sender that can be moved into driver callbacks
    pub fn sender(&self) -> Sender<EngineEvent> {
        self.sender.clone()
    }

    pub fn try_receive(&self) -> Result<EngineEvent, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Take at most `max_events` pending events
    pub fn drain(&self, max_events: usize) -> Vec<EngineEvent> {
        self.receiver.try_iter().take(max_events).collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oscillator::RenderFault;

    #[test]
    fn drain_respects_limit() {
        let bus = EventBus::new();
        let sender = bus.sender();
        for frames in 0..5 {
            sender.try_send(EngineEvent::RenderFault(RenderFault { frames })).unwrap();
        }

        assert_eq!(bus.drain(3).len(), 3);
        assert_eq!(bus.drain(10).len(), 2);
        assert!(bus.try_receive().is_err());
    }

    #[test]
    fn full_bus_drops_instead_of_blocking() {
        let bus = EventBus::with_capacity(1);
        let sender = bus.sender();
        assert!(sender.try_send(EngineEvent::StreamError("first".into())).is_ok());
        assert!(sender.try_send(EngineEvent::StreamError("second".into())).is_err());
        assert_eq!(
            bus.try_receive(),
            Ok(EngineEvent::StreamError("first".into()))
        );
    }
}
