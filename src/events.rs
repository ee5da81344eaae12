use log::debug;
use tokio::sync::broadcast;

use crate::model::DevfileRecord;

const DEFAULT_CAPACITY: usize = 64;

/// Publish/subscribe channel owned by whoever composes the publisher and its
/// subscribers. There is no process-wide registry.
#[derive(Debug, Clone)]
pub struct EventBus<E: Clone> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Dropping the returned receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Delivers `event` to every current subscriber. Publishing with no
    /// subscriber is not an error.
    pub fn publish(&self, event: E) {
        if self.sender.send(event).is_err() {
            debug!("Event published without subscribers");
        }
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised after a devfile record has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DevfileCreatedEvent<R: DevfileRecord> {
    pub devfile: R,
}

impl<R: DevfileRecord> DevfileCreatedEvent<R> {
    pub fn new(devfile: R) -> Self {
        Self { devfile }
    }
}
