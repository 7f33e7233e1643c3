//! # In-Memory Event Bus
//!
//! `tokio::sync::broadcast` fan-out plus a retained history, so tests and
//! the CLI can inspect everything that was published.

use crate::events::RegistryEvent;
use crate::ports::outbound::EventPublisher;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast bus that also keeps every published event.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<RegistryEvent>,
    history: RwLock<Vec<RegistryEvent>>,
    events_published: AtomicU64,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: RwLock::new(Vec::new()),
            events_published: AtomicU64::new(0),
        }
    }

    /// Receive events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }

    /// Every event published so far, oldest first.
    ///
    /// A panic while the history was held does not discard it.
    #[must_use]
    pub fn history(&self) -> Vec<RegistryEvent> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: RegistryEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        // No receivers is not an error: history still has the event.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(topic, receivers, "Event published");
        receivers
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
