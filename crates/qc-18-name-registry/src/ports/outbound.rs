//! # Driven Ports (SPI - Outbound)
//!
//! Collaborators the registry service depends on: a clock, a funds-transfer
//! capability for treasury withdrawals, and an event sink.

use crate::domain::value_objects::{Address, Amount, Timestamp};
use crate::errors::PayoutError;
use crate::events::RegistryEvent;
use async_trait::async_trait;

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Time source abstraction for testability.
pub trait TimeSource: Send + Sync {
    /// Returns the current time in seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// PAYOUT SINK
// =============================================================================

/// External funds transfer used by treasury withdrawal.
///
/// The service calls this with no registry lock held, so an implementation
/// may call back into the registry.
#[async_trait]
pub trait PayoutSink: Send + Sync {
    /// Transfer `amount` to `to`.
    ///
    /// # Errors
    ///
    /// Any `PayoutError`; the service restores the treasury balance.
    async fn payout(&self, to: Address, amount: Amount) -> Result<(), PayoutError>;
}

// =============================================================================
// EVENT PUBLISHER
// =============================================================================

/// Sink for registry events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event. Returns the number of subscribers that received it.
    async fn publish(&self, event: RegistryEvent) -> usize;

    /// Total events published so far.
    fn events_published(&self) -> u64;
}
