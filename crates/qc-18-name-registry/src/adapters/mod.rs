//! # Adapters
//!
//! In-process implementations of the outbound ports.

pub mod clock;
pub mod event_bus;
pub mod payout;

pub use clock::{ManualTimeSource, SystemTimeSource};
pub use event_bus::InMemoryEventBus;
pub use payout::LedgerPayoutSink;
