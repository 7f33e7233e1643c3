//! # Quantum Name Service Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── exploits/         # Attack simulations against the registry
//! │   ├── reentrancy.rs     # Payout callbacks into withdraw
//! │   └── index_consistency.rs  # Owner index under hostile call sequences
//! │
//! └── integration/      # End-to-end flows through the async service
//!     └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qns-tests
//!
//! # By category
//! cargo test -p qns-tests integration::
//! cargo test -p qns-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p qns-tests
//! ```

pub mod exploits;
pub mod integration;

use qc_18_name_registry::prelude::*;
use std::sync::Arc;

/// Service wired to in-memory adapters with a settable clock.
pub type TestService = NameRegistryService<ManualTimeSource, LedgerPayoutSink, InMemoryEventBus>;

/// A service and handles to every adapter behind it.
pub struct Harness {
    pub service: Arc<TestService>,
    pub clock: Arc<ManualTimeSource>,
    pub payouts: Arc<LedgerPayoutSink>,
    pub bus: Arc<InMemoryEventBus>,
}

/// Start time used by every harness.
pub const GENESIS: Timestamp = 1_700_000_000;

/// Build a harness whose treasury is controlled by `controller`.
///
/// # Panics
///
/// If the default config fails validation.
#[must_use]
pub fn harness(controller: Address) -> Harness {
    let clock = Arc::new(ManualTimeSource::new(GENESIS));
    let payouts = Arc::new(LedgerPayoutSink::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let service = NameRegistryService::new(
        ServiceConfig {
            registry: RegistryConfig::with_controller(controller),
        },
        clock.clone(),
        payouts.clone(),
        bus.clone(),
    )
    .expect("default config is valid");
    Harness {
        service: Arc::new(service),
        clock,
        payouts,
        bus,
    }
}

/// Deterministic test identity.
#[must_use]
pub const fn account(seed: u8) -> Address {
    Address::new([seed; 20])
}
