//! # QC-18 Name Registry - Leasable Domain Records
//!
//! **Subsystem ID:** 18
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Registers short unique names, attaches owner-controlled data to them and
//! holds them as transferable, time-bounded leases paid for in exact integer
//! amounts. Every record can be rendered into a self-describing metadata
//! document with an embedded SVG card.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Unique Names | `domain/records.rs` - `RecordStore::register()` |
//! | INVARIANT-2 | Owner Index Inverse | `domain/owner_index.rs`, `domain/invariants.rs` - `check_owner_index_invariant()` |
//! | INVARIANT-3 | Ids Never Reused | `domain/records.rs` - `next_id` allocator |
//! | INVARIANT-4 | Lease Monotonicity | `domain/records.rs` - `extend_lease()` |
//! | INVARIANT-5 | Treasury Balance | `domain/treasury.rs` - `Treasury::is_consistent()` |
//!
//! ## Pricing (defaults)
//!
//! | Name length | Price |
//! |-------------|-------|
//! | 1-3 | 0.01 (10^16 base units) |
//! | 4-6 | 0.005 |
//! | 7-10 | 0.001 |
//! | > 10 | rejected (`NameTooLong`) |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `TimeSource` | Current time for leases |
//! | `PayoutSink` | Funds transfer for treasury withdrawal |
//! | `EventPublisher` | Registry event delivery |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_name_registry::prelude::*;
//!
//! let price = api.price("test").await?;
//! let receipt = api.register(caller, "test", "hello", price).await?;
//! let uri = api.token_uri(receipt.id).await?;
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod metadata;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::engine::RegistryEngine;
    pub use crate::domain::entities::{DomainRecord, RegistrationReceipt, RenewalReceipt};
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };
    pub use crate::domain::pricing::PriceTable;
    pub use crate::domain::value_objects::{
        units_to_amount, Address, Amount, DomainName, Timestamp, TokenId, U256,
    };

    // Metadata
    pub use crate::metadata::{
        check_well_formed, decode_document, decode_image, encode_document, MetadataCodec,
        MetadataDocument,
    };

    // Ports
    pub use crate::ports::inbound::NameRegistryApi;
    pub use crate::ports::outbound::{EventPublisher, PayoutSink, TimeSource};

    // Adapters
    pub use crate::adapters::{
        InMemoryEventBus, LedgerPayoutSink, ManualTimeSource, SystemTimeSource,
    };

    // Events
    pub use crate::events::{topics, RegistryEvent};

    // Errors
    pub use crate::errors::{CodecError, ConfigError, PayoutError, RegistryError};

    // Config & service
    pub use crate::config::{PriceTiers, RegistryConfig};
    pub use crate::service::{NameRegistryService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CONSTANTS
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 18;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Name Registry";
