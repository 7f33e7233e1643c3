//! # Core Domain Entities
//!
//! The registry's unit of state and the receipts returned by mutations.

use crate::domain::value_objects::{Address, Amount, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

// =============================================================================
// DOMAIN RECORD
// =============================================================================

/// A registered name and its lease.
///
/// `name` and `id` never change for the lifetime of a record. A lapsed record
/// stays in the store until a new registrant supersedes it; supersession
/// replaces the whole record with a fresh id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Registered name (unique key).
    pub name: String,
    /// Sequential token id allocated at registration.
    pub id: TokenId,
    /// Current holder.
    pub owner: Address,
    /// Owner-controlled payload.
    pub data: String,
    /// When this lifetime of the name began.
    pub registered_at: Timestamp,
    /// Lease end; the record is lapsed once `now > lease_ends_at`.
    pub lease_ends_at: Timestamp,
    /// Amount collected at registration, kept as paid.
    pub price_paid: Amount,
}

impl DomainRecord {
    /// Returns true if the lease has lapsed at `now`.
    #[must_use]
    pub fn is_lapsed(&self, now: Timestamp) -> bool {
        now > self.lease_ends_at
    }

    /// Seconds of lease remaining at `now` (zero once lapsed).
    #[must_use]
    pub fn remaining(&self, now: Timestamp) -> u64 {
        self.lease_ends_at.saturating_sub(now)
    }
}

// =============================================================================
// RECEIPTS
// =============================================================================

/// Result of a successful registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Allocated token id.
    pub id: TokenId,
    /// Registered name.
    pub name: String,
    /// New owner.
    pub owner: Address,
    /// Lease end of the new record.
    pub lease_ends_at: Timestamp,
    /// Amount credited to the treasury.
    pub price_paid: Amount,
    /// Id of the lapsed record this registration replaced, if any.
    pub superseded: Option<TokenId>,
}

/// Result of a successful renewal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalReceipt {
    /// Lease end before the renewal.
    pub previous_lease_ends_at: Timestamp,
    /// Lease end after the renewal.
    pub lease_ends_at: Timestamp,
    /// Amount credited to the treasury.
    pub paid: Amount,
}
