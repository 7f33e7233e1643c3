//! # Domain Invariants
//!
//! Consistency rules between the record store, its indices and the treasury.
//! The engine asserts them in debug builds after every mutation; tests call
//! them directly.
//!
//! - INVARIANT-1: Unique Names (one live record per name)
//! - INVARIANT-2: Owner Index Inverse
//! - INVARIANT-3: Id Index Consistency
//! - INVARIANT-4: Lease Ordering
//! - INVARIANT-5: Treasury Balance

use crate::domain::owner_index::OwnerIndex;
use crate::domain::records::RecordStore;
use crate::domain::treasury::Treasury;
use crate::domain::value_objects::TokenId;
use std::collections::HashSet;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1: Unique Names
///
/// Insertion order lists every live name exactly once.
#[must_use]
pub fn check_unique_names_invariant(store: &RecordStore) -> bool {
    let mut seen = HashSet::new();
    let all_unique = store.all_names().all(|name| seen.insert(name));
    all_unique && seen.len() == store.len()
}

/// INVARIANT-2: Owner Index Inverse
///
/// The index holds exactly one (owner, name) pair per live record, matching
/// the record's `owner` field.
#[must_use]
pub fn check_owner_index_invariant(store: &RecordStore, owners: &OwnerIndex) -> bool {
    owners.len() == store.len()
        && store
            .records()
            .all(|record| owners.contains(&record.owner, &record.name))
        && owners.entries().all(|(owner, name)| {
            store
                .get(name)
                .is_ok_and(|record| record.owner == *owner)
        })
}

/// INVARIANT-3: Id Index Consistency
///
/// Every live record is reachable by its id, and no id exceeds the allocator.
#[must_use]
pub fn check_id_index_invariant(store: &RecordStore) -> bool {
    let ids: Vec<(TokenId, &str)> = store.ids().collect();
    ids.len() == store.len()
        && ids.iter().all(|(id, name)| {
            *id < store.next_id() && store.get(name).is_ok_and(|record| record.id == *id)
        })
}

/// INVARIANT-4: Lease Ordering
///
/// `lease_ends_at` is strictly after `registered_at` for every record.
#[must_use]
pub fn check_lease_invariant(store: &RecordStore) -> bool {
    store
        .records()
        .all(|record| record.lease_ends_at > record.registered_at)
}

/// INVARIANT-5: Treasury Balance
///
/// Balance equals collected minus withdrawn.
#[must_use]
pub fn check_treasury_invariant(treasury: &Treasury) -> bool {
    treasury.is_consistent()
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    store: &RecordStore,
    owners: &OwnerIndex,
    treasury: &Treasury,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_unique_names_invariant(store) {
        violations.push(InvariantViolation::DuplicateName);
    }
    if !check_owner_index_invariant(store, owners) {
        violations.push(InvariantViolation::OwnerIndexMismatch {
            indexed: owners.len(),
            records: store.len(),
        });
    }
    if !check_id_index_invariant(store) {
        violations.push(InvariantViolation::IdIndexMismatch);
    }
    if !check_lease_invariant(store) {
        violations.push(InvariantViolation::LeaseBeforeRegistration);
    }
    if !check_treasury_invariant(treasury) {
        violations.push(InvariantViolation::TreasuryImbalance);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A name appears more than once, or order and records disagree.
    DuplicateName,
    /// Owner index is not the inverse of record owners.
    OwnerIndexMismatch { indexed: usize, records: usize },
    /// Id index disagrees with record ids.
    IdIndexMismatch,
    /// A lease ends at or before its registration.
    LeaseBeforeRegistration,
    /// Treasury balance does not match its ledger totals.
    TreasuryImbalance,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName => write!(f, "duplicate or orphaned name in store order"),
            Self::OwnerIndexMismatch { indexed, records } => {
                write!(f, "owner index mismatch: {indexed} indexed, {records} records")
            }
            Self::IdIndexMismatch => write!(f, "id index does not match record ids"),
            Self::LeaseBeforeRegistration => write!(f, "lease ends before registration"),
            Self::TreasuryImbalance => write!(f, "treasury balance != collected - withdrawn"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
