//! # Ledger Payout Sink
//!
//! In-memory settlement: credited balances per recipient, with switches to
//! simulate a rejecting recipient or an unavailable backend.

use crate::domain::value_objects::{Address, Amount, U256};
use crate::errors::PayoutError;
use crate::ports::outbound::PayoutSink;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Payout sink that records credits in memory.
#[derive(Debug, Default)]
pub struct LedgerPayoutSink {
    credited: RwLock<HashMap<Address, Amount>>,
    rejecting: RwLock<HashSet<Address>>,
    offline: AtomicBool,
    payouts: AtomicU64,
}

impl LedgerPayoutSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every payout to `recipient` fail with `Rejected`.
    pub fn reject(&self, recipient: Address) {
        self.rejecting
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(recipient);
    }

    /// Toggle `Unavailable` failures for all payouts.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Total credited to `recipient`.
    #[must_use]
    pub fn balance_of(&self, recipient: &Address) -> Amount {
        self.credited
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(recipient)
            .copied()
            .unwrap_or_default()
    }

    /// Number of successful payouts.
    #[must_use]
    pub fn payouts_made(&self) -> u64 {
        self.payouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayoutSink for LedgerPayoutSink {
    async fn payout(&self, to: Address, amount: Amount) -> Result<(), PayoutError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PayoutError::Unavailable("ledger offline".to_string()));
        }
        let rejected = self
            .rejecting
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&to);
        if rejected {
            return Err(PayoutError::Rejected(to));
        }

        let mut credited = self
            .credited
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = credited.entry(to).or_insert_with(U256::zero);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| PayoutError::Unavailable("ledger balance overflow".to_string()))?;
        self.payouts.fetch_add(1, Ordering::SeqCst);

        debug!(to = %to, amount = %amount, "Payout credited");
        Ok(())
    }
}
