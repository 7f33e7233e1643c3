//! # Lease Manager
//!
//! Lease validity and renewal. Expiry is lazy: a record is lapsed when the
//! read-time `now` is past its stored `lease_ends_at`, with no sweep or timer.

use crate::config::RegistryConfig;
use crate::domain::entities::RenewalReceipt;
use crate::domain::pricing::PriceTable;
use crate::domain::records::RecordStore;
use crate::domain::value_objects::{Amount, Timestamp, U256};
use crate::errors::RegistryError;

/// Renewal policy: term length and cost multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaseManager {
    lease_term: u64,
    renewal_percent: u32,
}

impl LeaseManager {
    /// Creates a manager granting `lease_term` seconds per renewal at
    /// `renewal_percent` of the registration price.
    #[must_use]
    pub fn new(lease_term: u64, renewal_percent: u32) -> Self {
        Self {
            lease_term,
            renewal_percent,
        }
    }

    /// Build from registry configuration.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.lease_term_secs, config.renewal_percent)
    }

    /// Seconds granted per registration or renewal.
    #[must_use]
    pub fn lease_term(&self) -> u64 {
        self.lease_term
    }

    /// Cost to renew `name`: `price(name) × renewal_percent / 100`, rounded down.
    ///
    /// # Errors
    ///
    /// `NameTooLong` from the price table.
    pub fn renew_cost(&self, prices: &PriceTable, name: &str) -> Result<Amount, RegistryError> {
        let price = prices.price(name)?;
        let scaled = price
            .checked_mul(U256::from(self.renewal_percent))
            .ok_or(RegistryError::ArithmeticOverflow("renewal cost"))?;
        Ok(scaled / U256::from(100u8))
    }

    /// Lease end that a renewal at `now` would produce for a lease ending at
    /// `current_end`. A live lease extends from its end so unused time is
    /// kept; a lapsed lease restarts from `now`.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the result does not fit.
    pub fn next_lease_end(
        &self,
        current_end: Timestamp,
        now: Timestamp,
    ) -> Result<Timestamp, RegistryError> {
        let base = if now > current_end { now } else { current_end };
        base.checked_add(self.lease_term)
            .ok_or(RegistryError::ArithmeticOverflow("lease end"))
    }

    /// Validate and apply a renewal.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InsufficientPayment`, `ArithmeticOverflow`. The store is
    /// unchanged on error.
    pub fn renew(
        &self,
        store: &mut RecordStore,
        prices: &PriceTable,
        name: &str,
        payment: Amount,
        now: Timestamp,
    ) -> Result<RenewalReceipt, RegistryError> {
        let current_end = store.get(name)?.lease_ends_at;
        let cost = self.renew_cost(prices, name)?;
        if payment < cost {
            return Err(RegistryError::InsufficientPayment {
                required: cost,
                provided: payment,
            });
        }
        let new_end = self.next_lease_end(current_end, now)?;
        store.extend_lease(name, new_end)?;
        Ok(RenewalReceipt {
            previous_lease_ends_at: current_end,
            lease_ends_at: new_end,
            paid: payment,
        })
    }

    /// Returns true if `name`'s lease has lapsed at `now`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the name was never registered.
    pub fn is_lapsed(
        &self,
        store: &RecordStore,
        name: &str,
        now: Timestamp,
    ) -> Result<bool, RegistryError> {
        Ok(store.get(name)?.is_lapsed(now))
    }
}

impl Default for LeaseManager {
    fn default() -> Self {
        Self::from_config(&RegistryConfig::default())
    }
}
