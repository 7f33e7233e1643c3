//! # Registry Engine
//!
//! Synchronous aggregate over the record store, owner index, lease manager
//! and treasury. It is the only type with mutating entry points; callers
//! supply the authenticated `caller` and the current time.
//!
//! ## Atomicity
//!
//! Every mutation validates all preconditions before its first write. An
//! `Err` return leaves the engine structurally equal to its state before the
//! call, event queue included.

use crate::config::RegistryConfig;
use crate::domain::entities::{DomainRecord, RegistrationReceipt, RenewalReceipt};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::lease::LeaseManager;
use crate::domain::owner_index::OwnerIndex;
use crate::domain::pricing::PriceTable;
use crate::domain::records::{RecordStore, RegistrationRequest};
use crate::domain::treasury::Treasury;
use crate::domain::value_objects::{Address, Amount, DomainName, Timestamp, TokenId};
use crate::errors::{ConfigError, RegistryError};
use crate::events::RegistryEvent;
use crate::metadata::{encode_document, MetadataCodec, MetadataDocument};
use tracing::{debug, info};

/// The registry aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEngine {
    config: RegistryConfig,
    prices: PriceTable,
    leases: LeaseManager,
    records: RecordStore,
    owners: OwnerIndex,
    treasury: Treasury,
    codec: MetadataCodec,
    events: Vec<RegistryEvent>,
}

impl RegistryEngine {
    /// Creates an empty registry.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if `config` fails [`RegistryConfig::validate`].
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            prices: PriceTable::from_config(&config),
            leases: LeaseManager::from_config(&config),
            records: RecordStore::new(),
            owners: OwnerIndex::new(),
            treasury: Treasury::new(config.controller),
            codec: MetadataCodec::new(config.tld.clone()),
            events: Vec::new(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Register `name` for `caller`.
    ///
    /// A lapsed record under the same name is superseded with a fresh id.
    ///
    /// # Errors
    ///
    /// Checked in order: `NameTooLong`, `InvalidName`, `DataTooLong`,
    /// `AlreadyRegistered`, `InsufficientPayment`, `ArithmeticOverflow`
    /// (lease end, token id, then treasury).
    pub fn register(
        &mut self,
        caller: Address,
        name: &str,
        data: &str,
        payment: Amount,
        now: Timestamp,
    ) -> Result<RegistrationReceipt, RegistryError> {
        let name = DomainName::parse(name, self.prices.max_len())?;
        self.check_data(data)?;

        let request = RegistrationRequest {
            name: &name,
            owner: caller,
            data: data.to_string(),
            payment,
            now,
            lease_term: self.leases.lease_term(),
        };
        self.records.check_registration(&request, &self.prices)?;
        self.treasury.ensure_can_credit(payment)?;

        let allocation = self
            .records
            .register(request, &self.prices, &mut self.owners)?;
        self.treasury.credit(payment)?;

        info!(
            name = %name,
            owner = %caller,
            id = allocation.id,
            amount = %payment,
            "Domain registered"
        );
        self.events.push(RegistryEvent::Registered {
            owner: caller,
            name: name.to_string(),
            id: allocation.id,
        });
        self.debug_check();

        Ok(RegistrationReceipt {
            id: allocation.id,
            name: name.into_inner(),
            owner: caller,
            lease_ends_at: allocation.lease_ends_at,
            price_paid: payment,
            superseded: allocation.superseded,
        })
    }

    /// Replace the data of a record owned by `caller`.
    ///
    /// # Errors
    ///
    /// `DataTooLong`, `NotFound`, `NotOwner`, `LeaseExpired`.
    pub fn modify_data(
        &mut self,
        caller: Address,
        name: &str,
        data: &str,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        self.check_data(data)?;
        self.records
            .modify_data(name, caller, data.to_string(), now)?;

        info!(name, owner = %caller, "Domain data modified");
        self.events.push(RegistryEvent::DataModified {
            name: name.to_string(),
            owner: caller,
        });
        Ok(())
    }

    /// Extend the lease of `name`. Any caller may pay.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ArithmeticOverflow`, `InsufficientPayment`.
    pub fn renew(
        &mut self,
        caller: Address,
        name: &str,
        payment: Amount,
        now: Timestamp,
    ) -> Result<RenewalReceipt, RegistryError> {
        self.records.get(name)?;
        self.treasury.ensure_can_credit(payment)?;

        let receipt = self
            .leases
            .renew(&mut self.records, &self.prices, name, payment, now)?;
        self.treasury.credit(payment)?;

        info!(
            name,
            payer = %caller,
            lease_ends_at = receipt.lease_ends_at,
            amount = %payment,
            "Domain renewed"
        );
        self.events.push(RegistryEvent::Renewed {
            name: name.to_string(),
            payer: caller,
            lease_ends_at: receipt.lease_ends_at,
            paid: payment,
        });
        self.debug_check();
        Ok(receipt)
    }

    /// Move `name` from `from` to `to`. The caller must be the current owner
    /// and equal to `from`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotOwner`, `InvalidRecipient`, `LeaseExpired`.
    pub fn transfer(
        &mut self,
        caller: Address,
        name: &str,
        from: Address,
        to: Address,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let record = self.records.get(name)?;
        if caller != record.owner || from != record.owner {
            return Err(RegistryError::NotOwner {
                name: name.to_string(),
                caller,
            });
        }
        if to.is_zero() {
            return Err(RegistryError::InvalidRecipient);
        }
        if record.is_lapsed(now) {
            return Err(RegistryError::LeaseExpired {
                name: name.to_string(),
                expired_at: record.lease_ends_at,
            });
        }
        let id = record.id;

        self.records.set_owner(name, to, &mut self.owners)?;

        info!(name, id, from = %from, to = %to, "Domain transferred");
        self.events.push(RegistryEvent::Transferred {
            name: name.to_string(),
            id,
            from,
            to,
        });
        self.debug_check();
        Ok(())
    }

    /// [`Self::transfer`] addressed by token id.
    ///
    /// # Errors
    ///
    /// `TokenNotFound`, then as for [`Self::transfer`].
    pub fn transfer_token(
        &mut self,
        caller: Address,
        id: TokenId,
        from: Address,
        to: Address,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let name = self.records.name_of(id)?.to_string();
        self.transfer(caller, &name, from, to, now)
    }

    /// Apply an ownership change reported by the transfer protocol.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record exists for `name`.
    pub fn on_ownership_changed(
        &mut self,
        name: &str,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let id = self.records.get(name)?.id;
        let previous = self.records.set_owner(name, new_owner, &mut self.owners)?;
        if previous == new_owner {
            return Ok(());
        }

        info!(name, id, from = %previous, to = %new_owner, "Ownership change applied");
        self.events.push(RegistryEvent::Transferred {
            name: name.to_string(),
            id,
            from: previous,
            to: new_owner,
        });
        self.debug_check();
        Ok(())
    }

    /// Take the whole treasury balance for the controller.
    ///
    /// The balance is zero when this returns; the caller performs the
    /// external transfer and calls [`Self::restore_withdrawal`] if it fails.
    ///
    /// # Errors
    ///
    /// `NotAuthorized`.
    pub fn withdraw(&mut self, caller: Address) -> Result<Amount, RegistryError> {
        let amount = self.treasury.withdraw(caller)?;
        debug!(controller = %caller, amount = %amount, "Treasury balance taken");
        self.debug_check();
        Ok(amount)
    }

    /// Return an amount taken by [`Self::withdraw`] whose payout failed.
    pub fn restore_withdrawal(&mut self, amount: Amount) {
        self.treasury.restore(amount);
        debug!(amount = %amount, "Treasury balance restored");
        self.debug_check();
    }

    /// Remove and return all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Registration price for `name`.
    ///
    /// # Errors
    ///
    /// `NameTooLong`.
    pub fn price(&self, name: &str) -> Result<Amount, RegistryError> {
        self.prices.price(name)
    }

    /// Renewal cost for `name`.
    ///
    /// # Errors
    ///
    /// `NameTooLong`.
    pub fn renew_cost(&self, name: &str) -> Result<Amount, RegistryError> {
        self.leases.renew_cost(&self.prices, name)
    }

    /// # Errors
    ///
    /// `NotFound`.
    pub fn get_record(&self, name: &str) -> Result<&DomainRecord, RegistryError> {
        self.records.get(name)
    }

    /// Every registered name in order of first registration.
    #[must_use]
    pub fn all_domains(&self) -> Vec<String> {
        self.records.all_names().map(str::to_string).collect()
    }

    /// Live, non-lapsed records held by `owner`, ascending by id.
    #[must_use]
    pub fn owned_domains(&self, owner: &Address, now: Timestamp) -> Vec<DomainRecord> {
        let mut owned: Vec<DomainRecord> = self
            .owners
            .iter_names_of(owner)
            .filter_map(|name| self.records.get(name).ok())
            .filter(|record| !record.is_lapsed(now))
            .cloned()
            .collect();
        owned.sort_by_key(|record| record.id);
        owned
    }

    /// Number of records indexed under `owner`, lapsed included.
    #[must_use]
    pub fn balance_of(&self, owner: &Address) -> usize {
        self.owners.count_of(owner)
    }

    /// # Errors
    ///
    /// `TokenNotFound`.
    pub fn owner_of(&self, id: TokenId) -> Result<Address, RegistryError> {
        Ok(self.records.get_by_id(id)?.owner)
    }

    /// # Errors
    ///
    /// `NotFound`.
    pub fn is_lapsed(&self, name: &str, now: Timestamp) -> Result<bool, RegistryError> {
        self.leases.is_lapsed(&self.records, name, now)
    }

    /// Metadata document for `name`.
    ///
    /// # Errors
    ///
    /// `NotFound`.
    pub fn render(&self, name: &str) -> Result<MetadataDocument, RegistryError> {
        Ok(self.codec.render(self.records.get(name)?))
    }

    /// Encoded metadata document for token `id`.
    ///
    /// # Errors
    ///
    /// `TokenNotFound`, `Codec`.
    pub fn token_uri(&self, id: TokenId) -> Result<String, RegistryError> {
        let record = self.records.get_by_id(id)?;
        Ok(encode_document(&self.codec.render(record))?)
    }

    #[must_use]
    pub fn max_name_length(&self) -> usize {
        self.prices.max_len()
    }

    #[must_use]
    pub fn treasury_balance(&self) -> Amount {
        self.treasury.balance()
    }

    #[must_use]
    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run every consistency check against the current state.
    #[must_use]
    pub fn check_invariants(&self) -> InvariantCheckResult {
        check_all_invariants(&self.records, &self.owners, &self.treasury)
    }

    fn check_data(&self, data: &str) -> Result<(), RegistryError> {
        let length = data.chars().count();
        if length > self.config.max_data_length {
            return Err(RegistryError::DataTooLong {
                length,
                max: self.config.max_data_length,
            });
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_valid(),
            "registry invariants violated: {:?}",
            self.check_invariants()
        );
    }
}
