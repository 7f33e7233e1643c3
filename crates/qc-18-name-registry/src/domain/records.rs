//! # Record Store
//!
//! Canonical name → record mapping plus the denormalized indices that hang
//! off it.
//!
//! ## Data Structures
//!
//! - `records`: O(1) lookup by name
//! - `by_id`: token id → name (exactly one entry per live record)
//! - `order`: names in order of first registration
//! - `next_id`: monotonic allocator, never rewound
//!
//! Every mutating method validates all of its preconditions before the
//! first write, so an `Err` return leaves the store untouched.

use crate::domain::entities::DomainRecord;
use crate::domain::owner_index::OwnerIndex;
use crate::domain::pricing::PriceTable;
use crate::domain::value_objects::{Address, Amount, DomainName, Timestamp, TokenId};
use crate::errors::RegistryError;
use std::collections::{BTreeMap, HashMap};

/// Inputs for [`RecordStore::register`].
#[derive(Clone, Debug)]
pub struct RegistrationRequest<'a> {
    /// Validated name.
    pub name: &'a DomainName,
    /// Registrant and first owner.
    pub owner: Address,
    /// Initial data payload.
    pub data: String,
    /// Amount offered.
    pub payment: Amount,
    /// Current time.
    pub now: Timestamp,
    /// Lease term to grant.
    pub lease_term: u64,
}

/// Outcome of a successful [`RecordStore::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Newly allocated id.
    pub id: TokenId,
    /// Lease end of the new record.
    pub lease_ends_at: Timestamp,
    /// Id of the lapsed record that was replaced.
    pub superseded: Option<TokenId>,
}

/// Owns every domain record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: HashMap<String, DomainRecord>,
    by_id: BTreeMap<TokenId, String>,
    order: Vec<String>,
    next_id: TokenId,
}

impl RecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records (lapsed included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was ever registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next registration will receive.
    #[must_use]
    pub fn next_id(&self) -> TokenId {
        self.next_id
    }

    /// Run every precondition of [`Self::register`] without writing.
    ///
    /// Returns the lease end and the id the registration would receive.
    ///
    /// # Errors
    ///
    /// - `NameTooLong` from the price table
    /// - `AlreadyRegistered` if a non-lapsed record exists
    /// - `InsufficientPayment` if `payment < price(name)`
    /// - `ArithmeticOverflow` if the lease end or id would overflow
    pub fn check_registration(
        &self,
        request: &RegistrationRequest<'_>,
        prices: &PriceTable,
    ) -> Result<(Timestamp, TokenId), RegistryError> {
        let name = request.name.as_str();
        let price = prices.price(name)?;

        if let Some(existing) = self.records.get(name) {
            if !existing.is_lapsed(request.now) {
                return Err(RegistryError::AlreadyRegistered(name.to_string()));
            }
        }

        if request.payment < price {
            return Err(RegistryError::InsufficientPayment {
                required: price,
                provided: request.payment,
            });
        }

        let lease_ends_at = request
            .now
            .checked_add(request.lease_term)
            .ok_or(RegistryError::ArithmeticOverflow("lease end"))?;
        self.next_id
            .checked_add(1)
            .ok_or(RegistryError::ArithmeticOverflow("token id"))?;
        Ok((lease_ends_at, self.next_id))
    }

    /// Register or supersede a name.
    ///
    /// # Errors
    ///
    /// As for [`Self::check_registration`].
    pub fn register(
        &mut self,
        request: RegistrationRequest<'_>,
        prices: &PriceTable,
        owners: &mut OwnerIndex,
    ) -> Result<Allocation, RegistryError> {
        let (lease_ends_at, id) = self.check_registration(&request, prices)?;
        let name = request.name.as_str();
        let previous = self.records.get(name);

        // All checks passed; mutate.
        let superseded = previous.map(|old| (old.id, old.owner));
        if let Some((old_id, old_owner)) = superseded {
            owners.remove(old_owner, name);
            self.by_id.remove(&old_id);
        } else {
            self.order.push(name.to_string());
        }

        self.records.insert(
            name.to_string(),
            DomainRecord {
                name: name.to_string(),
                id,
                owner: request.owner,
                data: request.data,
                registered_at: request.now,
                lease_ends_at,
                price_paid: request.payment,
            },
        );
        self.by_id.insert(id, name.to_string());
        self.next_id = id + 1;
        owners.add(request.owner, name);

        Ok(Allocation {
            id,
            lease_ends_at,
            superseded: superseded.map(|(old_id, _)| old_id),
        })
    }

    /// Look up a record by name.
    ///
    /// # Errors
    ///
    /// `NotFound` if the name was never registered.
    pub fn get(&self, name: &str) -> Result<&DomainRecord, RegistryError> {
        self.records
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Name currently holding token `id`.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` if no live record holds `id` (never allocated, or superseded).
    pub fn name_of(&self, id: TokenId) -> Result<&str, RegistryError> {
        self.by_id
            .get(&id)
            .map(String::as_str)
            .ok_or(RegistryError::TokenNotFound(id))
    }

    /// Look up a record by token id.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` as for [`Self::name_of`].
    pub fn get_by_id(&self, id: TokenId) -> Result<&DomainRecord, RegistryError> {
        let name = self.name_of(id)?;
        self.get(name)
    }

    /// Replace the data payload. Only the owner may do this, and only while
    /// the lease is live.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotOwner`, `LeaseExpired`.
    pub fn modify_data(
        &mut self,
        name: &str,
        caller: Address,
        new_data: String,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if record.owner != caller {
            return Err(RegistryError::NotOwner {
                name: name.to_string(),
                caller,
            });
        }
        if record.is_lapsed(now) {
            return Err(RegistryError::LeaseExpired {
                name: name.to_string(),
                expired_at: record.lease_ends_at,
            });
        }
        record.data = new_data;
        Ok(())
    }

    /// Set a new owner and move the index entry with it. Returns the former owner.
    ///
    /// # Errors
    ///
    /// `NotFound` if the name has no record.
    pub fn set_owner(
        &mut self,
        name: &str,
        new_owner: Address,
        owners: &mut OwnerIndex,
    ) -> Result<Address, RegistryError> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let previous = record.owner;
        record.owner = new_owner;
        owners.transfer(name, previous, new_owner);
        Ok(previous)
    }

    /// Move the lease end forward.
    ///
    /// # Errors
    ///
    /// `NotFound`; `ArithmeticOverflow` if `new_end` would not strictly increase the lease.
    pub fn extend_lease(&mut self, name: &str, new_end: Timestamp) -> Result<(), RegistryError> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if new_end <= record.lease_ends_at {
            return Err(RegistryError::ArithmeticOverflow("lease end"));
        }
        record.lease_ends_at = new_end;
        Ok(())
    }

    /// Names in order of first registration. Each call starts from the beginning.
    pub fn all_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Every live record, unordered.
    pub fn records(&self) -> impl Iterator<Item = &DomainRecord> + '_ {
        self.records.values()
    }

    /// The id → name index, ascending by id.
    pub fn ids(&self) -> impl Iterator<Item = (TokenId, &str)> + '_ {
        self.by_id.iter().map(|(id, name)| (*id, name.as_str()))
    }
}
