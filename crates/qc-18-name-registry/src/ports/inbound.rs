//! # Driving Ports (API - Inbound)
//!
//! The public API of the name registry. Every mutating call takes the
//! authenticated caller; the current time comes from the service's
//! [`crate::ports::outbound::TimeSource`].

use crate::domain::entities::{DomainRecord, RegistrationReceipt, RenewalReceipt};
use crate::domain::value_objects::{Address, Amount, TokenId};
use crate::errors::RegistryError;
use crate::metadata::MetadataDocument;
use async_trait::async_trait;

/// Name registry API.
///
/// Each call is atomic: it either applies completely or returns an error and
/// changes nothing.
#[async_trait]
pub trait NameRegistryApi: Send + Sync {
    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Register `name` for `caller`, paying `payment`.
    ///
    /// # Errors
    ///
    /// `NameTooLong`, `InvalidName`, `DataTooLong`, `AlreadyRegistered`,
    /// `InsufficientPayment`, `ArithmeticOverflow`.
    async fn register(
        &self,
        caller: Address,
        name: &str,
        data: &str,
        payment: Amount,
    ) -> Result<RegistrationReceipt, RegistryError>;

    /// Replace the data of a record owned by `caller`.
    async fn modify_data(&self, caller: Address, name: &str, data: &str)
        -> Result<(), RegistryError>;

    /// Extend a lease. Any caller may pay.
    async fn renew(
        &self,
        caller: Address,
        name: &str,
        payment: Amount,
    ) -> Result<RenewalReceipt, RegistryError>;

    /// Transfer `name` from `from` to `to`.
    async fn transfer(
        &self,
        caller: Address,
        name: &str,
        from: Address,
        to: Address,
    ) -> Result<(), RegistryError>;

    /// Transfer by token id.
    async fn transfer_token(
        &self,
        caller: Address,
        id: TokenId,
        from: Address,
        to: Address,
    ) -> Result<(), RegistryError>;

    /// Notification from the transfer protocol that `name` changed hands.
    async fn on_ownership_changed(&self, name: &str, new_owner: Address)
        -> Result<(), RegistryError>;

    /// Pay the whole treasury balance to the controller.
    ///
    /// # Errors
    ///
    /// `NotAuthorized`, `PayoutFailed`.
    async fn withdraw(&self, caller: Address) -> Result<Amount, RegistryError>;

    // =========================================================================
    // QUERIES
    // =========================================================================

    async fn price(&self, name: &str) -> Result<Amount, RegistryError>;

    async fn renew_cost(&self, name: &str) -> Result<Amount, RegistryError>;

    async fn get_record(&self, name: &str) -> Result<DomainRecord, RegistryError>;

    /// Names in order of first registration.
    async fn all_domains(&self) -> Vec<String>;

    /// Non-lapsed records held by `owner`, ascending by id.
    async fn owned_domains(&self, owner: Address) -> Vec<DomainRecord>;

    async fn balance_of(&self, owner: Address) -> usize;

    async fn owner_of(&self, id: TokenId) -> Result<Address, RegistryError>;

    async fn is_lapsed(&self, name: &str) -> Result<bool, RegistryError>;

    async fn render(&self, name: &str) -> Result<MetadataDocument, RegistryError>;

    /// `data:application/json;base64,` document for token `id`.
    async fn token_uri(&self, id: TokenId) -> Result<String, RegistryError>;

    async fn max_name_length(&self) -> usize;

    async fn treasury_balance(&self) -> Amount;
}
