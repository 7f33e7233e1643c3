//! # Name Registry Service
//!
//! Async driving-port implementation around [`RegistryEngine`].
//!
//! ## Call Sequence
//!
//! 1. Read `now` from the [`TimeSource`]
//! 2. Take the engine write lock, run the operation, drain queued events
//! 3. Release the lock
//! 4. Publish the drained events
//!
//! ## Withdrawal
//!
//! The balance is zeroed under the lock, the lock is released, and only then
//! is [`PayoutSink::payout`] awaited. A payout that calls back into
//! `withdraw` sees a zero balance. A failed payout retakes the lock and
//! restores the balance.

use crate::config::RegistryConfig;
use crate::domain::engine::RegistryEngine;
use crate::domain::entities::{DomainRecord, RegistrationReceipt, RenewalReceipt};
use crate::domain::invariants::InvariantCheckResult;
use crate::domain::value_objects::{Address, Amount, Timestamp, TokenId};
use crate::errors::{ConfigError, RegistryError};
use crate::events::RegistryEvent;
use crate::metadata::MetadataDocument;
use crate::ports::inbound::NameRegistryApi;
use crate::ports::outbound::{EventPublisher, PayoutSink, TimeSource};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Name registry service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Registry parameters.
    pub registry: RegistryConfig,
}

/// Service statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    pub registrations: u64,
    pub data_updates: u64,
    pub renewals: u64,
    pub transfers: u64,
    pub withdrawals: u64,
    /// Calls that returned an error.
    pub rejected_calls: u64,
    pub events_published: u64,
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Register,
    ModifyData,
    Renew,
    Transfer,
    Withdraw,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::ModifyData => "modify_data",
            Self::Renew => "renew",
            Self::Transfer => "transfer",
            Self::Withdraw => "withdraw",
        }
    }
}

/// The name registry service.
pub struct NameRegistryService<T: TimeSource, P: PayoutSink, E: EventPublisher> {
    config: ServiceConfig,
    engine: RwLock<RegistryEngine>,
    clock: Arc<T>,
    payouts: Arc<P>,
    publisher: Arc<E>,
    stats: RwLock<ServiceStats>,
}

impl<T: TimeSource, P: PayoutSink, E: EventPublisher> NameRegistryService<T, P, E> {
    /// Create a service over an empty registry.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if the registry config fails validation.
    pub fn new(
        config: ServiceConfig,
        clock: Arc<T>,
        payouts: Arc<P>,
        publisher: Arc<E>,
    ) -> Result<Self, ConfigError> {
        let engine = RegistryEngine::new(config.registry.clone())?;
        info!(
            tld = %config.registry.tld,
            controller = %config.registry.controller,
            max_name_length = config.registry.max_name_length,
            "Name registry service started"
        );
        Ok(Self {
            config,
            engine: RwLock::new(engine),
            clock,
            payouts,
            publisher,
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Clone of the current engine state.
    pub async fn snapshot(&self) -> RegistryEngine {
        self.engine.read().await.clone()
    }

    pub async fn check_invariants(&self) -> InvariantCheckResult {
        self.engine.read().await.check_invariants()
    }

    async fn mutate<R, F>(&self, operation: Operation, apply: F) -> Result<R, RegistryError>
    where
        R: Send,
        F: FnOnce(&mut RegistryEngine, Timestamp) -> Result<R, RegistryError> + Send,
    {
        let (result, events) = {
            let mut engine = self.engine.write().await;
            // Read under the lock so timestamps follow the mutation order.
            let now = self.clock.now();
            let result = apply(&mut engine, now);
            #[cfg(feature = "metrics")]
            metrics::treasury(engine.treasury_balance());
            (result, engine.drain_events())
        };

        match result.as_ref().err().cloned() {
            None => self.count_success(operation).await,
            Some(err) => self.count_rejection(operation, &err).await,
        }
        self.publish(events).await;
        result
    }

    async fn publish(&self, events: Vec<RegistryEvent>) {
        if events.is_empty() {
            return;
        }
        let count = events.len() as u64;
        for event in events {
            self.publisher.publish(event).await;
        }
        self.stats.write().await.events_published += count;
    }

    async fn count_success(&self, operation: Operation) {
        let mut stats = self.stats.write().await;
        match operation {
            Operation::Register => stats.registrations += 1,
            Operation::ModifyData => stats.data_updates += 1,
            Operation::Renew => stats.renewals += 1,
            Operation::Transfer => stats.transfers += 1,
            Operation::Withdraw => stats.withdrawals += 1,
        }
        #[cfg(feature = "metrics")]
        metrics::success(operation);
    }

    async fn count_rejection(&self, operation: Operation, err: &RegistryError) {
        warn!(
            operation = operation.as_str(),
            reason = err.reason(),
            error = %err,
            "Registry call rejected"
        );
        self.stats.write().await.rejected_calls += 1;
        #[cfg(feature = "metrics")]
        qns_telemetry::metrics::REJECTIONS_TOTAL
            .with_label_values(&[err.reason()])
            .inc();
    }
}

#[async_trait]
impl<T, P, E> NameRegistryApi for NameRegistryService<T, P, E>
where
    T: TimeSource + 'static,
    P: PayoutSink + 'static,
    E: EventPublisher + 'static,
{
    #[instrument(skip(self, data))]
    async fn register(
        &self,
        caller: Address,
        name: &str,
        data: &str,
        payment: Amount,
    ) -> Result<RegistrationReceipt, RegistryError> {
        self.mutate(Operation::Register, |engine, now| {
            engine.register(caller, name, data, payment, now)
        })
        .await
    }

    #[instrument(skip(self, data))]
    async fn modify_data(
        &self,
        caller: Address,
        name: &str,
        data: &str,
    ) -> Result<(), RegistryError> {
        self.mutate(Operation::ModifyData, |engine, now| {
            engine.modify_data(caller, name, data, now)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn renew(
        &self,
        caller: Address,
        name: &str,
        payment: Amount,
    ) -> Result<RenewalReceipt, RegistryError> {
        self.mutate(Operation::Renew, |engine, now| {
            engine.renew(caller, name, payment, now)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn transfer(
        &self,
        caller: Address,
        name: &str,
        from: Address,
        to: Address,
    ) -> Result<(), RegistryError> {
        self.mutate(Operation::Transfer, |engine, now| {
            engine.transfer(caller, name, from, to, now)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn transfer_token(
        &self,
        caller: Address,
        id: TokenId,
        from: Address,
        to: Address,
    ) -> Result<(), RegistryError> {
        self.mutate(Operation::Transfer, |engine, now| {
            engine.transfer_token(caller, id, from, to, now)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn on_ownership_changed(
        &self,
        name: &str,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        self.mutate(Operation::Transfer, |engine, _now| {
            engine.on_ownership_changed(name, new_owner)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn withdraw(&self, caller: Address) -> Result<Amount, RegistryError> {
        let taken = self.engine.write().await.withdraw(caller);
        let amount = match taken {
            Ok(amount) => amount,
            Err(err) => {
                self.count_rejection(Operation::Withdraw, &err).await;
                return Err(err);
            }
        };

        if amount.is_zero() {
            debug!(controller = %caller, "Nothing to withdraw");
            self.count_success(Operation::Withdraw).await;
            return Ok(amount);
        }

        // Lock released: the payout may re-enter the service.
        if let Err(payout_err) = self.payouts.payout(caller, amount).await {
            self.engine.write().await.restore_withdrawal(amount);
            let err = RegistryError::from(payout_err);
            self.count_rejection(Operation::Withdraw, &err).await;
            return Err(err);
        }

        info!(controller = %caller, amount = %amount, "Treasury withdrawn");
        self.count_success(Operation::Withdraw).await;
        #[cfg(feature = "metrics")]
        metrics::treasury(self.engine.read().await.treasury_balance());
        self.publish(vec![RegistryEvent::Withdrawn {
            controller: caller,
            amount,
        }])
        .await;
        Ok(amount)
    }

    async fn price(&self, name: &str) -> Result<Amount, RegistryError> {
        self.engine.read().await.price(name)
    }

    async fn renew_cost(&self, name: &str) -> Result<Amount, RegistryError> {
        self.engine.read().await.renew_cost(name)
    }

    async fn get_record(&self, name: &str) -> Result<DomainRecord, RegistryError> {
        self.engine.read().await.get_record(name).cloned()
    }

    async fn all_domains(&self) -> Vec<String> {
        self.engine.read().await.all_domains()
    }

    async fn owned_domains(&self, owner: Address) -> Vec<DomainRecord> {
        let engine = self.engine.read().await;
        engine.owned_domains(&owner, self.clock.now())
    }

    async fn balance_of(&self, owner: Address) -> usize {
        self.engine.read().await.balance_of(&owner)
    }

    async fn owner_of(&self, id: TokenId) -> Result<Address, RegistryError> {
        self.engine.read().await.owner_of(id)
    }

    async fn is_lapsed(&self, name: &str) -> Result<bool, RegistryError> {
        let engine = self.engine.read().await;
        engine.is_lapsed(name, self.clock.now())
    }

    async fn render(&self, name: &str) -> Result<MetadataDocument, RegistryError> {
        self.engine.read().await.render(name)
    }

    async fn token_uri(&self, id: TokenId) -> Result<String, RegistryError> {
        self.engine.read().await.token_uri(id)
    }

    async fn max_name_length(&self) -> usize {
        self.engine.read().await.max_name_length()
    }

    async fn treasury_balance(&self) -> Amount {
        self.engine.read().await.treasury_balance()
    }
}

#[cfg(feature = "metrics")]
mod metrics {
    use super::Operation;
    use crate::domain::value_objects::{Amount, U256};
    use qns_telemetry::metrics as m;

    pub(super) fn success(operation: Operation) {
        match operation {
            Operation::Register => m::REGISTRATIONS_TOTAL.inc(),
            Operation::Renew => m::RENEWALS_TOTAL.inc(),
            Operation::Transfer => m::TRANSFERS_TOTAL.inc(),
            Operation::Withdraw => m::WITHDRAWALS_TOTAL.inc(),
            Operation::ModifyData => m::DATA_UPDATES_TOTAL.inc(),
        }
    }

    pub(super) fn treasury(balance: Amount) {
        let value = if balance > U256::from(u128::MAX) {
            f64::MAX
        } else {
            balance.as_u128() as f64
        };
        m::TREASURY_BALANCE.set(value);
    }
}
