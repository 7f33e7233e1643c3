//! # Payout Reentrancy
//!
//! The controller's payout recipient is attacker code that calls back into
//! the registry while the outer withdrawal is still in flight.
//!
//! ## Attack Vectors
//!
//! - Nested `withdraw` to drain the treasury twice
//! - Registration during the payout, then a failed payout to double-count
//!   the restored balance
//! - Nested withdrawal by a non-controller identity

use async_trait::async_trait;
use qc_18_name_registry::prelude::*;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

/// What the hostile sink does from inside `payout`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reentry {
    /// Call `withdraw` as the same controller.
    Withdraw,
    /// Call `withdraw` as another identity.
    WithdrawAs(Address),
    /// Register `name` with `payment`, then fail the payout.
    RegisterThenFail {
        name: &'static str,
        payment: u64,
    },
}

pub type HostileService = NameRegistryService<ManualTimeSource, HostileSink, InMemoryEventBus>;

/// Payout sink that re-enters the service it serves.
pub struct HostileSink {
    service: OnceLock<Weak<HostileService>>,
    reentry: Reentry,
    nested: Mutex<Vec<Result<Amount, RegistryError>>>,
    received: Mutex<Amount>,
}

impl HostileSink {
    #[must_use]
    pub fn new(reentry: Reentry) -> Self {
        Self {
            service: OnceLock::new(),
            reentry,
            nested: Mutex::new(Vec::new()),
            received: Mutex::new(U256::zero()),
        }
    }

    /// Results of every nested call, in order.
    #[must_use]
    pub fn nested(&self) -> Vec<Result<Amount, RegistryError>> {
        self.nested.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Total accepted by successful payouts.
    #[must_use]
    pub fn received(&self) -> Amount {
        *self.received.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, result: Result<Amount, RegistryError>) {
        self.nested.lock().unwrap_or_else(PoisonError::into_inner).push(result);
    }
}

#[async_trait]
impl PayoutSink for HostileSink {
    async fn payout(&self, to: Address, amount: Amount) -> Result<(), PayoutError> {
        let Some(service) = self.service.get().and_then(Weak::upgrade) else {
            return Err(PayoutError::Unavailable("service dropped".into()));
        };

        match self.reentry {
            Reentry::Withdraw => {
                let nested = service.withdraw(to).await;
                self.record(nested);
            }
            Reentry::WithdrawAs(caller) => {
                let nested = service.withdraw(caller).await;
                self.record(nested);
            }
            Reentry::RegisterThenFail { name, payment } => {
                let paid = U256::from(payment);
                let nested = service.register(to, name, "", paid).await.map(|_| paid);
                self.record(nested);
                return Err(PayoutError::Rejected(to));
            }
        }

        *self.received.lock().unwrap_or_else(PoisonError::into_inner) += amount;
        Ok(())
    }
}

/// Build a service whose payouts go through a [`HostileSink`].
///
/// # Panics
///
/// If the default config fails validation.
#[must_use]
pub fn hostile_service(controller: Address, reentry: Reentry) -> (Arc<HostileService>, Arc<HostileSink>) {
    let sink = Arc::new(HostileSink::new(reentry));
    let service = Arc::new(
        NameRegistryService::new(
            ServiceConfig {
                registry: RegistryConfig::with_controller(controller),
            },
            Arc::new(ManualTimeSource::new(crate::GENESIS)),
            sink.clone(),
            Arc::new(InMemoryEventBus::new()),
        )
        .expect("default config is valid"),
    );
    // A fresh OnceLock accepts exactly one value.
    let _ = sink.service.set(Arc::downgrade(&service));
    (service, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account;

    const CONTROLLER: Address = account(0xC0);
    const ATTACKER: Address = account(0xEE);
    const USER: Address = account(0x11);

    async fn fund(service: &HostileService, names: &[&str]) -> Amount {
        let mut total = U256::zero();
        for name in names {
            let price = service.price(name).await.unwrap();
            service.register(USER, name, "", price).await.unwrap();
            total += price;
        }
        total
    }

    #[tokio::test]
    async fn test_nested_withdraw_cannot_drain_twice() {
        let (service, sink) = hostile_service(CONTROLLER, Reentry::Withdraw);
        let funded = fund(&service, &["abc", "test", "longername"]).await;

        let withdrawn = service.withdraw(CONTROLLER).await.unwrap();

        assert_eq!(withdrawn, funded);
        assert_eq!(sink.nested(), vec![Ok(U256::zero())]);
        assert_eq!(sink.received(), funded);
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.treasury().total_withdrawn(), funded);
        assert!(snapshot.check_invariants().is_valid());
    }

    #[tokio::test]
    async fn test_nested_withdraw_by_attacker_rejected() {
        let (service, sink) = hostile_service(CONTROLLER, Reentry::WithdrawAs(ATTACKER));
        let funded = fund(&service, &["test"]).await;

        assert_eq!(service.withdraw(CONTROLLER).await.unwrap(), funded);
        assert_eq!(
            sink.nested(),
            vec![Err(RegistryError::NotAuthorized { caller: ATTACKER })]
        );
        assert_eq!(service.stats().await.rejected_calls, 1);
    }

    #[tokio::test]
    async fn test_failed_payout_after_nested_registration_keeps_both_amounts() {
        let medium = units_to_amount(5, 3).as_u64();
        let (service, sink) = hostile_service(
            CONTROLLER,
            Reentry::RegisterThenFail {
                name: "late",
                payment: medium,
            },
        );
        let funded = fund(&service, &["test"]).await;

        let err = service.withdraw(CONTROLLER).await.unwrap_err();
        assert!(matches!(err, RegistryError::PayoutFailed(_)));
        assert_eq!(sink.nested(), vec![Ok(U256::from(medium))]);

        // Restored balance plus the payment taken while the lock was free.
        let expected = funded + U256::from(medium);
        assert_eq!(service.treasury_balance().await, expected);
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.treasury().total_collected(), expected);
        assert!(snapshot.treasury().total_withdrawn().is_zero());
        assert!(snapshot.check_invariants().is_valid());
        assert_eq!(service.get_record("late").await.unwrap().owner, CONTROLLER);
    }

    #[tokio::test]
    async fn test_non_controller_never_reaches_payout() {
        let (service, sink) = hostile_service(CONTROLLER, Reentry::Withdraw);
        let funded = fund(&service, &["test"]).await;

        let err = service.withdraw(ATTACKER).await.unwrap_err();
        assert_eq!(err, RegistryError::NotAuthorized { caller: ATTACKER });
        assert!(sink.nested().is_empty());
        assert_eq!(service.treasury_balance().await, funded);
    }
}
