//! # Owner Index Consistency
//!
//! Call sequences aimed at desynchronising the owner index from the record
//! store: self-transfers, forged `from` arguments, transfers of lapsed
//! leases, supersession races and concurrent registrations of one name.
//!
//! Each test checks the full invariant set after every step.

use qc_18_name_registry::prelude::*;

/// Fail with the violation list if any registry invariant is broken.
///
/// # Panics
///
/// On any invariant violation.
pub fn assert_consistent(engine: &RegistryEngine) {
    if let InvariantCheckResult::Invalid(violations) = engine.check_invariants() {
        panic!("registry invariants violated: {violations:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{account, harness, GENESIS};
    use qc_18_name_registry::config::DEFAULT_LEASE_TERM_SECS;
    use std::collections::HashSet;
    use std::sync::Arc;

    const CONTROLLER: Address = account(0xC0);
    const ALICE: Address = account(0xA1);
    const MALLORY: Address = account(0xEE);

    fn engine_with(names: &[&str], owner: Address) -> RegistryEngine {
        let mut engine = RegistryEngine::new(RegistryConfig::with_controller(CONTROLLER)).unwrap();
        for name in names {
            let price = engine.price(name).unwrap();
            engine.register(owner, name, "", price, GENESIS).unwrap();
        }
        engine
    }

    #[test]
    fn test_self_transfer_keeps_single_entry() {
        let mut engine = engine_with(&["test"], ALICE);

        engine.transfer(ALICE, "test", ALICE, ALICE, GENESIS).unwrap();
        assert_consistent(&engine);
        assert_eq!(engine.balance_of(&ALICE), 1);

        engine.on_ownership_changed("test", ALICE).unwrap();
        assert_consistent(&engine);
        assert_eq!(engine.balance_of(&ALICE), 1);
    }

    #[test]
    fn test_forged_from_is_rejected_without_change() {
        let mut engine = engine_with(&["test"], ALICE);
        let before = engine.clone();

        // Mallory names Alice as `from` but is not the caller Alice.
        let err = engine
            .transfer(MALLORY, "test", ALICE, MALLORY, GENESIS)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotOwner { .. }));

        // Alice calling with a `from` that is not the owner.
        let err = engine
            .transfer(ALICE, "test", MALLORY, MALLORY, GENESIS)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotOwner { .. }));

        let err = engine
            .transfer(ALICE, "test", ALICE, Address::ZERO, GENESIS)
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidRecipient);

        assert_eq!(engine, before);
    }

    #[test]
    fn test_lapsed_lease_cannot_be_moved() {
        let mut engine = engine_with(&["test"], ALICE);
        let later = GENESIS + DEFAULT_LEASE_TERM_SECS + 1;

        let err = engine.transfer(ALICE, "test", ALICE, MALLORY, later).unwrap_err();
        assert!(matches!(err, RegistryError::LeaseExpired { .. }));
        assert_eq!(engine.balance_of(&MALLORY), 0);
        assert_consistent(&engine);
    }

    #[test]
    fn test_stale_token_after_supersession() {
        let mut engine = engine_with(&["test"], ALICE);
        let later = GENESIS + DEFAULT_LEASE_TERM_SECS + 1;
        let price = engine.price("test").unwrap();

        let receipt = engine.register(MALLORY, "test", "", price, later).unwrap();
        assert_eq!(receipt.superseded, Some(0));
        assert_consistent(&engine);

        // Old token id is dead: no transfer, no owner, no metadata.
        let err = engine
            .transfer_token(ALICE, 0, ALICE, ALICE, later)
            .unwrap_err();
        assert_eq!(err, RegistryError::TokenNotFound(0));
        assert_eq!(engine.token_uri(0).unwrap_err(), RegistryError::TokenNotFound(0));
        assert_eq!(engine.balance_of(&ALICE), 0);
        assert!(engine.owned_domains(&ALICE, later).is_empty());
        assert_eq!(engine.owner_of(receipt.id).unwrap(), MALLORY);
    }

    #[test]
    fn test_ping_pong_transfers_stay_consistent() {
        let mut engine = engine_with(&["a", "bb", "ccc", "dddd"], ALICE);
        let names = engine.all_domains();

        for round in 0..20u64 {
            let name = &names[(round as usize) % names.len()];
            let owner = engine.get_record(name).unwrap().owner;
            let next = if owner == ALICE { MALLORY } else { ALICE };
            engine.transfer(owner, name, owner, next, GENESIS + round).unwrap();
            assert_consistent(&engine);
        }

        let total = engine.balance_of(&ALICE) + engine.balance_of(&MALLORY);
        assert_eq!(total, names.len());
    }

    #[test]
    fn test_external_move_to_zero_keeps_index_inverse() {
        let mut engine = engine_with(&["test"], ALICE);

        engine.on_ownership_changed("test", Address::ZERO).unwrap();
        assert_consistent(&engine);
        assert_eq!(engine.balance_of(&ALICE), 0);
        assert_eq!(engine.balance_of(&Address::ZERO), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_of_one_name() {
        let h = harness(CONTROLLER);
        let price = h.service.price("race").await.unwrap();

        let mut handles = Vec::new();
        for seed in 1..=16u8 {
            let service = Arc::clone(&h.service);
            handles.push(tokio::spawn(async move {
                service.register(account(seed), "race", "", price).await
            }));
        }

        let mut winners = HashSet::new();
        for handle in handles {
            if let Ok(receipt) = handle.await.unwrap() {
                winners.insert(receipt.owner);
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(h.service.treasury_balance().await, price);
        assert_eq!(h.service.stats().await.rejected_calls, 15);
        assert_consistent(&h.service.snapshot().await);
    }
}
