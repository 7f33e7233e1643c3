//! # Integration Test Flows
//!
//! Drives the async registry service end to end over the in-memory adapters.
//!
//! ## Flows Tested:
//!
//! 1. **Deploy → register → query**: pricing, uniqueness, owner index
//! 2. **Transfer by token id**: owner index follows the token
//! 3. **Token URI**: document and embedded image decode cleanly
//! 4. **Lease lifecycle**: renewal, lapse, supersession by a new registrant
//! 5. **Treasury**: withdrawal of everything collected, payout failure

#[cfg(test)]
mod tests {
    use crate::{account, harness, Harness, GENESIS};
    use qc_18_name_registry::config::DEFAULT_LEASE_TERM_SECS;
    use qc_18_name_registry::metadata::AttributeValue;
    use qc_18_name_registry::prelude::*;

    const OWNER: Address = account(0x01);
    const OTHER: Address = account(0x02);
    const THIRD: Address = account(0x03);

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Registry deployed by `OWNER` with `test` and `test1` registered to it.
    async fn deployed_with_two_domains() -> Harness {
        let h = harness(OWNER);
        let api = &h.service;

        let price = api.price("test").await.unwrap();
        api.register(OWNER, "test", "test", price).await.unwrap();
        let price = api.price("test1").await.unwrap();
        api.register(OWNER, "test1", "test1", price).await.unwrap();
        h
    }

    // =============================================================================
    // REGISTRATION
    // =============================================================================

    #[tokio::test]
    async fn test_register_and_query() {
        let h = harness(OWNER);
        let api = &h.service;

        let price = api.price("test").await.unwrap();
        assert_eq!(price, units_to_amount(5, 3));

        let receipt = api.register(OWNER, "test", "test", price).await.unwrap();
        assert_eq!(receipt.id, 0);
        assert_eq!(receipt.superseded, None);
        assert_eq!(receipt.lease_ends_at, GENESIS + DEFAULT_LEASE_TERM_SECS);
        assert_eq!(api.balance_of(OWNER).await, 1);

        let record = api.get_record("test").await.unwrap();
        assert_eq!(record.owner, OWNER);
        assert_eq!(record.data, "test");
        assert_eq!(record.price_paid, price);

        let price1 = api.price("test1").await.unwrap();
        let receipt1 = api.register(OWNER, "test1", "test1", price1).await.unwrap();
        assert_eq!(receipt1.id, 1);
        assert_eq!(api.balance_of(OWNER).await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;
        let price = api.price("test").await.unwrap();

        let err = api.register(OTHER, "test", "mine", price).await.unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("test".into()));
        assert_eq!(api.get_record("test").await.unwrap().owner, OWNER);
        assert_eq!(api.balance_of(OTHER).await, 0);
    }

    #[tokio::test]
    async fn test_zero_payment_rejected() {
        let h = harness(OWNER);
        let api = &h.service;

        let err = api
            .register(OWNER, "test", "test", U256::zero())
            .await
            .unwrap_err();
        assert!(err.is_payment_error());
        assert!(api.all_domains().await.is_empty());
        assert!(api.treasury_balance().await.is_zero());
    }

    #[tokio::test]
    async fn test_name_too_long_rejected() {
        let h = harness(OWNER);
        let api = &h.service;
        assert_eq!(api.max_name_length().await, 10);

        let err = api
            .register(OWNER, "abcdefghijk", "x", units_to_amount(1, 0))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::NameTooLong { length: 11, max: 10 });

        let err = api.price("abcdefghijk").await.unwrap_err();
        assert!(matches!(err, RegistryError::NameTooLong { .. }));
    }

    #[tokio::test]
    async fn test_overpayment_is_retained() {
        let h = harness(OWNER);
        let api = &h.service;
        let paid = units_to_amount(6, 3);

        api.register(OWNER, "ttttt", "x", paid).await.unwrap();
        assert_eq!(api.treasury_balance().await, paid);
        assert_eq!(api.get_record("ttttt").await.unwrap().price_paid, paid);
    }

    // =============================================================================
    // TRANSFERS
    // =============================================================================

    #[tokio::test]
    async fn test_transfer_token_moves_ownership() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;

        api.transfer_token(OWNER, 0, OWNER, OTHER).await.unwrap();
        assert_eq!(api.owner_of(0).await.unwrap(), OTHER);
        assert_eq!(api.balance_of(OWNER).await, 1);
        assert_eq!(api.balance_of(OTHER).await, 1);

        api.transfer(OWNER, "test1", OWNER, OTHER).await.unwrap();
        assert_eq!(api.balance_of(OWNER).await, 0);
        assert_eq!(api.balance_of(OTHER).await, 2);

        let owned = api.owned_domains(OTHER).await;
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|r| r.owner == OTHER));
        assert_eq!(owned[0].name, "test");
        assert_eq!(owned[1].name, "test1");

        assert!(h.service.check_invariants().await.is_valid());
    }

    #[tokio::test]
    async fn test_new_owner_controls_data() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;
        api.transfer(OWNER, "test", OWNER, OTHER).await.unwrap();

        let err = api.modify_data(OWNER, "test", "stale").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotOwner { .. }));

        api.modify_data(OTHER, "test", "fresh").await.unwrap();
        assert_eq!(api.get_record("test").await.unwrap().data, "fresh");
    }

    #[tokio::test]
    async fn test_external_ownership_change_updates_index() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;

        api.on_ownership_changed("test1", THIRD).await.unwrap();
        assert_eq!(api.owner_of(1).await.unwrap(), THIRD);
        assert_eq!(api.balance_of(THIRD).await, 1);
        assert_eq!(api.balance_of(OWNER).await, 1);

        let err = api.on_ownership_changed("nope", THIRD).await.unwrap_err();
        assert_eq!(err, RegistryError::NotFound("nope".into()));
    }

    // =============================================================================
    // METADATA
    // =============================================================================

    #[tokio::test]
    async fn test_token_uri_decodes() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;
        api.modify_data(OWNER, "test", "https://example.com/<profile>")
            .await
            .unwrap();

        let uri = api.token_uri(0).await.unwrap();
        assert!(uri.starts_with("data:application/json;base64,"));

        let document = decode_document(&uri).unwrap();
        assert_eq!(document.name, "test.qns");
        assert_eq!(document.data, "https://example.com/<profile>");
        assert_eq!(
            document.attribute("length"),
            Some(&AttributeValue::Number(4))
        );
        assert_eq!(
            document.attribute("token_id"),
            Some(&AttributeValue::Number(0))
        );

        let svg = decode_image(&document.image).unwrap();
        assert!(check_well_formed(&svg).is_ok());
        assert!(svg.contains("test.qns"));
        assert!(svg.contains("&lt;profile&gt;"));

        assert_eq!(api.render("test").await.unwrap(), document);
    }

    #[tokio::test]
    async fn test_token_uri_unknown_id() {
        let h = deployed_with_two_domains().await;
        let err = h.service.token_uri(7).await.unwrap_err();
        assert_eq!(err, RegistryError::TokenNotFound(7));
    }

    // =============================================================================
    // LEASES
    // =============================================================================

    #[tokio::test]
    async fn test_renewal_by_third_party_extends_live_lease() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;
        let before = api.get_record("test").await.unwrap().lease_ends_at;

        h.clock.advance(1_000);
        let cost = api.renew_cost("test").await.unwrap();
        let receipt = api.renew(THIRD, "test", cost).await.unwrap();

        assert_eq!(receipt.previous_lease_ends_at, before);
        assert_eq!(receipt.lease_ends_at, before + DEFAULT_LEASE_TERM_SECS);
        assert_eq!(api.get_record("test").await.unwrap().owner, OWNER);

        let err = api.renew(THIRD, "test", U256::zero()).await.unwrap_err();
        assert!(err.is_payment_error());
    }

    #[tokio::test]
    async fn test_lapsed_domain_is_superseded() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;

        h.clock.advance(DEFAULT_LEASE_TERM_SECS + 1);
        assert!(api.is_lapsed("test").await.unwrap());
        assert!(api.owned_domains(OWNER).await.is_empty());
        // Lapsed records stay indexed until superseded.
        assert_eq!(api.balance_of(OWNER).await, 2);

        let err = api.modify_data(OWNER, "test", "late").await.unwrap_err();
        assert!(matches!(err, RegistryError::LeaseExpired { .. }));
        let err = api.transfer(OWNER, "test", OWNER, OTHER).await.unwrap_err();
        assert!(matches!(err, RegistryError::LeaseExpired { .. }));

        let price = api.price("test").await.unwrap();
        let receipt = api.register(OTHER, "test", "new era", price).await.unwrap();
        assert_eq!(receipt.id, 2);
        assert_eq!(receipt.superseded, Some(0));

        assert_eq!(api.balance_of(OWNER).await, 1);
        assert_eq!(api.balance_of(OTHER).await, 1);
        assert_eq!(
            api.owner_of(0).await.unwrap_err(),
            RegistryError::TokenNotFound(0)
        );
        assert_eq!(api.owner_of(2).await.unwrap(), OTHER);
        assert_eq!(api.all_domains().await, vec!["test", "test1"]);
        assert!(h.service.check_invariants().await.is_valid());
    }

    #[tokio::test]
    async fn test_lapsed_renewal_restarts_from_now() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;

        h.clock.advance(DEFAULT_LEASE_TERM_SECS + 500);
        let now = GENESIS + DEFAULT_LEASE_TERM_SECS + 500;
        let cost = api.renew_cost("test1").await.unwrap();
        let receipt = api.renew(OWNER, "test1", cost).await.unwrap();

        assert_eq!(receipt.lease_ends_at, now + DEFAULT_LEASE_TERM_SECS);
        assert!(!api.is_lapsed("test1").await.unwrap());
        let owned = api.owned_domains(OWNER).await;
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "test1");
    }

    // =============================================================================
    // TREASURY
    // =============================================================================

    #[tokio::test]
    async fn test_withdraw_collects_everything() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;
        let collected = units_to_amount(10, 3);
        assert_eq!(api.treasury_balance().await, collected);

        let err = api.withdraw(OTHER).await.unwrap_err();
        assert_eq!(err, RegistryError::NotAuthorized { caller: OTHER });

        let withdrawn = api.withdraw(OWNER).await.unwrap();
        assert_eq!(withdrawn, collected);
        assert!(api.treasury_balance().await.is_zero());
        assert_eq!(h.payouts.balance_of(&OWNER), collected);

        // Second withdrawal is a zero no-op.
        assert!(api.withdraw(OWNER).await.unwrap().is_zero());
        assert_eq!(h.payouts.payouts_made(), 1);
    }

    #[tokio::test]
    async fn test_failed_payout_restores_balance() {
        let h = deployed_with_two_domains().await;
        let api = &h.service;
        let collected = api.treasury_balance().await;

        h.payouts.set_offline(true);
        let err = api.withdraw(OWNER).await.unwrap_err();
        assert!(matches!(err, RegistryError::PayoutFailed(_)));
        assert_eq!(api.treasury_balance().await, collected);

        h.payouts.set_offline(false);
        assert_eq!(api.withdraw(OWNER).await.unwrap(), collected);
        assert!(h.service.check_invariants().await.is_valid());
    }

    // =============================================================================
    // EVENTS
    // =============================================================================

    #[tokio::test]
    async fn test_event_stream_follows_state_changes() {
        let h = harness(OWNER);
        let api = &h.service;
        let mut rx = h.bus.subscribe();

        let price = api.price("test").await.unwrap();
        api.register(OWNER, "test", "a", price).await.unwrap();
        api.modify_data(OWNER, "test", "b").await.unwrap();
        api.transfer_token(OWNER, 0, OWNER, OTHER).await.unwrap();
        api.withdraw(OWNER).await.unwrap();
        // Rejected calls publish nothing.
        let _ = api.register(THIRD, "test", "c", price).await;

        let topics: Vec<&str> = h.bus.history().iter().map(RegistryEvent::topic).collect();
        assert_eq!(
            topics,
            vec![
                topics::REGISTERED,
                topics::DATA_MODIFIED,
                topics::TRANSFERRED,
                topics::WITHDRAWN,
            ]
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(
            first,
            RegistryEvent::Registered {
                owner: OWNER,
                name: "test".into(),
                id: 0,
            }
        );

        let stats = h.service.stats().await;
        assert_eq!(stats.registrations, 1);
        assert_eq!(stats.transfers, 1);
        assert_eq!(stats.withdrawals, 1);
        assert_eq!(stats.rejected_calls, 1);
        assert_eq!(stats.events_published, 4);
    }
}
