//! End-to-end ledger behavior against in-memory collaborators.

mod common;

use common::*;
use tipjar_ledger::registry::RegistryError;
use tipjar_ledger::types::{
    AccountId, Amount, ContentDigest, ResourceId, SuggestionState, TipJarEvent, TipKey,
    BLOCK_PERIOD, COOLDOWN_PERIOD,
};
use tipjar_ledger::{ErrorKind, TipJar, TipJarError};

// ---------------------------------------------------------------------------
// Invocation Catalog
// ---------------------------------------------------------------------------

#[test]
fn suggestion_is_recorded_once() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hello", &alice(), Amount::ZERO)
        .unwrap();

    assert_eq!(digest, TipJar::digest_of("hello"));
    let record = fx.jar.content(&digest).unwrap();
    assert_eq!(record.text, "hello");
    assert_eq!(record.suggested_for, resource());
    assert_eq!(record.suggested_by, alice());
    assert_eq!(record.recorded_at, START);
    assert_eq!(fx.jar.total(&resource(), &digest), Amount::ZERO);
    assert_eq!(fx.jar.state(&resource(), &digest), SuggestionState::Active);

    let err = fx
        .jar
        .suggest(&resource(), "hello", &bob(), Amount::ZERO)
        .unwrap_err();
    assert_eq!(err, TipJarError::AlreadySuggested(digest));
    assert_eq!(fx.jar.content(&digest).unwrap().suggested_by, alice());
}

#[test]
fn content_longer_than_limit_is_rejected() {
    let fx = Fixture::new();
    let text = "x".repeat(MAX_LEN + 1);

    let err = fx
        .jar
        .suggest(&resource(), &text, &alice(), Amount::new(100))
        .unwrap_err();
    assert_eq!(
        err,
        TipJarError::ContentTooLong {
            resource: resource(),
            length: MAX_LEN + 1,
            max: MAX_LEN,
        }
    );
    assert!(fx.jar.content(&TipJar::digest_of(&text)).is_none());

    // Exactly at the limit is fine.
    let text = "x".repeat(MAX_LEN);
    assert!(fx
        .jar
        .suggest(&resource(), &text, &alice(), Amount::ZERO)
        .is_ok());
}

#[test]
fn length_is_measured_in_bytes() {
    let fx = Fixture::new();
    // 22 four-byte characters: 88 bytes, 22 chars.
    let text = "🦀".repeat(22);
    assert!(matches!(
        fx.jar.suggest(&resource(), &text, &alice(), Amount::ZERO),
        Err(TipJarError::ContentTooLong { length: 88, .. })
    ));
}

#[test]
fn unknown_resource_is_an_external_error() {
    let fx = Fixture::new();
    let unknown = ResourceId::new("punks", "1");
    let err = fx
        .jar
        .suggest(&unknown, "hello", &alice(), Amount::ZERO)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::External);
    assert_eq!(
        err,
        TipJarError::Registry(RegistryError::UnknownResource(unknown))
    );
}

// ---------------------------------------------------------------------------
// Tip Ledger
// ---------------------------------------------------------------------------

#[test]
fn tips_pool_per_suggestion() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();

    assert_eq!(fx.jar.total(&resource(), &digest), Amount::new(100));
    assert_eq!(
        fx.jar.contribution(&alice(), &resource(), &digest),
        Amount::new(100)
    );

    let total = fx
        .jar
        .tip(&resource(), &digest, Amount::new(50), &bob())
        .unwrap();
    assert_eq!(total, Amount::new(150));
    assert_eq!(fx.jar.total(&resource(), &digest), Amount::new(150));
    assert_eq!(
        fx.jar.contribution(&bob(), &resource(), &digest),
        Amount::new(50)
    );
    assert_eq!(fx.jar.custody(), Ok(Amount::new(150)));
    assert!(fx.jar.conservation_violations().is_empty());
}

#[test]
fn tip_input_validation() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::ZERO)
        .unwrap();

    assert_eq!(
        fx.jar
            .tip(&resource(), &ContentDigest::ZERO, Amount::new(1), &bob()),
        Err(TipJarError::ZeroHash)
    );
    assert_eq!(
        fx.jar.tip(&resource(), &digest, Amount::ZERO, &bob()),
        Err(TipJarError::ZeroAmount)
    );

    let missing = TipJar::digest_of("never suggested");
    assert_eq!(
        fx.jar.tip(&resource(), &missing, Amount::new(1), &bob()),
        Err(TipJarError::ContentNotFound(missing))
    );
}

#[test]
fn tipping_on_another_resource_rechecks_length() {
    let fx = Fixture::new();
    let small = ResourceId::new("punks", "1");
    fx.registry.register(small.clone(), keeper(), 4);

    let digest = fx
        .jar
        .suggest(&resource(), "hello", &alice(), Amount::ZERO)
        .unwrap();

    assert!(matches!(
        fx.jar.tip(&small, &digest, Amount::new(10), &bob()),
        Err(TipJarError::ContentTooLong { length: 5, max: 4, .. })
    ));

    fx.registry.set_max_content_length(&small, 5).unwrap();
    assert_eq!(
        fx.jar.tip(&small, &digest, Amount::new(10), &bob()),
        Ok(Amount::new(10))
    );
    // Pools are independent per resource.
    assert_eq!(fx.jar.total(&resource(), &digest), Amount::ZERO);
}

#[test]
fn withdraw_returns_whole_contribution() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.jar
        .tip(&resource(), &digest, Amount::new(30), &alice())
        .unwrap();
    fx.jar
        .tip(&resource(), &digest, Amount::new(50), &bob())
        .unwrap();

    assert_eq!(
        fx.jar.withdraw(&resource(), &digest, &alice()),
        Ok(Amount::new(130))
    );
    assert_eq!(fx.treasury.balance_of(&alice()), Amount::new(130));
    assert_eq!(fx.jar.total(&resource(), &digest), Amount::new(50));
    assert_eq!(
        fx.jar.contribution(&alice(), &resource(), &digest),
        Amount::ZERO
    );

    assert!(matches!(
        fx.jar.withdraw(&resource(), &digest, &alice()),
        Err(TipJarError::NoSuchTip { .. })
    ));
}

#[test]
fn batch_withdraw_pays_once() {
    let fx = Fixture::new();
    let first = fx
        .jar
        .suggest(&resource(), "first", &alice(), Amount::new(10))
        .unwrap();
    let second = fx
        .jar
        .suggest(&resource(), "second", &alice(), Amount::new(20))
        .unwrap();

    let paid = fx
        .jar
        .batch_withdraw(&[(resource(), first), (resource(), second)], &alice())
        .unwrap();
    assert_eq!(paid, Amount::new(30));

    let payouts = fx.treasury.payouts();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].to, alice());
    assert_eq!(payouts[0].amount, Amount::new(30));
    assert_eq!(fx.jar.custody(), Ok(Amount::ZERO));
}

#[test]
fn batch_withdraw_is_all_or_nothing() {
    let fx = Fixture::new();
    let first = fx
        .jar
        .suggest(&resource(), "first", &alice(), Amount::new(10))
        .unwrap();
    let unfunded = fx
        .jar
        .suggest(&resource(), "second", &bob(), Amount::ZERO)
        .unwrap();
    let events_before = fx.jar.events().len();

    assert!(matches!(
        fx.jar
            .batch_withdraw(&[(resource(), first), (resource(), unfunded)], &alice()),
        Err(TipJarError::NoSuchTip { .. })
    ));
    assert_eq!(
        fx.jar.contribution(&alice(), &resource(), &first),
        Amount::new(10)
    );
    assert_eq!(fx.jar.events().len(), events_before);
    assert!(fx.treasury.payouts().is_empty());
}

#[test]
fn empty_batch_pays_nothing() {
    let fx = Fixture::new();
    assert_eq!(fx.jar.batch_withdraw(&[], &alice()), Ok(Amount::ZERO));
    assert!(fx.treasury.payouts().is_empty());
}

// ---------------------------------------------------------------------------
// Claim Gate
// ---------------------------------------------------------------------------

#[test]
fn claim_respects_minimum_and_fires_once() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.jar
        .tip(&resource(), &digest, Amount::new(50), &bob())
        .unwrap();
    fx.registry.record_invocation(&resource(), 3, digest).unwrap();

    assert_eq!(
        fx.jar
            .claim(&resource(), &digest, 3, Amount::new(200), &bob()),
        Err(TipJarError::MinimumUnmet {
            total: Amount::new(150),
            minimum: Amount::new(200),
        })
    );

    let receipt = fx
        .jar
        .claim(&resource(), &digest, 3, Amount::new(100), &bob())
        .unwrap();
    assert_eq!(receipt.keeper, keeper());
    assert_eq!(receipt.amount, Amount::new(150));
    assert_eq!(receipt.invocation_index, 3);
    assert_eq!(fx.treasury.balance_of(&keeper()), Amount::new(150));
    assert!(fx.jar.is_claimed(&resource(), &digest));
    assert_eq!(fx.jar.state(&resource(), &digest), SuggestionState::Claimed);
    assert_eq!(fx.jar.custody(), Ok(Amount::ZERO));

    assert!(matches!(
        fx.jar.claim(&resource(), &digest, 3, Amount::ZERO, &bob()),
        Err(TipJarError::AlreadyClaimed(_))
    ));
    assert_eq!(fx.treasury.payouts().len(), 1);
}

#[test]
fn claimed_pool_is_final() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.registry.record_invocation(&resource(), 0, digest).unwrap();
    fx.jar
        .claim(&resource(), &digest, 0, Amount::ZERO, &alice())
        .unwrap();

    assert!(matches!(
        fx.jar.withdraw(&resource(), &digest, &alice()),
        Err(TipJarError::AlreadyClaimed(_))
    ));
    assert!(matches!(
        fx.jar.tip(&resource(), &digest, Amount::new(5), &bob()),
        Err(TipJarError::AlreadyClaimed(_))
    ));
    assert!(matches!(
        fx.jar.block(&resource(), &digest, Amount::ZERO, &keeper()),
        Err(TipJarError::AlreadyClaimed(_))
    ));
}

#[test]
fn claim_without_proof_is_rejected_and_reverted() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.registry
        .record_invocation(&resource(), 1, TipJar::digest_of("something else"))
        .unwrap();

    assert_eq!(
        fx.jar.claim(&resource(), &digest, 1, Amount::ZERO, &keeper()),
        Err(TipJarError::NotSuggested {
            resource: resource(),
            digest,
            index: 1,
        })
    );
    assert!(!fx.jar.is_claimed(&resource(), &digest));
    assert_eq!(fx.jar.total(&resource(), &digest), Amount::new(100));
    assert!(fx.treasury.payouts().is_empty());
}

#[test]
fn claim_on_empty_pool_has_nothing_to_claim() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::ZERO)
        .unwrap();
    fx.registry.record_invocation(&resource(), 0, digest).unwrap();

    assert!(matches!(
        fx.jar.claim(&resource(), &digest, 0, Amount::ZERO, &keeper()),
        Err(TipJarError::NothingToClaim(_))
    ));
}

#[test]
fn claim_pays_keeper_at_claim_time() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.registry.record_invocation(&resource(), 0, digest).unwrap();

    let successor = AccountId::new("successor");
    fx.registry
        .transfer_keeper(&resource(), successor.clone())
        .unwrap();

    let receipt = fx
        .jar
        .claim(&resource(), &digest, 0, Amount::ZERO, &alice())
        .unwrap();
    assert_eq!(receipt.keeper, successor);
    assert_eq!(fx.treasury.balance_of(&successor), Amount::new(100));
    assert_eq!(fx.treasury.balance_of(&keeper()), Amount::ZERO);
}

#[test]
fn claim_without_keeper_is_reverted() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.registry.record_invocation(&resource(), 0, digest).unwrap();
    fx.registry.clear_keeper(&resource()).unwrap();

    let err = fx
        .jar
        .claim(&resource(), &digest, 0, Amount::ZERO, &alice())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::External);
    assert!(!fx.jar.is_claimed(&resource(), &digest));
}

// ---------------------------------------------------------------------------
// Withdrawal Lock
// ---------------------------------------------------------------------------

#[test]
fn block_freezes_tips_and_withdrawals() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();

    let until = fx
        .jar
        .block(&resource(), &digest, Amount::ZERO, &keeper())
        .unwrap();
    assert_eq!(until, START.plus(BLOCK_PERIOD));
    assert_eq!(fx.jar.blocked_until(&resource(), &digest), Some(until));
    assert_eq!(
        fx.jar.state(&resource(), &digest),
        SuggestionState::Blocked { until }
    );

    fx.clock.advance(BLOCK_PERIOD - 1);
    assert_eq!(
        fx.jar.tip(&resource(), &digest, Amount::new(5), &bob()),
        Err(TipJarError::WindowBlocked {
            key: TipKey::new(resource(), digest),
            until,
        })
    );
    assert!(matches!(
        fx.jar.withdraw(&resource(), &digest, &alice()),
        Err(TipJarError::WindowBlocked { .. })
    ));

    fx.clock.advance(2);
    assert_eq!(
        fx.jar.withdraw(&resource(), &digest, &alice()),
        Ok(Amount::new(100))
    );
    assert_eq!(fx.jar.state(&resource(), &digest), SuggestionState::Active);
}

#[test]
fn block_also_freezes_claims() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.registry.record_invocation(&resource(), 0, digest).unwrap();
    fx.jar
        .block(&resource(), &digest, Amount::ZERO, &keeper())
        .unwrap();

    let err = fx
        .jar
        .claim(&resource(), &digest, 0, Amount::ZERO, &keeper())
        .unwrap_err();
    assert!(err.is_timing());

    fx.clock.advance(BLOCK_PERIOD);
    assert!(fx
        .jar
        .claim(&resource(), &digest, 0, Amount::ZERO, &keeper())
        .is_ok());
}

#[test]
fn block_is_keeper_only_and_minimum_guarded() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();

    assert_eq!(
        fx.jar.block(&resource(), &digest, Amount::ZERO, &alice()),
        Err(TipJarError::NotKeeper {
            caller: alice(),
            resource: resource(),
        })
    );
    assert!(matches!(
        fx.jar
            .block(&resource(), &digest, Amount::new(101), &keeper()),
        Err(TipJarError::MinimumUnmet { .. })
    ));
    assert_eq!(fx.jar.blocked_until(&resource(), &digest), None);
}

#[test]
fn block_cooldown() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.jar
        .block(&resource(), &digest, Amount::ZERO, &keeper())
        .unwrap();

    // Window over, cooldown still running.
    fx.clock.advance(BLOCK_PERIOD + 60);
    assert_eq!(
        fx.jar.block(&resource(), &digest, Amount::ZERO, &keeper()),
        Err(TipJarError::CooldownPending {
            key: TipKey::new(resource(), digest),
            ready_at: START.plus(COOLDOWN_PERIOD),
        })
    );

    fx.clock.set(START.plus(COOLDOWN_PERIOD));
    let until = fx
        .jar
        .block(&resource(), &digest, Amount::ZERO, &keeper())
        .unwrap();
    assert_eq!(until, START.plus(COOLDOWN_PERIOD + BLOCK_PERIOD));
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

#[test]
fn journal_records_committed_events_in_order() {
    let fx = Fixture::new();
    let digest = fx
        .jar
        .suggest(&resource(), "hi", &alice(), Amount::new(100))
        .unwrap();
    fx.jar
        .block(&resource(), &digest, Amount::ZERO, &keeper())
        .unwrap();
    // Rejected, leaves no trace.
    let _ = fx.jar.tip(&resource(), &digest, Amount::new(5), &bob());
    fx.clock.advance(BLOCK_PERIOD);
    fx.jar.withdraw(&resource(), &digest, &alice()).unwrap();

    let names: Vec<&str> = fx
        .jar
        .events()
        .iter()
        .map(|entry| entry.event.name())
        .collect();
    assert_eq!(
        names,
        vec![
            "SuggestionRecorded",
            "TipRecorded",
            "WithdrawalsBlocked",
            "TipWithdrawn"
        ]
    );
    assert!(fx.jar.verify_journal());

    let events = fx.jar.events();
    assert!(matches!(
        &events[1].event,
        TipJarEvent::TipRecorded { amount, .. } if *amount == Amount::new(100)
    ));
    assert_eq!(events[3].recorded_at, START.plus(BLOCK_PERIOD));
}
