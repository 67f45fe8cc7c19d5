use super::*;

use chrono::{DateTime, Duration, TimeZone};

use crate::config::SynonymBackend;
use crate::item::{ItemStatus, MatchMethod};
use crate::persistence::MemoryItemStore;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
}

fn offline_config() -> EngineConfig {
    EngineConfig {
        synonym_backend: SynonymBackend::Builtin,
        ..Default::default()
    }
}

fn engine_with(items: impl IntoIterator<Item = Item>) -> MatchEngine<MemoryItemStore> {
    MatchEngine::from_config(offline_config(), Arc::new(MemoryItemStore::with_items(items)))
}

fn lost_wallet() -> Item {
    Item::lost(
        "student-17",
        "Black Leather Wallet",
        "Leather wallet with student ID card",
        "Library",
        day(1),
    )
}

fn found_wallet(when: DateTime<Utc>) -> Item {
    Item::found(
        "staff-4",
        "Dark Brown Leather Wallet",
        "Found a leather wallet with a student ID card",
        "Library",
        when,
    )
    .with_verification("What colour is the wallet?", "dark brown leather")
}

#[tokio::test]
async fn test_new_lost_item_matches_and_records_both_sides() {
    let found = found_wallet(day(2));
    let umbrella = Item::found("staff-9", "Blue Umbrella", "Folding umbrella", "Library", day(2));
    let engine = engine_with([found.clone(), umbrella]);

    let outcome = engine.on_item_created(lost_wallet()).await.unwrap();

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].item_id, found.id());
    assert_eq!(outcome.matches[0].method, MatchMethod::TextOnly);
    assert!(outcome.persistence.as_ref().unwrap().is_complete());

    assert_eq!(outcome.events.len(), 1);
    let event = &outcome.events[0];
    assert_eq!(event.lost_item_id, outcome.item.id());
    assert_eq!(event.found_item_id, found.id());
    assert_eq!(event.lost_owner_id, "student-17");
    assert_eq!(event.found_owner_id, "staff-4");

    let stored_found = engine.store().get(found.id()).unwrap();
    assert_eq!(stored_found.matches().len(), 1);
    assert_eq!(stored_found.matches()[0].target_id(), outcome.item.id());

    let shown = engine.matches_for(outcome.item.id()).await.unwrap();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].similarity_percent(), outcome.matches[0].similarity_percent);
}

#[tokio::test]
async fn test_found_before_lost_is_not_matched() {
    let engine = engine_with([found_wallet(day(0))]);

    let outcome = engine.on_item_created(lost_wallet()).await.unwrap();

    assert!(outcome.matches.is_empty());
    assert!(!outcome.is_matched());
    assert!(outcome.item.matches().is_empty());
}

#[tokio::test]
async fn test_new_found_item_matches_existing_lost_item() {
    let lost = lost_wallet();
    let engine = engine_with([lost.clone()]);

    let outcome = engine.on_item_created(found_wallet(day(2))).await.unwrap();

    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].lost_item_id, lost.id());
    assert_eq!(outcome.events[0].found_owner_id, "staff-4");
}

#[tokio::test]
async fn test_invalid_item_is_rejected() {
    let engine = engine_with(Vec::new());
    let item = Item::lost("student-17", "  ", "", "Library", day(1));

    let err = engine.on_item_created(item).await.unwrap_err();
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_store_failures_do_not_fail_creation() {
    let found = found_wallet(day(2));
    let engine = engine_with([found.clone()]);
    engine.store().fail_all_saves(true);

    let outcome = engine.on_item_created(lost_wallet()).await.unwrap();

    let report = outcome.persistence.unwrap();
    assert!(!report.primary_saved);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(outcome.matches.len(), 1);
}

#[tokio::test]
async fn test_verify_claim_answer() {
    let found = found_wallet(day(2));
    let engine = engine_with([found.clone()]);

    let accepted = engine
        .verify_claim_answer(found.id(), "brown leather")
        .await
        .unwrap();
    assert!(accepted.is_verified);
    assert_eq!(accepted.threshold, 0.75);

    let rejected = engine
        .verify_claim_answer(found.id(), "blue phone")
        .await
        .unwrap();
    assert!(!rejected.is_verified);
}

#[tokio::test]
async fn test_verify_without_stored_answer_is_input_error() {
    let found = Item::found("staff-4", "Wallet", "", "Library", day(2));
    let engine = engine_with([found.clone()]);

    let err = engine
        .verify_claim_answer(found.id(), "brown leather")
        .await
        .unwrap_err();
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_approved_claim_removes_items_from_future_pools() {
    let lost = lost_wallet();
    let found = found_wallet(day(2));
    let engine = engine_with([lost.clone(), found.clone()]);

    let mut claim = Claim::open(&lost, &found).unwrap();
    let verdict = engine.process_claim(&mut claim, "brown leather").await.unwrap();

    assert!(verdict.is_verified);
    assert_eq!(claim.status, ClaimStatus::Approved);
    assert_eq!(engine.store().get(lost.id()).unwrap().status(), ItemStatus::Claimed);
    assert_eq!(engine.store().get(found.id()).unwrap().status(), ItemStatus::Claimed);

    let another = Item::lost(
        "student-30",
        "Black Leather Wallet",
        "Leather wallet with student ID card",
        "Library",
        day(1),
    );
    let outcome = engine.on_item_created(another).await.unwrap();
    assert!(outcome.matches.is_empty());
}

#[tokio::test]
async fn test_rejected_claim_leaves_items_active() {
    let lost = lost_wallet();
    let found = found_wallet(day(2));
    let engine = engine_with([lost.clone(), found.clone()]);

    let mut claim = Claim::open(&lost, &found).unwrap();
    let verdict = engine.process_claim(&mut claim, "blue phone").await.unwrap();

    assert!(!verdict.is_verified);
    assert_eq!(claim.status, ClaimStatus::Rejected);
    assert!(engine.store().get(found.id()).unwrap().is_active());
}

#[tokio::test]
async fn test_items_for_owner_uses_display_threshold() {
    let found = found_wallet(day(2));
    let engine = engine_with([found.clone()]);
    engine.on_item_created(lost_wallet()).await.unwrap();

    let listed = engine.items_for_owner("staff-4").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].matches.len(), 1);
}
