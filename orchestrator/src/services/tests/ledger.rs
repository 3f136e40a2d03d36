//! Ledger semantics: windowed lookups, idempotent inserts, rollback removal

use chrono::Duration;

use super::common::{record, t0};
use crate::services::ledger::RealPromotionLedger;
use crate::traits::PromotionLedger;
use shared::TriggerKind;

#[tokio::test]
async fn test_recent_promotion_expires_after_window() {
    let ledger = RealPromotionLedger::new();
    ledger.record_promotion(record("u1", "A1", t0())).await.unwrap();

    let window = Duration::days(7);
    let just_after = t0() + Duration::minutes(1);
    assert!(ledger.has_recent_promotion("u1", "A1", just_after - window).await.unwrap());

    let exactly_seven = t0() + window;
    assert!(ledger.has_recent_promotion("u1", "A1", exactly_seven - window).await.unwrap());

    let past_window = t0() + window + Duration::seconds(1);
    assert!(!ledger.has_recent_promotion("u1", "A1", past_window - window).await.unwrap());
}

#[tokio::test]
async fn test_history_is_per_user() {
    let ledger = RealPromotionLedger::new();
    ledger.record_promotion(record("u1", "A1", t0())).await.unwrap();

    assert!(!ledger.has_recent_promotion("u2", "A1", t0() - Duration::days(7)).await.unwrap());
    assert!(ledger.recent_asins("u2", t0() - Duration::days(7)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_key_is_idempotent() {
    let ledger = RealPromotionLedger::new();

    let first = ledger.record_promotion(record("u1", "A1", t0())).await.unwrap();
    let second = ledger.record_promotion(record("u1", "A1", t0())).await.unwrap();

    assert!(first.was_new);
    assert!(!second.was_new);
    assert_eq!(ledger.total_records().await, 1);
}

#[tokio::test]
async fn test_full_history_allows_repromotion() {
    let ledger = RealPromotionLedger::new();
    ledger.record_promotion(record("u1", "A1", t0())).await.unwrap();
    let later = t0() + Duration::days(8);
    let outcome = ledger.record_promotion(record("u1", "A1", later)).await.unwrap();

    assert!(outcome.was_new);
    let history = ledger.user_history("u1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].promoted_at, later);
}

#[tokio::test]
async fn test_latest_promotion_filters_by_trigger() {
    let ledger = RealPromotionLedger::new();
    let mut auto = record("u1", "A1", t0());
    auto.trigger = TriggerKind::Auto;
    ledger.record_promotion(auto).await.unwrap();
    ledger
        .record_promotion(record("u1", "A2", t0() + Duration::hours(1)))
        .await
        .unwrap();

    let newest = ledger.latest_promotion("u1", None).await.unwrap().unwrap();
    let newest_auto = ledger.latest_promotion("u1", Some(TriggerKind::Auto)).await.unwrap().unwrap();

    assert_eq!(newest.asin, "A2");
    assert_eq!(newest_auto.asin, "A1");
    assert!(ledger.latest_promotion("nobody", None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_promotions_since_and_remove() {
    let ledger = RealPromotionLedger::new();
    let older = record("u1", "OLD", t0() - Duration::days(1));
    let newer = record("u1", "NEW", t0() + Duration::hours(2));
    ledger.record_promotion(older).await.unwrap();
    ledger.record_promotion(newer.clone()).await.unwrap();

    let today = ledger.promotions_since("u1", t0()).await.unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].asin, "NEW");

    assert!(ledger.remove_promotion(&newer.key()).await.unwrap());
    assert!(!ledger.remove_promotion(&newer.key()).await.unwrap());
    assert!(ledger.promotions_since("u1", t0()).await.unwrap().is_empty());
}
