//! In-memory promotion ledger
//!
//! Full history is kept per user, keyed by `(promoted_at, asin)`, so rotation
//! windows are answered by time range and old promotions age out naturally.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

use crate::error::OrchestratorResult;
use crate::traits::PromotionLedger;
use shared::{process_debug, ProcessId, PromotionKey, PromotionRecord, RecordOutcome, TriggerKind};

type UserLedger = BTreeMap<(DateTime<Utc>, String), PromotionRecord>;

#[derive(Default)]
pub struct RealPromotionLedger {
    records: RwLock<HashMap<String, UserLedger>>,
}

impl RealPromotionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn total_records(&self) -> usize {
        self.records.read().await.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl PromotionLedger for RealPromotionLedger {
    async fn has_recent_promotion(&self, user_id: &str, asin: &str, since: DateTime<Utc>) -> OrchestratorResult<bool> {
        let records = self.records.read().await;
        Ok(records.get(user_id).is_some_and(|ledger| {
            ledger
                .range((since, String::new())..)
                .any(|(_, record)| record.asin == asin)
        }))
    }

    async fn recent_asins(&self, user_id: &str, since: DateTime<Utc>) -> OrchestratorResult<HashSet<String>> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .map(|ledger| {
                ledger
                    .range((since, String::new())..)
                    .map(|(_, record)| record.asin.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn record_promotion(&self, record: PromotionRecord) -> OrchestratorResult<RecordOutcome> {
        let mut records = self.records.write().await;
        let ledger = records.entry(record.user_id.clone()).or_default();
        let key = (record.promoted_at, record.asin.clone());

        if ledger.contains_key(&key) {
            process_debug!(
                ProcessId::current(),
                "Ledger already holds {} for {} at {}",
                record.asin,
                record.user_id,
                record.promoted_at
            );
            return Ok(RecordOutcome { was_new: false });
        }

        ledger.insert(key, record);
        Ok(RecordOutcome { was_new: true })
    }

    async fn remove_promotion(&self, key: &PromotionKey) -> OrchestratorResult<bool> {
        let mut records = self.records.write().await;
        let removed = records
            .get_mut(&key.user_id)
            .and_then(|ledger| ledger.remove(&(key.promoted_at, key.asin.clone())))
            .is_some();
        Ok(removed)
    }

    async fn promotions_since(&self, user_id: &str, since: DateTime<Utc>) -> OrchestratorResult<Vec<PromotionRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .map(|ledger| {
                ledger
                    .range((since, String::new())..)
                    .map(|(_, record)| record.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn latest_promotion(
        &self,
        user_id: &str,
        trigger: Option<TriggerKind>,
    ) -> OrchestratorResult<Option<PromotionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(user_id).and_then(|ledger| {
            ledger
                .values()
                .rev()
                .find(|record| trigger.map_or(true, |kind| record.trigger == kind))
                .cloned()
        }))
    }

    async fn user_history(&self, user_id: &str) -> OrchestratorResult<Vec<PromotionRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .map(|ledger| ledger.values().rev().cloned().collect())
            .unwrap_or_default())
    }
}
