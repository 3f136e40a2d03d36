//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the Scheduler talks to sits behind one of these traits
//! so cycles can be exercised against mocks or the in-memory services.

use chrono::{DateTime, Utc};
use shared::{
    Campaign, CatalogEntry, ChannelCredentials, Platform, Product, PromotionKey, PromotionRecord, RecordOutcome,
    TriggerKind, UpsertOutcome, UserSnapshot,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::message::PromotionMessage;
use crate::error::{ChannelError, OrchestratorResult};

/// Promotion counters of a product, captured before `mark_promoted` so a
/// failed recording step can put them back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionStats {
    pub times_promoted: u32,
    pub last_promoted_at: Option<DateTime<Utc>>,
}

/// Successful delivery to one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReceipt {
    pub platform: Platform,
    pub http_status: u16,
    /// Remote message id when the API returns one
    pub post_id: Option<String>,
}

/// Catalog of promotable products
#[mockall::automock]
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// Merge by ASIN; descriptive fields are overwritten, promotion stats kept
    async fn upsert(&self, entry: CatalogEntry) -> OrchestratorResult<UpsertOutcome>;

    async fn get(&self, asin: &str) -> OrchestratorResult<Option<Product>>;

    /// Candidates not in `exclude`, ordered trending first, then by conversion
    /// rate, least promoted, and rating
    async fn query_eligible(
        &self,
        exclude: &HashSet<String>,
        category: Option<String>,
        active_only: bool,
    ) -> OrchestratorResult<Vec<Product>>;

    /// Bump `times_promoted` and stamp `last_promoted_at`.
    ///
    /// Returns the previous stats, or `None` (with a warning) for an unknown ASIN.
    async fn mark_promoted(&self, asin: &str, at: DateTime<Utc>) -> OrchestratorResult<Option<PromotionStats>>;

    /// Undo a `mark_promoted` during rollback
    async fn restore_stats(&self, asin: &str, stats: PromotionStats) -> OrchestratorResult<()>;
}

/// Append-only history of successful promotions, one row per event
#[mockall::automock]
#[async_trait::async_trait]
pub trait PromotionLedger: Send + Sync {
    async fn has_recent_promotion(&self, user_id: &str, asin: &str, since: DateTime<Utc>) -> OrchestratorResult<bool>;

    /// ASINs promoted to the user at or after `since`
    async fn recent_asins(&self, user_id: &str, since: DateTime<Utc>) -> OrchestratorResult<HashSet<String>>;

    /// Insert a record; an identical key is reported with `was_new = false`
    async fn record_promotion(&self, record: PromotionRecord) -> OrchestratorResult<RecordOutcome>;

    /// Delete a record written earlier in the same cycle
    async fn remove_promotion(&self, key: &PromotionKey) -> OrchestratorResult<bool>;

    async fn promotions_since(&self, user_id: &str, since: DateTime<Utc>) -> OrchestratorResult<Vec<PromotionRecord>>;

    /// Newest record for the user, optionally limited to one trigger kind
    async fn latest_promotion(
        &self,
        user_id: &str,
        trigger: Option<TriggerKind>,
    ) -> OrchestratorResult<Option<PromotionRecord>>;

    /// Full history for the user, newest first
    async fn user_history(&self, user_id: &str) -> OrchestratorResult<Vec<PromotionRecord>>;
}

/// Read-only view of subscriptions and campaigns
#[mockall::automock]
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &str) -> OrchestratorResult<Option<UserSnapshot>>;

    async fn list_users(&self) -> OrchestratorResult<Vec<UserSnapshot>>;

    async fn get_campaign(&self, campaign_id: Uuid) -> OrchestratorResult<Option<Campaign>>;

    /// Increment the campaign's `total_posts`
    async fn record_campaign_post(&self, campaign_id: Uuid) -> OrchestratorResult<()>;
}

/// One outbound notification endpoint
#[mockall::automock]
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    fn platform(&self) -> Platform;

    async fn send(&self, message: &PromotionMessage) -> Result<ChannelReceipt, ChannelError>;
}

/// Builds the channels a user has complete credentials for
#[mockall::automock]
pub trait ChannelFactory: Send + Sync {
    fn channels_for(&self, credentials: &ChannelCredentials) -> Vec<Arc<dyn NotificationChannel>>;
}

/// Source of "now"
#[mockall::automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
