//! Promotion ledger records and campaign context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Platform;

/// What started a promotion cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Periodic sweep over all users
    Scheduled,
    /// "Promote now" request
    Manual,
    /// "AI auto-promote" request, subject to the free-tier cooldown
    Auto,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Scheduled => write!(f, "scheduled"),
            TriggerKind::Manual => write!(f, "manual"),
            TriggerKind::Auto => write!(f, "auto"),
        }
    }
}

/// Ledger key: full history is kept, one row per promotion event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromotionKey {
    pub user_id: String,
    pub asin: String,
    pub promoted_at: DateTime<Utc>,
}

/// One successful promotion event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    pub user_id: String,
    pub asin: String,
    pub promoted_at: DateTime<Utc>,
    /// Channels that accepted the post
    pub platforms: Vec<Platform>,
    pub post_id: Option<String>,
    pub trigger: TriggerKind,
    pub campaign_id: Option<Uuid>,
    pub clicks_generated: u64,
    pub revenue_generated: f64,
}

impl PromotionRecord {
    pub fn new(
        user_id: impl Into<String>,
        asin: impl Into<String>,
        promoted_at: DateTime<Utc>,
        platforms: Vec<Platform>,
        trigger: TriggerKind,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            asin: asin.into(),
            promoted_at,
            platforms,
            post_id: None,
            trigger,
            campaign_id: None,
            clicks_generated: 0,
            revenue_generated: 0.0,
        }
    }

    pub fn key(&self) -> PromotionKey {
        PromotionKey {
            user_id: self.user_id.clone(),
            asin: self.asin.clone(),
            promoted_at: self.promoted_at,
        }
    }
}

/// Result of a ledger insert; a repeated key is an idempotent no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub was_new: bool,
}

/// Optional filter context for a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub total_posts: u64,
}

fn default_active() -> bool {
    true
}

impl Campaign {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, category: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            category,
            is_active: true,
            total_posts: 0,
        }
    }
}
