//! Promotion cycle results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Platform, Product, Tier};

/// Why a cycle ended without attempting delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooSoon,
    DailyCap,
    NoChannelsConfigured,
    AiCooldown,
    CampaignInactive,
    NoProducts,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::TooSoon => "too_soon",
            SkipReason::DailyCap => "daily_cap",
            SkipReason::NoChannelsConfigured => "no_channels_configured",
            SkipReason::AiCooldown => "ai_cooldown",
            SkipReason::CampaignInactive => "campaign_inactive",
            SkipReason::NoProducts => "no_products",
        };
        write!(f, "{reason}")
    }
}

/// Why a cycle that reached dispatch did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No channel accepted the post
    Delivery,
    /// A write during recording failed and was rolled back
    Persistence,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Delivery => write!(f, "delivery"),
            FailureReason::Persistence => write!(f, "persistence"),
        }
    }
}

/// Terminal state of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum CycleOutcome {
    Completed,
    Skipped(SkipReason),
    Failed(FailureReason),
}

/// Result of one channel call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutcome {
    pub success: bool,
    pub detail: String,
    pub http_status: Option<u16>,
}

impl ChannelOutcome {
    pub fn delivered(detail: impl Into<String>, http_status: Option<u16>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
            http_status,
        }
    }

    pub fn failed(detail: impl Into<String>, http_status: Option<u16>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
            http_status,
        }
    }
}

/// Output contract of a single promotion cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub success: bool,
    pub message: String,
    pub product: Option<Product>,
    pub platforms_posted: Vec<Platform>,
    pub outcome: CycleOutcome,
    /// Seconds until a skipped cycle could pass the cadence gate
    pub retry_after_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub channel_results: BTreeMap<Platform, ChannelOutcome>,
}

impl CycleReport {
    pub fn skipped(reason: SkipReason, retry_after_seconds: Option<i64>) -> Self {
        let message = match retry_after_seconds {
            Some(wait) => format!("Skipped: {reason} (retry in {wait}s)"),
            None => format!("Skipped: {reason}"),
        };
        Self {
            success: false,
            message,
            product: None,
            platforms_posted: Vec::new(),
            outcome: CycleOutcome::Skipped(reason),
            retry_after_seconds,
            channel_results: BTreeMap::new(),
        }
    }

    pub fn failed(reason: FailureReason, product: Product, channel_results: BTreeMap<Platform, ChannelOutcome>) -> Self {
        Self {
            success: false,
            message: format!("Failed: {reason} for {}", product.asin),
            product: Some(product),
            platforms_posted: Vec::new(),
            outcome: CycleOutcome::Failed(reason),
            retry_after_seconds: None,
            channel_results,
        }
    }

    pub fn completed(product: Product, platforms_posted: Vec<Platform>, channel_results: BTreeMap<Platform, ChannelOutcome>) -> Self {
        let names: Vec<String> = platforms_posted.iter().map(Platform::to_string).collect();
        Self {
            success: true,
            message: format!("Promoted {} to {}", product.asin, names.join(", ")),
            product: Some(product),
            platforms_posted,
            outcome: CycleOutcome::Completed,
            retry_after_seconds: None,
            channel_results,
        }
    }

    /// Delivered, but the ledger already held this exact promotion, so no
    /// stats were changed
    pub fn already_recorded(
        product: Product,
        platforms_posted: Vec<Platform>,
        channel_results: BTreeMap<Platform, ChannelOutcome>,
    ) -> Self {
        let mut report = Self::completed(product, platforms_posted, channel_results);
        report.message.push_str(" (already recorded)");
        report
    }
}

/// Side-effect free view of the cadence gate for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceStatus {
    pub user_id: String,
    pub tier: Tier,
    pub can_post_now: bool,
    pub blocked_by: Option<SkipReason>,
    pub retry_after_seconds: Option<i64>,
    pub posts_today: u32,
    pub max_posts_per_day: u32,
    pub remaining_today: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_wire_names() {
        let json = serde_json::to_string(&SkipReason::NoChannelsConfigured).unwrap();
        assert_eq!(json, "\"no_channels_configured\"");
        assert_eq!(SkipReason::TooSoon.to_string(), "too_soon");
    }

    #[test]
    fn test_outcome_serializes_with_reason() {
        let json = serde_json::to_value(CycleOutcome::Failed(FailureReason::Delivery)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failed", "reason": "delivery"}));
    }

    #[test]
    fn test_skipped_report_mentions_wait() {
        let report = CycleReport::skipped(SkipReason::TooSoon, Some(120));
        assert!(!report.success);
        assert!(report.message.contains("too_soon"));
        assert!(report.message.contains("120"));
    }
}
