//! Trigger surface request/response shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cycle::CycleReport;
use crate::types::Platform;

/// Manual, auto or scheduled promotion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    pub user_id: String,
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    /// Number of products to promote; defaults to one
    #[serde(default)]
    pub count: Option<u32>,
    /// Seed for scoring jitter; no jitter is applied when absent
    #[serde(default)]
    pub jitter_seed: Option<u64>,
}

impl TriggerRequest {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            campaign_id: None,
            count: None,
            jitter_seed: None,
        }
    }

    pub fn requested_count(&self) -> u32 {
        self.count.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    pub products_promoted: u32,
    pub platforms: Vec<Platform>,
    pub asins: Vec<String>,
    pub retry_after_seconds: Option<i64>,
}

impl TriggerResponse {
    /// Fold per-product cycle reports into one response
    pub fn from_reports(reports: &[CycleReport]) -> Self {
        let mut platforms: Vec<Platform> = Vec::new();
        let mut asins = Vec::new();

        for report in reports.iter().filter(|report| report.success) {
            for platform in &report.platforms_posted {
                if !platforms.contains(platform) {
                    platforms.push(*platform);
                }
            }
            if let Some(product) = &report.product {
                asins.push(product.asin.clone());
            }
        }
        platforms.sort();

        let products_promoted = asins.len() as u32;
        let message = match (products_promoted, reports.last()) {
            (0, Some(last)) => last.message.clone(),
            (0, None) => "Nothing to promote".to_string(),
            (1, _) => format!("Promoted 1 product to {} platform(s)", platforms.len()),
            (n, _) => format!("Promoted {n} products to {} platform(s)", platforms.len()),
        };

        Self {
            success: products_promoted > 0,
            message,
            products_promoted,
            platforms,
            asins,
            retry_after_seconds: reports.iter().find_map(|report| report.retry_after_seconds),
        }
    }
}
