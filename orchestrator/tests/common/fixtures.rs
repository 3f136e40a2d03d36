//! Test fixtures and data for scheduler tests

use chrono::{DateTime, TimeZone, Utc};
use shared::{CatalogEntry, ChannelCredentials, Tier, UserSnapshot};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const FREE_USER: &'static str = "free-user";
    pub const PREMIUM_USER: &'static str = "premium-user";
    pub const PRO_USER: &'static str = "pro-user";
    pub const QUIET_USER: &'static str = "quiet-user";
    pub const ADMIN_EMAIL: &'static str = "owner@example.com";

    /// Monday 2024-06-10 12:00 UTC
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    pub fn discord_and_slack() -> ChannelCredentials {
        ChannelCredentials {
            discord_webhook_url: Some("https://discord.test/webhooks/1/abc".to_string()),
            slack_bot_token: Some("xoxb-test".to_string()),
            slack_channel: Some("#deals".to_string()),
            ..Default::default()
        }
    }

    pub fn discord_only() -> ChannelCredentials {
        ChannelCredentials {
            discord_webhook_url: Some("https://discord.test/webhooks/1/abc".to_string()),
            ..Default::default()
        }
    }

    pub fn user(user_id: &str, tier: Tier) -> UserSnapshot {
        UserSnapshot::new(user_id, tier).with_channels(Self::discord_only())
    }

    pub fn entry(asin: &str, rating: f64, category: &str) -> CatalogEntry {
        CatalogEntry {
            title: Some(format!("Product {asin}")),
            category: Some(category.to_string()),
            rating: Some(rating),
            ..CatalogEntry::with_asin(asin)
        }
    }

    /// `size` products A1..An with strictly decreasing ratings, so A1 always scores highest
    pub fn catalog(size: usize) -> Vec<CatalogEntry> {
        (0..size)
            .map(|i| Self::entry(&format!("A{}", i + 1), 5.0 - 0.25 * i as f64, "Books"))
            .collect()
    }
}
