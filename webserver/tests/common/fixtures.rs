//! Canned scheduler responses

use shared::{CadenceStatus, Platform, SkipReason, Tier, TriggerResponse};

pub const USER: &str = "u1";

pub fn promoted(asins: &[&str]) -> TriggerResponse {
    TriggerResponse {
        success: true,
        message: format!("Promoted {} products to 2 platform(s)", asins.len()),
        products_promoted: asins.len() as u32,
        platforms: vec![Platform::Discord, Platform::Slack],
        asins: asins.iter().map(|asin| asin.to_string()).collect(),
        retry_after_seconds: None,
    }
}

pub fn skipped(reason: SkipReason, retry_after_seconds: i64) -> TriggerResponse {
    TriggerResponse {
        success: false,
        message: format!("Skipped: {reason} (retry in {retry_after_seconds}s)"),
        products_promoted: 0,
        platforms: Vec::new(),
        asins: Vec::new(),
        retry_after_seconds: Some(retry_after_seconds),
    }
}

pub fn blocked_status(reason: SkipReason) -> CadenceStatus {
    CadenceStatus {
        user_id: USER.to_string(),
        tier: Tier::Free,
        can_post_now: false,
        blocked_by: Some(reason),
        retry_after_seconds: Some(7200),
        posts_today: 1,
        max_posts_per_day: 2,
        remaining_today: 1,
    }
}
