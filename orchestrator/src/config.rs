//! Scheduler configuration
//!
//! Everything the engine would otherwise read from globals (tier policies,
//! rotation windows, admin accounts, channel endpoints) lives here and is
//! injected into the [`Scheduler`](crate::Scheduler) at construction.

use chrono::Duration as ChronoDuration;
use shared::{Tier, UserSnapshot};
use std::time::Duration;

use crate::error::{OrchestratorError, OrchestratorResult};

const MIN_CHANNEL_TIMEOUT_SECS: u64 = 10;
const MAX_CHANNEL_TIMEOUT_SECS: u64 = 30;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Throttle applied to one subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub max_posts_per_day: u32,
    pub min_gap: ChronoDuration,
}

impl TierPolicy {
    pub fn new(max_posts_per_day: u32, min_gap: ChronoDuration) -> Self {
        Self {
            max_posts_per_day,
            min_gap,
        }
    }
}

/// Policy table for every paid and free tier. Trial users get the premium policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicies {
    pub free: TierPolicy,
    pub premium: TierPolicy,
    pub pro: TierPolicy,
    pub lifetime: TierPolicy,
}

impl Default for TierPolicies {
    fn default() -> Self {
        Self {
            free: TierPolicy::new(2, ChronoDuration::hours(12)),
            premium: TierPolicy::new(8, ChronoDuration::hours(3)),
            pro: TierPolicy::new(24, ChronoDuration::hours(1)),
            // 50 posts spread evenly over a day
            lifetime: TierPolicy::new(50, ChronoDuration::seconds(24 * 3600 / 50)),
        }
    }
}

impl TierPolicies {
    pub fn for_tier(&self, tier: Tier) -> TierPolicy {
        match tier {
            Tier::Free => self.free,
            Tier::Premium | Tier::Trial => self.premium,
            Tier::Pro => self.pro,
            Tier::Lifetime => self.lifetime,
        }
    }
}

/// Base URLs and credentials for the outbound notification APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEndpoints {
    pub telegram_api_base: String,
    pub slack_api_base: String,
    /// JSON mail relay; email delivery is disabled when unset
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: String,
}

impl Default for ChannelEndpoints {
    fn default() -> Self {
        Self {
            telegram_api_base: "https://api.telegram.org".to_string(),
            slack_api_base: "https://slack.com/api".to_string(),
            email_api_url: None,
            email_api_key: None,
            email_from: "deals@localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Rotation window in days; promoted items are excluded for this long
    pub primary_window_days: i64,
    /// Narrower window used once when the primary window leaves nothing eligible
    pub fallback_window_days: i64,
    /// How many eligible products are scored per cycle
    pub candidate_pool_size: usize,
    pub channel_timeout: Duration,
    pub sweep_interval: Duration,
    /// Free-tier cooldown between auto-promote triggers
    pub ai_cooldown: ChronoDuration,
    pub jitter_max: f64,
    /// Draw a fresh jitter seed for requests that do not carry one
    pub variety_jitter: bool,
    /// Offset from UTC defining "local midnight" for daily caps
    pub utc_offset_minutes: i32,
    pub affiliate_tag: Option<String>,
    /// Users whose email is listed are treated as lifetime tier
    pub admin_emails: Vec<String>,
    pub tier_policies: TierPolicies,
    pub endpoints: ChannelEndpoints,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            primary_window_days: 7,
            fallback_window_days: 3,
            candidate_pool_size: 20,
            channel_timeout: Duration::from_secs(15),
            sweep_interval: Duration::from_secs(300),
            ai_cooldown: ChronoDuration::hours(5),
            jitter_max: 15.0,
            variety_jitter: false,
            utc_offset_minutes: 0,
            affiliate_tag: None,
            admin_emails: Vec::new(),
            tier_policies: TierPolicies::default(),
            endpoints: ChannelEndpoints::default(),
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from `PROMO_*` environment variables
    ///
    /// An optional `.env` file in the working directory is read first; variables
    /// already present in the environment win.
    pub fn from_env() -> OrchestratorResult<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, starting from the defaults
    pub fn from_lookup<F>(lookup: F) -> OrchestratorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(days) = parse_var::<i64, _>(&lookup, "PROMO_PRIMARY_WINDOW_DAYS")? {
            config.primary_window_days = days;
        }
        if let Some(days) = parse_var::<i64, _>(&lookup, "PROMO_FALLBACK_WINDOW_DAYS")? {
            config.fallback_window_days = days;
        }
        if let Some(size) = parse_var::<usize, _>(&lookup, "PROMO_CANDIDATE_POOL_SIZE")? {
            config.candidate_pool_size = size;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "PROMO_CHANNEL_TIMEOUT_SECS")? {
            config.channel_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "PROMO_SWEEP_INTERVAL_SECS")? {
            config.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(hours) = parse_var::<i64, _>(&lookup, "PROMO_AI_COOLDOWN_HOURS")? {
            config.ai_cooldown = ChronoDuration::hours(hours);
        }
        if let Some(max) = parse_var::<f64, _>(&lookup, "PROMO_JITTER_MAX")? {
            config.jitter_max = max;
        }
        if let Some(enabled) = parse_var::<bool, _>(&lookup, "PROMO_VARIETY_JITTER")? {
            config.variety_jitter = enabled;
        }
        if let Some(offset) = parse_var::<i32, _>(&lookup, "PROMO_UTC_OFFSET_MINUTES")? {
            config.utc_offset_minutes = offset;
        }

        config.affiliate_tag = non_empty(lookup("PROMO_AFFILIATE_TAG"));
        if let Some(emails) = lookup("PROMO_ADMIN_EMAILS") {
            config.admin_emails = emails
                .split(',')
                .map(|email| email.trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect();
        }

        if let Some(base) = non_empty(lookup("PROMO_TELEGRAM_API_BASE")) {
            config.endpoints.telegram_api_base = base;
        }
        if let Some(base) = non_empty(lookup("PROMO_SLACK_API_BASE")) {
            config.endpoints.slack_api_base = base;
        }
        config.endpoints.email_api_url = non_empty(lookup("PROMO_EMAIL_API_URL"));
        config.endpoints.email_api_key = non_empty(lookup("PROMO_EMAIL_API_KEY"));
        if let Some(from) = non_empty(lookup("PROMO_EMAIL_FROM")) {
            config.endpoints.email_from = from;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent settings and clamp the channel timeout into range
    pub fn validate(&mut self) -> OrchestratorResult<()> {
        if self.primary_window_days <= 0 {
            return Err(OrchestratorError::config("PROMO_PRIMARY_WINDOW_DAYS must be positive"));
        }
        if self.fallback_window_days <= 0 || self.fallback_window_days > self.primary_window_days {
            return Err(OrchestratorError::config(
                "PROMO_FALLBACK_WINDOW_DAYS must be positive and not exceed the primary window",
            ));
        }
        if self.candidate_pool_size == 0 {
            return Err(OrchestratorError::config("PROMO_CANDIDATE_POOL_SIZE must be at least 1"));
        }
        if !self.jitter_max.is_finite() || self.jitter_max < 0.0 {
            return Err(OrchestratorError::config("PROMO_JITTER_MAX must be a non-negative number"));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(OrchestratorError::config("PROMO_UTC_OFFSET_MINUTES must be within +/-14h"));
        }
        if self.sweep_interval.is_zero() {
            return Err(OrchestratorError::config("PROMO_SWEEP_INTERVAL_SECS must be positive"));
        }

        let secs = self
            .channel_timeout
            .as_secs()
            .clamp(MIN_CHANNEL_TIMEOUT_SECS, MAX_CHANNEL_TIMEOUT_SECS);
        self.channel_timeout = Duration::from_secs(secs);
        Ok(())
    }

    pub fn primary_window(&self) -> ChronoDuration {
        ChronoDuration::days(self.primary_window_days)
    }

    pub fn fallback_window(&self) -> ChronoDuration {
        ChronoDuration::days(self.fallback_window_days)
    }

    pub fn is_admin(&self, user: &UserSnapshot) -> bool {
        user.email
            .as_deref()
            .map(|email| email.trim().to_lowercase())
            .is_some_and(|email| self.admin_emails.contains(&email))
    }

    /// Tier used for throttling: admin accounts always get lifetime limits
    pub fn effective_tier(&self, user: &UserSnapshot) -> Tier {
        if self.is_admin(user) {
            Tier::Lifetime
        } else {
            user.tier
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> OrchestratorResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| OrchestratorError::config(format!("{key} has invalid value '{raw}'"))),
        None => Ok(None),
    }
}
