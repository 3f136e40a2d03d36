//! Tier-based cadence gate
//!
//! Pure decision logic: callers gather the user's recent activity into
//! [`CadenceInputs`] and the gate answers go/no-go with the time to wait.

use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};
use shared::{CadenceStatus, SkipReason, Tier, TriggerKind};

use crate::config::{SchedulerConfig, TierPolicies};

/// Activity snapshot the gate decides on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceInputs {
    pub tier: Tier,
    pub last_promotion: Option<DateTime<Utc>>,
    pub last_ai_promotion: Option<DateTime<Utc>>,
    /// Promotions since local midnight
    pub posts_today: u32,
    pub has_channels: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceDecision {
    Allowed { remaining_today: u32 },
    Blocked { reason: SkipReason, retry_after: Option<Duration> },
}

impl CadenceDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CadenceDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct CadenceGate {
    policies: TierPolicies,
    ai_cooldown: Duration,
    offset: FixedOffset,
}

impl CadenceGate {
    pub fn new(policies: TierPolicies, ai_cooldown: Duration, utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
        Self {
            policies,
            ai_cooldown,
            offset,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.tier_policies, config.ai_cooldown, config.utc_offset_minutes)
    }

    /// Start of the current local day, expressed in UTC
    pub fn local_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.offset);
        now - Duration::seconds(i64::from(local.num_seconds_from_midnight()))
            - Duration::nanoseconds(i64::from(local.nanosecond()))
    }

    pub fn next_local_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.local_midnight(now) + Duration::days(1)
    }

    /// Checks run in order: channels, minimum gap, daily cap, then the
    /// free-tier auto-promote cooldown. The first failing check is reported.
    pub fn evaluate(&self, inputs: &CadenceInputs, trigger: TriggerKind, now: DateTime<Utc>) -> CadenceDecision {
        let policy = self.policies.for_tier(inputs.tier);

        if !inputs.has_channels {
            return CadenceDecision::Blocked {
                reason: SkipReason::NoChannelsConfigured,
                retry_after: None,
            };
        }

        if let Some(last) = inputs.last_promotion {
            let ready_at = last + policy.min_gap;
            if now < ready_at {
                return CadenceDecision::Blocked {
                    reason: SkipReason::TooSoon,
                    retry_after: Some(ready_at - now),
                };
            }
        }

        if inputs.posts_today >= policy.max_posts_per_day {
            return CadenceDecision::Blocked {
                reason: SkipReason::DailyCap,
                retry_after: Some(self.next_local_midnight(now) - now),
            };
        }

        if trigger == TriggerKind::Auto && inputs.tier == Tier::Free {
            if let Some(last_ai) = inputs.last_ai_promotion {
                let ready_at = last_ai + self.ai_cooldown;
                if now < ready_at {
                    return CadenceDecision::Blocked {
                        reason: SkipReason::AiCooldown,
                        retry_after: Some(ready_at - now),
                    };
                }
            }
        }

        CadenceDecision::Allowed {
            remaining_today: policy.max_posts_per_day - inputs.posts_today,
        }
    }

    pub fn status(&self, user_id: &str, inputs: &CadenceInputs, trigger: TriggerKind, now: DateTime<Utc>) -> CadenceStatus {
        let policy = self.policies.for_tier(inputs.tier);
        let decision = self.evaluate(inputs, trigger, now);
        let (blocked_by, retry_after_seconds) = match decision {
            CadenceDecision::Allowed { .. } => (None, None),
            CadenceDecision::Blocked { reason, retry_after } => (Some(reason), retry_after.map(|d| d.num_seconds())),
        };

        CadenceStatus {
            user_id: user_id.to_string(),
            tier: inputs.tier,
            can_post_now: decision.is_allowed(),
            blocked_by,
            retry_after_seconds,
            posts_today: inputs.posts_today,
            max_posts_per_day: policy.max_posts_per_day,
            remaining_today: policy.max_posts_per_day.saturating_sub(inputs.posts_today),
        }
    }
}
