//! Read-only user snapshot supplied by the subscription store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Platform;
use crate::errors::SharedError;

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
    Pro,
    Lifetime,
    Trial,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Premium => write!(f, "premium"),
            Tier::Pro => write!(f, "pro"),
            Tier::Lifetime => write!(f, "lifetime"),
            Tier::Trial => write!(f, "trial"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "premium" => Ok(Tier::Premium),
            "pro" => Ok(Tier::Pro),
            "lifetime" => Ok(Tier::Lifetime),
            "trial" => Ok(Tier::Trial),
            _ => Err(SharedError::UnknownTier { input: s.to_string() }),
        }
    }
}

/// Per-channel credentials; a channel is configured only when all of its fields are set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCredentials {
    pub discord_webhook_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_channel: Option<String>,
    pub email_recipient: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ChannelCredentials {
    pub fn is_configured(&self, platform: Platform) -> bool {
        match platform {
            Platform::Discord => present(&self.discord_webhook_url),
            Platform::Telegram => present(&self.telegram_bot_token) && present(&self.telegram_chat_id),
            Platform::Slack => present(&self.slack_bot_token) && present(&self.slack_channel),
            Platform::Email => present(&self.email_recipient),
        }
    }

    /// Platforms with complete credentials, in a stable order
    pub fn configured_platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|platform| self.is_configured(*platform))
            .collect()
    }
}

/// Tier and channel view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub tier: Tier,
    #[serde(default)]
    pub last_promotion_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_ai_promotion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channels: ChannelCredentials,
}

impl UserSnapshot {
    pub fn new(user_id: impl Into<String>, tier: Tier) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            tier,
            last_promotion_timestamp: None,
            last_ai_promotion_time: None,
            channels: ChannelCredentials::default(),
        }
    }

    pub fn with_channels(mut self, channels: ChannelCredentials) -> Self {
        self.channels = channels;
        self
    }

    pub fn has_channels(&self) -> bool {
        !self.channels.configured_platforms().is_empty()
    }
}
