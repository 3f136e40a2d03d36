//! Core types used throughout the promotion system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::SharedError;

pub mod product;
pub mod promotion;
pub mod user;

pub use product::{parse_price, CatalogEntry, Product, UpsertOutcome};
pub use promotion::{Campaign, PromotionKey, PromotionRecord, RecordOutcome, TriggerKind};
pub use user::{ChannelCredentials, Tier, UserSnapshot};

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Used before a binary has called one of the `init_*` functions (tests, library use)
static UNSET_PROCESS_ID: ProcessId = ProcessId::Scheduler;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Scheduler process running periodic sweeps
    Scheduler,
    /// WebServer process serving trigger requests
    WebServer,
}

impl ProcessId {
    /// Initialize the global process ID for the scheduler
    pub fn init_scheduler() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Scheduler)
    }

    /// Initialize the global process ID for webserver
    pub fn init_webserver() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::WebServer)
    }

    /// Get the global process ID
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&UNSET_PROCESS_ID)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Scheduler => write!(f, "scheduler"),
            ProcessId::WebServer => write!(f, "webserver"),
        }
    }
}

/// Notification channels a promotion can be delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Discord,
    Telegram,
    Slack,
    Email,
}

impl Platform {
    pub const ALL: [Platform; 4] = [Platform::Discord, Platform::Telegram, Platform::Slack, Platform::Email];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Discord => write!(f, "discord"),
            Platform::Telegram => write!(f, "telegram"),
            Platform::Slack => write!(f, "slack"),
            Platform::Email => write!(f, "email"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discord" => Ok(Platform::Discord),
            "telegram" => Ok(Platform::Telegram),
            "slack" => Ok(Platform::Slack),
            "email" | "mail" => Ok(Platform::Email),
            _ => Err(SharedError::UnknownPlatform { input: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trips_through_display() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.to_string().parse().unwrap();
            assert_eq!(parsed, platform);
        }
        assert!("fax".parse::<Platform>().is_err());
    }

    #[test]
    fn test_process_id_display() {
        assert_eq!(ProcessId::Scheduler.to_string(), "scheduler");
        assert_eq!(ProcessId::WebServer.to_string(), "webserver");
    }
}
