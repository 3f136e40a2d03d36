//! Multi-channel dispatcher
//!
//! Every channel call runs in its own spawned task under its own timeout, and
//! the dispatcher joins on all of them. A failure, timeout, or panic in one
//! task only affects that channel's entry. Channel tasks are detached, so a
//! send in flight always runs to completion or to its timeout.

use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::core::message::PromotionMessage;
use crate::error::ChannelError;
use crate::traits::{ChannelReceipt, NotificationChannel};
use shared::{process_debug, process_warn, ChannelOutcome, Platform, ProcessId};

/// Per-channel results of one fan-out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    pub results: BTreeMap<Platform, ChannelOutcome>,
    pub receipts: Vec<ChannelReceipt>,
}

impl DispatchOutcome {
    /// Platforms that accepted the post, in platform order
    pub fn succeeded(&self) -> Vec<Platform> {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.success)
            .map(|(platform, _)| *platform)
            .collect()
    }

    pub fn any_succeeded(&self) -> bool {
        self.results.values().any(|outcome| outcome.success)
    }

    /// First remote post id among the receipts
    pub fn post_id(&self) -> Option<String> {
        self.receipts.iter().find_map(|receipt| receipt.post_id.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    channel_timeout: Duration,
}

impl Dispatcher {
    pub fn new(channel_timeout: Duration) -> Self {
        Self { channel_timeout }
    }

    pub fn channel_timeout(&self) -> Duration {
        self.channel_timeout
    }

    /// Send one message to every channel concurrently. No retries.
    pub async fn dispatch(&self, message: &PromotionMessage, channels: Vec<Arc<dyn NotificationChannel>>) -> DispatchOutcome {
        let limit = self.channel_timeout;

        let tasks: Vec<(Platform, JoinHandle<Result<ChannelReceipt, ChannelError>>)> = channels
            .into_iter()
            .map(|channel| {
                let platform = channel.platform();
                let message = message.clone();
                let handle = tokio::spawn(async move {
                    match timeout(limit, channel.send(&message)).await {
                        Ok(result) => result,
                        Err(_) => Err(ChannelError::Timeout {
                            platform,
                            seconds: limit.as_secs(),
                        }),
                    }
                });
                (platform, handle)
            })
            .collect();

        let (platforms, handles): (Vec<Platform>, Vec<_>) = tasks.into_iter().unzip();
        let joined = join_all(handles).await;

        let mut outcome = DispatchOutcome::default();
        for (platform, result) in platforms.into_iter().zip(joined) {
            let result = result.unwrap_or_else(|join_error| {
                Err(ChannelError::TaskAborted {
                    platform,
                    message: join_error.to_string(),
                })
            });

            match result {
                Ok(receipt) => {
                    process_debug!(ProcessId::current(), "📨 {} accepted post (HTTP {})", platform, receipt.http_status);
                    outcome.results.insert(
                        platform,
                        ChannelOutcome::delivered(format!("posted to {platform}"), Some(receipt.http_status)),
                    );
                    outcome.receipts.push(receipt);
                }
                Err(e) => {
                    process_warn!(ProcessId::current(), "⚠️ Channel {} failed: {}", platform, e);
                    outcome
                        .results
                        .insert(platform, ChannelOutcome::failed(e.to_string(), e.http_status()));
                }
            }
        }

        outcome
    }
}
