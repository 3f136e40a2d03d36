//! Test helpers and builder patterns for scheduler tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use orchestrator::services::{ManualClock, RealInventoryStore, RealPromotionLedger, RealUserDirectory};
use orchestrator::traits::{ChannelFactory, ChannelReceipt, NotificationChannel, PromotionLedger, UserDirectory};
use orchestrator::{ChannelError, PromotionMessage, Scheduler, SchedulerConfig};
use shared::{
    Campaign, CatalogEntry, ChannelCredentials, CycleOutcome, CycleReport, Platform, SkipReason, TriggerRequest,
    UserSnapshot,
};

use super::fixtures::TestFixtures;

pub type TestScheduler<U = RealUserDirectory, L = RealPromotionLedger> =
    Scheduler<RealInventoryStore, L, U, ScriptedFactory, ManualClock>;

/// Channel that succeeds or fails on demand and counts its sends
pub struct ScriptedChannel {
    platform: Platform,
    fail: bool,
    delay: Option<StdDuration>,
    sends: Arc<AtomicUsize>,
}

#[async_trait]
impl NotificationChannel for ScriptedChannel {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send(&self, _message: &PromotionMessage) -> Result<ChannelReceipt, ChannelError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ChannelError::HttpStatus {
                platform: self.platform,
                status: 500,
                body: "upstream error".to_string(),
            });
        }
        Ok(ChannelReceipt {
            platform: self.platform,
            http_status: 200,
            post_id: Some(format!("{}-post", self.platform)),
        })
    }
}

/// Builds one scripted channel per configured platform
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    failing: HashSet<Platform>,
    delay: Option<StdDuration>,
    sends: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

impl ChannelFactory for ScriptedFactory {
    fn channels_for(&self, credentials: &ChannelCredentials) -> Vec<Arc<dyn NotificationChannel>> {
        credentials
            .configured_platforms()
            .into_iter()
            .map(|platform| {
                Arc::new(ScriptedChannel {
                    platform,
                    fail: self.failing.contains(&platform),
                    delay: self.delay,
                    sends: self.sends.clone(),
                }) as Arc<dyn NotificationChannel>
            })
            .collect()
    }
}

/// Builder for schedulers over in-memory stores and a manual clock
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    catalog: Vec<CatalogEntry>,
    users: Vec<UserSnapshot>,
    campaigns: Vec<Campaign>,
    factory: ScriptedFactory,
    start: DateTime<Utc>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            catalog: TestFixtures::catalog(5),
            users: Vec::new(),
            campaigns: Vec::new(),
            factory: ScriptedFactory::default(),
            start: TestFixtures::t0(),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<CatalogEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_user(mut self, user: UserSnapshot) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_campaign(mut self, campaign: Campaign) -> Self {
        self.campaigns.push(campaign);
        self
    }

    pub fn failing(mut self, platform: Platform) -> Self {
        self.factory.failing.insert(platform);
        self
    }

    /// Every channel waits this long (tokio time) before answering
    pub fn with_send_delay(mut self, delay: StdDuration) -> Self {
        self.factory.delay = Some(delay);
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn with_config<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut SchedulerConfig),
    {
        setup(&mut self.config);
        self
    }

    /// Build with a real in-memory user directory seeded from the builder
    pub async fn build(self) -> (TestScheduler, ManualClock) {
        self.build_with_ledger(RealPromotionLedger::new()).await
    }

    /// Build with a seeded in-memory directory and any ledger, typically a mock
    pub async fn build_with_ledger<L: PromotionLedger + 'static>(
        self,
        ledger: L,
    ) -> (TestScheduler<RealUserDirectory, L>, ManualClock) {
        let directory = RealUserDirectory::new();
        for user in &self.users {
            directory.insert_user(user.clone()).await;
        }
        for campaign in &self.campaigns {
            directory.insert_campaign(campaign.clone()).await;
        }
        self.assemble(directory, ledger).await
    }

    /// Build with any user directory, typically a mock
    pub async fn build_with_directory<U: UserDirectory + 'static>(self, directory: U) -> (TestScheduler<U>, ManualClock) {
        self.assemble(directory, RealPromotionLedger::new()).await
    }

    async fn assemble<U, L>(self, directory: U, ledger: L) -> (TestScheduler<U, L>, ManualClock)
    where
        U: UserDirectory + 'static,
        L: PromotionLedger + 'static,
    {
        let inventory = RealInventoryStore::new();
        inventory.import(self.catalog).await;

        let clock = ManualClock::new(self.start);
        let scheduler = Scheduler::new(
            inventory,
            ledger,
            directory,
            self.factory,
            clock.clone(),
            self.config,
        );
        (scheduler, clock)
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Assertion and request helpers
pub struct TestHelpers;

impl TestHelpers {
    pub fn request(user_id: &str, count: u32) -> TriggerRequest {
        TriggerRequest {
            count: Some(count),
            ..TriggerRequest::for_user(user_id)
        }
    }

    pub fn promoted_asin(report: &CycleReport) -> &str {
        assert_eq!(report.outcome, CycleOutcome::Completed, "unexpected report: {}", report.message);
        report
            .product
            .as_ref()
            .map(|product| product.asin.as_str())
            .expect("completed report carries its product")
    }

    pub fn assert_skipped(report: &CycleReport, reason: SkipReason) {
        assert!(!report.success);
        assert_eq!(report.outcome, CycleOutcome::Skipped(reason), "unexpected report: {}", report.message);
    }
}
