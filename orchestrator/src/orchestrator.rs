//! Promotion scheduler
//!
//! Composes the cadence gate, rotation policy, scorer and dispatcher into one
//! promotion cycle per user, and records the outcome. All collaborators are
//! injected so the same scheduler runs against in-memory stores or mocks.
//!
//! Cadence and selection run in the caller's task and stop if the caller is
//! dropped. From the first dispatch on, the cycle moves into a spawned task
//! that owns the user lock and runs through recording even if nobody awaits it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio::time::interval;
use uuid::Uuid;

use futures_util::future::join_all;
use shared::{
    logging, process_debug, process_error, process_info, CadenceStatus, Campaign, CycleReport,
    FailureReason, Platform, ProcessId, Product, PromotionKey, PromotionRecord, SkipReason, TriggerKind,
    TriggerRequest, TriggerResponse, UserSnapshot,
};

use crate::{
    config::SchedulerConfig,
    core::{
        select_top, CadenceDecision, CadenceGate, CadenceInputs, CycleMachine, CycleState, Jitter, PromotionMessage,
        RotationPolicy,
    },
    error::{OrchestratorError, OrchestratorResult},
    services::Dispatcher,
    traits::{ChannelFactory, Clock, InventoryStore, NotificationChannel, PromotionLedger, PromotionStats, UserDirectory},
};

/// Per-user results of one sweep
pub type SweepResults = Vec<(String, OrchestratorResult<CycleReport>)>;

/// Main scheduler that runs promotion cycles
pub struct Scheduler<I, L, U, F, C>
where
    I: InventoryStore + 'static,
    L: PromotionLedger + 'static,
    U: UserDirectory + 'static,
    F: ChannelFactory + 'static,
    C: Clock + 'static,
{
    /// Injected services, shared with in-flight deliveries
    inventory: Arc<I>,
    ledger: Arc<L>,
    users: Arc<U>,
    channels: F,
    clock: Arc<C>,

    config: SchedulerConfig,
    gate: CadenceGate,
    rotation: RotationPolicy,
    dispatcher: Dispatcher,

    /// One lock per user; a cycle holds it from cadence check to exit
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,

    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Mutex<mpsc::Receiver<()>>,
}

impl<I, L, U, F, C> Scheduler<I, L, U, F, C>
where
    I: InventoryStore + 'static,
    L: PromotionLedger + 'static,
    U: UserDirectory + 'static,
    F: ChannelFactory + 'static,
    C: Clock + 'static,
{
    /// Create new scheduler with injected dependencies
    pub fn new(inventory: I, ledger: L, users: U, channels: F, clock: C, config: SchedulerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            gate: CadenceGate::from_config(&config),
            rotation: RotationPolicy::from_config(&config),
            dispatcher: Dispatcher::new(config.channel_timeout),
            inventory: Arc::new(inventory),
            ledger: Arc::new(ledger),
            users: Arc::new(users),
            channels,
            clock: Arc::new(clock),
            config,
            user_locks: Mutex::new(HashMap::new()),
            shutdown_tx,
            shutdown_rx: Mutex::new(shutdown_rx),
        }
    }

    pub fn inventory(&self) -> &I {
        self.inventory.as_ref()
    }

    pub fn ledger(&self) -> &L {
        self.ledger.as_ref()
    }

    pub fn users(&self) -> &U {
        self.users.as_ref()
    }

    pub fn channel_factory(&self) -> &F {
        &self.channels
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get shutdown sender for graceful shutdown
    pub fn shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Handle a manual or auto-promote request, promoting up to `count` products
    pub async fn trigger(&self, request: TriggerRequest, kind: TriggerKind) -> OrchestratorResult<TriggerResponse> {
        let reports = self.execute(&request, kind).await?;
        Ok(TriggerResponse::from_reports(&reports))
    }

    /// Run a single-product cycle and return its report
    pub async fn run_cycle(
        &self,
        user_id: &str,
        campaign_id: Option<Uuid>,
        kind: TriggerKind,
        jitter_seed: Option<u64>,
    ) -> OrchestratorResult<CycleReport> {
        let request = TriggerRequest {
            user_id: user_id.to_string(),
            campaign_id,
            count: Some(1),
            jitter_seed,
        };
        let mut reports = self.execute(&request, kind).await?;
        // execute always yields at least one report
        Ok(reports.swap_remove(0))
    }

    /// Run a scheduled cycle for every user with at least one usable channel
    pub async fn sweep(&self) -> OrchestratorResult<SweepResults> {
        let users: Vec<UserSnapshot> = self
            .users
            .list_users()
            .await?
            .into_iter()
            .filter(|user| !self.channels.channels_for(&user.channels).is_empty())
            .collect();

        process_debug!(ProcessId::current(), "🧹 Sweeping {} users", users.len());

        let cycles = users.iter().map(|user| async move {
            let result = self.run_cycle(&user.user_id, None, TriggerKind::Scheduled, None).await;
            (user.user_id.clone(), result)
        });
        let results = join_all(cycles).await;

        let promoted = results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(report) if report.success))
            .count();
        let errors = results.iter().filter(|(_, r)| r.is_err()).count();
        process_info!(
            ProcessId::current(),
            "📣 Sweep finished: {} promoted, {} skipped or failed, {} errors",
            promoted,
            results.len() - promoted - errors,
            errors
        );

        Ok(results)
    }

    /// Main loop - sweeps on every interval tick until shutdown
    pub async fn run(&self) -> OrchestratorResult<()> {
        let mut shutdown_rx = self.shutdown_rx.lock().await;
        let mut sweep_interval = interval(self.config.sweep_interval);

        loop {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    match self.sweep().await {
                        Ok(results) => {
                            for (user_id, result) in results {
                                if let Err(e) = result {
                                    process_error!(ProcessId::current(), user_id = %user_id, "❌ Cycle error: {}", e);
                                }
                            }
                        }
                        Err(e) => logging::log_error(ProcessId::current(), "Sweep", &e),
                    }
                },

                _ = shutdown_rx.recv() => {
                    logging::log_shutdown(ProcessId::current(), "Scheduler loop stopping");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Current cadence view for a user, without side effects
    pub async fn cadence_status(&self, user_id: &str, kind: TriggerKind) -> OrchestratorResult<CadenceStatus> {
        let user = self.load_user(user_id).await?;
        let has_channels = !self.channels.channels_for(&user.channels).is_empty();
        let now = self.clock.now();
        let inputs = self.cadence_inputs(&user, has_channels, now).await?;
        Ok(self.gate.status(user_id, &inputs, kind, now))
    }

    /// One cycle for one user. Yields one report per attempted product, or a
    /// single skip report.
    async fn execute(&self, request: &TriggerRequest, kind: TriggerKind) -> OrchestratorResult<Vec<CycleReport>> {
        let guard = self.user_lock(&request.user_id).await.lock_owned().await;

        let user = self.load_user(&request.user_id).await?;
        let campaign = match request.campaign_id {
            Some(id) => Some(self.load_campaign(id, &user.user_id).await?),
            None => None,
        };

        let mut machine = CycleMachine::new(&user.user_id);
        machine.advance(CycleState::CheckingCadence)?;

        if campaign.as_ref().is_some_and(|c| !c.is_active) {
            return self.skip(&mut machine, SkipReason::CampaignInactive, None);
        }

        let channels = self.channels.channels_for(&user.channels);
        let now = self.clock.now();
        let inputs = self.cadence_inputs(&user, !channels.is_empty(), now).await?;
        let remaining_today = match self.gate.evaluate(&inputs, kind, now) {
            CadenceDecision::Allowed { remaining_today } => remaining_today,
            CadenceDecision::Blocked { reason, retry_after } => {
                let wait = retry_after.map(|d| d.num_seconds().max(0));
                return self.skip(&mut machine, reason, wait);
            }
        };

        machine.advance(CycleState::Selecting)?;
        let count = request.requested_count().min(remaining_today) as usize;
        let category = campaign.as_ref().and_then(|c| c.category.clone());

        let candidates = self
            .rotation
            .eligible_candidates(
                self.inventory.as_ref(),
                self.ledger.as_ref(),
                &user.user_id,
                category.as_deref(),
                self.config.candidate_pool_size.max(count),
                now,
            )
            .await?;
        if candidates.used_fallback {
            process_info!(
                ProcessId::current(),
                user_id = %user.user_id,
                "🔄 Rotation window narrowed to {} days",
                candidates.window.num_days()
            );
        }

        let seed = request
            .jitter_seed
            .or_else(|| self.config.variety_jitter.then(rand::random::<u64>));
        let mut jitter = seed.map(|seed| Jitter::seeded(seed, self.config.jitter_max));
        let selected = select_top(candidates.products, count, category.as_deref(), jitter.as_mut());

        if selected.is_empty() {
            return self.skip(&mut machine, SkipReason::NoProducts, None);
        }

        let products: Vec<Product> = selected
            .into_iter()
            .map(|scored| {
                process_debug!(
                    ProcessId::current(),
                    user_id = %user.user_id,
                    "🎯 Selected {} (score {:.1})",
                    scored.product.asin,
                    scored.score
                );
                scored.product
            })
            .collect();

        let delivery = self.delivery();
        let user_id = user.user_id.clone();
        let handle = tokio::spawn(async move {
            delivery
                .run(guard, machine, user, campaign, products, channels, kind)
                .await
        });

        handle.await.map_err(|e| OrchestratorError::CycleTaskFailed {
            user_id,
            message: e.to_string(),
        })?
    }

    fn skip(
        &self,
        machine: &mut CycleMachine,
        reason: SkipReason,
        retry_after_seconds: Option<i64>,
    ) -> OrchestratorResult<Vec<CycleReport>> {
        machine.advance(CycleState::Skipped(reason))?;
        let report = CycleReport::skipped(reason, retry_after_seconds);
        process_info!(ProcessId::current(), "⏭️ {}", report.message);
        machine.finish()?;
        Ok(vec![report])
    }

    async fn cadence_inputs(
        &self,
        user: &UserSnapshot,
        has_channels: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) -> OrchestratorResult<CadenceInputs> {
        let latest = self
            .ledger
            .latest_promotion(&user.user_id, None)
            .await?
            .map(|record| record.promoted_at);
        let latest_ai = self
            .ledger
            .latest_promotion(&user.user_id, Some(TriggerKind::Auto))
            .await?
            .map(|record| record.promoted_at);
        let posts_today = self
            .ledger
            .promotions_since(&user.user_id, self.gate.local_midnight(now))
            .await?
            .len() as u32;

        Ok(CadenceInputs {
            tier: self.config.effective_tier(user),
            last_promotion: latest.max(user.last_promotion_timestamp),
            last_ai_promotion: latest_ai.max(user.last_ai_promotion_time),
            posts_today,
            has_channels,
        })
    }

    async fn load_user(&self, user_id: &str) -> OrchestratorResult<UserSnapshot> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| OrchestratorError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Campaigns belonging to another user are treated as unknown
    async fn load_campaign(&self, campaign_id: Uuid, user_id: &str) -> OrchestratorResult<Campaign> {
        self.users
            .get_campaign(campaign_id)
            .await?
            .filter(|campaign| campaign.user_id == user_id)
            .ok_or(OrchestratorError::CampaignNotFound { campaign_id })
    }

    fn delivery(&self) -> Delivery<I, L, U, C> {
        Delivery {
            inventory: self.inventory.clone(),
            ledger: self.ledger.clone(),
            users: self.users.clone(),
            clock: self.clock.clone(),
            dispatcher: self.dispatcher.clone(),
            affiliate_tag: self.config.affiliate_tag.clone(),
        }
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Dispatch and recording half of a cycle, owned by a spawned task
struct Delivery<I, L, U, C> {
    inventory: Arc<I>,
    ledger: Arc<L>,
    users: Arc<U>,
    clock: Arc<C>,
    dispatcher: Dispatcher,
    affiliate_tag: Option<String>,
}

impl<I, L, U, C> Delivery<I, L, U, C>
where
    I: InventoryStore + 'static,
    L: PromotionLedger + 'static,
    U: UserDirectory + 'static,
    C: Clock + 'static,
{
    /// Deliver products in order, stopping at the first one that is not
    /// recorded. The user lock is released when this returns.
    #[allow(clippy::too_many_arguments)]
    async fn run(
        self,
        _guard: OwnedMutexGuard<()>,
        mut machine: CycleMachine,
        user: UserSnapshot,
        campaign: Option<Campaign>,
        products: Vec<Product>,
        channels: Vec<Arc<dyn NotificationChannel>>,
        kind: TriggerKind,
    ) -> OrchestratorResult<Vec<CycleReport>> {
        let mut reports = Vec::with_capacity(products.len());
        for product in products {
            machine.advance(CycleState::Dispatching)?;
            let report = self
                .deliver(&mut machine, &user, campaign.as_ref(), product, channels.clone(), kind)
                .await?;
            let stop = !report.success;
            reports.push(report);
            if stop {
                break;
            }
        }

        machine.finish()?;
        Ok(reports)
    }

    /// Dispatch one product and record it if any channel accepted it
    async fn deliver(
        &self,
        machine: &mut CycleMachine,
        user: &UserSnapshot,
        campaign: Option<&Campaign>,
        mut product: Product,
        channels: Vec<Arc<dyn NotificationChannel>>,
        kind: TriggerKind,
    ) -> OrchestratorResult<CycleReport> {
        let message = PromotionMessage::for_product(&product, self.affiliate_tag.as_deref());
        let dispatch = self.dispatcher.dispatch(&message, channels).await;

        if !dispatch.any_succeeded() {
            machine.advance(CycleState::Failed(FailureReason::Delivery))?;
            process_info!(
                ProcessId::current(),
                user_id = %user.user_id,
                "📭 No channel accepted {}; rotation slot kept",
                product.asin
            );
            return Ok(CycleReport::failed(FailureReason::Delivery, product, dispatch.results));
        }

        machine.advance(CycleState::Recording)?;
        let platforms = dispatch.succeeded();
        let now = self.clock.now();

        match self
            .record(user, campaign, &product, &platforms, dispatch.post_id(), kind, now)
            .await
        {
            Ok(true) => {
                product.times_promoted = product.times_promoted.saturating_add(1);
                product.last_promoted_at = Some(now);
                let report = CycleReport::completed(product, platforms, dispatch.results);
                process_info!(ProcessId::current(), user_id = %user.user_id, "✅ {}", report.message);
                Ok(report)
            }
            Ok(false) => {
                // Report what is stored, not a bump that never happened
                let stored = match self.inventory.get(&product.asin).await {
                    Ok(Some(stored)) => stored,
                    Ok(None) => product,
                    Err(e) => {
                        logging::log_error(ProcessId::current(), "Reloading product", &e);
                        product
                    }
                };
                let report = CycleReport::already_recorded(stored, platforms, dispatch.results);
                process_info!(ProcessId::current(), user_id = %user.user_id, "♻️ {}", report.message);
                Ok(report)
            }
            Err(e) => {
                process_error!(
                    ProcessId::current(),
                    user_id = %user.user_id,
                    "❌ Recording {} failed and was rolled back: {}",
                    product.asin,
                    e
                );
                machine.advance(CycleState::Failed(FailureReason::Persistence))?;
                Ok(CycleReport::failed(FailureReason::Persistence, product, dispatch.results))
            }
        }
    }

    /// Ledger, then inventory stats, then campaign counter. A failing step
    /// undoes the earlier ones. Returns `false` when the ledger already held
    /// this promotion, in which case nothing else is written.
    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        user: &UserSnapshot,
        campaign: Option<&Campaign>,
        product: &Product,
        platforms: &[Platform],
        post_id: Option<String>,
        kind: TriggerKind,
        now: chrono::DateTime<chrono::Utc>,
    ) -> OrchestratorResult<bool> {
        let mut record = PromotionRecord::new(&user.user_id, &product.asin, now, platforms.to_vec(), kind);
        record.post_id = post_id;
        record.campaign_id = campaign.map(|c| c.id);
        let key = record.key();

        let outcome = self.ledger.record_promotion(record).await?;
        if !outcome.was_new {
            process_debug!(ProcessId::current(), "Promotion {:?} already recorded", key);
            return Ok(false);
        }

        let previous = match self.inventory.mark_promoted(&product.asin, now).await {
            Ok(previous) => previous,
            Err(e) => {
                self.rollback(&key, None).await;
                return Err(e);
            }
        };

        if let Some(campaign) = campaign {
            if let Err(e) = self.users.record_campaign_post(campaign.id).await {
                self.rollback(&key, previous).await;
                return Err(e);
            }
        }

        Ok(true)
    }

    async fn rollback(&self, key: &PromotionKey, previous: Option<PromotionStats>) {
        if let Some(stats) = previous {
            if let Err(e) = self.inventory.restore_stats(&key.asin, stats).await {
                logging::log_error(ProcessId::current(), "Restoring inventory stats", &e);
            }
        }
        if let Err(e) = self.ledger.remove_promotion(key).await {
            logging::log_error(ProcessId::current(), "Removing ledger entry", &e);
        }
    }
}

/// Scheduler wired to the in-memory stores, HTTP channels and wall clock
pub type RealScheduler = Scheduler<
    crate::services::RealInventoryStore,
    crate::services::RealPromotionLedger,
    crate::services::RealUserDirectory,
    crate::services::RealChannelFactory,
    crate::services::SystemClock,
>;

impl RealScheduler {
    /// Build a production scheduler from a catalog file and an optional user directory file
    pub async fn from_files(
        catalog: Option<&std::path::Path>,
        users: Option<&std::path::Path>,
        config: SchedulerConfig,
    ) -> OrchestratorResult<Self> {
        use crate::services::{RealChannelFactory, RealInventoryStore, RealPromotionLedger, RealUserDirectory, SystemClock};

        let inventory = RealInventoryStore::new();
        if let Some(path) = catalog {
            let summary = inventory.load_catalog(path).await?;
            process_info!(
                ProcessId::current(),
                "📦 Catalog loaded: {} imported, {} skipped",
                summary.imported,
                summary.skipped
            );
        }

        let directory = match users {
            Some(path) => RealUserDirectory::from_json_file(path).await?,
            None => RealUserDirectory::new(),
        };

        let channels = RealChannelFactory::new(config.endpoints.clone());
        Ok(Scheduler::new(
            inventory,
            RealPromotionLedger::new(),
            directory,
            channels,
            SystemClock,
            config,
        ))
    }
}
