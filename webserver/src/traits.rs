//! Service trait definitions for dependency injection
//!
//! Handlers only see the scheduler through this seam, so routes can be
//! tested against a mock.

use async_trait::async_trait;

use orchestrator::traits::{ChannelFactory, Clock, InventoryStore, PromotionLedger, UserDirectory};
use orchestrator::{OrchestratorResult, Scheduler};
use shared::{CadenceStatus, TriggerKind, TriggerRequest, TriggerResponse};

/// Runs promotion cycles on behalf of HTTP callers
#[mockall::automock]
#[async_trait]
pub trait PromotionTrigger: Send + Sync {
    /// Run one cycle for the requesting user
    async fn trigger(&self, request: TriggerRequest, kind: TriggerKind) -> OrchestratorResult<TriggerResponse>;

    /// Side-effect free cadence view
    async fn cadence_status(&self, user_id: &str, kind: TriggerKind) -> OrchestratorResult<CadenceStatus>;
}

#[async_trait]
impl<I, L, U, F, C> PromotionTrigger for Scheduler<I, L, U, F, C>
where
    I: InventoryStore + 'static,
    L: PromotionLedger + 'static,
    U: UserDirectory + 'static,
    F: ChannelFactory + 'static,
    C: Clock + 'static,
{
    async fn trigger(&self, request: TriggerRequest, kind: TriggerKind) -> OrchestratorResult<TriggerResponse> {
        Scheduler::trigger(self, request, kind).await
    }

    async fn cadence_status(&self, user_id: &str, kind: TriggerKind) -> OrchestratorResult<CadenceStatus> {
        Scheduler::cadence_status(self, user_id, kind).await
    }
}
