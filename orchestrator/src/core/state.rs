//! Promotion cycle state machine
//!
//! A cycle moves `Idle -> CheckingCadence -> Selecting -> Dispatching ->
//! Recording -> Idle`, or exits early through `Skipped(reason)` /
//! `Failed(reason)`. Batch triggers loop `Recording -> Dispatching` once per
//! additional product.

use serde::{Deserialize, Serialize};
use shared::{process_debug, FailureReason, ProcessId, SkipReason};

use crate::error::{OrchestratorError, OrchestratorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    CheckingCadence,
    Selecting,
    Dispatching,
    Recording,
    Skipped(SkipReason),
    Failed(FailureReason),
}

impl CycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleState::Skipped(_) | CycleState::Failed(_))
    }

    pub fn can_transition_to(&self, next: &CycleState) -> bool {
        use CycleState::*;

        match (self, next) {
            (Idle, CheckingCadence) => true,
            (CheckingCadence, Selecting) => true,
            (CheckingCadence, Skipped(reason)) => *reason != SkipReason::NoProducts,
            (Selecting, Dispatching) => true,
            (Selecting, Skipped(SkipReason::NoProducts)) => true,
            (Dispatching, Recording) => true,
            (Dispatching, Failed(FailureReason::Delivery)) => true,
            (Recording, Idle) => true,
            (Recording, Dispatching) => true,
            (Recording, Failed(FailureReason::Persistence)) => true,
            (Skipped(_), Idle) | (Failed(_), Idle) => true,
            _ => false,
        }
    }
}

/// Tracks one user's cycle and rejects illegal transitions
#[derive(Debug, Clone)]
pub struct CycleMachine {
    user_id: String,
    state: CycleState,
    trail: Vec<CycleState>,
}

impl CycleMachine {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: CycleState::Idle,
            trail: vec![CycleState::Idle],
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Every state visited so far, starting with `Idle`
    pub fn trail(&self) -> &[CycleState] {
        &self.trail
    }

    pub fn advance(&mut self, next: CycleState) -> OrchestratorResult<()> {
        if !self.state.can_transition_to(&next) {
            return Err(OrchestratorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        process_debug!(
            ProcessId::current(),
            user_id = %self.user_id,
            "🔁 Cycle {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        self.trail.push(next);
        Ok(())
    }

    /// Return to `Idle` from a terminal or completed state
    pub fn finish(&mut self) -> OrchestratorResult<()> {
        if self.state == CycleState::Idle {
            return Ok(());
        }
        self.advance(CycleState::Idle)
    }
}
