//! Promotion scheduling and deduplication engine
//!
//! Decides when each user may promote a product, which product to promote
//! without repeating recent picks, delivers the promotion to every configured
//! channel, and records what was posted.

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{ChannelEndpoints, SchedulerConfig, TierPolicies, TierPolicy};
pub use crate::core::{CadenceGate, CycleMachine, CycleState, PromotionMessage, RotationPolicy};
pub use error::{ChannelError, OrchestratorError, OrchestratorResult};
pub use orchestrator::{RealScheduler, Scheduler, SweepResults};
pub use traits::{ChannelFactory, Clock, InventoryStore, NotificationChannel, PromotionLedger, UserDirectory};
