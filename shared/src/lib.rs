//! Shared types for the promotion scheduling system
//!
//! Contains the catalog, ledger and user types used by both the scheduler
//! and the webserver, plus the request/report messages that flow between them.

pub mod types;
pub mod errors;
pub mod messages;
pub mod logging;

pub use types::*;
pub use errors::*;

pub use messages::{
    // Trigger surface
    TriggerRequest, TriggerResponse,

    // Cycle results
    CadenceStatus, ChannelOutcome, CycleOutcome, CycleReport, FailureReason, SkipReason,
};
