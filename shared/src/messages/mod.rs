//! Message types exchanged between the trigger surfaces and the scheduler
//!
//! - `trigger`: inbound promotion requests and their responses
//! - `cycle`: per-cycle reports, skip/failure reasons and cadence status

pub mod cycle;
pub mod trigger;

pub use cycle::{CadenceStatus, ChannelOutcome, CycleOutcome, CycleReport, FailureReason, SkipReason};
pub use trigger::{TriggerRequest, TriggerResponse};
