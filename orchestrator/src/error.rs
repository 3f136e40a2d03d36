//! Scheduler-specific error types

use shared::{Platform, SharedError};
use thiserror::Error;
use uuid::Uuid;

use crate::core::state::CycleState;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Validation failed: {message}")]
    ValidationError { message: String },

    #[error("Unknown user: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Unknown campaign: {campaign_id}")]
    CampaignNotFound { campaign_id: Uuid },

    #[error("Persistence failure during {operation}: {message}")]
    PersistenceError { operation: String, message: String },

    #[error("Invalid cycle transition: {from:?} -> {to:?}")]
    InvalidTransition { from: CycleState, to: CycleState },

    #[error("Cycle task for {user_id} failed: {message}")]
    CycleTaskFailed { user_id: String, message: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn persistence(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::PersistenceError {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Failure of a single notification channel call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("{platform} returned HTTP {status}: {body}")]
    HttpStatus { platform: Platform, status: u16, body: String },

    #[error("{platform} rejected the post: {message}")]
    Rejected { platform: Platform, message: String },

    #[error("{platform} transport error: {message}")]
    Transport { platform: Platform, message: String },

    #[error("{platform} timed out after {seconds}s")]
    Timeout { platform: Platform, seconds: u64 },

    #[error("{platform} is missing credential {field}")]
    MissingCredential { platform: Platform, field: String },

    #[error("{platform} send task aborted: {message}")]
    TaskAborted { platform: Platform, message: String },
}

impl ChannelError {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ChannelError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
