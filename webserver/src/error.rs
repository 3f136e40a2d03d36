//! WebServer-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use orchestrator::OrchestratorError;
use shared::{process_error, ProcessId, SharedError};

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error(transparent)]
    Scheduler(#[from] OrchestratorError),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WebServerError {
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::InvalidRequest {
            details: details.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebServerError::InvalidRequest { .. } | WebServerError::SharedError(_) => StatusCode::BAD_REQUEST,
            WebServerError::Scheduler(error) => match error {
                OrchestratorError::UserNotFound { .. } | OrchestratorError::CampaignNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                OrchestratorError::ValidationError { .. } | OrchestratorError::SharedError(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebServerError::ServerStartup(_) | WebServerError::IoError(_) | WebServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            process_error!(ProcessId::current(), "❌ Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;
