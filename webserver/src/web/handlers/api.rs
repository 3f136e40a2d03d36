//! REST API handlers
//!
//! Trigger endpoints answer 200 with `success=false` when a cycle is skipped
//! or undelivered; only infrastructure and lookup failures become error codes.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared::{process_info, CadenceStatus, ProcessId, TriggerKind, TriggerRequest, TriggerResponse};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;

/// Manual "promote now" - /api/promote
pub async fn promote(State(state): State<AppState>, Json(request): Json<TriggerRequest>) -> WebServerResult<Json<TriggerResponse>> {
    run_trigger(&state, request, TriggerKind::Manual).await
}

/// AI auto-promote - /api/auto-promote
pub async fn auto_promote(
    State(state): State<AppState>,
    Json(request): Json<TriggerRequest>,
) -> WebServerResult<Json<TriggerResponse>> {
    run_trigger(&state, request, TriggerKind::Auto).await
}

async fn run_trigger(state: &AppState, request: TriggerRequest, kind: TriggerKind) -> WebServerResult<Json<TriggerResponse>> {
    if request.user_id.trim().is_empty() {
        return Err(WebServerError::invalid("userId must not be empty"));
    }

    let user_id = request.user_id.clone();
    let response = state.trigger.trigger(request, kind).await?;
    process_info!(
        ProcessId::current(),
        user_id = %user_id,
        "📨 {} trigger: {}",
        kind,
        response.message
    );
    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
pub struct CadenceQuery {
    /// Trigger to evaluate against; auto-promote has its own cooldown
    pub trigger: Option<TriggerKind>,
}

/// Cadence view - /api/users/:user_id/cadence
pub async fn cadence(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<CadenceQuery>,
) -> WebServerResult<Json<CadenceStatus>> {
    let kind = query.trigger.unwrap_or(TriggerKind::Manual);
    let status = state.trigger.cadence_status(&user_id, kind).await?;
    Ok(Json(status))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime": state.uptime_seconds(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
