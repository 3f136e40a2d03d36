//! Main webserver implementation
//!
//! Builds the axum router over an injected `PromotionTrigger` and serves it
//! until the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use shared::{process_info, ProcessId};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;
use crate::traits::PromotionTrigger;
use crate::web::handlers::api;

/// HTTP trigger surface for the scheduler
#[derive(Clone)]
pub struct WebServer {
    bind_address: SocketAddr,
    state: AppState,
}

impl WebServer {
    pub fn new(bind_address: SocketAddr, trigger: Arc<dyn PromotionTrigger>) -> Self {
        Self {
            bind_address,
            state: AppState::new(trigger),
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/api/promote", post(api::promote))
            .route("/api/auto-promote", post(api::auto_promote))
            .route("/api/users/:user_id/cadence", get(api::cadence))
            .route("/health", get(api::health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` completes
    pub async fn run<S>(&self, shutdown: S) -> WebServerResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {}: {}", self.bind_address, e)))?;

        process_info!(ProcessId::current(), "🌐 Listening on http://{}", self.bind_address);

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }
}
