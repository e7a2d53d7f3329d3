// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router and server setup.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use formflow_bot::{MessagePipeline, RateLimiter};
use formflow_core::error::FormflowError;
use formflow_cron::ReconcileSweeper;

use crate::handlers;

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Orchestrator plus delivery behind the error boundary.
    pub pipeline: Arc<MessagePipeline>,
    /// Per-user cooldown fronting the pipeline.
    pub rate_limiter: Arc<RateLimiter>,
    /// Reconciliation sweep, triggered by the form-sync webhook.
    pub reconciler: Arc<ReconcileSweeper>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route("/form-sync", post(handlers::post_form_sync))
        .route("/status-change", post(handlers::post_status_change))
        .route("/health", get(handlers::get_health))
        .route("/callback", get(handlers::get_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the token is cancelled.
pub async fn start_server(
    host: &str,
    port: u16,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), FormflowError> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FormflowError::Gateway {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| FormflowError::Gateway {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
