//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                - Liveness check
//! GET  /health/ready          - Readiness check (pings the ERP)
//!
//! # Webhooks
//! POST /webhooks/forms/order  - Order form submission
//! ```

pub mod orders;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/forms/order", post(orders::handle_order_submission))
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/webhooks", webhook_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the ERP endpoint is reachable before returning OK.
/// Returns 503 Service Unavailable if the ERP cannot be pinged.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.erp().version().await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
