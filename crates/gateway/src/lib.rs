//! Formbridge Gateway library.
//!
//! This crate provides the gateway functionality as a library, allowing the
//! router to be driven directly in integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod erp;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router for the given state.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
