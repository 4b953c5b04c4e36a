//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! The HTTP mapping is deliberately small: a malformed payload is the
//! caller's fault (400), a failed or nonsensical ERP exchange is an upstream
//! problem (502), and everything else is a 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::erp::ErpError;
use crate::forms::PayloadError;

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// The inbound webhook payload could not be parsed or normalized.
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// An ERP API call failed.
    #[error("ERP error: {0}")]
    Erp(#[from] ErpError),

    /// Webhook signature verification failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to the webhook caller.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture upstream and internal failures to Sentry
        if matches!(self, Self::Erp(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Payload(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Erp(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Payload problems are actionable for the caller; upstream and
        // internal details are not exposed.
        let message = match &self {
            Self::Payload(err) => err.to_string(),
            Self::Unauthorized(_) => "Invalid webhook signature".to_string(),
            Self::Erp(_) => "Upstream ERP error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
