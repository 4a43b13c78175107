//! Error types for the game state API layer.
//!
//! [`ApiError`] unifies all request-level failure modes into a single enum
//! that converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every error
//! body has the same shape: `{"error": <message>, "timestamp": <unix secs>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::accessor::AccessError;
use crate::handlers::PLAYER_NOT_FOUND;
use crate::metrics::MetricsError;

/// Message returned to clients for every 5xx response. Details stay in
/// the server log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was missing a required input.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The game state accessor failed.
    #[error("accessor error: {0}")]
    Access(#[from] AccessError),

    /// Host metrics could not be sampled.
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// The path exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::Access(AccessError::PlayerGone(_)) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Access(_) | Self::Metrics(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Build the `{error, timestamp}` body shared by every error response.
pub fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": message,
        "timestamp": chrono::Utc::now().timestamp(),
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::MethodNotAllowed => self.to_string(),
            // Logged out between lookup and read.
            Self::Access(AccessError::PlayerGone(_)) => PLAYER_NOT_FOUND.to_owned(),
            Self::Access(_) | Self::Metrics(_) | Self::Internal(_) => {
                error!(error = %self, "request failed");
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
        };

        (status, axum::Json(error_body(&message))).into_response()
    }
}
