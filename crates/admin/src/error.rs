//! Unified error handling for the back office API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the back office API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Duplicate resource (e.g. admin email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            // Every credential failure collapses to the same client-facing
            // message; the cause is only distinguishable in internal logs.
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_owned()),
            AuthError::InvalidInput(msg) => Self::BadRequest(msg),
            AuthError::EmailTaken => Self::Conflict("Email is already registered".to_owned()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::Hash(msg) => Self::Internal(msg),
            AuthError::Token(e) => Self::Internal(e.to_string()),
        }
    }
}

/// JSON error body: `{"status":"error","message":"..."}`.
#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server-side failures are logged with full detail
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "request error");
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg)
            | Self::BadRequest(msg) => msg,
        };

        (
            status,
            Json(ErrorBody {
                status: "error",
                message,
            }),
        )
            .into_response()
    }
}
