//! Error types for the session and request layers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Login failures. Surfaced to the user as inline text, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Problems reading a stored session.
///
/// Never leaves the session layer: a corrupt session is logged and read as anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session field `{field}` is missing")]
    Missing { field: &'static str },
    #[error("session field `{field}` is malformed: {value:?}")]
    Corrupt { field: &'static str, value: String },
}

/// Failures while signing a session token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session expiry of {hours} hours is out of range")]
    ExpiryOutOfRange { hours: i64 },

    #[error(transparent)]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Handler-level error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the logs.
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
