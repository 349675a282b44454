//! Domain error types for the Qase dashboard server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Errors talking to the Qase API.
#[derive(Debug, thiserror::Error)]
pub enum QaseError {
    /// Qase rejected the API token (HTTP 401/403)
    #[error("Qase rejected the API token")]
    Unauthorized,

    /// Any other non-2xx status
    #[error("Qase API error: {status} {reason}")]
    Status { status: u16, reason: String },

    /// Connection, TLS or timeout failure
    #[error("Qase request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Unexpected Qase response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl QaseError {
    /// Whether the caller must log in again with a new token.
    pub fn is_auth(&self) -> bool {
        matches!(self, QaseError::Unauthorized)
    }
}

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or unknown session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Qase rejected the session's token; the session has been discarded
    #[error("Invalid API token. Please login again.")]
    ReauthRequired,

    /// Qase call failed for a reason other than authentication
    #[error("{0}")]
    Upstream(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code) = match self {
            AppError::NotFound(_) => (actix_web::http::StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InvalidInput(_) => {
                (actix_web::http::StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            AppError::Unauthorized(_) => {
                (actix_web::http::StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AppError::ReauthRequired => {
                (actix_web::http::StatusCode::UNAUTHORIZED, "REAUTH_REQUIRED")
            }
            AppError::Upstream(err_str) => {
                tracing::error!("Upstream error: {}", err_str);
                (actix_web::http::StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: self.to_string(),
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<QaseError> for AppError {
    fn from(err: QaseError) -> Self {
        match err {
            QaseError::Unauthorized => AppError::ReauthRequired,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Unauthorized(format!("Malformed session id: {}", err))
    }
}
