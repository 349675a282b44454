//! Session request and response models.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request to log in with a Qase API token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Qase API token (never echoed back or logged)
    #[schema(value_type = String)]
    pub token: SecretString,
}

/// Newly created session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionResponse {
    /// Pass as `X-Session-Id` on subsequent requests
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Whether the initial load was started
    pub refresh: RefreshStatus,
}

/// Outcome of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Started,
    AlreadyRunning,
    Failed,
}

/// Response to `POST /dashboard/refresh`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub status: RefreshStatus,
    /// Number of test cases fetched, when a refresh was started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<usize>,
}
