//! Login and logout endpoints.

use actix_web::{HttpResponse, delete, post, web};
use secrecy::ExposeSecret;
use tracing::warn;

use crate::auth::SessionAuth;
use crate::error::{AppError, AppResult};
use crate::models::{CreateSessionRequest, CreateSessionResponse, RefreshStatus};
use crate::services::session::{RefreshOutcome, SessionStore};

/// Log in with a Qase API token.
///
/// Creates a session and starts loading test cases. Fails with 401 when Qase
/// rejects the token; any other load failure still returns the session with
/// `refresh: failed`.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    tag = "Session",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
        (status = 400, description = "Empty token", body = crate::error::ErrorResponse),
        (status = 401, description = "Token rejected by Qase", body = crate::error::ErrorResponse)
    )
)]
#[post("/session")]
pub async fn create_session(
    store: web::Data<SessionStore>,
    body: web::Json<CreateSessionRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    if body.token.expose_secret().trim().is_empty() {
        return Err(AppError::InvalidInput("token must not be empty".to_string()));
    }

    let session = store.create(body.token).await;

    let refresh = match session.refresh().await {
        Ok(RefreshOutcome::Started { .. }) => RefreshStatus::Started,
        Ok(RefreshOutcome::AlreadyRunning) => RefreshStatus::AlreadyRunning,
        Err(AppError::ReauthRequired) => {
            store.remove(&session.id()).await;
            return Err(AppError::ReauthRequired);
        }
        Err(e) => {
            // Session stays usable; the client retries via /dashboard/refresh
            warn!("Initial load failed for session {}: {}", session.id(), e);
            RefreshStatus::Failed
        }
    };

    Ok(HttpResponse::Created().json(CreateSessionResponse {
        session_id: session.id(),
        created_at: session.created_at(),
        refresh,
    }))
}

/// Log out and discard all data loaded for the session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    tag = "Session",
    params(("X-Session-Id" = String, Header, description = "Session id")),
    responses(
        (status = 204, description = "Session removed"),
        (status = 401, description = "Unknown session", body = crate::error::ErrorResponse)
    )
)]
#[delete("/session")]
pub async fn delete_session(
    store: web::Data<SessionStore>,
    auth: SessionAuth,
) -> HttpResponse {
    store.remove(&auth.session.id()).await;
    HttpResponse::NoContent().finish()
}

/// Configure session routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_session).service(delete_session);
}
