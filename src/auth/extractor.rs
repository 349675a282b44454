//! Actix-web extractor resolving the caller's dashboard session.
//!
//! The session id travels in the `X-Session-Id` header. A session whose Qase token
//! has been rejected is removed from the store here, so the client is told to log in
//! again exactly once per rejected token.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::config::SESSION_ID_HEADER;
use crate::error::AppError;
use crate::services::session::{DashboardSession, SessionStore};

/// Extractor that requires a live session.
///
/// ```ignore
/// async fn handler(auth: SessionAuth) -> impl Responder {
///     let view = auth.session.view().await;
/// }
/// ```
pub struct SessionAuth {
    pub session: Arc<DashboardSession>,
}

fn session_id(req: &HttpRequest) -> Result<Uuid, AppError> {
    let raw = req
        .headers()
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", SESSION_ID_HEADER)))?;
    Ok(Uuid::parse_str(raw.trim())?)
}

impl FromRequest for SessionAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let store = req.app_data::<web::Data<SessionStore>>().cloned();
        let id = session_id(req);

        Box::pin(async move {
            let store = store
                .ok_or_else(|| AppError::Unauthorized("Internal configuration error".to_string()))?;
            let id = id?;

            let session = store
                .get(&id)
                .await
                .ok_or_else(|| AppError::Unauthorized("Unknown or expired session".to_string()))?;

            if !session.is_authenticated().await {
                store.remove(&id).await;
                return Err(AppError::ReauthRequired);
            }

            Ok(SessionAuth { session })
        })
    }
}
