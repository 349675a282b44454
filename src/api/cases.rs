//! Test case detail endpoint.

use actix_web::{HttpResponse, get, web};

use crate::auth::SessionAuth;
use crate::error::{AppError, AppResult};
use crate::models::TestCaseDetail;
use crate::services::session::SessionStore;

/// Get one test case with description, conditions and steps.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{case_id}",
    tag = "Test Cases",
    params(
        ("case_id" = i64, Path, description = "Qase test case id"),
        ("X-Session-Id" = String, Header, description = "Session id")
    ),
    responses(
        (status = 200, description = "Test case detail", body = TestCaseDetail),
        (status = 401, description = "No session or token rejected", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Qase request failed", body = crate::error::ErrorResponse)
    )
)]
#[get("/cases/{case_id}")]
pub async fn get_case(
    store: web::Data<SessionStore>,
    auth: SessionAuth,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    match auth.session.test_case_detail(path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(detail)),
        Err(AppError::ReauthRequired) => {
            store.remove(&auth.session.id()).await;
            Err(AppError::ReauthRequired)
        }
        Err(e) => Err(e),
    }
}

/// Configure test case routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_case);
}
