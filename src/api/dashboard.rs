//! Dashboard API handlers: scoped suite tree, statistics, refresh and selection.

use actix_web::{HttpResponse, delete, get, post, web};

use crate::auth::SessionAuth;
use crate::error::{AppError, AppResult};
use crate::models::{
    DashboardResponse, DescendantsResponse, LoadStateResponse, RefreshResponse, RefreshStatus,
    SelectionResponse, TestCaseListResponse,
};
use crate::services::labels::distributions;
use crate::services::selection::{SuiteSelection, descendant_ids};
use crate::services::session::{DashboardSession, LoadState, RefreshOutcome, SessionStore};

impl From<LoadState> for LoadStateResponse {
    fn from(state: LoadState) -> Self {
        LoadStateResponse {
            test_cases_loaded: state.test_cases_loaded,
            suites_loaded: state.suites_loaded,
            refreshing: state.refreshing,
            last_error: state.last_error,
            loaded_at: state.loaded_at,
        }
    }
}

async fn selection_response(
    session: &DashboardSession,
    selection: &SuiteSelection,
) -> SelectionResponse {
    let view = session.view().await;
    SelectionResponse {
        suite_ids: selection.ids(),
        selected_test_cases: selection.filter_cases(&view.scoped_cases).len(),
    }
}

/// Get the scoped dashboard for the current session.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    params(("X-Session-Id" = String, Header, description = "Session id")),
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "No session or token rejected", body = crate::error::ErrorResponse)
    )
)]
#[get("/dashboard")]
pub async fn get_dashboard(auth: SessionAuth) -> AppResult<HttpResponse> {
    let session = &auth.session;
    let view = session.view().await;
    let selection = session.selection().await;
    let load_state = session.load_state().await;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        root: session.root().clone(),
        scoped_test_cases: view.scoped_cases.len(),
        distributions: distributions(&view.stats),
        selection: SelectionResponse {
            suite_ids: selection.ids(),
            selected_test_cases: view.filtered_cases.len(),
        },
        stats: view.stats,
        tree: view.tree,
        load_state: load_state.into(),
    }))
}

/// Start a refresh of the session's data.
///
/// Returns after test cases are loaded; suites continue loading in the background.
/// A refresh requested while one is running does nothing.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/refresh",
    tag = "Dashboard",
    params(("X-Session-Id" = String, Header, description = "Session id")),
    responses(
        (status = 202, description = "Refresh started or already running", body = RefreshResponse),
        (status = 401, description = "Token rejected by Qase", body = crate::error::ErrorResponse),
        (status = 502, description = "Qase request failed", body = crate::error::ErrorResponse)
    )
)]
#[post("/dashboard/refresh")]
pub async fn refresh_dashboard(
    store: web::Data<SessionStore>,
    auth: SessionAuth,
) -> AppResult<HttpResponse> {
    let response = match auth.session.refresh().await {
        Ok(RefreshOutcome::Started { test_cases, .. }) => RefreshResponse {
            status: RefreshStatus::Started,
            test_cases: Some(test_cases),
        },
        Ok(RefreshOutcome::AlreadyRunning) => RefreshResponse {
            status: RefreshStatus::AlreadyRunning,
            test_cases: None,
        },
        Err(AppError::ReauthRequired) => {
            store.remove(&auth.session.id()).await;
            return Err(AppError::ReauthRequired);
        }
        Err(e) => return Err(e),
    };

    Ok(HttpResponse::Accepted().json(response))
}

/// List test cases in scope, narrowed by the current selection.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/cases",
    tag = "Dashboard",
    params(("X-Session-Id" = String, Header, description = "Session id")),
    responses(
        (status = 200, description = "Test cases", body = TestCaseListResponse),
        (status = 401, description = "No session", body = crate::error::ErrorResponse)
    )
)]
#[get("/dashboard/cases")]
pub async fn list_cases(auth: SessionAuth) -> AppResult<HttpResponse> {
    let view = auth.session.view().await;
    Ok(HttpResponse::Ok().json(TestCaseListResponse {
        total: view.filtered_cases.len(),
        test_cases: view.filtered_cases,
    }))
}

/// Get a suite id together with all its descendants in the scoped tree.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/suites/{suite_id}/descendants",
    tag = "Dashboard",
    params(
        ("suite_id" = i64, Path, description = "Suite id"),
        ("X-Session-Id" = String, Header, description = "Session id")
    ),
    responses(
        (status = 200, description = "Descendant ids", body = DescendantsResponse),
        (status = 401, description = "No session", body = crate::error::ErrorResponse)
    )
)]
#[get("/dashboard/suites/{suite_id}/descendants")]
pub async fn get_descendants(auth: SessionAuth, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let view = auth.session.view().await;
    Ok(HttpResponse::Ok().json(DescendantsResponse {
        suite_id,
        descendant_ids: descendant_ids(suite_id, &view.tree),
    }))
}

/// Toggle a suite and its descendants in the selection.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/selection/toggle/{suite_id}",
    tag = "Dashboard",
    params(
        ("suite_id" = i64, Path, description = "Suite id"),
        ("X-Session-Id" = String, Header, description = "Session id")
    ),
    responses(
        (status = 200, description = "Updated selection", body = SelectionResponse),
        (status = 401, description = "No session", body = crate::error::ErrorResponse)
    )
)]
#[post("/dashboard/selection/toggle/{suite_id}")]
pub async fn toggle_selection(auth: SessionAuth, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let selection = auth.session.toggle_selection(path.into_inner()).await;
    Ok(HttpResponse::Ok().json(selection_response(&auth.session, &selection).await))
}

/// Select every suite in the scoped tree.
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/selection/all",
    tag = "Dashboard",
    params(("X-Session-Id" = String, Header, description = "Session id")),
    responses(
        (status = 200, description = "Updated selection", body = SelectionResponse),
        (status = 401, description = "No session", body = crate::error::ErrorResponse)
    )
)]
#[post("/dashboard/selection/all")]
pub async fn select_all(auth: SessionAuth) -> AppResult<HttpResponse> {
    let selection = auth.session.select_all().await;
    Ok(HttpResponse::Ok().json(selection_response(&auth.session, &selection).await))
}

/// Clear the selection, showing every suite in scope again.
#[utoipa::path(
    delete,
    path = "/api/v1/dashboard/selection",
    tag = "Dashboard",
    params(("X-Session-Id" = String, Header, description = "Session id")),
    responses(
        (status = 200, description = "Cleared selection", body = SelectionResponse),
        (status = 401, description = "No session", body = crate::error::ErrorResponse)
    )
)]
#[delete("/dashboard/selection")]
pub async fn clear_selection(auth: SessionAuth) -> AppResult<HttpResponse> {
    let selection = auth.session.clear_selection().await;
    Ok(HttpResponse::Ok().json(selection_response(&auth.session, &selection).await))
}

/// Configure dashboard routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_dashboard)
        .service(refresh_dashboard)
        .service(list_cases)
        .service(get_descendants)
        .service(toggle_selection)
        .service(select_all)
        .service(clear_selection);
}
