//! E2E tests: login, logout and token rejection.

use actix_web::test;
use serde_json::json;

use super::mock_qase_api::MockQaseApi;
use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_and_info() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;

    let (status, body) = call(&app, test::TestRequest::get().uri("/api/v1/health"), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");

    login_ok(&app).await;
    let (status, body) = call(&app, test::TestRequest::get().uri("/api/v1/info"), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["project_code"], PROJECT_CODE);
    assert_eq!(body["root_suite"]["display_name"], "PAS (Root)");
    assert_eq!(body["active_sessions"], 1);
}

/// Login returns a session id and starts the first load.
#[actix_rt::test]
async fn test_login_creates_session() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;

    let (status, body) = login(&app, VALID_TOKEN).await;

    assert_eq!(status, 201);
    assert_eq!(body["refresh"], "started");
    assert!(body["session_id"].is_string());
    assert!(body.get("token").is_none(), "token must never be echoed");
    assert_eq!(store.len().await, 1);
}

#[actix_rt::test]
async fn test_login_with_blank_token_rejected() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;

    let (status, body) = login(&app, "   ").await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
    assert!(store.is_empty().await);
    assert!(mock.case_offsets().is_empty());
}

/// A token Qase rejects yields REAUTH_REQUIRED and leaves no session behind.
#[actix_rt::test]
async fn test_login_with_rejected_token() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;

    let (status, body) = login(&app, REJECTED_TOKEN).await;

    assert_eq!(status, 401);
    assert_eq!(body["error"], "REAUTH_REQUIRED");
    assert_eq!(body["message"], "Invalid API token. Please login again.");
    assert!(store.is_empty().await);
}

/// A transient Qase failure still creates the session so the client can retry.
#[actix_rt::test]
async fn test_login_survives_transient_failure() {
    let mut fixture = project_fixture();
    fixture.fail_case_list = true;
    let mock = MockQaseApi::start(fixture).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;

    let (status, body) = login(&app, VALID_TOKEN).await;
    assert_eq!(status, 201);
    assert_eq!(body["refresh"], "failed");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    mock.with_state(|s| s.fail_case_list = false);
    let (status, body) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/dashboard/refresh"),
        Some(&session_id),
    )
    .await;
    assert_eq!(status, 202);
    assert_eq!(body["status"], "started");

    let body = wait_for_suites(&app, &session_id).await;
    assert_eq!(body["scoped_test_cases"], 4);
}

#[actix_rt::test]
async fn test_requests_without_session_are_unauthorized() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;

    let (status, body) = call(&app, test::TestRequest::get().uri("/api/v1/dashboard"), None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/dashboard"),
        Some("not-a-uuid"),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/dashboard"),
        Some("5f0c6d2e-9a51-4c3b-8f7e-0d4a2b1c3e5f"),
    )
    .await;
    assert_eq!(status, 401);
}

/// Logout discards the session; it cannot be used afterwards.
#[actix_rt::test]
async fn test_logout() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;
    let session_id = login_ok(&app).await;

    let (status, body) = call(
        &app,
        test::TestRequest::delete().uri("/api/v1/session"),
        Some(&session_id),
    )
    .await;
    assert_eq!(status, 204);
    assert_eq!(body, serde_json::Value::Null);
    assert!(store.is_empty().await);

    let (status, _) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/dashboard"),
        Some(&session_id),
    )
    .await;
    assert_eq!(status, 401);
}

/// Sessions do not share data or selections.
#[actix_rt::test]
async fn test_sessions_are_isolated() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;
    let first = login_ok(&app).await;
    let second = login_ok(&app).await;
    assert_ne!(first, second);
    wait_for_suites(&app, &first).await;
    wait_for_suites(&app, &second).await;

    call(
        &app,
        test::TestRequest::post().uri("/api/v1/dashboard/selection/toggle/12"),
        Some(&first),
    )
    .await;

    let (_, body) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/dashboard"),
        Some(&second),
    )
    .await;
    assert_eq!(body["selection"]["suite_ids"], json!([]));
    assert_eq!(body["stats"]["total_tests"], 4);
}

/// A token revoked mid-session forces a new login on the next request.
#[actix_rt::test]
async fn test_token_revoked_after_login() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;
    let session_id = login_ok(&app).await;
    wait_for_suites(&app, &session_id).await;

    mock.with_state(|s| {
        s.rejected_tokens.insert(VALID_TOKEN.to_string());
    });

    let (status, body) = call(
        &app,
        test::TestRequest::post().uri("/api/v1/dashboard/refresh"),
        Some(&session_id),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "REAUTH_REQUIRED");
    assert!(store.is_empty().await);

    let (status, body) = call(
        &app,
        test::TestRequest::get().uri("/api/v1/dashboard"),
        Some(&session_id),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

/// A rejection during suite loading is reported once, on the next request.
#[actix_rt::test]
async fn test_suite_auth_failure_requires_reauth() {
    let mut fixture = project_fixture();
    fixture.reject_suite_requests = true;
    let mock = MockQaseApi::start(fixture).await;
    let store = create_store(&mock);
    let app = create_test_app(&store).await;
    let session_id = login_ok(&app).await;

    let mut last = (0, serde_json::Value::Null);
    for _ in 0..200 {
        last = call(
            &app,
            test::TestRequest::get().uri("/api/v1/dashboard"),
            Some(&session_id),
        )
        .await;
        if last.0 != 200 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }

    assert_eq!(last.0, 401);
    assert_eq!(last.1["error"], "REAUTH_REQUIRED");
    assert!(store.is_empty().await);
}
