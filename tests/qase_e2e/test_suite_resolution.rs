//! E2E tests: resolving suites and their parent chains.

use std::collections::HashSet;
use std::time::Duration;

use qase_dashboard_lib::config::QaseSettings;
use qase_dashboard_lib::error::QaseError;
use qase_dashboard_lib::models::{TestCase, TestSuite};
use qase_dashboard_lib::services::QaseClient;

use super::mock_qase_api::MockQaseApi;
use super::test_helpers::*;

async fn fixture_cases(mock: &MockQaseApi) -> Vec<TestCase> {
    client(mock)
        .fetch_all_test_cases(&token(VALID_TOKEN))
        .await
        .unwrap()
}

fn ids(suites: &[TestSuite]) -> HashSet<i64> {
    suites.iter().map(|s| s.id).collect()
}

/// Every referenced suite, every ancestor and every required id is resolved once.
#[actix_rt::test]
async fn test_resolves_chains_and_required_ids() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let cases = fixture_cases(&mock).await;

    let suites = client(&mock)
        .fetch_all_suites(&token(VALID_TOKEN), &cases, &[96])
        .await
        .unwrap();

    assert_eq!(ids(&suites), HashSet::from([9, 10, 11, 12, 20, 96]));
    assert_eq!(suites.len(), 6, "no suite may appear twice");

    let requests = mock.suite_requests();
    let unique: HashSet<i64> = requests.iter().copied().collect();
    assert_eq!(requests.len(), unique.len(), "each suite fetched once: {requests:?}");
}

/// Suites come back with their parent links intact.
#[actix_rt::test]
async fn test_parent_links_preserved() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let cases = fixture_cases(&mock).await;

    let suites = client(&mock)
        .fetch_all_suites(&token(VALID_TOKEN), &cases, &[])
        .await
        .unwrap();

    let tokens = suites.iter().find(|s| s.id == 11).unwrap();
    assert_eq!(tokens.title, "Tokens");
    assert_eq!(tokens.parent_id, Some(10));
    let pas = suites.iter().find(|s| s.id == 9).unwrap();
    assert_eq!(pas.parent_id, None);
    assert!(!ids(&suites).contains(&96));
}

/// A suite that fails to load becomes a placeholder and its chain stops there.
#[actix_rt::test]
async fn test_failed_suite_becomes_placeholder() {
    let mut fixture = project_fixture();
    fixture.failing_suites.insert(10);
    let mock = MockQaseApi::start(fixture).await;
    let cases = fixture_cases(&mock).await;

    let suites = client(&mock)
        .fetch_all_suites(&token(VALID_TOKEN), &cases, &[])
        .await
        .unwrap();

    let login = suites.iter().find(|s| s.id == 10).unwrap();
    assert_eq!(login, &TestSuite::placeholder(10));
    assert_eq!(login.title, "Suite 10");
    // 9 is still reached through Checkout
    assert!(ids(&suites).contains(&9));
}

/// A suite Qase answers without a result is skipped.
#[actix_rt::test]
async fn test_unknown_suite_is_skipped() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let cases = fixture_cases(&mock).await;

    let suites = client(&mock)
        .fetch_all_suites(&token(VALID_TOKEN), &cases, &[4242])
        .await
        .unwrap();

    assert!(!ids(&suites).contains(&4242));
    assert!(mock.suite_requests().contains(&4242));
}

/// An auth failure while resolving suites aborts the whole operation.
#[actix_rt::test]
async fn test_auth_failure_aborts() {
    let mock = MockQaseApi::start(project_fixture()).await;
    let cases = fixture_cases(&mock).await;
    mock.with_state(|s| s.reject_suite_requests = true);

    let err = client(&mock)
        .fetch_all_suites(&token(VALID_TOKEN), &cases, &[96])
        .await
        .unwrap_err();

    assert!(matches!(err, QaseError::Unauthorized));
}

fn batched_fixture(ids: std::ops::Range<i64>) -> super::mock_qase_api::MockQaseState {
    let mut fixture = project_fixture();
    for id in ids {
        fixture
            .suites
            .insert(id, super::mock_qase_api::suite_json(id, &format!("S{id}"), Some(9)));
    }
    fixture.suite_delay = Duration::from_millis(50);
    fixture
}

/// Batch index of each required id request, in arrival order.
fn batch_order(requests: &[i64], first_id: i64, batch_size: i64) -> Vec<i64> {
    requests
        .iter()
        .filter(|&&id| id >= first_id)
        .map(|&id| (id - first_id) / batch_size)
        .collect()
}

/// Ids beyond one batch are all resolved, at most one batch at a time.
#[actix_rt::test]
async fn test_multiple_batches() {
    let mock = MockQaseApi::start(batched_fixture(100..125)).await;
    let required: Vec<i64> = (100..125).collect();

    let suites = client(&mock)
        .fetch_all_suites(&token(VALID_TOKEN), &[], &required)
        .await
        .unwrap();

    let resolved = ids(&suites);
    assert!(required.iter().all(|id| resolved.contains(id)));
    assert!(resolved.contains(&9));
    assert_eq!(suites.len(), 26);

    let peak = mock.peak_suites_in_flight();
    assert!(peak <= 10, "at most one batch in flight, saw {peak}");
    assert!(peak > 1, "chains within a batch run concurrently");

    let order = batch_order(&mock.suite_requests(), 100, 10);
    assert_eq!(order.len(), 25);
    assert!(
        order.windows(2).all(|pair| pair[0] <= pair[1]),
        "a batch started before the previous one finished: {order:?}"
    );
}

/// The batch size comes from the client settings.
#[actix_rt::test]
async fn test_batch_size_bounds_concurrency() {
    let mock = MockQaseApi::start(batched_fixture(100..110)).await;
    let required: Vec<i64> = (100..110).collect();
    let client = QaseClient::new(&QaseSettings {
        suite_batch_size: 4,
        ..settings(&mock)
    })
    .unwrap();

    let suites = client
        .fetch_all_suites(&token(VALID_TOKEN), &[], &required)
        .await
        .unwrap();

    assert_eq!(suites.len(), 11);
    assert!(mock.peak_suites_in_flight() <= 4);
    let order = batch_order(&mock.suite_requests(), 100, 4);
    assert!(order.windows(2).all(|pair| pair[0] <= pair[1]), "{order:?}");
}

/// A single case can be fetched with its steps, including steps with null fields.
#[actix_rt::test]
async fn test_fetch_case_detail() {
    let mock = MockQaseApi::start(project_fixture()).await;

    let detail = client(&mock)
        .fetch_test_case_detail(&token(VALID_TOKEN), 3)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(detail.case.id, 3);
    assert_eq!(detail.case.suite_id, 12);
    assert_eq!(detail.steps.len(), 2);
    assert_eq!(detail.steps[0].action.as_deref(), Some("Open the app"));
    assert_eq!(detail.steps[0].expected_result, None);
    assert_eq!(detail.steps[1].data.as_deref(), Some("user/pass"));

    let missing = client(&mock)
        .fetch_test_case_detail(&token(VALID_TOKEN), 999)
        .await
        .unwrap();
    assert!(missing.is_none());
}
