//! Qase API gateway.
//!
//! Fetches the full test case list page by page and resolves suites together with
//! their parent chains. Nothing here retries; callers decide what to do on failure.
//!
//! Failure policy:
//! - 401/403 on any call is `QaseError::Unauthorized` and aborts the operation
//! - A page without the `status`/`result` envelope ends pagination
//! - A suite that fails to resolve becomes a `Suite {id}` placeholder

use std::collections::HashSet;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{QASE_TOKEN_HEADER, QaseSettings};
use crate::error::QaseError;
use crate::models::{QaseEnvelope, QaseListResponse, TestCase, TestCaseDetail, TestSuite};

/// HTTP connect timeout for Qase requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the subset of the Qase v1 API the dashboard needs.
#[derive(Clone)]
pub struct QaseClient {
    http_client: reqwest::Client,
    api_base: String,
    project_code: String,
    page_size: u32,
    suite_batch_size: usize,
}

impl QaseClient {
    /// Create a new client from settings.
    pub fn new(settings: &QaseSettings) -> Result<Self, QaseError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(QaseError::Transport)?;

        info!(
            "Qase client initialized (api_base={}, project={}, page_size={}, suite_batch_size={})",
            settings.api_base, settings.project_code, settings.page_size, settings.suite_batch_size
        );

        Ok(Self {
            http_client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            project_code: urlencoding::encode(&settings.project_code).into_owned(),
            page_size: settings.page_size.max(1),
            suite_batch_size: settings.suite_batch_size.max(1),
        })
    }

    pub fn project_code(&self) -> &str {
        &self.project_code
    }

    /// GET a Qase endpoint and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        path: &str,
    ) -> Result<T, QaseError> {
        let url = format!("{}{}", self.api_base, path);

        let response = self
            .http_client
            .get(&url)
            .header(QASE_TOKEN_HEADER, token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(QaseError::Transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Qase rejected API token (status={}, path={})", status, path);
            return Err(QaseError::Unauthorized);
        }
        if !status.is_success() {
            return Err(QaseError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.json::<T>().await.map_err(QaseError::Decode)
    }

    /// Fetch every test case of the project, preserving API order.
    pub async fn fetch_all_test_cases(
        &self,
        token: &SecretString,
    ) -> Result<Vec<TestCase>, QaseError> {
        let mut cases = Vec::new();
        let mut offset: u64 = 0;
        let limit = u64::from(self.page_size);

        loop {
            let path = format!(
                "/case/{}?limit={}&offset={}",
                self.project_code, limit, offset
            );
            let page = self
                .get_json::<QaseListResponse<TestCase>>(token, &path)
                .await?;

            let Some(page) = page.into_result() else {
                warn!(
                    "Qase page at offset {} had no result envelope; stopping with {} cases",
                    offset,
                    cases.len()
                );
                break;
            };

            let total = page.total;
            cases.extend(page.entities);
            offset += limit;
            debug!("Fetched test cases {}/{}", cases.len(), total);

            if offset >= total {
                break;
            }
        }

        info!("Fetched {} test cases from project {}", cases.len(), self.project_code);
        Ok(cases)
    }

    /// Fetch one suite. `Ok(None)` when Qase answered without a result.
    pub async fn fetch_suite(
        &self,
        token: &SecretString,
        suite_id: i64,
    ) -> Result<Option<TestSuite>, QaseError> {
        let path = format!("/suite/{}/{}", self.project_code, suite_id);
        let envelope = self.get_json::<QaseEnvelope<TestSuite>>(token, &path).await?;
        Ok(envelope.into_result())
    }

    /// Fetch a test case with its description and steps.
    pub async fn fetch_test_case_detail(
        &self,
        token: &SecretString,
        case_id: i64,
    ) -> Result<Option<TestCaseDetail>, QaseError> {
        let path = format!("/case/{}/{}", self.project_code, case_id);
        let envelope = self
            .get_json::<QaseEnvelope<TestCaseDetail>>(token, &path)
            .await?;
        Ok(envelope.into_result())
    }

    /// Resolve every suite referenced by `cases` plus `required_ids`, with all ancestors.
    ///
    /// Ids are processed in batches of `suite_batch_size`; chains within a batch run
    /// concurrently and batches run one after another. The result holds each suite
    /// once, in the order it was first resolved.
    pub async fn fetch_all_suites(
        &self,
        token: &SecretString,
        cases: &[TestCase],
        required_ids: &[i64],
    ) -> Result<Vec<TestSuite>, QaseError> {
        let mut seen_ids = HashSet::new();
        let mut suite_ids: Vec<i64> = Vec::new();
        for id in cases.iter().map(|c| c.suite_id).chain(required_ids.iter().copied()) {
            if seen_ids.insert(id) {
                suite_ids.push(id);
            }
        }

        let visited = Mutex::new(HashSet::new());
        let mut suites: Vec<TestSuite> = Vec::new();
        let mut emitted = HashSet::new();

        for batch in suite_ids.chunks(self.suite_batch_size) {
            let chains = join_all(
                batch
                    .iter()
                    .map(|&id| self.resolve_suite_chain(token, id, &visited)),
            )
            .await;

            for chain in chains {
                for suite in chain? {
                    if emitted.insert(suite.id) {
                        suites.push(suite);
                    }
                }
            }
        }

        info!(
            "Resolved {} suites from {} referenced ids",
            suites.len(),
            suite_ids.len()
        );
        Ok(suites)
    }

    /// Walk from `start` up through its parents, skipping ids already claimed.
    async fn resolve_suite_chain(
        &self,
        token: &SecretString,
        start: i64,
        visited: &Mutex<HashSet<i64>>,
    ) -> Result<Vec<TestSuite>, QaseError> {
        let mut chain = Vec::new();
        let mut next = Some(start);

        while let Some(suite_id) = next {
            if !visited.lock().await.insert(suite_id) {
                break;
            }

            match self.fetch_suite(token, suite_id).await {
                Ok(Some(suite)) => {
                    next = suite.parent_id;
                    chain.push(suite);
                }
                Ok(None) => {
                    debug!("Suite {} returned no result", suite_id);
                    break;
                }
                Err(QaseError::Unauthorized) => return Err(QaseError::Unauthorized),
                Err(e) => {
                    warn!("Error fetching suite {}: {}; using placeholder", suite_id, e);
                    chain.push(TestSuite::placeholder(suite_id));
                    break;
                }
            }
        }

        Ok(chain)
    }
}
