//! Dashboard sessions.
//!
//! A session is created on login with the user's Qase API token and discarded on
//! logout or when Qase rejects the token. It owns everything fetched with that token
//! plus the user's suite selection. Sessions share nothing with each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dashboard::{DashboardView, assemble};
use super::qase_client::QaseClient;
use super::scope::RootSuite;
use super::selection::SuiteSelection;
use crate::error::{AppError, AppResult, QaseError};
use crate::models::{TestCase, TestCaseDetail, TestSuite};

/// Single-flight latch for the refresh operation.
#[derive(Debug, Clone, Default)]
pub struct RefreshLatch {
    running: Arc<AtomicBool>,
}

/// Held while a refresh runs; releases the latch on drop.
#[derive(Debug)]
pub struct RefreshGuard {
    running: Arc<AtomicBool>,
}

impl RefreshLatch {
    /// Claim the latch, or `None` if a refresh is already running.
    pub fn try_acquire(&self) -> Option<RefreshGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Result of asking a session to refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Test cases were fetched; suites are being resolved by `suites_task`
    Started {
        test_cases: usize,
        suites_task: JoinHandle<()>,
    },
    /// Another refresh holds the latch; nothing was done
    AlreadyRunning,
}

/// Data loaded for a session.
#[derive(Debug, Default)]
struct SessionData {
    test_cases: Vec<TestCase>,
    suites: Vec<TestSuite>,
    test_cases_loaded: bool,
    suites_loaded: bool,
    last_error: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
    selection: SuiteSelection,
}

/// Load progress reported alongside the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    pub test_cases_loaded: bool,
    pub suites_loaded: bool,
    pub refreshing: bool,
    pub last_error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// One logged-in dashboard user.
pub struct DashboardSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    credential: RwLock<Option<SecretString>>,
    client: QaseClient,
    root: RootSuite,
    required_suite_ids: Vec<i64>,
    latch: RefreshLatch,
    data: RwLock<SessionData>,
}

impl std::fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSession")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("credential", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl DashboardSession {
    pub fn new(
        client: QaseClient,
        token: SecretString,
        root: RootSuite,
        required_suite_ids: Vec<i64>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            credential: RwLock::new(Some(token)),
            client,
            root,
            required_suite_ids,
            latch: RefreshLatch::default(),
            data: RwLock::new(SessionData::default()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn root(&self) -> &RootSuite {
        &self.root
    }

    /// Whether the session still holds a token Qase has not rejected.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    async fn credential(&self) -> AppResult<SecretString> {
        self.credential
            .read()
            .await
            .clone()
            .ok_or(AppError::ReauthRequired)
    }

    /// Drop the token if Qase rejected it.
    async fn clear_credential_if_auth(&self, err: &QaseError) {
        if err.is_auth() {
            warn!("Session {}: API token rejected, credential cleared", self.id);
            *self.credential.write().await = None;
        }
    }

    /// Convert a gateway error, dropping the token if Qase rejected it.
    async fn fail(&self, err: QaseError) -> AppError {
        self.clear_credential_if_auth(&err).await;
        err.into()
    }

    /// Fetch all test cases, publish them, then resolve suites in the background.
    ///
    /// Returns once test cases are available. The latch stays held until the suite
    /// task finishes, so a second refresh in the meantime is a no-op.
    pub async fn refresh(self: &Arc<Self>) -> AppResult<RefreshOutcome> {
        let Some(guard) = self.latch.try_acquire() else {
            info!("Session {}: refresh already in progress", self.id);
            return Ok(RefreshOutcome::AlreadyRunning);
        };

        let token = self.credential().await?;

        let cases = match self.client.fetch_all_test_cases(&token).await {
            Ok(cases) => cases,
            Err(e) => {
                error!("Session {}: failed to load test cases: {}", self.id, e);
                self.data.write().await.last_error = Some(e.to_string());
                return Err(self.fail(e).await);
            }
        };

        let test_cases = cases.len();
        {
            let mut data = self.data.write().await;
            data.test_cases = cases.clone();
            data.test_cases_loaded = true;
            data.last_error = None;
        }

        let session = Arc::clone(self);
        let suites_task = tokio::spawn(async move {
            let _guard = guard;
            session.load_suites(&token, &cases).await;
        });

        Ok(RefreshOutcome::Started {
            test_cases,
            suites_task,
        })
    }

    async fn load_suites(&self, token: &SecretString, cases: &[TestCase]) {
        match self
            .client
            .fetch_all_suites(token, cases, &self.required_suite_ids)
            .await
        {
            Ok(suites) => {
                let mut data = self.data.write().await;
                data.suites = suites;
                data.suites_loaded = true;
                data.loaded_at = Some(Utc::now());
            }
            Err(e) => {
                error!("Session {}: failed to load suites: {}", self.id, e);
                self.data.write().await.last_error = Some(e.to_string());
                self.clear_credential_if_auth(&e).await;
            }
        }
    }

    /// Current scoped dashboard view.
    pub async fn view(&self) -> DashboardView {
        let data = self.data.read().await;
        assemble(&data.suites, &data.test_cases, &self.root, &data.selection)
    }

    pub async fn load_state(&self) -> LoadState {
        let data = self.data.read().await;
        LoadState {
            test_cases_loaded: data.test_cases_loaded,
            suites_loaded: data.suites_loaded,
            refreshing: self.latch.is_running(),
            last_error: data.last_error.clone(),
            loaded_at: data.loaded_at,
        }
    }

    pub async fn selection(&self) -> SuiteSelection {
        self.data.read().await.selection.clone()
    }

    /// Toggle a suite and its descendants in the current scoped tree.
    pub async fn toggle_selection(&self, suite_id: i64) -> SuiteSelection {
        let mut data = self.data.write().await;
        let view = assemble(&data.suites, &data.test_cases, &self.root, &data.selection);
        data.selection.toggle(suite_id, &view.tree);
        data.selection.clone()
    }

    pub async fn select_all(&self) -> SuiteSelection {
        let mut data = self.data.write().await;
        let view = assemble(&data.suites, &data.test_cases, &self.root, &data.selection);
        data.selection.select_all(&view.tree);
        data.selection.clone()
    }

    pub async fn clear_selection(&self) -> SuiteSelection {
        let mut data = self.data.write().await;
        data.selection.clear();
        data.selection.clone()
    }

    /// Fetch one test case with its steps.
    pub async fn test_case_detail(&self, case_id: i64) -> AppResult<TestCaseDetail> {
        let token = self.credential().await?;
        match self.client.fetch_test_case_detail(&token, case_id).await {
            Ok(Some(detail)) => Ok(detail),
            Ok(None) => Err(AppError::NotFound(format!("Test case {}", case_id))),
            Err(e) => Err(self.fail(e).await),
        }
    }
}

/// All live sessions, keyed by session id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<DashboardSession>>>>,
    client: QaseClient,
    root: RootSuite,
    required_suite_ids: Vec<i64>,
}

impl SessionStore {
    pub fn new(client: QaseClient, root: RootSuite, required_suite_ids: Vec<i64>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            client,
            root,
            required_suite_ids,
        }
    }

    pub fn root(&self) -> &RootSuite {
        &self.root
    }

    pub fn project_code(&self) -> &str {
        self.client.project_code()
    }

    /// Log in: create and register a session for `token`.
    pub async fn create(&self, token: SecretString) -> Arc<DashboardSession> {
        let session = DashboardSession::new(
            self.client.clone(),
            token,
            self.root.clone(),
            self.required_suite_ids.clone(),
        );
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        info!("Session {} created", session.id());
        session
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<DashboardSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Log out: drop the session and everything it loaded.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!("Session {} removed", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
