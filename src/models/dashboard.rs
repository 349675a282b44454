//! Dashboard response models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{DashboardStats, Distributions, SuiteTreeNode, TestCase};
use crate::services::scope::RootSuite;

/// Load progress of the session's data.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoadStateResponse {
    pub test_cases_loaded: bool,
    pub suites_loaded: bool,
    pub refreshing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Current suite selection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SelectionResponse {
    /// Selected suite ids; empty means every suite in scope
    pub suite_ids: Vec<i64>,
    /// Test cases the selection lets through
    pub selected_test_cases: usize,
}

/// Full dashboard for one session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub root: RootSuite,
    /// Children of the root suite
    pub tree: Vec<SuiteTreeNode>,
    /// Test cases in scope before the selection filter
    pub scoped_test_cases: usize,
    pub stats: DashboardStats,
    pub distributions: Distributions,
    pub selection: SelectionResponse,
    pub load_state: LoadStateResponse,
}

/// Test cases in scope after the selection filter.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestCaseListResponse {
    pub test_cases: Vec<TestCase>,
    pub total: usize,
}

/// Subtree ids of a suite.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DescendantsResponse {
    pub suite_id: i64,
    /// `suite_id` followed by every descendant id
    pub descendant_ids: Vec<i64>,
}
