//! Qase test case models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Automation code Qase assigns to automated test cases.
pub const AUTOMATION_AUTOMATED: i32 = 2;

/// Test case as returned by the Qase list endpoint.
///
/// Categorical fields carry the raw Qase codes; unknown codes are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestCase {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Suite the case belongs to (may reference a suite that was never fetched)
    pub suite_id: i64,
    /// 0 = manual, 2 = automated; anything else counts as manual
    #[serde(default)]
    pub automation: i32,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub severity: i32,
    #[serde(rename = "type", default)]
    pub case_type: i32,
    #[serde(default)]
    pub behavior: i32,
}

impl TestCase {
    /// Whether the case counts as automated.
    pub fn is_automated(&self) -> bool {
        self.automation == AUTOMATION_AUTOMATED
    }
}

/// One step of a test case.
///
/// Qase sends `null` for blank step fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestStep {
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Full test case with description and steps, from the single-case endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestCaseDetail {
    #[serde(flatten)]
    pub case: TestCase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postconditions: Option<String>,
    #[serde(default)]
    pub steps: Vec<TestStep>,
}
