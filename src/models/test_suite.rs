//! Qase test suite model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Test suite, either returned by Qase or synthesized as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestSuite {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TestSuite {
    /// Create a suite with a title and optional parent.
    pub fn new(id: i64, title: impl Into<String>, parent_id: Option<i64>) -> Self {
        TestSuite {
            id,
            title: title.into(),
            parent_id,
            description: None,
        }
    }

    /// Stand-in for a suite that is referenced but could not be fetched.
    pub fn placeholder(id: i64) -> Self {
        TestSuite::new(id, placeholder_title(id), None)
    }
}

/// Deterministic title used for placeholder suites.
pub fn placeholder_title(id: i64) -> String {
    format!("Suite {}", id)
}
