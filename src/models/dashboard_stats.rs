//! Aggregate statistics over a list of test cases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counts keyed by raw Qase code.
pub type CodeHistogram = BTreeMap<i32, usize>;

/// Dashboard statistics, always derived from a test case list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_tests: usize,
    pub automated_tests: usize,
    pub manual_tests: usize,
    /// Automated share rounded to the nearest integer, 0 when there are no tests
    pub automation_percentage: u32,
    pub by_status: CodeHistogram,
    pub by_priority: CodeHistogram,
    pub by_severity: CodeHistogram,
    pub by_type: CodeHistogram,
}

/// One labeled bar of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DistributionEntry {
    pub code: i32,
    pub label: String,
    pub count: usize,
    /// Share of all counted cases, rounded to the nearest integer
    pub percentage: u32,
}

/// Labeled views of the four histograms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Distributions {
    pub status: Vec<DistributionEntry>,
    pub priority: Vec<DistributionEntry>,
    pub severity: Vec<DistributionEntry>,
    pub case_type: Vec<DistributionEntry>,
}
