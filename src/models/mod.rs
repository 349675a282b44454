//! Domain models for the Qase dashboard.

pub mod dashboard;
pub mod dashboard_stats;
pub mod qase_response;
pub mod session;
pub mod suite_tree;
pub mod test_case;
pub mod test_suite;

// Re-export commonly used types
pub use dashboard::{
    DashboardResponse, DescendantsResponse, LoadStateResponse, SelectionResponse,
    TestCaseListResponse,
};
pub use dashboard_stats::{CodeHistogram, DashboardStats, DistributionEntry, Distributions};
pub use qase_response::{QaseEnvelope, QaseList, QaseListResponse};
pub use session::{CreateSessionRequest, CreateSessionResponse, RefreshResponse, RefreshStatus};
pub use suite_tree::{SuiteTreeNode, find_in_forest};
pub use test_case::{AUTOMATION_AUTOMATED, TestCase, TestCaseDetail, TestStep};
pub use test_suite::{TestSuite, placeholder_title};
