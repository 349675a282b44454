//! Assembles the scoped dashboard view from raw session data.

use crate::models::{DashboardStats, SuiteTreeNode, TestCase, TestSuite};

use super::scope::{
    RootSuite, children_only, collect_scoped_suite_ids, scope_test_cases, scope_to_root,
};
use super::selection::SuiteSelection;
use super::stats::compute_stats;
use super::suite_tree::build_suite_tree;

/// Everything the presentation layer renders for one session.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Children of the root suite, the units the user filters by
    pub tree: Vec<SuiteTreeNode>,
    /// Test cases in scope, before the selection filter
    pub scoped_cases: Vec<TestCase>,
    /// Test cases in scope after the selection filter
    pub filtered_cases: Vec<TestCase>,
    /// Statistics over `filtered_cases`
    pub stats: DashboardStats,
}

/// Build the forest, scope it to `root`, and apply `selection`.
pub fn assemble(
    suites: &[TestSuite],
    cases: &[TestCase],
    root: &RootSuite,
    selection: &SuiteSelection,
) -> DashboardView {
    let full = build_suite_tree(suites, cases);
    let scoped = scope_to_root(&full, root);
    let scoped_ids = collect_scoped_suite_ids(&scoped, &full, &root.spec);
    let scoped_cases = scope_test_cases(cases, &scoped_ids);
    let tree = children_only(&scoped, &root.spec);
    let filtered_cases = selection.filter_cases(&scoped_cases);
    let stats = compute_stats(&filtered_cases);

    DashboardView {
        tree,
        scoped_cases,
        filtered_cases,
        stats,
    }
}
