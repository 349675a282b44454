//! Descendant resolution and the multi-select suite filter.

use std::collections::BTreeSet;

use crate::models::{SuiteTreeNode, TestCase, find_in_forest};

/// `suite_id` followed by every id in its subtree, in preorder.
///
/// An id missing from the forest is treated as a leaf and returned alone.
pub fn descendant_ids(suite_id: i64, forest: &[SuiteTreeNode]) -> Vec<i64> {
    let Some(node) = find_in_forest(forest, suite_id) else {
        return vec![suite_id];
    };

    let mut ids = Vec::new();
    node.walk(&mut |n| ids.push(n.suite.id));
    ids
}

/// Set of selected suite ids. Empty means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteSelection {
    ids: BTreeSet<i64>,
}

impl SuiteSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `suite_id` and its descendants, or deselect them all if it was selected.
    pub fn toggle(&mut self, suite_id: i64, forest: &[SuiteTreeNode]) {
        let affected = descendant_ids(suite_id, forest);
        if self.ids.contains(&suite_id) {
            for id in affected {
                self.ids.remove(&id);
            }
        } else {
            self.ids.extend(affected);
        }
    }

    /// Select every suite in the forest.
    pub fn select_all(&mut self, forest: &[SuiteTreeNode]) {
        self.ids.clear();
        for node in forest {
            node.walk(&mut |n| {
                self.ids.insert(n.suite.id);
            });
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, suite_id: i64) -> bool {
        self.ids.contains(&suite_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    /// Cases in the selected suites; every case when nothing is selected.
    pub fn filter_cases(&self, cases: &[TestCase]) -> Vec<TestCase> {
        if self.ids.is_empty() {
            return cases.to_vec();
        }
        cases
            .iter()
            .filter(|case| self.ids.contains(&case.suite_id))
            .cloned()
            .collect()
    }
}
