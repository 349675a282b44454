//! Suite tree node model.

use serde::Serialize;
use utoipa::ToSchema;

use super::TestSuite;

/// One node of the suite forest. A parent exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SuiteTreeNode {
    pub suite: TestSuite,
    #[schema(no_recursion)]
    pub children: Vec<SuiteTreeNode>,
    /// Test cases whose `suite_id` is this suite
    pub test_count: usize,
    /// `test_count` of this node plus every descendant
    pub all_descendant_test_count: usize,
}

impl SuiteTreeNode {
    /// Leaf node for a suite with the given direct test count.
    pub fn leaf(suite: TestSuite, test_count: usize) -> Self {
        SuiteTreeNode {
            suite,
            children: Vec::new(),
            test_count,
            all_descendant_test_count: test_count,
        }
    }

    pub fn id(&self) -> i64 {
        self.suite.id
    }

    /// Visit this node and its subtree in preorder.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SuiteTreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Depth-first search for a node by suite id.
    pub fn find(&self, id: i64) -> Option<&SuiteTreeNode> {
        if self.suite.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Depth-first search for a node by suite id across a forest.
pub fn find_in_forest(forest: &[SuiteTreeNode], id: i64) -> Option<&SuiteTreeNode> {
    forest.iter().find_map(|node| node.find(id))
}
