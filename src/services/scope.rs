//! Root scoping: narrowing the full forest to one configured suite subtree.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::suite_tree::{by_title, recompute_descendant_counts};
use crate::models::{SuiteTreeNode, TestCase, TestSuite, find_in_forest};

/// How the root suite is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RootSpec {
    /// Exact suite id
    Id(i64),
    /// Case-insensitive title substring
    Title(String),
}

impl RootSpec {
    /// Numeric input is an id, anything else a title fragment. Blank input is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(id) => RootSpec::Id(id),
            Err(_) => RootSpec::Title(raw.to_string()),
        })
    }

    /// Whether `node` itself is the configured root.
    pub fn matches(&self, node: &SuiteTreeNode) -> bool {
        match self {
            RootSpec::Id(id) => node.suite.id == *id,
            RootSpec::Title(fragment) => node
                .suite
                .title
                .to_lowercase()
                .contains(&fragment.to_lowercase()),
        }
    }
}

/// Configured root suite with the title used when it has to be synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RootSuite {
    pub spec: RootSpec,
    pub display_name: String,
}

impl RootSuite {
    pub fn new(spec: RootSpec, display_name: String) -> Self {
        Self { spec, display_name }
    }
}

/// Narrow `forest` to the configured root.
///
/// Returns the top-level nodes matching the root. When none match and the root is an
/// id, every node anywhere whose `parent_id` is that id is wrapped in a virtual root
/// titled `display_name`. Returns an empty forest when neither finds anything.
pub fn scope_to_root(forest: &[SuiteTreeNode], root: &RootSuite) -> Vec<SuiteTreeNode> {
    let direct: Vec<SuiteTreeNode> = forest
        .iter()
        .filter(|node| root.spec.matches(node))
        .cloned()
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    let RootSpec::Id(root_id) = root.spec else {
        return Vec::new();
    };

    let mut orphans = Vec::new();
    for node in forest {
        collect_children_of(node, root_id, &mut orphans);
    }
    if orphans.is_empty() {
        return Vec::new();
    }
    orphans.sort_by(by_title);

    let mut scoped = vec![SuiteTreeNode {
        suite: TestSuite::new(root_id, root.display_name.clone(), None),
        children: orphans,
        test_count: 0,
        all_descendant_test_count: 0,
    }];
    recompute_descendant_counts(&mut scoped);
    scoped
}

/// Collect nodes whose parent is `parent_id`, without descending into a match.
fn collect_children_of(node: &SuiteTreeNode, parent_id: i64, out: &mut Vec<SuiteTreeNode>) {
    if node.suite.parent_id == Some(parent_id) {
        out.push(node.clone());
        return;
    }
    for child in &node.children {
        collect_children_of(child, parent_id, out);
    }
}

/// Drop the root nodes themselves, keeping their children as the filterable units.
///
/// A title root can match several top-level nodes; their children are merged and
/// sorted. Returns the forest unchanged when no top-level node is the root.
pub fn children_only(forest: &[SuiteTreeNode], root: &RootSpec) -> Vec<SuiteTreeNode> {
    let roots: Vec<&SuiteTreeNode> = forest.iter().filter(|node| root.matches(node)).collect();
    match roots.as_slice() {
        [] => forest.to_vec(),
        [single] => single.children.clone(),
        several => {
            let mut children: Vec<SuiteTreeNode> = several
                .iter()
                .flat_map(|node| node.children.iter().cloned())
                .collect();
            children.sort_by(by_title);
            children
        }
    }
}

/// Every suite id at or below the scoped root.
///
/// For an id root, the node is looked up in `scoped`, or in `full` when scoping found
/// nothing. For a title root, every id in `scoped` belongs to the scope.
pub fn collect_scoped_suite_ids(
    scoped: &[SuiteTreeNode],
    full: &[SuiteTreeNode],
    root: &RootSpec,
) -> HashSet<i64> {
    let mut ids = HashSet::new();
    let mut add = |node: &SuiteTreeNode| {
        ids.insert(node.suite.id);
    };

    match root {
        RootSpec::Id(root_id) => {
            let search = if scoped.is_empty() { full } else { scoped };
            if let Some(node) = find_in_forest(search, *root_id) {
                node.walk(&mut add);
            }
        }
        RootSpec::Title(_) => {
            for node in scoped {
                node.walk(&mut add);
            }
        }
    }

    ids
}

/// Test cases whose suite belongs to the scope, in their original order.
pub fn scope_test_cases(cases: &[TestCase], scoped_ids: &HashSet<i64>) -> Vec<TestCase> {
    cases
        .iter()
        .filter(|case| scoped_ids.contains(&case.suite_id))
        .cloned()
        .collect()
}
