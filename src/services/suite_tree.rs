//! Suite forest construction from flat suite and test case lists.
//!
//! Suites are indexed into an arena and linked by parent id, then materialized into
//! owned `SuiteTreeNode`s. Descendant counts are computed during materialization in
//! a post-order pass, so they are always consistent with the node set.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{SuiteTreeNode, TestCase, TestSuite};

/// Arena slot for a suite before it is materialized.
struct ArenaEntry {
    suite: TestSuite,
    test_count: usize,
    children: Vec<usize>,
}

/// Order nodes by title, case-insensitively, falling back to id.
pub fn by_title(a: &SuiteTreeNode, b: &SuiteTreeNode) -> Ordering {
    a.suite
        .title
        .to_lowercase()
        .cmp(&b.suite.title.to_lowercase())
        .then(a.suite.id.cmp(&b.suite.id))
}

/// Count direct test cases per suite id.
pub fn count_cases_by_suite(cases: &[TestCase]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for case in cases {
        *counts.entry(case.suite_id).or_insert(0) += 1;
    }
    counts
}

/// Build the suite forest.
///
/// With no suite metadata at all, falls back to one root per distinct `suite_id` seen
/// in `cases`, using placeholder titles.
pub fn build_suite_tree(suites: &[TestSuite], cases: &[TestCase]) -> Vec<SuiteTreeNode> {
    let counts = count_cases_by_suite(cases);

    if suites.is_empty() {
        let mut roots: Vec<SuiteTreeNode> = counts
            .iter()
            .map(|(&id, &count)| SuiteTreeNode::leaf(TestSuite::placeholder(id), count))
            .collect();
        roots.sort_by(by_title);
        return roots;
    }

    let mut arena: Vec<ArenaEntry> = Vec::with_capacity(suites.len());
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(suites.len());

    for suite in suites {
        if index.contains_key(&suite.id) {
            continue;
        }
        index.insert(suite.id, arena.len());
        arena.push(ArenaEntry {
            test_count: counts.get(&suite.id).copied().unwrap_or(0),
            suite: suite.clone(),
            children: Vec::new(),
        });
    }

    // Placeholders for parents referenced but absent from the fetched set
    for suite in suites {
        if let Some(parent_id) = suite.parent_id
            && !index.contains_key(&parent_id)
        {
            index.insert(parent_id, arena.len());
            arena.push(ArenaEntry {
                suite: TestSuite::placeholder(parent_id),
                test_count: 0,
                children: Vec::new(),
            });
        }
    }

    let mut root_slots = Vec::new();
    for slot in 0..arena.len() {
        let parent_slot = arena[slot]
            .suite
            .parent_id
            .and_then(|parent_id| index.get(&parent_id).copied())
            .filter(|&parent_slot| parent_slot != slot);

        match parent_slot {
            Some(parent_slot) => arena[parent_slot].children.push(slot),
            None => root_slots.push(slot),
        }
    }

    let mut roots: Vec<SuiteTreeNode> = root_slots
        .into_iter()
        .map(|slot| materialize(&arena, slot))
        .collect();
    roots.sort_by(by_title);
    roots
}

/// Build the owned subtree rooted at `slot`, sorting children and summing counts.
fn materialize(arena: &[ArenaEntry], slot: usize) -> SuiteTreeNode {
    let entry = &arena[slot];

    let mut children: Vec<SuiteTreeNode> = entry
        .children
        .iter()
        .map(|&child| materialize(arena, child))
        .collect();
    children.sort_by(by_title);

    let all_descendant_test_count = entry.test_count
        + children
            .iter()
            .map(|c| c.all_descendant_test_count)
            .sum::<usize>();

    SuiteTreeNode {
        suite: entry.suite.clone(),
        children,
        test_count: entry.test_count,
        all_descendant_test_count,
    }
}

/// Recompute `all_descendant_test_count` bottom-up for a whole forest.
///
/// Needed after any structural edit of an already built forest.
pub fn recompute_descendant_counts(forest: &mut [SuiteTreeNode]) -> usize {
    forest
        .iter_mut()
        .map(|node| {
            node.all_descendant_test_count =
                node.test_count + recompute_descendant_counts(&mut node.children);
            node.all_descendant_test_count
        })
        .sum()
}
