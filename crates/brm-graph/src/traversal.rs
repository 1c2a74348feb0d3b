//! Breadth-first reachability over the rule graph.
//!
//! Neighbors are expanded in ascending order so results are deterministic.
//! Visited tracking makes every traversal terminate on cyclic graphs.

use std::collections::{HashSet, VecDeque};

use brm_core::models::RuleId;

use crate::graph::RuleGraph;

/// Everything reachable from `start`, in discovery order, `start` first.
/// A start node missing from the graph reaches only itself.
pub fn reachable_from(graph: &RuleGraph, start: RuleId) -> Vec<RuleId> {
    reachable_from_all(graph, &[start])
}

/// Everything reachable from any of `starts`, in discovery order.
pub fn reachable_from_all(graph: &RuleGraph, starts: &[RuleId]) -> Vec<RuleId> {
    let mut visited: HashSet<RuleId> = HashSet::new();
    let mut queue: VecDeque<RuleId> = VecDeque::new();
    let mut order = Vec::new();

    for &start in starts {
        if visited.insert(start) {
            queue.push_back(start);
        }
    }

    while let Some(current) = queue.pop_front() {
        order.push(current);
        for next in graph.neighbors(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    order
}

/// Shortest hop count from `start` to `target`, if reachable.
pub fn distance(graph: &RuleGraph, start: RuleId, target: RuleId) -> Option<usize> {
    let mut visited: HashSet<RuleId> = HashSet::from([start]);
    let mut queue: VecDeque<(RuleId, usize)> = VecDeque::from([(start, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if current == target {
            return Some(depth);
        }
        for next in graph.neighbors(current) {
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }
    None
}
