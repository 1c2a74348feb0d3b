//! petgraph::StableGraph wrapper keyed by RuleId, with provenance-tagged edges.

use std::collections::{BTreeSet, HashMap};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};

use brm_core::models::{EdgeKind, RuleId};

/// Every provenance that contributed a given edge.
pub type EdgeKinds = BTreeSet<EdgeKind>;

/// The underlying directed graph type.
pub type RuleStableGraph = StableGraph<RuleId, EdgeKinds, Directed>;

/// Directed rule graph plus the root set and parent map derived while loading.
#[derive(Debug, Clone, Default)]
pub struct RuleGraph {
    graph: RuleStableGraph,
    node_index: HashMap<RuleId, NodeIndex>,
    /// IDs present in the rule table (as opposed to only referenced by edges).
    known: BTreeSet<RuleId>,
    /// child → parent.
    parent_map: HashMap<RuleId, RuleId>,
}

impl RuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node for a rule.
    pub fn ensure_node(&mut self, id: RuleId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.node_index.insert(id, idx);
        idx
    }

    /// Register a rule from the rule table. Only registered rules can be roots.
    pub fn add_rule(&mut self, id: RuleId, parent: Option<RuleId>) {
        self.ensure_node(id);
        self.known.insert(id);
        if let Some(parent) = parent {
            self.parent_map.insert(id, parent);
            self.add_edge(parent, id, EdgeKind::ParentChild);
        }
    }

    /// Add `from → to`, merging the provenance into an existing edge.
    pub fn add_edge(&mut self, from: RuleId, to: RuleId, kind: EdgeKind) {
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if let Some(kinds) = self.graph.edge_weight_mut(edge) {
                    kinds.insert(kind);
                }
            }
            None => {
                self.graph.add_edge(a, b, BTreeSet::from([kind]));
            }
        }
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Successors of `id`, ascending.
    pub fn neighbors(&self, id: RuleId) -> Vec<RuleId> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<RuleId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Provenance of the edge `from → to`, if present.
    pub fn edge_kinds(&self, from: RuleId, to: RuleId) -> Option<&EdgeKinds> {
        let a = *self.node_index.get(&from)?;
        let b = *self.node_index.get(&to)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge)
    }

    /// Rule-table IDs with no parent, ascending.
    pub fn roots(&self) -> Vec<RuleId> {
        self.known
            .iter()
            .filter(|id| !self.parent_map.contains_key(id))
            .copied()
            .collect()
    }

    pub fn parent_of(&self, id: RuleId) -> Option<RuleId> {
        self.parent_map.get(&id).copied()
    }

    pub fn parent_map(&self) -> &HashMap<RuleId, RuleId> {
        &self.parent_map
    }

    /// Whether the ID came from the rule table.
    pub fn is_known(&self, id: RuleId) -> bool {
        self.known.contains(&id)
    }

    /// Every node, ascending. Includes IDs only referenced by edges.
    pub fn nodes(&self) -> Vec<RuleId> {
        let mut ids: Vec<RuleId> = self.node_index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Breadth-first reachable set from `start`, in discovery order, `start` first.
    pub fn reachable_from(&self, start: RuleId) -> Vec<RuleId> {
        crate::traversal::reachable_from(self, start)
    }
}
