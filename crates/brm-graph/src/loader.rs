//! Relationship loader: reads the four relationship sources and builds the
//! rule graph, root set, and parent map.

use brm_core::errors::BrmResult;
use brm_core::models::{CompositeRule, EdgeKind, GlobalCriticalLink, Rule, RuleConflict};
use brm_core::traits::IRuleStorage;

use crate::graph::RuleGraph;
use crate::references::{ReferenceExtractor, RegexReferenceExtractor};

/// Raw rows from the four relationship sources.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSources {
    pub rules: Vec<Rule>,
    pub global_critical_links: Vec<GlobalCriticalLink>,
    pub conflicts: Vec<RuleConflict>,
    pub composites: Vec<CompositeRule>,
}

impl RelationshipSources {
    /// Read every source from storage.
    pub fn read(storage: &dyn IRuleStorage) -> BrmResult<Self> {
        Ok(Self {
            rules: storage.list_rules()?,
            global_critical_links: storage.global_critical_links()?,
            conflicts: storage.conflicts()?,
            composites: storage.composite_rules()?,
        })
    }
}

/// Builds a [`RuleGraph`] from relationship rows.
pub struct RelationshipLoader {
    extractor: Box<dyn ReferenceExtractor>,
}

impl RelationshipLoader {
    pub fn new() -> Self {
        Self::with_extractor(Box::new(RegexReferenceExtractor))
    }

    pub fn with_extractor(extractor: Box<dyn ReferenceExtractor>) -> Self {
        Self { extractor }
    }

    /// Read all sources from storage and build the graph.
    pub fn load(&self, storage: &dyn IRuleStorage) -> BrmResult<RuleGraph> {
        let sources = RelationshipSources::read(storage)?;
        Ok(self.build(&sources))
    }

    /// Build the graph from already-read rows.
    pub fn build(&self, sources: &RelationshipSources) -> RuleGraph {
        let mut graph = RuleGraph::new();

        for rule in &sources.rules {
            graph.add_rule(rule.id, rule.parent_id);
        }
        for link in &sources.global_critical_links {
            graph.add_edge(link.gcr_rule_id, link.target_rule_id, EdgeKind::GlobalCritical);
        }
        for conflict in &sources.conflicts {
            graph.add_edge(conflict.rule_id_1, conflict.rule_id_2, EdgeKind::Conflict);
            graph.add_edge(conflict.rule_id_2, conflict.rule_id_1, EdgeKind::Conflict);
        }
        for composite in &sources.composites {
            for sub_rule in self.extractor.extract(&composite.logic_expr) {
                graph.add_edge(sub_rule, composite.id, EdgeKind::CompositeReference);
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            roots = graph.roots().len(),
            "rule graph loaded"
        );
        graph
    }
}

impl Default for RelationshipLoader {
    fn default() -> Self {
        Self::new()
    }
}
