//! # brm-graph
//!
//! Builds the directed rule graph from the four relationship sources
//! (parent links, global-critical links, conflicts, composite references)
//! and answers reachability questions over it. Cycles are allowed.

pub mod graph;
pub mod loader;
pub mod references;
pub mod traversal;

pub use graph::{EdgeKinds, RuleGraph};
pub use loader::{RelationshipLoader, RelationshipSources};
pub use references::{ReferenceExtractor, RegexReferenceExtractor};
