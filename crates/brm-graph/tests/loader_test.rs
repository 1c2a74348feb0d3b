//! Relationship loader: edges from all four sources, roots, parent map.

use brm_core::models::{CompositeRule, EdgeKind, GlobalCriticalLink, RuleConflict, RuleId};
use brm_graph::{RelationshipLoader, RelationshipSources, RuleGraph};
use test_fixtures::{rule, seeded_engine};

fn ids(v: &[i64]) -> Vec<RuleId> {
    v.iter().copied().map(RuleId).collect()
}

fn build(sources: RelationshipSources) -> RuleGraph {
    RelationshipLoader::new().build(&sources)
}

#[test]
fn parent_links_become_edges_and_parent_map() {
    let graph = build(RelationshipSources {
        rules: vec![rule(1, None), rule(2, Some(1)), rule(3, Some(1))],
        ..Default::default()
    });

    assert_eq!(graph.neighbors(RuleId(1)), ids(&[2, 3]));
    assert_eq!(graph.parent_of(RuleId(2)), Some(RuleId(1)));
    assert_eq!(graph.roots(), ids(&[1]));
    assert_eq!(
        graph.edge_kinds(RuleId(1), RuleId(2)).unwrap().iter().copied().collect::<Vec<_>>(),
        vec![EdgeKind::ParentChild]
    );
}

#[test]
fn conflicts_are_bidirectional() {
    let graph = build(RelationshipSources {
        rules: vec![rule(5, None), rule(9, None)],
        conflicts: vec![RuleConflict {
            rule_id_1: RuleId(5),
            rule_id_2: RuleId(9),
            priority: 1,
        }],
        ..Default::default()
    });

    assert_eq!(graph.neighbors(RuleId(5)), ids(&[9]));
    assert_eq!(graph.neighbors(RuleId(9)), ids(&[5]));
    assert_eq!(graph.roots(), ids(&[5, 9]));
}

#[test]
fn composite_references_point_at_the_composite() {
    let graph = build(RelationshipSources {
        rules: vec![rule(10, None), rule(20, None), rule(30, None)],
        composites: vec![CompositeRule {
            id: RuleId(30),
            logic_expr: "Rule10 AND rule20 OR NOT RULE10".to_string(),
        }],
        ..Default::default()
    });

    assert_eq!(graph.neighbors(RuleId(10)), ids(&[30]));
    assert_eq!(graph.neighbors(RuleId(20)), ids(&[30]));
    assert!(graph.neighbors(RuleId(30)).is_empty());
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn duplicate_pairs_merge_provenance() {
    let graph = build(RelationshipSources {
        rules: vec![rule(1, None), rule(2, Some(1))],
        global_critical_links: vec![GlobalCriticalLink {
            gcr_rule_id: RuleId(1),
            target_rule_id: RuleId(2),
        }],
        ..Default::default()
    });

    assert_eq!(graph.edge_count(), 1);
    let kinds = graph.edge_kinds(RuleId(1), RuleId(2)).unwrap();
    assert!(kinds.contains(&EdgeKind::ParentChild));
    assert!(kinds.contains(&EdgeKind::GlobalCritical));
}

#[test]
fn non_parent_targets_without_parent_stay_roots() {
    let graph = build(RelationshipSources {
        rules: vec![rule(1, None), rule(2, None)],
        global_critical_links: vec![GlobalCriticalLink {
            gcr_rule_id: RuleId(1),
            target_rule_id: RuleId(2),
        }],
        ..Default::default()
    });
    assert_eq!(graph.roots(), ids(&[1, 2]));
}

#[test]
fn dangling_edge_targets_are_nodes_but_not_roots() {
    let graph = build(RelationshipSources {
        rules: vec![rule(1, None)],
        global_critical_links: vec![GlobalCriticalLink {
            gcr_rule_id: RuleId(1),
            target_rule_id: RuleId(77),
        }],
        ..Default::default()
    });

    assert!(graph.contains(RuleId(77)));
    assert!(!graph.is_known(RuleId(77)));
    assert_eq!(graph.roots(), ids(&[1]));
    assert_eq!(graph.nodes(), ids(&[1, 77]));
}

#[test]
fn roots_are_ascending() {
    let graph = build(RelationshipSources {
        rules: vec![rule(9, None), rule(3, None), rule(6, Some(9)), rule(1, None)],
        ..Default::default()
    });
    assert_eq!(graph.roots(), ids(&[1, 3, 9]));
}

#[test]
fn load_reads_every_source_from_storage() {
    let engine = seeded_engine("composite");
    let graph = RelationshipLoader::new().load(&engine).unwrap();

    assert_eq!(graph.roots(), ids(&[10, 20]));
    assert_eq!(graph.neighbors(RuleId(10)), ids(&[30]));
    let kinds = graph.edge_kinds(RuleId(20), RuleId(30)).unwrap();
    assert!(kinds.contains(&EdgeKind::ParentChild));
    assert!(kinds.contains(&EdgeKind::CompositeReference));
}
