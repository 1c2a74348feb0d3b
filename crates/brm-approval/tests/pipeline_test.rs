//! Pipeline construction from graph reachability.

use brm_approval::ApprovalPipelineBuilder;
use brm_core::config::ApprovalConfig;
use brm_core::models::RuleId;
use brm_core::traits::{IApprovalStorage, IRuleStorage};
use brm_storage::StorageEngine;
use test_fixtures::{seeded_engine, RuleBuilder};

fn builder() -> ApprovalPipelineBuilder {
    ApprovalPipelineBuilder::new(ApprovalConfig::default())
}

fn stage_rows(engine: &StorageEngine, id: i64) -> Vec<(u32, String, String)> {
    engine
        .approvals_for_rule(RuleId(id))
        .unwrap()
        .into_iter()
        .map(|s| (s.stage, s.group_name, s.username))
        .collect()
}

fn row(stage: u32, group: &str, user: &str) -> (u32, String, String) {
    (stage, group.to_string(), user.to_string())
}

#[test]
fn stages_follow_leading_priority_encounter_final_order() {
    let engine = seeded_engine("approval_groups");
    builder()
        .build_pipeline(&engine, &engine, RuleId(1), "ann")
        .unwrap();

    // Reachable from 1: 1 (OPS), 2 (BG3), 3 (FIN), 4 (BG2), 5 (HR) via the GCR link.
    assert_eq!(
        stage_rows(&engine, 1),
        vec![
            row(1, "BG1", "ann"),
            row(1, "BG1", "bob"),
            row(2, "BG2", "cid"),
            row(3, "BG3", "BG3_default"),
            row(4, "OPS", "OPS_default"),
            row(5, "FIN", "FIN_default"),
            row(6, "HR", "HR_default"),
            row(7, "FINAL", "fin"),
        ]
    );
}

#[test]
fn pipeline_covers_only_what_the_rule_reaches() {
    let engine = seeded_engine("approval_groups");
    builder()
        .build_pipeline(&engine, &engine, RuleId(2), "ann")
        .unwrap();

    let groups: Vec<String> = stage_rows(&engine, 2).into_iter().map(|r| r.1).collect();
    assert_eq!(groups, vec!["BG1", "BG1", "BG2", "BG3", "FINAL"]);
}

#[test]
fn rebuilding_is_idempotent() {
    let engine = seeded_engine("approval_groups");
    let b = builder();
    let first = b.build_pipeline(&engine, &engine, RuleId(1), "ann").unwrap();
    let second = b.build_pipeline(&engine, &engine, RuleId(1), "bob").unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.approvals_for_rule(RuleId(1)).unwrap(), second);
}

#[test]
fn rebuilding_resets_earlier_approvals() {
    let engine = seeded_engine("approval_groups");
    let b = builder();
    b.build_pipeline(&engine, &engine, RuleId(5), "ann").unwrap();
    assert!(engine
        .mark_approved(RuleId(5), 1, "ann", chrono::Utc::now())
        .unwrap());

    b.build_pipeline(&engine, &engine, RuleId(5), "ann").unwrap();
    assert!(engine
        .approvals_for_rule(RuleId(5))
        .unwrap()
        .iter()
        .all(|s| !s.approved));
}

#[test]
fn rule_without_owner_gets_leading_and_final_only() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.insert_rule(&RuleBuilder::new(7).build()).unwrap();

    let stages = builder()
        .build_pipeline(&engine, &engine, RuleId(7), "ann")
        .unwrap();
    let rows: Vec<(u32, &str, &str)> = stages
        .iter()
        .map(|s| (s.stage, s.group_name.as_str(), s.username.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![(1, "BG1", "BG1_default"), (2, "FINAL", "FINAL_default")]
    );
}

#[test]
fn owner_in_leading_or_final_group_is_not_repeated() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .insert_rule(&RuleBuilder::new(1).owner("BG1").build())
        .unwrap();
    engine
        .insert_rule(&RuleBuilder::new(2).parent(1).owner("FINAL").build())
        .unwrap();

    let stages = builder()
        .build_pipeline(&engine, &engine, RuleId(1), "ann")
        .unwrap();
    let groups: Vec<&str> = stages.iter().map(|s| s.group_name.as_str()).collect();
    assert_eq!(groups, vec!["BG1", "FINAL"]);
}

#[test]
fn custom_config_changes_group_names() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .insert_rule(&RuleBuilder::new(1).owner("RISK").build())
        .unwrap();
    let config = ApprovalConfig {
        leading_group: "LEAD".to_string(),
        priority_groups: vec!["RISK".to_string()],
        final_group: "SIGNOFF".to_string(),
        default_approver_suffix: "-auto".to_string(),
    };

    let stages = ApprovalPipelineBuilder::new(config)
        .build_pipeline(&engine, &engine, RuleId(1), "ann")
        .unwrap();
    let users: Vec<&str> = stages.iter().map(|s| s.username.as_str()).collect();
    assert_eq!(users, vec!["LEAD-auto", "RISK-auto", "SIGNOFF-auto"]);
}
