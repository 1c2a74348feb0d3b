//! Approval pipeline builder.

use std::collections::HashMap;

use brm_core::config::ApprovalConfig;
use brm_core::errors::BrmResult;
use brm_core::models::{ApprovalStage, Rule, RuleId};
use brm_core::traits::{IApprovalStorage, IRuleStorage};
use brm_graph::{RelationshipLoader, RelationshipSources, RuleGraph};

use crate::sequence::{impacted_groups, stage_sequence};

/// Builds the approval rows for a rule from graph reachability.
///
/// Rebuilding is idempotent: the rule's existing rows are replaced in one
/// transaction by the freshly computed pipeline.
pub struct ApprovalPipelineBuilder {
    config: ApprovalConfig,
    loader: RelationshipLoader,
}

impl ApprovalPipelineBuilder {
    pub fn new(config: ApprovalConfig) -> Self {
        Self {
            config,
            loader: RelationshipLoader::new(),
        }
    }

    pub fn with_loader(mut self, loader: RelationshipLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    /// Compute and persist the pipeline for `rule_id`. Returns the rows written.
    pub fn build_pipeline(
        &self,
        rules: &dyn IRuleStorage,
        approvals: &dyn IApprovalStorage,
        rule_id: RuleId,
        initiated_by: &str,
    ) -> BrmResult<Vec<ApprovalStage>> {
        let sources = RelationshipSources::read(rules)?;
        let stages = self.plan_from_sources(&sources, approvals, rule_id)?;
        approvals.replace_pipeline(rule_id, &stages)?;

        tracing::info!(
            rule_id = %rule_id,
            initiated_by = %initiated_by,
            stages = stages.last().map(|s| s.stage).unwrap_or(0),
            rows = stages.len(),
            "approval pipeline rebuilt"
        );
        Ok(stages)
    }

    /// Plan against relationship rows already in hand, for callers that need
    /// the pipeline before their own rule edit is written.
    pub fn plan_from_sources(
        &self,
        sources: &RelationshipSources,
        approvals: &dyn IApprovalStorage,
        rule_id: RuleId,
    ) -> BrmResult<Vec<ApprovalStage>> {
        let graph = self.loader.build(sources);
        let by_id = sources
            .rules
            .iter()
            .map(|r| (r.id, r.clone()))
            .collect::<HashMap<_, _>>();
        self.plan(&graph, &by_id, approvals, rule_id)
    }

    /// Compute the pipeline rows without writing them.
    pub fn plan(
        &self,
        graph: &RuleGraph,
        rules: &HashMap<RuleId, Rule>,
        approvals: &dyn IApprovalStorage,
        rule_id: RuleId,
    ) -> BrmResult<Vec<ApprovalStage>> {
        let related = graph.reachable_from(rule_id);
        let impacted = impacted_groups(&related, rules);
        let groups = stage_sequence(&impacted, &self.config);

        let mut stages = Vec::new();
        for (idx, group) in groups.iter().enumerate() {
            let stage = idx as u32 + 1;
            let mut approvers = approvals.approvers_for_group(group)?;
            if approvers.is_empty() {
                approvers.push(self.config.default_approver(group));
            }
            stages.extend(approvers.into_iter().map(|username| ApprovalStage {
                rule_id,
                group_name: group.clone(),
                username,
                stage,
                approved: false,
                approved_at: None,
            }));
        }
        Ok(stages)
    }
}
