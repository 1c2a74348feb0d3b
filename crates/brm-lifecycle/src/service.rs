//! Lock-guarded rule definition lifecycle.

use std::sync::Arc;

use chrono::Utc;

use brm_approval::{record_approval, reject, ApprovalPipelineBuilder, ApprovalProgress};
use brm_core::config::BrmConfig;
use brm_core::errors::{BrmError, BrmResult};
use brm_core::models::{
    ApprovalStatus, AuditAction, LifecycleState, NewRule, OperationType, Rule, RuleChanges,
    RuleId, RuleStatus, TableReference,
};
use brm_core::traits::{
    IApprovalStorage, IAuditStorage, ILockStorage, IRuleStorage, NullDependencyParser,
    SqlDependencyParser,
};
use brm_graph::RelationshipSources;
use brm_storage::audit::AuditLogger;
use brm_storage::StorageEngine;

use crate::guards;
use crate::lock::RuleLock;

/// Create, edit, activate, deactivate, delete, and approve rules.
///
/// Mutations of an existing rule take the rule's edit lock as `actor`, write
/// the change, rebuild the approval pipeline when the definition changed,
/// then release the lock whatever the outcome. Audit failures are logged and
/// never undo the mutation.
pub struct RuleLifecycleService {
    rules: Arc<dyn IRuleStorage>,
    approvals: Arc<dyn IApprovalStorage>,
    audit: Arc<dyn IAuditStorage>,
    lock: RuleLock,
    pipeline: ApprovalPipelineBuilder,
    parser: Box<dyn SqlDependencyParser>,
}

impl RuleLifecycleService {
    pub fn new(
        rules: Arc<dyn IRuleStorage>,
        approvals: Arc<dyn IApprovalStorage>,
        locks: Arc<dyn ILockStorage>,
        audit: Arc<dyn IAuditStorage>,
        config: &BrmConfig,
    ) -> Self {
        Self {
            lock: RuleLock::new(locks, audit.clone(), config.lock.ttl()),
            rules,
            approvals,
            audit,
            pipeline: ApprovalPipelineBuilder::new(config.approval.clone()),
            parser: Box::new(NullDependencyParser),
        }
    }

    /// Every storage seam backed by one engine.
    pub fn from_engine(engine: Arc<StorageEngine>, config: &BrmConfig) -> Self {
        Self::new(engine.clone(), engine.clone(), engine.clone(), engine, config)
    }

    pub fn with_parser(mut self, parser: Box<dyn SqlDependencyParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn lock(&self) -> &RuleLock {
        &self.lock
    }

    /// Insert a new DRAFT rule, record its table dependencies, and open its
    /// approval pipeline.
    pub fn create(&self, new: NewRule, actor: &str) -> BrmResult<Rule> {
        if let Some(parent) = new.parent_id {
            self.load(parent)?;
        }

        let now = Utc::now();
        let mut rule = Rule {
            id: RuleId(0),
            parent_id: new.parent_id,
            name: new.name,
            description: new.description,
            critical: new.critical,
            is_global: new.is_global,
            owner_group: new.owner_group,
            status: RuleStatus::Inactive,
            approval_status: ApprovalStatus::ApprovalInProgress,
            lifecycle_state: LifecycleState::Draft,
            operation_type: OperationType::detect(&new.sql_text, new.decision_table_id),
            sql_text: new.sql_text,
            decision_table_id: new.decision_table_id,
            version: 1,
            created_by: actor.to_string(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        rule.id = self.rules.insert_new_rule(&rule)?;

        self.record_dependencies(&rule)?;
        self.pipeline
            .build_pipeline(self.rules.as_ref(), self.approvals.as_ref(), rule.id, actor)?;
        self.audit(AuditAction::Insert, rule.id, actor, None, Some(&rule));

        tracing::info!(rule_id = %rule.id, actor, op = %rule.operation_type, "rule created");
        Ok(rule)
    }

    /// Apply `changes`, bump the version, and send the rule back through
    /// approval.
    pub fn update(&self, rule_id: RuleId, changes: RuleChanges, actor: &str) -> BrmResult<Rule> {
        self.with_lock(rule_id, actor, || {
            let old = self.load(rule_id)?;
            if changes.parent_id == Some(Some(rule_id)) {
                return Err(BrmError::InvalidState {
                    rule_id: rule_id.value(),
                    reason: "a rule cannot be its own parent".to_string(),
                });
            }
            if let Some(Some(parent)) = changes.parent_id {
                self.load(parent)?;
            }

            let mut rule = apply_changes(old.clone(), changes);
            rule.version += 1;
            rule.status = RuleStatus::Inactive;
            rule.lifecycle_state = LifecycleState::UnderApproval;
            rule.approval_status = ApprovalStatus::ApprovalInProgress;
            rule.operation_type = OperationType::detect(&rule.sql_text, rule.decision_table_id);
            rule.updated_by = Some(actor.to_string());
            rule.updated_at = Utc::now();

            // Plan against the edited rule before writing anything.
            let mut sources = RelationshipSources::read(self.rules.as_ref())?;
            if let Some(slot) = sources.rules.iter_mut().find(|r| r.id == rule_id) {
                *slot = rule.clone();
            }
            let stages = self
                .pipeline
                .plan_from_sources(&sources, self.approvals.as_ref(), rule_id)?;
            let tables = self.parser.parse(&rule.sql_text).tables;
            let old_tables = self.rules.table_dependencies(rule_id)?;

            self.rules.update_rule(&rule)?;
            let written = self
                .rules
                .replace_table_dependencies(rule_id, &tables)
                .and_then(|()| self.approvals.replace_pipeline(rule_id, &stages));
            if let Err(e) = written {
                self.restore(&old, &old_tables);
                return Err(e);
            }
            tracing::info!(
                rule_id = %rule_id,
                initiated_by = actor,
                rows = stages.len(),
                "approval pipeline rebuilt"
            );

            self.audit(AuditAction::Update, rule_id, actor, Some(&old), Some(&rule));

            tracing::info!(rule_id = %rule_id, actor, version = rule.version, "rule updated");
            Ok(rule)
        })
    }

    /// Put an approved rule into service.
    pub fn activate(&self, rule_id: RuleId, actor: &str) -> BrmResult<Rule> {
        self.with_lock(rule_id, actor, || {
            let old = self.load(rule_id)?;
            let parent = match old.parent_id {
                Some(pid) => self.rules.get_rule(pid)?,
                None => None,
            };
            guards::check_activate(&old, parent.as_ref())?;

            let rule = self.set_status(&old, RuleStatus::Active, LifecycleState::Active, actor)?;
            self.audit(AuditAction::Activate, rule_id, actor, Some(&old), Some(&rule));
            tracing::info!(rule_id = %rule_id, actor, "rule activated");
            Ok(rule)
        })
    }

    /// Take an approved rule out of service.
    pub fn deactivate(&self, rule_id: RuleId, actor: &str) -> BrmResult<Rule> {
        self.with_lock(rule_id, actor, || {
            let old = self.load(rule_id)?;
            let children = self.rules.children_of(rule_id)?;
            guards::check_deactivate(&old, &children)?;

            let rule =
                self.set_status(&old, RuleStatus::Inactive, LifecycleState::Inactive, actor)?;
            self.audit(AuditAction::Deactivate, rule_id, actor, Some(&old), Some(&rule));
            tracing::info!(rule_id = %rule_id, actor, "rule deactivated");
            Ok(rule)
        })
    }

    /// Remove an inactive, approved, childless rule with its relationships.
    pub fn delete(&self, rule_id: RuleId, actor: &str) -> BrmResult<()> {
        self.with_lock(rule_id, actor, || {
            let old = self.load(rule_id)?;
            let children = self.rules.children_of(rule_id)?;
            guards::check_delete(&old, &children)?;

            self.rules.delete_rule(rule_id)?;
            self.audit(AuditAction::Delete, rule_id, actor, Some(&old), None);
            tracing::info!(rule_id = %rule_id, actor, "rule deleted");
            Ok(())
        })
    }

    /// Record `username`'s approval in the current stage.
    pub fn approve(&self, rule_id: RuleId, username: &str) -> BrmResult<ApprovalProgress> {
        let old = self.load(rule_id)?;
        let progress = record_approval(
            self.rules.as_ref(),
            self.approvals.as_ref(),
            rule_id,
            username,
            Utc::now(),
        )?;
        let new = self.rules.get_rule(rule_id)?;
        self.audit(AuditAction::Approve, rule_id, username, Some(&old), new.as_ref());
        Ok(progress)
    }

    pub fn reject(&self, rule_id: RuleId, username: &str) -> BrmResult<()> {
        let old = self.load(rule_id)?;
        reject(
            self.rules.as_ref(),
            self.approvals.as_ref(),
            rule_id,
            username,
            Utc::now(),
        )?;
        let new = self.rules.get_rule(rule_id)?;
        self.audit(AuditAction::Reject, rule_id, username, Some(&old), new.as_ref());
        Ok(())
    }

    /// Run `f` holding the rule's edit lock. The lock is released on every
    /// path; a failed release is logged, never returned.
    fn with_lock<T>(
        &self,
        rule_id: RuleId,
        actor: &str,
        f: impl FnOnce() -> BrmResult<T>,
    ) -> BrmResult<T> {
        self.lock.lock(rule_id, actor, false)?;
        let result = f();
        if let Err(e) = self.lock.unlock(rule_id, actor, false) {
            tracing::warn!(rule_id = %rule_id, actor, error = %e, "failed to release rule lock");
        }
        result
    }

    fn load(&self, rule_id: RuleId) -> BrmResult<Rule> {
        self.rules
            .get_rule(rule_id)?
            .ok_or(BrmError::RuleNotFound { id: rule_id.value() })
    }

    /// Put back the rule row and table dependencies after a later write of
    /// an update failed. The pipeline write is atomic, so its old rows stand.
    fn restore(&self, old: &Rule, old_tables: &[TableReference]) {
        let restored = self
            .rules
            .update_rule(old)
            .and_then(|()| self.rules.replace_table_dependencies(old.id, old_tables));
        if let Err(e) = restored {
            tracing::warn!(
                rule_id = %old.id,
                error = %e,
                "failed to restore rule after update error"
            );
        }
    }

    fn set_status(
        &self,
        old: &Rule,
        status: RuleStatus,
        state: LifecycleState,
        actor: &str,
    ) -> BrmResult<Rule> {
        let mut rule = old.clone();
        rule.status = status;
        rule.lifecycle_state = state;
        rule.updated_by = Some(actor.to_string());
        rule.updated_at = Utc::now();
        self.rules.update_rule(&rule)?;
        Ok(rule)
    }

    fn record_dependencies(&self, rule: &Rule) -> BrmResult<()> {
        let deps = self.parser.parse(&rule.sql_text);
        self.rules.replace_table_dependencies(rule.id, &deps.tables)
    }

    fn audit(
        &self,
        action: AuditAction,
        rule_id: RuleId,
        actor: &str,
        old: Option<&Rule>,
        new: Option<&Rule>,
    ) {
        let recorded = AuditLogger::rule_entry(action, rule_id, actor, old, new)
            .and_then(|entry| self.audit.record_audit(&entry));
        if let Err(e) = recorded {
            tracing::warn!(
                rule_id = %rule_id,
                action = action.as_str(),
                error = %e,
                "audit write failed; mutation kept"
            );
        }
    }
}

fn apply_changes(mut rule: Rule, changes: RuleChanges) -> Rule {
    if let Some(parent_id) = changes.parent_id {
        rule.parent_id = parent_id;
    }
    if let Some(name) = changes.name {
        rule.name = name;
    }
    if let Some(description) = changes.description {
        rule.description = description;
    }
    if let Some(critical) = changes.critical {
        rule.critical = critical;
    }
    if let Some(is_global) = changes.is_global {
        rule.is_global = is_global;
    }
    if let Some(owner_group) = changes.owner_group {
        rule.owner_group = owner_group;
    }
    if let Some(sql_text) = changes.sql_text {
        rule.sql_text = sql_text;
    }
    if let Some(decision_table_id) = changes.decision_table_id {
        rule.decision_table_id = decision_table_id;
    }
    rule
}
