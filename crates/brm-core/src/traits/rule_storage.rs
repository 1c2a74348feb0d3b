use crate::errors::BrmResult;
use crate::models::{CompositeRule, GlobalCriticalLink, Rule, RuleConflict, RuleId, TableReference};

/// Rule definitions plus the three non-parent relationship sources.
pub trait IRuleStorage: Send + Sync {
    // --- CRUD ---
    /// Insert with the caller's ID.
    fn insert_rule(&self, rule: &Rule) -> BrmResult<()>;
    /// Insert and let storage assign the ID; `rule.id` is ignored.
    fn insert_new_rule(&self, rule: &Rule) -> BrmResult<RuleId>;
    fn get_rule(&self, id: RuleId) -> BrmResult<Option<Rule>>;
    fn update_rule(&self, rule: &Rule) -> BrmResult<()>;
    fn delete_rule(&self, id: RuleId) -> BrmResult<()>;

    // --- Query ---
    fn list_rules(&self) -> BrmResult<Vec<Rule>>;
    fn children_of(&self, id: RuleId) -> BrmResult<Vec<Rule>>;

    // --- Relationships ---
    fn global_critical_links(&self) -> BrmResult<Vec<GlobalCriticalLink>>;
    fn add_global_critical_link(&self, link: &GlobalCriticalLink) -> BrmResult<()>;
    fn conflicts(&self) -> BrmResult<Vec<RuleConflict>>;
    fn add_conflict(&self, conflict: &RuleConflict) -> BrmResult<()>;
    fn composite_rules(&self) -> BrmResult<Vec<CompositeRule>>;
    fn upsert_composite_rule(&self, composite: &CompositeRule) -> BrmResult<()>;

    // --- Dependency bookkeeping ---
    fn replace_table_dependencies(&self, id: RuleId, tables: &[TableReference]) -> BrmResult<()>;
    fn table_dependencies(&self, id: RuleId) -> BrmResult<Vec<TableReference>>;
}
