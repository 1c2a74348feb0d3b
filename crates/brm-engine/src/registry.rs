//! Rule registry: every runnable rule keyed by ID.

use std::collections::HashMap;

use brm_core::errors::BrmResult;
use brm_core::models::{Rule, RuleId};
use brm_core::traits::IRuleStorage;

/// Rules eligible for a run. A graph node absent from the registry is skipped.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<RuleId, Rule>,
}

impl RuleRegistry {
    /// Load rules from storage. With `only_active`, inactive rules are left
    /// out so the executor treats them as missing.
    pub fn load(storage: &dyn IRuleStorage, only_active: bool) -> BrmResult<Self> {
        let all = storage.list_rules()?;
        let total = all.len();
        let registry = Self::from_rules(all.into_iter().filter(|r| !only_active || r.is_active()));
        tracing::debug!(
            total,
            registered = registry.len(),
            only_active,
            "rule registry loaded"
        );
        Ok(registry)
    }

    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.rules.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
