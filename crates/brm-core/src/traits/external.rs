use crate::models::{Rule, SqlDependencies};

/// Evaluates decision-table rules. Evaluation logic lives outside this workspace.
pub trait DecisionEvaluator: Send + Sync {
    /// Returns `(passed, message)`.
    fn evaluate(&self, rule: &Rule) -> (bool, String);
}

/// Stand-in used when no real evaluator is wired up. Always passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughEvaluator;

impl DecisionEvaluator for PassThroughEvaluator {
    fn evaluate(&self, rule: &Rule) -> (bool, String) {
        (
            true,
            format!(
                "decision table {} evaluated",
                rule.decision_table_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "?".to_string())
            ),
        )
    }
}

/// Extracts table/column dependencies from SQL text. Consumed as a black box
/// by the mutation paths for audit and permission bookkeeping.
pub trait SqlDependencyParser: Send + Sync {
    fn parse(&self, sql_text: &str) -> SqlDependencies;
}

/// Parser that reports no dependencies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDependencyParser;

impl SqlDependencyParser for NullDependencyParser {
    fn parse(&self, _sql_text: &str) -> SqlDependencies {
        SqlDependencies::default()
    }
}
