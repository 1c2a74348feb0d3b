//! Extraction of `Rule<digits>` references from composite logic expressions.

use std::sync::LazyLock;

use regex::Regex;

use brm_core::models::RuleId;

static RULE_REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rule(\d+)").expect("rule reference pattern is valid"));

/// Turns free text into the rule IDs it references.
pub trait ReferenceExtractor: Send + Sync {
    /// Referenced IDs in order of appearance. Duplicates are kept.
    fn extract(&self, text: &str) -> Vec<RuleId>;
}

/// Case-insensitive `Rule` followed by one or more digits.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexReferenceExtractor;

impl ReferenceExtractor for RegexReferenceExtractor {
    fn extract(&self, text: &str) -> Vec<RuleId> {
        RULE_REFERENCE_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let digits = caps.get(1)?.as_str();
                match digits.parse::<i64>() {
                    Ok(id) => Some(RuleId(id)),
                    Err(e) => {
                        tracing::warn!(
                            reference = digits,
                            error = %e,
                            "ignoring unparseable rule reference"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
