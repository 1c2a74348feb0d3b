mod approval_storage;
mod audit_storage;
mod execution_log;
mod external;
mod lock_storage;
mod rule_storage;

pub use approval_storage::IApprovalStorage;
pub use audit_storage::IAuditStorage;
pub use execution_log::{IExecutionLogStorage, IValidationStorage};
pub use external::{
    DecisionEvaluator, NullDependencyParser, PassThroughEvaluator, SqlDependencyParser,
};
pub use lock_storage::{ILockStorage, ReleaseOutcome};
pub use rule_storage::IRuleStorage;
