pub mod approval;
pub mod audit_entry;
pub mod dependency;
pub mod execution;
pub mod lock;
pub mod relationships;
pub mod rule;

pub use approval::ApprovalStage;
pub use audit_entry::{AuditAction, AuditEntry};
pub use dependency::{ColumnReference, SqlDependencies, TableReference};
pub use execution::{DataValidation, ExecutionLogEntry, ExecutionResult};
pub use lock::{AcquireOutcome, LeaseRecord, LockRecord};
pub use relationships::{CompositeRule, EdgeKind, GlobalCriticalLink, RuleConflict};
pub use rule::{
    ApprovalStatus, LifecycleState, NewRule, OperationType, Rule, RuleChanges, RuleId, RuleStatus,
};
