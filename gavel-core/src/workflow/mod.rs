//! Moderation workflow state machine.
//!
//! Three workflows share one shape: a submission publishes a `Pending`
//! record, and a moderator verdict moves it to exactly one of `Approved`
//! or `Rejected`, where it stays. Approvals drive the per-user escalation
//! counter; side effects (posting, editing, notifying) are described as
//! data in [`effect`] and executed by the [`interpreter`], so the
//! transition logic itself stays pure and testable.

pub mod effect;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod record;
pub mod registry;

pub use effect::{Effect, LogLevel, UserNotice};
pub use engine::{
    IssueReprimand, SubmissionOutcome, SubmitAppeal, SubmitRemediation, WorkflowEngine,
};
pub use error::WorkflowError;
pub use interpreter::{EffectOutcome, PortSet};
pub use record::{
    AppealRecord, Decision, EscalationCount, ExternalRef, RecordHandle, RecordSnapshot,
    RecordStatus, RemediationRecord, ReprimandRecord, UserId, WorkflowKind,
};
pub use registry::DecisionOutcome;
