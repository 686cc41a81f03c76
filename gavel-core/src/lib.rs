//! Core library for gavel, a community-moderation workflow engine.
//!
//! Platform adapters (a console front end, a chat bot) drive the
//! [`workflow::WorkflowEngine`] through the port traits in [`ports`];
//! everything in here is platform-agnostic.

pub mod action;
pub mod counter;
pub mod ports;
pub mod testing;
pub mod workflow;

pub use counter::CounterStore;
pub use workflow::{
    DecisionOutcome, EscalationCount, IssueReprimand, PortSet, RecordHandle, SubmissionOutcome,
    SubmitAppeal, SubmitRemediation, UserId, WorkflowEngine, WorkflowError, WorkflowKind,
};
