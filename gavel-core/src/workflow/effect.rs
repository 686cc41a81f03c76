//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of an engine operation.
//! They are pure data - the interpreter executes them against the
//! presentation and notification ports. This separation keeps the engine
//! testable without a live chat platform.

use serde::{Deserialize, Serialize};

use super::record::{
    EscalationCount, RecordHandle, RecordSnapshot, ReprimandRecord, UserId,
};

/// All effects the engine can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Publish a freshly submitted record for moderator review.
    PublishRecord { snapshot: RecordSnapshot },

    /// Re-render an existing record after a decision.
    UpdateRecordDisplay {
        handle: RecordHandle,
        snapshot: RecordSnapshot,
    },

    /// Announce an approved reprimand. The external ref the port returns
    /// keys the subject's remediation grant.
    PublishApprovedNotice {
        record: ReprimandRecord,
        level: EscalationCount,
    },

    /// Send a direct notification to a user about their submission.
    NotifyUser { user: UserId, notice: UserNotice },

    /// Log a message (for debugging/tracing).
    Log { level: LogLevel, message: String },
}

/// Content of a direct user notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserNotice {
    RemediationApproved { handle: RecordHandle },
    RemediationRejected { handle: RecordHandle, reason: String },
    AppealApproved { handle: RecordHandle },
    AppealRejected { handle: RecordHandle, reason: String },
}

impl UserNotice {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::RemediationApproved { .. } => "Your remediation form was approved",
            Self::RemediationRejected { .. } => "Your remediation form was rejected",
            Self::AppealApproved { .. } => "Your reprimand appeal was approved",
            Self::AppealRejected { .. } => "Your reprimand appeal was rejected",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::RemediationApproved { handle } => {
                format!("Remediation form: {}", handle)
            }
            Self::RemediationRejected { handle, reason } => {
                format!("Reason: {}\nRemediation form: {}", reason, handle)
            }
            Self::AppealApproved { handle } => {
                format!("Appeal form: {}", handle)
            }
            Self::AppealRejected { handle, reason } => {
                format!("Reason: {}\nAppeal form: {}", reason, handle)
            }
        }
    }
}

/// Log level for logging effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
