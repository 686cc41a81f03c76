//! Domain errors surfaced to the platform adapter.
//!
//! Persistence failures are deliberately absent: the counter store logs
//! them and keeps the in-memory value authoritative, so they never
//! propagate through an engine operation. Silent eligibility refusals are
//! not errors either; see `SubmissionOutcome` in the engine.

use super::record::{RecordHandle, RecordStatus};
use std::fmt;

/// Why an engine operation was refused outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A required field was missing or malformed (e.g. rejection without a
    /// reason, blank subject identifier).
    Validation { message: String },
    /// The record handle is not tracked by the registry.
    NotFound { handle: RecordHandle },
    /// A decision was attempted on a record that is no longer Pending.
    InvalidState {
        handle: RecordHandle,
        status: RecordStatus,
    },
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { message } => write!(f, "validation failed: {}", message),
            Self::NotFound { handle } => write!(f, "no record with handle {}", handle.short()),
            Self::InvalidState { handle, status } => write!(
                f,
                "record {} is already {}, no further decision is possible",
                handle.short(),
                status
            ),
        }
    }
}

impl std::error::Error for WorkflowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_state() {
        let handle = RecordHandle::new();
        let err = WorkflowError::InvalidState {
            handle,
            status: RecordStatus::Approved,
        };
        let rendered = format!("{}", err);
        assert!(rendered.contains(&handle.short()));
        assert!(rendered.contains("approved"));
    }

    #[test]
    fn test_display_validation() {
        let err = WorkflowError::validation("rejection requires a reason");
        assert_eq!(
            format!("{}", err),
            "validation failed: rejection requires a reason"
        );
    }
}
