//! Parsing of action identifiers.
//!
//! Every interactive element the adapter renders carries a stable string
//! identifier; when the user activates one, the adapter hands the
//! identifier back here to recover which operation it names. Decide
//! actions append the record handle after a colon, e.g.
//! `approve_reprimand:3f2a...`.

use std::fmt;

use crate::workflow::record::{RecordHandle, WorkflowKind};
use crate::workflow::registry::DecisionOutcome;

/// An operation named by an action identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the reprimand entry form.
    StartReprimand,
    /// Open the remediation entry form.
    StartRemediation,
    /// Open the appeal entry form.
    StartAppeal,
    /// Decide a pending record.
    Decide {
        kind: WorkflowKind,
        outcome: DecisionOutcome,
        handle: RecordHandle,
    },
}

impl Action {
    /// The identifier string for this action, the inverse of
    /// [`parse_action`].
    pub fn id(&self) -> String {
        match self {
            Self::StartReprimand => "issue_reprimand".to_string(),
            Self::StartRemediation => "remediate".to_string(),
            Self::StartAppeal => "appeal".to_string(),
            Self::Decide {
                kind,
                outcome,
                handle,
            } => format!("{}_{}:{}", outcome_prefix(*outcome), kind, handle),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

fn outcome_prefix(outcome: DecisionOutcome) -> &'static str {
    match outcome {
        DecisionOutcome::Approve => "approve",
        DecisionOutcome::Reject => "reject",
    }
}

/// Result of parsing an action identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParse {
    /// The identifier named no known action (or carried a malformed
    /// handle). Callers log and ignore.
    Unknown { attempted: String },
    Action(Action),
}

/// Parse an action identifier back into an [`Action`].
pub fn parse_action(id: &str) -> ActionParse {
    let action = match id {
        "issue_reprimand" => Some(Action::StartReprimand),
        "remediate" => Some(Action::StartRemediation),
        "appeal" => Some(Action::StartAppeal),
        _ => parse_decide(id),
    };
    match action {
        Some(action) => ActionParse::Action(action),
        None => ActionParse::Unknown {
            attempted: id.to_string(),
        },
    }
}

fn parse_decide(id: &str) -> Option<Action> {
    let (name, raw_handle) = id.split_once(':')?;
    let (kind, outcome) = match name {
        "approve_reprimand" => (WorkflowKind::Reprimand, DecisionOutcome::Approve),
        "reject_reprimand" => (WorkflowKind::Reprimand, DecisionOutcome::Reject),
        "approve_remediation" => (WorkflowKind::Remediation, DecisionOutcome::Approve),
        "reject_remediation" => (WorkflowKind::Remediation, DecisionOutcome::Reject),
        "approve_appeal" => (WorkflowKind::Appeal, DecisionOutcome::Approve),
        "reject_appeal" => (WorkflowKind::Appeal, DecisionOutcome::Reject),
        _ => return None,
    };
    let handle: RecordHandle = raw_handle.parse().ok()?;
    Some(Action::Decide {
        kind,
        outcome,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_actions() {
        assert_eq!(
            parse_action("issue_reprimand"),
            ActionParse::Action(Action::StartReprimand)
        );
        assert_eq!(
            parse_action("remediate"),
            ActionParse::Action(Action::StartRemediation)
        );
        assert_eq!(
            parse_action("appeal"),
            ActionParse::Action(Action::StartAppeal)
        );
    }

    #[test]
    fn test_parse_decide_actions() {
        let handle = RecordHandle::new();
        for (kind, outcome) in [
            (WorkflowKind::Reprimand, DecisionOutcome::Approve),
            (WorkflowKind::Reprimand, DecisionOutcome::Reject),
            (WorkflowKind::Remediation, DecisionOutcome::Approve),
            (WorkflowKind::Remediation, DecisionOutcome::Reject),
            (WorkflowKind::Appeal, DecisionOutcome::Approve),
            (WorkflowKind::Appeal, DecisionOutcome::Reject),
        ] {
            let action = Action::Decide {
                kind,
                outcome,
                handle,
            };
            assert_eq!(parse_action(&action.id()), ActionParse::Action(action));
        }
    }

    #[test]
    fn test_unknown_action_reports_attempt() {
        assert_eq!(
            parse_action("escalate"),
            ActionParse::Unknown {
                attempted: "escalate".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_handle_is_unknown() {
        assert_eq!(
            parse_action("approve_reprimand:not-a-handle"),
            ActionParse::Unknown {
                attempted: "approve_reprimand:not-a-handle".to_string()
            }
        );
        // Decide actions without a handle are not actions at all.
        assert_eq!(
            parse_action("approve_reprimand"),
            ActionParse::Unknown {
                attempted: "approve_reprimand".to_string()
            }
        );
    }
}
