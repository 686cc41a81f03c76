//! In-memory registry of workflow records and remediation grants.
//!
//! One map per workflow type, keyed by record handle, plus the grant map
//! keyed by the external ref of the published approved-reprimand notice.
//! `decide_*` is the single mutation point for record status; nothing else
//! in the crate can change a status once a record is published.

use std::collections::HashMap;

use chrono::Utc;

use super::error::WorkflowError;
use super::record::{
    AppealRecord, Decidable, Decision, ExternalRef, RecordHandle, RecordSnapshot, RecordStatus,
    RemediationRecord, ReprimandRecord, UserId, WorkflowKind,
};

/// A moderator's verdict on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approve,
    Reject,
}

impl DecisionOutcome {
    fn status(&self) -> RecordStatus {
        match self {
            Self::Approve => RecordStatus::Approved,
            Self::Reject => RecordStatus::Rejected,
        }
    }
}

/// Registry of all tracked workflow records.
#[derive(Debug, Default)]
pub struct RecordRegistry {
    reprimands: HashMap<RecordHandle, ReprimandRecord>,
    remediations: HashMap<RecordHandle, RemediationRecord>,
    appeals: HashMap<RecordHandle, AppealRecord>,
    /// Approved-notice ref -> subject permitted to submit a remediation.
    /// Entries are never removed; see DESIGN.md on multi-use grants.
    grants: HashMap<ExternalRef, UserId>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Publication
    // =========================================================================

    pub fn publish_reprimand(&mut self, record: ReprimandRecord) -> RecordHandle {
        let handle = record.handle();
        self.reprimands.insert(handle, record);
        handle
    }

    pub fn publish_remediation(&mut self, record: RemediationRecord) -> RecordHandle {
        let handle = record.handle();
        self.remediations.insert(handle, record);
        handle
    }

    pub fn publish_appeal(&mut self, record: AppealRecord) -> RecordHandle {
        let handle = record.handle();
        self.appeals.insert(handle, record);
        handle
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn reprimand(&self, handle: RecordHandle) -> Option<&ReprimandRecord> {
        self.reprimands.get(&handle)
    }

    pub fn remediation(&self, handle: RecordHandle) -> Option<&RemediationRecord> {
        self.remediations.get(&handle)
    }

    pub fn appeal(&self, handle: RecordHandle) -> Option<&AppealRecord> {
        self.appeals.get(&handle)
    }

    pub fn snapshot(&self, kind: WorkflowKind, handle: RecordHandle) -> Option<RecordSnapshot> {
        match kind {
            WorkflowKind::Reprimand => self
                .reprimands
                .get(&handle)
                .cloned()
                .map(RecordSnapshot::Reprimand),
            WorkflowKind::Remediation => self
                .remediations
                .get(&handle)
                .cloned()
                .map(RecordSnapshot::Remediation),
            WorkflowKind::Appeal => self
                .appeals
                .get(&handle)
                .cloned()
                .map(RecordSnapshot::Appeal),
        }
    }

    /// Handles of all appeal records filed by a user, regardless of status.
    ///
    /// Deliberately includes terminal records: the appeal gate never
    /// expires (see DESIGN.md).
    pub fn find_appeals_by_user(&self, user: &UserId) -> Vec<RecordHandle> {
        self.appeals
            .iter()
            .filter(|(_, record)| &record.submitter == user)
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// True if the user has a remediation record still awaiting a decision.
    pub fn has_pending_remediation(&self, user: &UserId) -> bool {
        self.remediations
            .values()
            .any(|record| &record.submitter == user && record.status() == RecordStatus::Pending)
    }

    // =========================================================================
    // Grants
    // =========================================================================

    pub fn record_grant(&mut self, notice_ref: ExternalRef, subject: UserId) {
        self.grants.insert(notice_ref, subject);
    }

    pub fn grant_exists_for(&self, user: &UserId) -> bool {
        self.grants.values().any(|subject| subject == user)
    }

    // =========================================================================
    // Decisions (the single status mutation point)
    // =========================================================================

    pub fn decide_reprimand(
        &mut self,
        handle: RecordHandle,
        outcome: DecisionOutcome,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<ReprimandRecord, WorkflowError> {
        decide(&mut self.reprimands, handle, outcome, decided_by, reason)
    }

    pub fn decide_remediation(
        &mut self,
        handle: RecordHandle,
        outcome: DecisionOutcome,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<RemediationRecord, WorkflowError> {
        decide(&mut self.remediations, handle, outcome, decided_by, reason)
    }

    pub fn decide_appeal(
        &mut self,
        handle: RecordHandle,
        outcome: DecisionOutcome,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<AppealRecord, WorkflowError> {
        decide(&mut self.appeals, handle, outcome, decided_by, reason)
    }
}

/// Apply a decision to a pending record.
///
/// Fails without mutating anything when the handle is unknown, the record
/// is already terminal, or a rejection arrives without a reason.
fn decide<R: Decidable + Clone>(
    records: &mut HashMap<RecordHandle, R>,
    handle: RecordHandle,
    outcome: DecisionOutcome,
    decided_by: UserId,
    reason: Option<String>,
) -> Result<R, WorkflowError> {
    let record = records
        .get_mut(&handle)
        .ok_or(WorkflowError::NotFound { handle })?;

    if record.status().is_terminal() {
        return Err(WorkflowError::InvalidState {
            handle,
            status: record.status(),
        });
    }

    let reason = match outcome {
        DecisionOutcome::Approve => None,
        DecisionOutcome::Reject => Some(
            reason
                .filter(|r| !r.trim().is_empty())
                .ok_or_else(|| WorkflowError::validation("rejection requires a reason"))?,
        ),
    };

    record.record_decision(
        outcome.status(),
        Decision {
            decided_by,
            reason,
            decided_at: Utc::now(),
        },
    );
    Ok(record.clone())
}
