//! Record and identifier types for the moderation workflows.
//!
//! Following the principle of "make illegal states unrepresentable":
//! identifiers get their own newtypes so they cannot be mixed up, and the
//! escalation counter is a type whose every constructor stays inside [0, 3].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Newtype for a chat-platform user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque handle for a published workflow record, assigned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordHandle(Uuid);

impl RecordHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns a truncated form for display (first 8 characters).
    pub fn short(&self) -> String {
        let full = self.0.to_string();
        full[..8.min(full.len())].to_string()
    }
}

impl Default for RecordHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Handle returned by the presentation port for a published payload.
///
/// Distinct from [`RecordHandle`]: the registry never mints these, the
/// platform adapter does (on a chat platform this would be a message id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRef(pub String);

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExternalRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExternalRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Per-user escalation counter, always within [0, 3].
///
/// Every operation clamps, so no sequence of increments, decrements, and
/// resets can leave the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EscalationCount(u8);

impl EscalationCount {
    /// Upper bound of the counter domain.
    pub const MAX_VALUE: u8 = 3;

    /// The maximum counter value.
    pub const MAX: Self = Self(Self::MAX_VALUE);

    /// A fresh (unseen) user's counter.
    pub const ZERO: Self = Self(0);

    /// Construct from a raw value, refusing anything outside [0, 3].
    pub fn new(raw: u8) -> Option<Self> {
        (raw <= Self::MAX_VALUE).then_some(Self(raw))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// The counter after one more approved reprimand (clamped at 3).
    pub fn incremented(&self) -> Self {
        Self((self.0 + 1).min(Self::MAX_VALUE))
    }

    /// The counter after an approved appeal (clamped at 0).
    pub fn decremented(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    pub fn is_max(&self) -> bool {
        self.0 == Self::MAX_VALUE
    }
}

impl Default for EscalationCount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<u8> for EscalationCount {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| {
            format!(
                "escalation count {} outside [0, {}]",
                raw,
                Self::MAX_VALUE
            )
        })
    }
}

impl From<EscalationCount> for u8 {
    fn from(count: EscalationCount) -> u8 {
        count.0
    }
}

impl fmt::Display for EscalationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX_VALUE)
    }
}

/// The three workflow types gavel tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowKind {
    Reprimand,
    Remediation,
    Appeal,
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reprimand => write!(f, "reprimand"),
            Self::Remediation => write!(f, "remediation"),
            Self::Appeal => write!(f, "appeal"),
        }
    }
}

/// Lifecycle status of a workflow record.
///
/// `Pending` is the sole non-terminal state; no transition leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Pending,
    Approved,
    Rejected,
}

impl RecordStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending approval"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// The moderator verdict attached to a record once it leaves Pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decided_by: UserId,
    /// Present exactly when the record was rejected.
    pub reason: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// Seam used by the registry's single transition point.
///
/// Records never expose their status mutably; the registry applies
/// decisions through this trait and nothing else may change a status.
pub(crate) trait Decidable {
    fn status(&self) -> RecordStatus;
    fn record_decision(&mut self, status: RecordStatus, decision: Decision);
}

/// Sentinel stored when the issuer supplied no evidence.
pub const NO_EVIDENCE: &str = "N/A";

/// A disciplinary citation against a subject user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReprimandRecord {
    handle: RecordHandle,
    pub subject: UserId,
    pub issuer: UserId,
    pub charter_article: String,
    pub remediation_method: String,
    pub evidence: String,
    /// The subject's counter after a tentative increment, computed at issue
    /// time for display only. The counter itself moves on approval.
    pub level_at_issue: EscalationCount,
    status: RecordStatus,
    decision: Option<Decision>,
}

impl ReprimandRecord {
    pub fn new(
        subject: UserId,
        issuer: UserId,
        charter_article: String,
        remediation_method: String,
        evidence: Option<String>,
        level_at_issue: EscalationCount,
    ) -> Self {
        let evidence = evidence
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| NO_EVIDENCE.to_string());
        Self {
            handle: RecordHandle::new(),
            subject,
            issuer,
            charter_article,
            remediation_method,
            evidence,
            level_at_issue,
            status: RecordStatus::Pending,
            decision: None,
        }
    }

    pub fn handle(&self) -> RecordHandle {
        self.handle
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }
}

impl Decidable for ReprimandRecord {
    fn status(&self) -> RecordStatus {
        self.status
    }

    fn record_decision(&mut self, status: RecordStatus, decision: Decision) {
        self.status = status;
        self.decision = Some(decision);
    }
}

/// A corrective submission filed to have the escalation counter reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationRecord {
    handle: RecordHandle,
    pub submitter: UserId,
    /// Free-text link supplied by the submitter; not validated against any
    /// reprimand record.
    pub reprimand_ref: String,
    pub proof: String,
    status: RecordStatus,
    decision: Option<Decision>,
}

impl RemediationRecord {
    pub fn new(submitter: UserId, reprimand_ref: String, proof: String) -> Self {
        Self {
            handle: RecordHandle::new(),
            submitter,
            reprimand_ref,
            proof,
            status: RecordStatus::Pending,
            decision: None,
        }
    }

    pub fn handle(&self) -> RecordHandle {
        self.handle
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }
}

impl Decidable for RemediationRecord {
    fn status(&self) -> RecordStatus {
        self.status
    }

    fn record_decision(&mut self, status: RecordStatus, decision: Decision) {
        self.status = status;
        self.decision = Some(decision);
    }
}

/// A submission contesting a reprimand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealRecord {
    handle: RecordHandle,
    pub submitter: UserId,
    pub reprimand_ref: String,
    pub reason: String,
    pub proof: String,
    status: RecordStatus,
    decision: Option<Decision>,
}

impl AppealRecord {
    pub fn new(submitter: UserId, reprimand_ref: String, reason: String, proof: String) -> Self {
        Self {
            handle: RecordHandle::new(),
            submitter,
            reprimand_ref,
            reason,
            proof,
            status: RecordStatus::Pending,
            decision: None,
        }
    }

    pub fn handle(&self) -> RecordHandle {
        self.handle
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn decision(&self) -> Option<&Decision> {
        self.decision.as_ref()
    }
}

impl Decidable for AppealRecord {
    fn status(&self) -> RecordStatus {
        self.status
    }

    fn record_decision(&mut self, status: RecordStatus, decision: Decision) {
        self.status = status;
        self.decision = Some(decision);
    }
}

/// Owned snapshot of any workflow record, for presentation and read access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSnapshot {
    Reprimand(ReprimandRecord),
    Remediation(RemediationRecord),
    Appeal(AppealRecord),
}

impl RecordSnapshot {
    pub fn kind(&self) -> WorkflowKind {
        match self {
            Self::Reprimand(_) => WorkflowKind::Reprimand,
            Self::Remediation(_) => WorkflowKind::Remediation,
            Self::Appeal(_) => WorkflowKind::Appeal,
        }
    }

    pub fn handle(&self) -> RecordHandle {
        match self {
            Self::Reprimand(r) => r.handle(),
            Self::Remediation(r) => r.handle(),
            Self::Appeal(r) => r.handle(),
        }
    }

    pub fn status(&self) -> RecordStatus {
        match self {
            Self::Reprimand(r) => r.status(),
            Self::Remediation(r) => r.status(),
            Self::Appeal(r) => r.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escalation_count_bounds() {
        assert_eq!(EscalationCount::new(0), Some(EscalationCount::ZERO));
        assert_eq!(EscalationCount::new(3), Some(EscalationCount::MAX));
        assert_eq!(EscalationCount::new(4), None);
    }

    #[test]
    fn test_escalation_count_clamps() {
        assert_eq!(EscalationCount::MAX.incremented(), EscalationCount::MAX);
        assert_eq!(EscalationCount::ZERO.decremented(), EscalationCount::ZERO);
        assert_eq!(EscalationCount::ZERO.incremented().get(), 1);
        assert_eq!(EscalationCount::MAX.decremented().get(), 2);
    }

    #[test]
    fn test_escalation_count_display() {
        assert_eq!(format!("{}", EscalationCount::ZERO), "0/3");
        assert_eq!(format!("{}", EscalationCount::MAX), "3/3");
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(!RecordStatus::Pending.is_terminal());
        assert!(RecordStatus::Approved.is_terminal());
        assert!(RecordStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_evidence_defaults_to_sentinel() {
        let record = ReprimandRecord::new(
            UserId::from("u1"),
            UserId::from("m1"),
            "Article 3".to_string(),
            "Apology".to_string(),
            None,
            EscalationCount::ZERO.incremented(),
        );
        assert_eq!(record.evidence, NO_EVIDENCE);

        let blank = ReprimandRecord::new(
            UserId::from("u1"),
            UserId::from("m1"),
            "Article 3".to_string(),
            "Apology".to_string(),
            Some("   ".to_string()),
            EscalationCount::ZERO.incremented(),
        );
        assert_eq!(blank.evidence, NO_EVIDENCE);

        let supplied = ReprimandRecord::new(
            UserId::from("u1"),
            UserId::from("m1"),
            "Article 3".to_string(),
            "Apology".to_string(),
            Some("screenshot".to_string()),
            EscalationCount::ZERO.incremented(),
        );
        assert_eq!(supplied.evidence, "screenshot");
    }

    #[test]
    fn test_record_handle_round_trip() {
        let handle = RecordHandle::new();
        let parsed: RecordHandle = handle.to_string().parse().expect("should parse");
        assert_eq!(parsed, handle);
        assert_eq!(handle.short().len(), 8);
    }

    #[derive(Debug, Clone, Copy)]
    enum CounterOp {
        Increment,
        Decrement,
        Reset,
    }

    fn counter_op() -> impl Strategy<Value = CounterOp> {
        prop_oneof![
            Just(CounterOp::Increment),
            Just(CounterOp::Decrement),
            Just(CounterOp::Reset),
        ]
    }

    proptest! {
        /// Any sequence of counter mutations stays within [0, 3].
        #[test]
        fn prop_counter_stays_in_domain(start in 0u8..=3, ops in proptest::collection::vec(counter_op(), 0..64)) {
            let mut count = EscalationCount::new(start).unwrap();
            for op in ops {
                count = match op {
                    CounterOp::Increment => count.incremented(),
                    CounterOp::Decrement => count.decremented(),
                    CounterOp::Reset => EscalationCount::ZERO,
                };
                prop_assert!(count.get() <= EscalationCount::MAX_VALUE);
            }
        }
    }
}
