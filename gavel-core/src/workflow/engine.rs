//! The workflow engine: the six operations the platform adapter calls.
//!
//! Each operation validates, mutates the registry and counter store, then
//! hands effects to the interpreter. The in-memory transition commits
//! before any effect runs; effect failures are logged and never rolled
//! back. A single command lock serializes operations - all three
//! workflows touch the shared counter map, so commands are processed one
//! at a time.

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::effect::{Effect, UserNotice};
use super::eligibility::{can_start_appeal, can_start_remediation, can_start_reprimand};
use super::error::WorkflowError;
use super::interpreter::{execute_effects, EffectOutcome, PortSet};
use super::record::{
    AppealRecord, EscalationCount, RecordHandle, RecordSnapshot, RemediationRecord,
    ReprimandRecord, UserId, WorkflowKind,
};
use super::registry::{DecisionOutcome, RecordRegistry};
use crate::counter::CounterStore;

/// Request to issue a new reprimand.
#[derive(Debug, Clone)]
pub struct IssueReprimand {
    pub subject: UserId,
    pub issuer: UserId,
    pub charter_article: String,
    pub remediation_method: String,
    pub evidence: Option<String>,
}

/// Request to submit a remediation form.
#[derive(Debug, Clone)]
pub struct SubmitRemediation {
    pub submitter: UserId,
    pub reprimand_ref: String,
    pub proof: String,
}

/// Request to submit an appeal form.
#[derive(Debug, Clone)]
pub struct SubmitAppeal {
    pub submitter: UserId,
    pub reprimand_ref: String,
    pub reason: String,
    pub proof: String,
}

/// Result of a submission attempt.
///
/// `Refused` is ordinary control flow, not an error: ineligible users get
/// no feedback at all, and callers need to see that nothing was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome<R> {
    Accepted(R),
    Refused,
}

impl<R> SubmissionOutcome<R> {
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Refused)
    }
}

/// The moderation workflow engine.
pub struct WorkflowEngine {
    registry: RwLock<RecordRegistry>,
    counters: CounterStore,
    ports: PortSet,
    /// Serializes command processing; see module docs.
    command_lock: Mutex<()>,
}

impl WorkflowEngine {
    pub fn new(counters: CounterStore, ports: PortSet) -> Self {
        Self {
            registry: RwLock::new(RecordRegistry::new()),
            counters,
            ports,
            command_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Reprimands
    // =========================================================================

    /// Publish a new pending reprimand.
    ///
    /// The display level is `min(counter + 1, 3)` at issue time; the
    /// counter itself only moves if the reprimand is approved.
    pub async fn issue_reprimand(
        &self,
        request: IssueReprimand,
    ) -> Result<ReprimandRecord, WorkflowError> {
        let _guard = self.command_lock.lock().await;

        require_non_blank(&request.subject.0, "subject user id")?;
        require_non_blank(&request.issuer.0, "issuer user id")?;
        require_non_blank(&request.charter_article, "charter article")?;
        require_non_blank(&request.remediation_method, "remediation method")?;
        debug_assert!(can_start_reprimand(&request.subject));

        let level = self.counters.get(&request.subject).await.incremented();
        let record = ReprimandRecord::new(
            request.subject,
            request.issuer,
            request.charter_article,
            request.remediation_method,
            request.evidence,
            level,
        );

        {
            let mut registry = self.registry.write().await;
            registry.publish_reprimand(record.clone());
        }

        execute_effects(
            &self.ports,
            vec![Effect::PublishRecord {
                snapshot: RecordSnapshot::Reprimand(record.clone()),
            }],
        )
        .await;

        Ok(record)
    }

    /// Decide a pending reprimand.
    ///
    /// Approval increments the subject's counter (clamped at 3), announces
    /// the reprimand, and - while the counter is still below the maximum -
    /// records a remediation grant keyed by the published notice.
    pub async fn decide_reprimand(
        &self,
        handle: RecordHandle,
        outcome: DecisionOutcome,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<ReprimandRecord, WorkflowError> {
        let _guard = self.command_lock.lock().await;

        let record = {
            let mut registry = self.registry.write().await;
            registry.decide_reprimand(handle, outcome, decided_by, reason)?
        };

        match outcome {
            DecisionOutcome::Approve => {
                let prior = self.counters.get(&record.subject).await;
                let new_count = prior.incremented();
                self.counters.set(&record.subject, new_count).await;

                let outcomes = execute_effects(
                    &self.ports,
                    vec![
                        Effect::UpdateRecordDisplay {
                            handle,
                            snapshot: RecordSnapshot::Reprimand(record.clone()),
                        },
                        Effect::PublishApprovedNotice {
                            record: record.clone(),
                            level: new_count,
                        },
                    ],
                )
                .await;

                if !new_count.is_max() {
                    let notice_ref = outcomes.into_iter().find_map(|o| match o {
                        EffectOutcome::NoticePublished { external } => Some(external),
                        _ => None,
                    });
                    match notice_ref {
                        Some(external) => {
                            let mut registry = self.registry.write().await;
                            registry.record_grant(external, record.subject.clone());
                        }
                        None => {
                            warn!(
                                "Approved notice for reprimand {} was not published; \
                                 no remediation grant recorded",
                                handle.short()
                            );
                        }
                    }
                }
            }
            DecisionOutcome::Reject => {
                execute_effects(
                    &self.ports,
                    vec![Effect::UpdateRecordDisplay {
                        handle,
                        snapshot: RecordSnapshot::Reprimand(record.clone()),
                    }],
                )
                .await;
            }
        }

        Ok(record)
    }

    // =========================================================================
    // Remediations
    // =========================================================================

    /// Submit a remediation form.
    ///
    /// Refused silently when the user holds no grant or already has a
    /// remediation awaiting a decision.
    pub async fn submit_remediation(
        &self,
        request: SubmitRemediation,
    ) -> Result<SubmissionOutcome<RemediationRecord>, WorkflowError> {
        let _guard = self.command_lock.lock().await;

        require_non_blank(&request.submitter.0, "submitter user id")?;
        require_non_blank(&request.reprimand_ref, "reprimand link")?;
        require_non_blank(&request.proof, "remediation proof")?;

        let eligible = {
            let registry = self.registry.read().await;
            can_start_remediation(&registry, &request.submitter)
                && !registry.has_pending_remediation(&request.submitter)
        };
        if !eligible {
            debug!(
                "Refusing remediation submission from {}: not eligible",
                request.submitter
            );
            return Ok(SubmissionOutcome::Refused);
        }

        let record = RemediationRecord::new(
            request.submitter,
            request.reprimand_ref,
            request.proof,
        );

        {
            let mut registry = self.registry.write().await;
            registry.publish_remediation(record.clone());
        }

        execute_effects(
            &self.ports,
            vec![Effect::PublishRecord {
                snapshot: RecordSnapshot::Remediation(record.clone()),
            }],
        )
        .await;

        Ok(SubmissionOutcome::Accepted(record))
    }

    /// Decide a pending remediation. Approval resets the submitter's
    /// counter to zero; either verdict notifies the submitter directly.
    pub async fn decide_remediation(
        &self,
        handle: RecordHandle,
        outcome: DecisionOutcome,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<RemediationRecord, WorkflowError> {
        let _guard = self.command_lock.lock().await;

        let record = {
            let mut registry = self.registry.write().await;
            registry.decide_remediation(handle, outcome, decided_by, reason)?
        };

        let notice = match outcome {
            DecisionOutcome::Approve => {
                self.counters
                    .set(&record.submitter, EscalationCount::ZERO)
                    .await;
                UserNotice::RemediationApproved { handle }
            }
            DecisionOutcome::Reject => UserNotice::RemediationRejected {
                handle,
                reason: record
                    .decision()
                    .and_then(|d| d.reason.clone())
                    .unwrap_or_default(),
            },
        };

        execute_effects(
            &self.ports,
            vec![
                Effect::UpdateRecordDisplay {
                    handle,
                    snapshot: RecordSnapshot::Remediation(record.clone()),
                },
                Effect::NotifyUser {
                    user: record.submitter.clone(),
                    notice,
                },
            ],
        )
        .await;

        Ok(record)
    }

    // =========================================================================
    // Appeals
    // =========================================================================

    /// Submit an appeal form.
    ///
    /// Refused silently when the user has any appeal record tracked,
    /// whatever its status.
    pub async fn submit_appeal(
        &self,
        request: SubmitAppeal,
    ) -> Result<SubmissionOutcome<AppealRecord>, WorkflowError> {
        let _guard = self.command_lock.lock().await;

        require_non_blank(&request.submitter.0, "submitter user id")?;
        require_non_blank(&request.reprimand_ref, "reprimand link")?;
        require_non_blank(&request.reason, "appeal reason")?;
        require_non_blank(&request.proof, "appeal proof")?;

        let eligible = {
            let registry = self.registry.read().await;
            can_start_appeal(&registry, &request.submitter)
        };
        if !eligible {
            debug!(
                "Refusing appeal submission from {}: an appeal record already exists",
                request.submitter
            );
            return Ok(SubmissionOutcome::Refused);
        }

        let record = AppealRecord::new(
            request.submitter,
            request.reprimand_ref,
            request.reason,
            request.proof,
        );

        {
            let mut registry = self.registry.write().await;
            registry.publish_appeal(record.clone());
        }

        execute_effects(
            &self.ports,
            vec![Effect::PublishRecord {
                snapshot: RecordSnapshot::Appeal(record.clone()),
            }],
        )
        .await;

        Ok(SubmissionOutcome::Accepted(record))
    }

    /// Decide a pending appeal. Approval decrements the submitter's
    /// counter (clamped at zero); either verdict notifies the submitter.
    pub async fn decide_appeal(
        &self,
        handle: RecordHandle,
        outcome: DecisionOutcome,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<AppealRecord, WorkflowError> {
        let _guard = self.command_lock.lock().await;

        let record = {
            let mut registry = self.registry.write().await;
            registry.decide_appeal(handle, outcome, decided_by, reason)?
        };

        let notice = match outcome {
            DecisionOutcome::Approve => {
                let prior = self.counters.get(&record.submitter).await;
                self.counters
                    .set(&record.submitter, prior.decremented())
                    .await;
                UserNotice::AppealApproved { handle }
            }
            DecisionOutcome::Reject => UserNotice::AppealRejected {
                handle,
                reason: record
                    .decision()
                    .and_then(|d| d.reason.clone())
                    .unwrap_or_default(),
            },
        };

        execute_effects(
            &self.ports,
            vec![
                Effect::UpdateRecordDisplay {
                    handle,
                    snapshot: RecordSnapshot::Appeal(record.clone()),
                },
                Effect::NotifyUser {
                    user: record.submitter.clone(),
                    notice,
                },
            ],
        )
        .await;

        Ok(record)
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// The subject's current escalation count.
    pub async fn counter(&self, user: &UserId) -> EscalationCount {
        self.counters.get(user).await
    }

    /// A point-in-time copy of a tracked record.
    pub async fn snapshot(
        &self,
        kind: WorkflowKind,
        handle: RecordHandle,
    ) -> Option<RecordSnapshot> {
        let registry = self.registry.read().await;
        registry.snapshot(kind, handle)
    }
}

fn require_non_blank(value: &str, field: &str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        return Err(WorkflowError::validation(format!("{} must not be blank", field)));
    }
    Ok(())
}
