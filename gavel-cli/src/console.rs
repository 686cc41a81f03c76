//! Console implementations of the ports.
//!
//! The console stands in for a chat platform: published records are
//! printed to stdout together with the action identifiers a moderator
//! would press, and direct notifications are printed as mock DMs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use gavel_core::action::Action;
use gavel_core::ports::{AuthorizationPort, NotificationPort, PresentationPort};
use gavel_core::workflow::record::{
    EscalationCount, ExternalRef, RecordHandle, RecordSnapshot, ReprimandRecord, UserId,
};
use gavel_core::workflow::registry::DecisionOutcome;

/// Renders records to stdout and mints sequential external refs, the way
/// a chat platform would return message ids.
pub struct ConsolePresentation {
    next_ref: AtomicU64,
}

impl ConsolePresentation {
    pub fn new() -> Self {
        Self {
            next_ref: AtomicU64::new(1),
        }
    }

    fn mint(&self, prefix: &str) -> ExternalRef {
        let n = self.next_ref.fetch_add(1, Ordering::Relaxed);
        ExternalRef::from(format!("{}-{}", prefix, n))
    }
}

impl Default for ConsolePresentation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresentationPort for ConsolePresentation {
    async fn publish_record(&self, snapshot: &RecordSnapshot) -> anyhow::Result<ExternalRef> {
        println!("{}", render_snapshot(snapshot));
        println!("  actions: {}", decide_actions(snapshot));
        Ok(self.mint("post"))
    }

    async fn update_record_display(
        &self,
        _handle: RecordHandle,
        snapshot: &RecordSnapshot,
    ) -> anyhow::Result<()> {
        println!("{}", render_snapshot(snapshot));
        Ok(())
    }

    async fn publish_approved_notice(
        &self,
        record: &ReprimandRecord,
        level: EscalationCount,
    ) -> anyhow::Result<ExternalRef> {
        println!(
            "[announcement] {} has been reprimanded (level {}). Article: {}. Remediation: {}.",
            record.subject, level, record.charter_article, record.remediation_method
        );
        Ok(self.mint("notice"))
    }
}

/// Prints direct notifications as mock DMs.
pub struct ConsoleNotification;

#[async_trait]
impl NotificationPort for ConsoleNotification {
    async fn notify_user(&self, user: &UserId, subject: &str, body: &str) -> anyhow::Result<()> {
        println!("[dm -> {}] {}: {}", user, subject, body);
        Ok(())
    }
}

/// Authorizes the fixed moderator list from the environment.
pub struct EnvAuthorization {
    moderators: HashSet<UserId>,
}

impl EnvAuthorization {
    pub fn new(moderators: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            moderators: moderators.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AuthorizationPort for EnvAuthorization {
    async fn is_authorized_moderator(&self, caller: &UserId) -> bool {
        self.moderators.contains(caller)
    }
}

pub fn render_snapshot(snapshot: &RecordSnapshot) -> String {
    match snapshot {
        RecordSnapshot::Reprimand(r) => format!(
            "[reprimand {}] against {} by {} ({})\n  article: {}\n  remediation: {}\n  evidence: {}\n  level: {}",
            r.handle().short(),
            r.subject,
            r.issuer,
            r.status(),
            r.charter_article,
            r.remediation_method,
            r.evidence,
            r.level_at_issue,
        ),
        RecordSnapshot::Remediation(r) => format!(
            "[remediation {}] from {} ({})\n  reprimand: {}\n  proof: {}",
            r.handle().short(),
            r.submitter,
            r.status(),
            r.reprimand_ref,
            r.proof,
        ),
        RecordSnapshot::Appeal(r) => format!(
            "[appeal {}] from {} ({})\n  reprimand: {}\n  reason: {}\n  proof: {}",
            r.handle().short(),
            r.submitter,
            r.status(),
            r.reprimand_ref,
            r.reason,
            r.proof,
        ),
    }
}

fn decide_actions(snapshot: &RecordSnapshot) -> String {
    let kind = snapshot.kind();
    let handle = snapshot.handle();
    format!(
        "{} | {}",
        Action::Decide {
            kind,
            outcome: DecisionOutcome::Approve,
            handle,
        },
        Action::Decide {
            kind,
            outcome: DecisionOutcome::Reject,
            handle,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::workflow::record::AppealRecord;

    #[tokio::test]
    async fn test_env_authorization() {
        let auth = EnvAuthorization::new([UserId::from("mod-1")]);
        assert!(auth.is_authorized_moderator(&UserId::from("mod-1")).await);
        assert!(!auth.is_authorized_moderator(&UserId::from("u1")).await);
    }

    #[test]
    fn test_render_includes_status_and_handle() {
        let record = AppealRecord::new(
            UserId::from("u1"),
            "link".to_string(),
            "unfair".to_string(),
            "proof".to_string(),
        );
        let rendered = render_snapshot(&RecordSnapshot::Appeal(record.clone()));
        assert!(rendered.contains(&record.handle().short()));
        assert!(rendered.contains("pending approval"));
    }
}
