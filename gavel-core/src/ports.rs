//! Port traits implemented by the platform adapter.
//!
//! The engine never talks to the chat platform directly; it emits effects
//! and the interpreter executes them against these traits. Failures are
//! best-effort relative to state transitions, which commit first.

use async_trait::async_trait;

use crate::workflow::record::{
    EscalationCount, ExternalRef, RecordHandle, RecordSnapshot, ReprimandRecord, UserId,
};

/// Renders and posts workflow records on the platform.
#[async_trait]
pub trait PresentationPort: Send + Sync {
    /// Publish a new record for moderator review, returning the platform's
    /// handle for the posted payload.
    async fn publish_record(&self, snapshot: &RecordSnapshot) -> anyhow::Result<ExternalRef>;

    /// Re-render an already published record (e.g. after a decision).
    async fn update_record_display(
        &self,
        handle: RecordHandle,
        snapshot: &RecordSnapshot,
    ) -> anyhow::Result<()>;

    /// Announce an approved reprimand on the announcement stream. The
    /// returned ref keys the subject's remediation grant.
    async fn publish_approved_notice(
        &self,
        record: &ReprimandRecord,
        level: EscalationCount,
    ) -> anyhow::Result<ExternalRef>;
}

/// Delivers direct notifications to users.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notify_user(&self, user: &UserId, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Answers whether a caller may decide records.
///
/// Enforcement happens at the adapter seam, before a decide action reaches
/// the engine; the engine itself trusts its caller.
#[async_trait]
pub trait AuthorizationPort: Send + Sync {
    async fn is_authorized_moderator(&self, caller: &UserId) -> bool;
}
