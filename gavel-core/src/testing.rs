//! Recording port implementations for tests.
//!
//! These capture everything the interpreter sends through the ports so
//! tests can assert on side effects without a live platform.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{AuthorizationPort, NotificationPort, PresentationPort};
use crate::workflow::record::{
    EscalationCount, ExternalRef, RecordHandle, RecordSnapshot, ReprimandRecord, UserId,
};

/// Presentation port that records every call and mints sequential refs.
#[derive(Default)]
pub struct RecordingPresentation {
    published: RwLock<Vec<RecordSnapshot>>,
    updated: RwLock<Vec<(RecordHandle, RecordSnapshot)>>,
    notices: RwLock<Vec<(ReprimandRecord, EscalationCount)>>,
    next_ref: AtomicU64,
    fail_notices: AtomicBool,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A presentation whose approved-notice publishing fails, for
    /// exercising the no-notice-no-grant path.
    pub fn with_failing_notices() -> Self {
        let presentation = Self::default();
        presentation.set_fail_notices(true);
        presentation
    }

    pub fn set_fail_notices(&self, fail: bool) {
        self.fail_notices.store(fail, Ordering::SeqCst);
    }

    pub async fn published(&self) -> Vec<RecordSnapshot> {
        self.published.read().await.clone()
    }

    pub async fn updated(&self) -> Vec<(RecordHandle, RecordSnapshot)> {
        self.updated.read().await.clone()
    }

    pub async fn notices(&self) -> Vec<(ReprimandRecord, EscalationCount)> {
        self.notices.read().await.clone()
    }

    fn mint_ref(&self, prefix: &str) -> ExternalRef {
        let n = self.next_ref.fetch_add(1, Ordering::SeqCst);
        ExternalRef(format!("{}-{}", prefix, n))
    }
}

#[async_trait]
impl PresentationPort for RecordingPresentation {
    async fn publish_record(&self, snapshot: &RecordSnapshot) -> anyhow::Result<ExternalRef> {
        self.published.write().await.push(snapshot.clone());
        Ok(self.mint_ref("posted"))
    }

    async fn update_record_display(
        &self,
        handle: RecordHandle,
        snapshot: &RecordSnapshot,
    ) -> anyhow::Result<()> {
        self.updated.write().await.push((handle, snapshot.clone()));
        Ok(())
    }

    async fn publish_approved_notice(
        &self,
        record: &ReprimandRecord,
        level: EscalationCount,
    ) -> anyhow::Result<ExternalRef> {
        if self.fail_notices.load(Ordering::SeqCst) {
            anyhow::bail!("announcement stream unavailable");
        }
        self.notices.write().await.push((record.clone(), level));
        Ok(self.mint_ref("notice"))
    }
}

/// Presentation port where every call fails.
pub struct FailingPresentation;

#[async_trait]
impl PresentationPort for FailingPresentation {
    async fn publish_record(&self, _snapshot: &RecordSnapshot) -> anyhow::Result<ExternalRef> {
        anyhow::bail!("presentation unavailable")
    }

    async fn update_record_display(
        &self,
        _handle: RecordHandle,
        _snapshot: &RecordSnapshot,
    ) -> anyhow::Result<()> {
        anyhow::bail!("presentation unavailable")
    }

    async fn publish_approved_notice(
        &self,
        _record: &ReprimandRecord,
        _level: EscalationCount,
    ) -> anyhow::Result<ExternalRef> {
        anyhow::bail!("presentation unavailable")
    }
}

/// Notification port that records (user, subject, body) triples.
#[derive(Default)]
pub struct RecordingNotification {
    sent: RwLock<Vec<(UserId, String, String)>>,
}

impl RecordingNotification {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(UserId, String, String)> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationPort for RecordingNotification {
    async fn notify_user(&self, user: &UserId, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent
            .write()
            .await
            .push((user.clone(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Authorization port backed by a fixed moderator set.
pub struct StaticAuthorization {
    moderators: HashSet<UserId>,
}

impl StaticAuthorization {
    pub fn new(moderators: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            moderators: moderators.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AuthorizationPort for StaticAuthorization {
    async fn is_authorized_moderator(&self, caller: &UserId) -> bool {
        self.moderators.contains(caller)
    }
}
