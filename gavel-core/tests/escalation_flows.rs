//! End-to-end flows through the workflow engine: full lifecycles across
//! reprimands, remediations, and appeals, plus counter persistence.

use std::path::PathBuf;
use std::sync::Arc;

use gavel_core::testing::{RecordingNotification, RecordingPresentation};
use gavel_core::workflow::record::EscalationCount;
use gavel_core::{
    CounterStore, DecisionOutcome, IssueReprimand, PortSet, SubmissionOutcome, SubmitAppeal,
    SubmitRemediation, UserId, WorkflowEngine,
};

struct Harness {
    engine: WorkflowEngine,
    presentation: Arc<RecordingPresentation>,
    notification: Arc<RecordingNotification>,
}

fn harness_with_counters(counters: CounterStore) -> Harness {
    let presentation = Arc::new(RecordingPresentation::new());
    let notification = Arc::new(RecordingNotification::new());
    let ports = PortSet {
        presentation: presentation.clone(),
        notification: notification.clone(),
    };
    Harness {
        engine: WorkflowEngine::new(counters, ports),
        presentation,
        notification,
    }
}

fn harness() -> Harness {
    harness_with_counters(CounterStore::in_memory())
}

fn temp_counts_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "gavel-flows-{}-{}.json",
        tag,
        std::process::id()
    ))
}

fn issue(subject: &str) -> IssueReprimand {
    IssueReprimand {
        subject: UserId::from(subject),
        issuer: UserId::from("mod-1"),
        charter_article: "Article 2.1".to_string(),
        remediation_method: "Written apology".to_string(),
        evidence: Some("screenshot".to_string()),
    }
}

async fn issue_and_approve(h: &Harness, subject: &str) {
    let record = h.engine.issue_reprimand(issue(subject)).await.unwrap();
    h.engine
        .decide_reprimand(
            record.handle(),
            DecisionOutcome::Approve,
            UserId::from("mod-1"),
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reprimand_then_remediation_round_trip() {
    let h = harness();
    let user = UserId::from("u1");

    issue_and_approve(&h, "u1").await;
    assert_eq!(h.engine.counter(&user).await.get(), 1);

    let outcome = h
        .engine
        .submit_remediation(SubmitRemediation {
            submitter: user.clone(),
            reprimand_ref: "https://chat.example/r/1".to_string(),
            proof: "apology posted".to_string(),
        })
        .await
        .unwrap();
    let record = match outcome {
        SubmissionOutcome::Accepted(record) => record,
        SubmissionOutcome::Refused => panic!("grant holder should be accepted"),
    };

    h.engine
        .decide_remediation(
            record.handle(),
            DecisionOutcome::Approve,
            UserId::from("mod-2"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(h.engine.counter(&user).await, EscalationCount::ZERO);

    let sent = h.notification.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, user);
}

#[tokio::test]
async fn test_counters_track_users_independently() {
    let h = harness();

    issue_and_approve(&h, "u1").await;
    issue_and_approve(&h, "u1").await;
    issue_and_approve(&h, "u2").await;

    assert_eq!(h.engine.counter(&UserId::from("u1")).await.get(), 2);
    assert_eq!(h.engine.counter(&UserId::from("u2")).await.get(), 1);
    assert_eq!(h.engine.counter(&UserId::from("u3")).await.get(), 0);
}

#[tokio::test]
async fn test_counter_survives_reopen() {
    let path = temp_counts_path("reopen");
    let _ = std::fs::remove_file(&path);

    {
        let h = harness_with_counters(CounterStore::open(&path));
        issue_and_approve(&h, "u1").await;
        issue_and_approve(&h, "u1").await;
        assert_eq!(h.engine.counter(&UserId::from("u1")).await.get(), 2);
    }

    let reopened = CounterStore::open(&path);
    assert_eq!(reopened.get(&UserId::from("u1")).await.get(), 2);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_rejected_appeal_notifies_and_locks_out() {
    let h = harness();
    let user = UserId::from("u1");

    issue_and_approve(&h, "u1").await;

    let record = match h
        .engine
        .submit_appeal(SubmitAppeal {
            submitter: user.clone(),
            reprimand_ref: "https://chat.example/r/1".to_string(),
            reason: "the evidence is forged".to_string(),
            proof: "original image".to_string(),
        })
        .await
        .unwrap()
    {
        SubmissionOutcome::Accepted(record) => record,
        SubmissionOutcome::Refused => panic!("first appeal should be accepted"),
    };

    h.engine
        .decide_appeal(
            record.handle(),
            DecisionOutcome::Reject,
            UserId::from("mod-1"),
            Some("forensics found no tampering".to_string()),
        )
        .await
        .unwrap();

    // Counter untouched, submitter told why.
    assert_eq!(h.engine.counter(&user).await.get(), 1);
    let sent = h.notification.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].2.contains("forensics found no tampering"));

    // No second chance, ever.
    let again = h
        .engine
        .submit_appeal(SubmitAppeal {
            submitter: user.clone(),
            reprimand_ref: "https://chat.example/r/1".to_string(),
            reason: "please reconsider".to_string(),
            proof: "same image".to_string(),
        })
        .await
        .unwrap();
    assert!(again.is_refused());
}

#[tokio::test]
async fn test_successful_appeal_walks_counter_back() {
    let h = harness();
    let user = UserId::from("u1");

    issue_and_approve(&h, "u1").await;
    assert_eq!(h.engine.counter(&user).await.get(), 1);

    let record = match h
        .engine
        .submit_appeal(SubmitAppeal {
            submitter: user.clone(),
            reprimand_ref: "https://chat.example/r/1".to_string(),
            reason: "wrong user cited".to_string(),
            proof: "logs".to_string(),
        })
        .await
        .unwrap()
    {
        SubmissionOutcome::Accepted(record) => record,
        SubmissionOutcome::Refused => panic!("first appeal should be accepted"),
    };
    h.engine
        .decide_appeal(
            record.handle(),
            DecisionOutcome::Approve,
            UserId::from("mod-1"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(h.engine.counter(&user).await, EscalationCount::ZERO);
}

#[tokio::test]
async fn test_every_published_record_reaches_presentation() {
    let h = harness();

    issue_and_approve(&h, "u1").await;
    let outcome = h
        .engine
        .submit_remediation(SubmitRemediation {
            submitter: UserId::from("u1"),
            reprimand_ref: "link".to_string(),
            proof: "done".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Accepted(_)));

    // One reprimand, one remediation.
    assert_eq!(h.presentation.published().await.len(), 2);
    // The decided reprimand was re-rendered once.
    assert_eq!(h.presentation.updated().await.len(), 1);
    // One approved-reprimand announcement.
    assert_eq!(h.presentation.notices().await.len(), 1);
}
