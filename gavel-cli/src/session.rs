//! Interactive session: a line protocol over stdin standing in for the
//! chat platform's buttons and modals.
//!
//! Each line is `|`-separated: the first field is an action identifier
//! (or a read command), the rest are the form fields for that action.
//!
//! ```text
//! issue_reprimand|<issuer>|<subject>|<article>|<method>[|evidence]
//! remediate|<submitter>|<reprimand link>|<proof>
//! appeal|<submitter>|<reprimand link>|<reason>|<proof>
//! approve_reprimand:<handle>|<moderator>
//! reject_reprimand:<handle>|<moderator>|<reason>
//! counter|<user>
//! show|<kind>|<handle>
//! ```

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use gavel_core::action::{parse_action, Action, ActionParse};
use gavel_core::ports::AuthorizationPort;
use gavel_core::workflow::record::{RecordHandle, UserId, WorkflowKind};
use gavel_core::workflow::registry::DecisionOutcome;
use gavel_core::{
    IssueReprimand, SubmissionOutcome, SubmitAppeal, SubmitRemediation, WorkflowEngine,
};

use crate::console::render_snapshot;

const HELP: &str = "\
actions:
  issue_reprimand|<issuer>|<subject>|<article>|<method>[|evidence]
  remediate|<submitter>|<reprimand link>|<proof>
  appeal|<submitter>|<reprimand link>|<reason>|<proof>
  approve_reprimand:<handle>|<moderator>
  reject_reprimand:<handle>|<moderator>|<reason>
  (likewise approve_remediation, reject_remediation, approve_appeal, reject_appeal)
commands:
  counter|<user>    show|<kind>|<handle>    help    quit";

/// What the session loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionReply {
    /// Print this (possibly empty) text and read the next line.
    Text(String),
    Quit,
}

pub struct Session {
    engine: WorkflowEngine,
    authorization: Arc<dyn AuthorizationPort>,
}

impl Session {
    pub fn new(engine: WorkflowEngine, authorization: Arc<dyn AuthorizationPort>) -> Self {
        Self {
            engine,
            authorization,
        }
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    /// Read lines from stdin until `quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line).await {
                SessionReply::Text(text) => {
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
                SessionReply::Quit => break,
            }
        }
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> SessionReply {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        let head = fields[0];
        if head.is_empty() {
            return SessionReply::Text(String::new());
        }

        match head {
            "quit" | "exit" => return SessionReply::Quit,
            "help" => return SessionReply::Text(HELP.to_string()),
            "counter" => return self.show_counter(&fields[1..]).await,
            "show" => return self.show_record(&fields[1..]).await,
            _ => {}
        }

        match parse_action(head) {
            ActionParse::Unknown { attempted } => {
                debug!("Ignoring unrecognized action '{}'", attempted);
                SessionReply::Text(format!("unrecognized action: {}", attempted))
            }
            ActionParse::Action(action) => self.handle_action(action, &fields[1..]).await,
        }
    }

    async fn handle_action(&self, action: Action, args: &[&str]) -> SessionReply {
        match action {
            Action::StartReprimand => self.issue_reprimand(args).await,
            Action::StartRemediation => self.submit_remediation(args).await,
            Action::StartAppeal => self.submit_appeal(args).await,
            Action::Decide {
                kind,
                outcome,
                handle,
            } => self.decide(kind, outcome, handle, args).await,
        }
    }

    async fn issue_reprimand(&self, args: &[&str]) -> SessionReply {
        let [issuer, subject, article, method, rest @ ..] = args else {
            return usage("issue_reprimand|<issuer>|<subject>|<article>|<method>[|evidence]");
        };
        let request = IssueReprimand {
            subject: UserId::from(*subject),
            issuer: UserId::from(*issuer),
            charter_article: article.to_string(),
            remediation_method: method.to_string(),
            evidence: rest.first().map(|e| e.to_string()),
        };
        match self.engine.issue_reprimand(request).await {
            Ok(record) => SessionReply::Text(format!(
                "reprimand {} filed against {} ({})",
                record.handle(),
                record.subject,
                record.status()
            )),
            Err(e) => SessionReply::Text(format!("error: {}", e)),
        }
    }

    async fn submit_remediation(&self, args: &[&str]) -> SessionReply {
        let [submitter, reprimand_ref, proof] = args else {
            return usage("remediate|<submitter>|<reprimand link>|<proof>");
        };
        let request = SubmitRemediation {
            submitter: UserId::from(*submitter),
            reprimand_ref: reprimand_ref.to_string(),
            proof: proof.to_string(),
        };
        match self.engine.submit_remediation(request).await {
            Ok(SubmissionOutcome::Accepted(record)) => SessionReply::Text(format!(
                "remediation {} filed by {} ({})",
                record.handle(),
                record.submitter,
                record.status()
            )),
            // Ineligible submissions get no feedback.
            Ok(SubmissionOutcome::Refused) => SessionReply::Text(String::new()),
            Err(e) => SessionReply::Text(format!("error: {}", e)),
        }
    }

    async fn submit_appeal(&self, args: &[&str]) -> SessionReply {
        let [submitter, reprimand_ref, reason, proof] = args else {
            return usage("appeal|<submitter>|<reprimand link>|<reason>|<proof>");
        };
        let request = SubmitAppeal {
            submitter: UserId::from(*submitter),
            reprimand_ref: reprimand_ref.to_string(),
            reason: reason.to_string(),
            proof: proof.to_string(),
        };
        match self.engine.submit_appeal(request).await {
            Ok(SubmissionOutcome::Accepted(record)) => SessionReply::Text(format!(
                "appeal {} filed by {} ({})",
                record.handle(),
                record.submitter,
                record.status()
            )),
            Ok(SubmissionOutcome::Refused) => SessionReply::Text(String::new()),
            Err(e) => SessionReply::Text(format!("error: {}", e)),
        }
    }

    async fn decide(
        &self,
        kind: WorkflowKind,
        outcome: DecisionOutcome,
        handle: RecordHandle,
        args: &[&str],
    ) -> SessionReply {
        let (moderator, reason) = match (outcome, args) {
            (DecisionOutcome::Approve, [moderator]) => (UserId::from(*moderator), None),
            (DecisionOutcome::Reject, [moderator, reason]) => {
                (UserId::from(*moderator), Some(reason.to_string()))
            }
            (DecisionOutcome::Approve, _) => {
                return usage("approve_<kind>:<handle>|<moderator>");
            }
            (DecisionOutcome::Reject, _) => {
                return usage("reject_<kind>:<handle>|<moderator>|<reason>");
            }
        };

        if !self.authorization.is_authorized_moderator(&moderator).await {
            return SessionReply::Text(format!(
                "{} is not allowed to decide records",
                moderator
            ));
        }

        let result = match kind {
            WorkflowKind::Reprimand => self
                .engine
                .decide_reprimand(handle, outcome, moderator, reason)
                .await
                .map(|r| r.status()),
            WorkflowKind::Remediation => self
                .engine
                .decide_remediation(handle, outcome, moderator, reason)
                .await
                .map(|r| r.status()),
            WorkflowKind::Appeal => self
                .engine
                .decide_appeal(handle, outcome, moderator, reason)
                .await
                .map(|r| r.status()),
        };
        match result {
            Ok(status) => SessionReply::Text(format!("{} {} is now {}", kind, handle.short(), status)),
            Err(e) => SessionReply::Text(format!("error: {}", e)),
        }
    }

    async fn show_counter(&self, args: &[&str]) -> SessionReply {
        let [user] = args else {
            return usage("counter|<user>");
        };
        let user = UserId::from(*user);
        let count = self.engine.counter(&user).await;
        SessionReply::Text(format!("{}: {}", user, count))
    }

    async fn show_record(&self, args: &[&str]) -> SessionReply {
        let [kind, handle] = args else {
            return usage("show|<kind>|<handle>");
        };
        let kind = match *kind {
            "reprimand" => WorkflowKind::Reprimand,
            "remediation" => WorkflowKind::Remediation,
            "appeal" => WorkflowKind::Appeal,
            other => return SessionReply::Text(format!("unknown record kind: {}", other)),
        };
        let handle: RecordHandle = match handle.parse() {
            Ok(handle) => handle,
            Err(_) => return SessionReply::Text(format!("malformed handle: {}", handle)),
        };
        match self.engine.snapshot(kind, handle).await {
            Some(snapshot) => SessionReply::Text(render_snapshot(&snapshot)),
            None => SessionReply::Text(format!("no {} record {}", kind, handle.short())),
        }
    }
}

fn usage(expected: &str) -> SessionReply {
    SessionReply::Text(format!("expected: {}", expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleNotification, ConsolePresentation, EnvAuthorization};
    use gavel_core::{CounterStore, PortSet};

    fn session() -> Session {
        let ports = PortSet {
            presentation: Arc::new(ConsolePresentation::new()),
            notification: Arc::new(ConsoleNotification),
        };
        let engine = WorkflowEngine::new(CounterStore::in_memory(), ports);
        let authorization = Arc::new(EnvAuthorization::new([UserId::from("mod-1")]));
        Session::new(engine, authorization)
    }

    fn reply_text(reply: SessionReply) -> String {
        match reply {
            SessionReply::Text(text) => text,
            SessionReply::Quit => panic!("unexpected quit"),
        }
    }

    /// Pull the record handle out of a "filed" reply.
    fn extract_handle(reply: &str) -> String {
        reply
            .split_whitespace()
            .nth(1)
            .expect("reply should contain a handle")
            .to_string()
    }

    #[tokio::test]
    async fn test_issue_and_approve_via_lines() {
        let s = session();

        let reply = reply_text(
            s.handle_line("issue_reprimand|mod-1|u1|Article 2|Apology")
                .await,
        );
        assert!(reply.contains("against u1"));
        let handle = extract_handle(&reply);

        let reply = reply_text(
            s.handle_line(&format!("approve_reprimand:{}|mod-1", handle))
                .await,
        );
        assert!(reply.contains("approved"));

        let reply = reply_text(s.handle_line("counter|u1").await);
        assert_eq!(reply, "u1: 1/3");
    }

    #[tokio::test]
    async fn test_unauthorized_moderator_cannot_decide() {
        let s = session();
        let reply = reply_text(
            s.handle_line("issue_reprimand|mod-1|u1|Article 2|Apology")
                .await,
        );
        let handle = extract_handle(&reply);

        let reply = reply_text(
            s.handle_line(&format!("approve_reprimand:{}|u1", handle))
                .await,
        );
        assert!(reply.contains("not allowed"));

        // The record is still pending.
        let reply = reply_text(
            s.handle_line(&format!("show|reprimand|{}", handle)).await,
        );
        assert!(reply.contains("pending approval"));
    }

    #[tokio::test]
    async fn test_refused_submission_is_silent() {
        let s = session();
        let reply = reply_text(s.handle_line("remediate|u1|link|proof").await);
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_reject_requires_reason_field() {
        let s = session();
        let reply = reply_text(
            s.handle_line("issue_reprimand|mod-1|u1|Article 2|Apology")
                .await,
        );
        let handle = extract_handle(&reply);

        let reply = reply_text(
            s.handle_line(&format!("reject_reprimand:{}|mod-1", handle))
                .await,
        );
        assert!(reply.starts_with("expected:"));

        let reply = reply_text(
            s.handle_line(&format!("reject_reprimand:{}|mod-1|no evidence", handle))
                .await,
        );
        assert!(reply.contains("rejected"));
    }

    #[tokio::test]
    async fn test_unrecognized_action_is_reported() {
        let s = session();
        let reply = reply_text(s.handle_line("escalate|u1").await);
        assert_eq!(reply, "unrecognized action: escalate");
    }

    #[tokio::test]
    async fn test_quit() {
        let s = session();
        assert_eq!(s.handle_line("quit").await, SessionReply::Quit);
    }
}
