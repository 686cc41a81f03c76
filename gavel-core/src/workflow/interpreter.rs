//! Effect interpreter that executes effects against the ports.
//!
//! The interpreter is the boundary between the engine and the platform.
//! Effects run sequentially and best-effort: a failed effect is logged and
//! the rest still run. Nothing here can roll back a state transition.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::effect::{Effect, LogLevel};
use crate::ports::{NotificationPort, PresentationPort};
use crate::workflow::record::ExternalRef;

/// The ports the interpreter executes against.
#[derive(Clone)]
pub struct PortSet {
    pub presentation: Arc<dyn PresentationPort>,
    pub notification: Arc<dyn NotificationPort>,
}

/// Results the engine may need from executed effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    /// A record was posted; the platform assigned it this ref.
    RecordPublished { external: ExternalRef },
    /// An approved-reprimand notice was posted. Consumed by the engine to
    /// key the remediation grant.
    NoticePublished { external: ExternalRef },
}

/// Execute a list of effects and collect their outcomes.
pub async fn execute_effects(ports: &PortSet, effects: Vec<Effect>) -> Vec<EffectOutcome> {
    let mut outcomes = Vec::new();

    for effect in effects {
        match execute_effect(ports, effect).await {
            Ok(Some(outcome)) => outcomes.push(outcome),
            Ok(None) => {}
            Err(e) => {
                error!("Effect execution failed: {:#}", e);
            }
        }
    }

    outcomes
}

async fn execute_effect(
    ports: &PortSet,
    effect: Effect,
) -> anyhow::Result<Option<EffectOutcome>> {
    match effect {
        Effect::PublishRecord { snapshot } => {
            let external = ports.presentation.publish_record(&snapshot).await?;
            info!(
                "Published {} record {} as {}",
                snapshot.kind(),
                snapshot.handle().short(),
                external
            );
            Ok(Some(EffectOutcome::RecordPublished { external }))
        }

        Effect::UpdateRecordDisplay { handle, snapshot } => {
            ports
                .presentation
                .update_record_display(handle, &snapshot)
                .await?;
            Ok(None)
        }

        Effect::PublishApprovedNotice { record, level } => {
            let external = ports
                .presentation
                .publish_approved_notice(&record, level)
                .await?;
            info!(
                "Announced approved reprimand {} ({}) as {}",
                record.handle().short(),
                level,
                external
            );
            Ok(Some(EffectOutcome::NoticePublished { external }))
        }

        Effect::NotifyUser { user, notice } => {
            ports
                .notification
                .notify_user(&user, notice.subject(), &notice.body())
                .await?;
            Ok(None)
        }

        Effect::Log { level, message } => {
            match level {
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warn => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            }
            Ok(None)
        }
    }
}
