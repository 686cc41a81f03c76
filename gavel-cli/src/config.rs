use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use gavel_core::UserId;

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the escalation counts file.
    pub state_dir: PathBuf,
    /// Users allowed to approve and reject records.
    pub moderator_ids: Vec<UserId>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let state_dir = std::env::var("GAVEL_STATE_DIR").unwrap_or_else(|_| ".".to_string());

        let raw_moderators = std::env::var("GAVEL_MODERATOR_IDS")
            .context("GAVEL_MODERATOR_IDS environment variable not set")?;
        let moderator_ids = parse_moderator_ids(&raw_moderators)?;

        Ok(Self {
            state_dir: PathBuf::from(state_dir),
            moderator_ids,
        })
    }
}

/// Parse a comma-separated moderator list, ignoring blank entries.
fn parse_moderator_ids(raw: &str) -> Result<Vec<UserId>> {
    let ids: Vec<UserId> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(UserId::from)
        .collect();
    if ids.is_empty() {
        bail!("GAVEL_MODERATOR_IDS must name at least one moderator");
    }
    Ok(ids)
}
