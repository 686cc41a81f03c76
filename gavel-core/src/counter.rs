//! Persistent per-user escalation counters.
//!
//! The backing file is a flat JSON map of user id to count, rewritten in
//! full on every mutation so it stays human-inspectable. Memory is the
//! fast path and stays authoritative: a failed durable write is logged and
//! the store carries on, to be flushed again on the next mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::error;

use crate::workflow::record::{EscalationCount, UserId};

/// Default file name for the counter map, under the state directory.
pub const COUNTS_FILE: &str = "escalation_counts.json";

/// Store of per-user escalation counts with write-through JSON persistence.
pub struct CounterStore {
    counts: RwLock<HashMap<UserId, EscalationCount>>,
    /// None for a memory-only store (tests).
    path: Option<PathBuf>,
}

impl CounterStore {
    /// Open a store backed by the given file, loading any persisted counts.
    ///
    /// A missing or blank file yields an empty store. A corrupt file (bad
    /// JSON, or a count outside [0, 3]) is logged and treated as empty
    /// rather than refusing to start.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counts = match load_counts(&path) {
            Ok(counts) => counts,
            Err(e) => {
                error!("Failed to load escalation counts from {:?}: {:#}", path, e);
                HashMap::new()
            }
        };
        Self {
            counts: RwLock::new(counts),
            path: Some(path),
        }
    }

    /// Open a store backed by `escalation_counts.json` under a directory.
    pub fn open_in_dir(dir: &Path) -> Self {
        Self::open(dir.join(COUNTS_FILE))
    }

    /// A store with no durable backing (for tests).
    pub fn in_memory() -> Self {
        Self {
            counts: RwLock::new(HashMap::new()),
            path: None,
        }
    }

    /// The persisted count for a user, zero if unseen.
    pub async fn get(&self, user: &UserId) -> EscalationCount {
        let counts = self.counts.read().await;
        counts.get(user).copied().unwrap_or_default()
    }

    /// Set a user's count and rewrite the backing file.
    ///
    /// The in-memory value is updated first; a failed durable write is
    /// logged and does not undo it.
    pub async fn set(&self, user: &UserId, value: EscalationCount) {
        let snapshot = {
            let mut counts = self.counts.write().await;
            counts.insert(user.clone(), value);
            counts.clone()
        };
        self.persist(snapshot).await;
    }

    async fn persist(&self, snapshot: HashMap<UserId, EscalationCount>) {
        let Some(path) = self.path.clone() else {
            return;
        };

        // The file write is blocking I/O; keep it off the runtime threads.
        let result =
            tokio::task::spawn_blocking(move || write_counts(&path, &snapshot)).await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Failed to persist escalation counts: {:#}", e);
            }
            Err(e) => {
                error!("spawn_blocking panicked while persisting counts: {}", e);
            }
        }
    }
}

fn load_counts(path: &Path) -> Result<HashMap<UserId, EscalationCount>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading counter file {:?}", path))?;
    if raw.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(&raw).with_context(|| format!("parsing counter file {:?}", path))
}

fn write_counts(path: &Path, counts: &HashMap<UserId, EscalationCount>) -> Result<()> {
    let body = serde_json::to_string_pretty(counts).context("serializing counter map")?;
    std::fs::write(path, body).with_context(|| format!("writing counter file {:?}", path))
}
