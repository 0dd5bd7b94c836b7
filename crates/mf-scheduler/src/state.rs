//! Persisted block-list of rate-limited models (`limits.json`).
//!
//! Reads never fail: a missing or corrupt file is an empty state. Writes go
//! through a temp file in the same directory and an atomic rename, so a
//! concurrent reader sees either the old or the new file, never a torn one.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mf_core::provider_of;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntry {
    /// Epoch seconds of the error that caused the block.
    pub last_hit_at: i64,
    /// Epoch seconds at which the model becomes selectable again.
    pub next_available_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BlockEntry {
    /// Expired entries are kept on disk but no longer block selection.
    pub fn is_expired(&self, now: i64) -> bool {
        self.next_available_at <= now
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitState {
    #[serde(default)]
    pub limited: BTreeMap<String, BlockEntry>,
}

impl LimitState {
    pub fn is_blocked(&self, model: &str, now: i64) -> bool {
        self.limited
            .get(model)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Seconds until `model` is selectable again; `None` when not blocked.
    pub fn remaining_secs(&self, model: &str, now: i64) -> Option<u64> {
        self.limited
            .get(model)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| (entry.next_available_at - now) as u64)
    }

    /// Unexpired entries, ordered by model id.
    pub fn active(&self, now: i64) -> impl Iterator<Item = (&String, &BlockEntry)> {
        self.limited
            .iter()
            .filter(move |(_, entry)| !entry.is_expired(now))
    }

    /// Block `model` for `cooldown_secs` from `hit_at`, replacing any entry.
    pub fn mark_limited(
        &mut self,
        model: &str,
        hit_at: i64,
        cooldown_secs: u64,
        reason: Option<String>,
    ) {
        let cooldown = i64::try_from(cooldown_secs).unwrap_or(i64::MAX);
        self.limited.insert(
            model.to_string(),
            BlockEntry {
                last_hit_at: hit_at,
                next_available_at: hit_at.saturating_add(cooldown),
                reason,
            },
        );
    }

    /// Block `failed_model` and every model in `order` that shares its
    /// provider prefix. Siblings get a synthesized reason naming the
    /// failed model. Returns the blocked ids, `failed_model` first.
    pub fn block_provider<S: AsRef<str>>(
        &mut self,
        order: &[S],
        failed_model: &str,
        hit_at: i64,
        cooldown_secs: u64,
        reason: Option<String>,
    ) -> Vec<String> {
        let provider = provider_of(failed_model);
        let sibling_reason = format!(
            "provider {provider} blocked via {failed_model}: {}",
            reason.as_deref().unwrap_or("limit reached")
        );

        self.mark_limited(failed_model, hit_at, cooldown_secs, reason);
        let mut blocked = vec![failed_model.to_string()];

        for model in order.iter().map(AsRef::as_ref) {
            if model == failed_model || provider_of(model) != provider {
                continue;
            }
            if blocked.iter().any(|b| b == model) {
                continue;
            }
            self.mark_limited(model, hit_at, cooldown_secs, Some(sibling_reason.clone()));
            blocked.push(model.to_string());
        }
        blocked
    }

    /// Remove the entry for `model`. Returns whether one existed.
    pub fn clear(&mut self, model: &str) -> bool {
        self.limited.remove(model).is_some()
    }
}

/// Load state from `path`; empty state when absent, unreadable or invalid.
pub fn load_state(path: &Path) -> LimitState {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => return LimitState::default(),
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read limit state; treating as empty");
            return LimitState::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(error) => {
            warn!(path = %path.display(), %error, "invalid limit state JSON; treating as empty");
            LimitState::default()
        }
    }
}

/// Write state atomically, creating parent directories as needed.
pub fn save_state(path: &Path, state: &LimitState) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;

    let mut content =
        serde_json::to_string_pretty(state).context("Failed to serialize limit state")?;
    content.push('\n');

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp state file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write temp state file")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to sync temp state file")?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

    info!(path = %path.display(), entries = state.limited.len(), "saved limit state");
    Ok(())
}

/// Delete the state file. Returns `false` when it did not exist.
pub fn reset_state(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(error) => {
            Err(error).with_context(|| format!("Failed to delete state file: {}", path.display()))
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
