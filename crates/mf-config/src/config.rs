use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mf_core::AppError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::paths;

pub const DEFAULT_COOLDOWN_MINUTES: u64 = 60;
pub const DEFAULT_MAX_RECENT_COOLDOWNS: usize = 50;

/// Failover configuration (`~/.config/model-failover/config.toml`).
///
/// Every key is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Model identifiers (`provider/model`) in priority order.
    pub models: Vec<String>,
    /// Cooldown applied when neither the error text nor a provider rule
    /// gives a better answer.
    pub default_cooldown_minutes: u64,
    /// Block every model sharing the failed model's provider prefix.
    pub provider_wide_blocking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_path: Option<String>,
    /// Trailing window size of `recentCooldowns` in metrics summaries.
    pub max_recent_cooldowns: usize,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            default_cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            provider_wide_blocking: false,
            state_path: None,
            metrics_path: None,
            max_recent_cooldowns: DEFAULT_MAX_RECENT_COOLDOWNS,
        }
    }
}

impl FailoverConfig {
    /// Load config from an explicit path, or the user config path.
    ///
    /// An explicit path must exist. The implicit user path falls back to
    /// defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                let path = paths::expand_home_path(path);
                if !path.exists() {
                    return Err(AppError::ConfigNotFound(path).into());
                }
                Self::load_from_path(&path)
            }
            None => match paths::default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub(crate) fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.warn_duplicate_models(&path.display().to_string());
        Ok(config)
    }

    /// State file path with `~` expanded; the XDG default when unset.
    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .as_deref()
            .map(paths::expand_home)
            .unwrap_or_else(paths::default_state_path)
    }

    /// Metrics log path with `~` expanded; the XDG default when unset.
    pub fn metrics_path(&self) -> PathBuf {
        self.metrics_path
            .as_deref()
            .map(paths::expand_home)
            .unwrap_or_else(paths::default_metrics_path)
    }

    pub fn contains_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    fn warn_duplicate_models(&self, source: &str) {
        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.as_str()) {
                warn!(
                    config = %source,
                    model = %model,
                    "duplicate model in failover order; later entry is unreachable"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
