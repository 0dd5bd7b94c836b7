use std::path::PathBuf;

use anyhow::Result;
use mf_config::FailoverConfig;
use mf_config::paths::expand_home_path;
use mf_core::OutputFormat;
use tracing::debug;

use crate::cli::Cli;

/// Loaded config plus the effective file paths for one invocation.
pub(crate) struct Context {
    pub config: FailoverConfig,
    pub state_path: PathBuf,
    pub metrics_path: PathBuf,
    pub format: OutputFormat,
}

impl Context {
    /// CLI flags win over config keys, config keys over XDG defaults.
    pub(crate) fn resolve(cli: &Cli) -> Result<Self> {
        let config = FailoverConfig::load(cli.config.as_deref())?;
        let state_path = cli
            .state
            .as_deref()
            .map(expand_home_path)
            .unwrap_or_else(|| config.state_path());
        let metrics_path = cli
            .metrics
            .as_deref()
            .map(expand_home_path)
            .unwrap_or_else(|| config.metrics_path());

        debug!(
            state = %state_path.display(),
            metrics = %metrics_path.display(),
            models = config.models.len(),
            "resolved failover context"
        );

        Ok(Self {
            config,
            state_path,
            metrics_path,
            format: cli.format,
        })
    }
}
