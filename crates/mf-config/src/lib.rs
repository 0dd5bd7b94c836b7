//! Failover configuration loading (`config.toml`) and XDG path resolution.

pub mod config;
pub mod paths;

pub use config::{DEFAULT_COOLDOWN_MINUTES, DEFAULT_MAX_RECENT_COOLDOWNS, FailoverConfig};
