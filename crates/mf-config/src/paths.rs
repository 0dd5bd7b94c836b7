use std::path::{Path, PathBuf};

/// XDG app name used for config and state directories.
pub const APP_NAME: &str = "model-failover";
/// File name of the block-list state file inside the state directory.
pub const STATE_FILE_NAME: &str = "limits.json";
/// File name of the metrics event log inside the memory directory.
pub const METRICS_FILE_NAME: &str = "failover-metrics.jsonl";
/// File name of the user config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// User config directory (`~/.config/model-failover` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// State directory (`~/.local/state/model-failover` on Linux).
///
/// `state_dir()` is Linux-only in `directories`; other platforms use the
/// local data dir.
pub fn state_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| {
        dirs.state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .to_path_buf()
    })
}

pub fn state_dir_fallback() -> PathBuf {
    std::env::temp_dir().join(format!("{APP_NAME}-state"))
}

fn state_root() -> PathBuf {
    state_dir().unwrap_or_else(state_dir_fallback)
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

pub fn default_state_path() -> PathBuf {
    state_root().join(STATE_FILE_NAME)
}

/// Metrics log lives under the workspace memory directory.
pub fn default_metrics_path() -> PathBuf {
    state_root().join("memory").join(METRICS_FILE_NAME)
}

/// Expand a leading `~` to the home directory.
///
/// Paths without a tilde prefix are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Same as [`expand_home`] for an already-typed path. Non-UTF-8 paths are
/// returned untouched.
pub fn expand_home_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => expand_home(text),
        None => path.to_path_buf(),
    }
}
