use super::*;
use tempfile::tempdir;

#[test]
fn test_load_explicit_missing_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let err = FailoverConfig::load(Some(&path)).unwrap_err();
    let app_err = err.downcast_ref::<AppError>().unwrap();
    assert!(matches!(app_err, AppError::ConfigNotFound(p) if p == &path));
}

#[test]
fn test_load_full_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
models = ["anthropic/claude-opus-4", "openai/gpt-5", "google-gemini-cli/gemini-2.5-pro"]
default_cooldown_minutes = 30
provider_wide_blocking = true
state_path = "/var/tmp/limits.json"
metrics_path = "/var/tmp/metrics.jsonl"
max_recent_cooldowns = 10
"#,
    )
    .unwrap();

    let config = FailoverConfig::load(Some(&path)).unwrap();
    assert_eq!(config.models.len(), 3);
    assert_eq!(config.models[0], "anthropic/claude-opus-4");
    assert_eq!(config.default_cooldown_minutes, 30);
    assert!(config.provider_wide_blocking);
    assert_eq!(config.state_path(), PathBuf::from("/var/tmp/limits.json"));
    assert_eq!(config.metrics_path(), PathBuf::from("/var/tmp/metrics.jsonl"));
    assert_eq!(config.max_recent_cooldowns, 10);
}

#[test]
fn test_missing_keys_use_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "models = [\"a/x\"]\n").unwrap();

    let config = FailoverConfig::load(Some(&path)).unwrap();
    assert_eq!(config.models, vec!["a/x".to_string()]);
    assert_eq!(config.default_cooldown_minutes, DEFAULT_COOLDOWN_MINUTES);
    assert_eq!(config.max_recent_cooldowns, DEFAULT_MAX_RECENT_COOLDOWNS);
    assert!(!config.provider_wide_blocking);
    assert_eq!(config.state_path(), paths::default_state_path());
    assert_eq!(config.metrics_path(), paths::default_metrics_path());
}

#[test]
fn test_invalid_toml_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "models = [unterminated").unwrap();

    let err = FailoverConfig::load(Some(&path)).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn test_tilde_paths_are_expanded() {
    let config = FailoverConfig {
        state_path: Some("~/mfo/limits.json".to_string()),
        ..FailoverConfig::default()
    };
    let path = config.state_path();
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with("mfo/limits.json"));
}

#[test]
fn test_contains_model() {
    let config = FailoverConfig {
        models: vec!["a/x".to_string(), "b/y".to_string()],
        ..FailoverConfig::default()
    };
    assert!(config.contains_model("b/y"));
    assert!(!config.contains_model("c/z"));
}

#[test]
fn test_duplicate_models_still_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "models = [\"a/x\", \"a/x\"]\n").unwrap();

    let config = FailoverConfig::load(Some(&path)).unwrap();
    assert_eq!(config.models.len(), 2);
}
