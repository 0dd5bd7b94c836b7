// End-to-end tests for the mfo binary.
// Every test runs against its own temp config, state and metrics files.

use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    config: PathBuf,
    state: PathBuf,
    metrics: PathBuf,
}

impl Fixture {
    fn new(models: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config.toml");
        let list = models
            .iter()
            .map(|m| format!("\"{m}\""))
            .collect::<Vec<_>>()
            .join(", ");
        std::fs::write(
            &config,
            format!("models = [{list}]\ndefault_cooldown_minutes = 60\n"),
        )
        .expect("write config");
        Self {
            state: dir.path().join("state").join("limits.json"),
            metrics: dir.path().join("memory").join("failover-metrics.jsonl"),
            config,
            _dir: dir,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_mfo"))
            .args(args)
            .arg("--config")
            .arg(&self.config)
            .arg("--state")
            .arg(&self.state)
            .arg("--metrics")
            .arg(&self.metrics)
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run mfo")
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = args.to_vec();
        full.extend(["--format", "json"]);
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "mfo {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[test]
fn cli_help_displays_correctly() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_mfo"))
        .arg("--help")
        .output()
        .expect("failed to run mfo --help");

    assert!(output.status.success());
    let stdout = stdout(&output);
    for command in ["status", "select", "classify", "report", "clear", "metrics"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn select_prints_first_model_when_nothing_blocked() {
    let fx = Fixture::new(&["a/x", "b/y", "c/z"]);
    let output = fx.run(&["select"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a/x");
}

#[test]
fn report_blocks_model_and_logs_failover() {
    let fx = Fixture::new(&["a/x", "b/y", "c/z"]);

    let plan = fx.json(&[
        "report",
        "--model",
        "a/x",
        "--error",
        "429 Too Many Requests",
        "--session",
        "s-1",
    ]);
    assert_eq!(plan["kind"], "rate_limit");
    assert_eq!(plan["cooldownSec"], 3600);
    assert_eq!(plan["nextModel"], "b/y");
    assert_eq!(plan["events"].as_array().map(Vec::len), Some(2));

    assert!(fx.state.exists());
    assert_eq!(line_count(&fx.metrics), 2);

    let output = fx.run(&["select"]);
    assert_eq!(stdout(&output).trim(), "b/y");

    let history = fx.json(&["metrics", "model", "a/x"]);
    assert_eq!(history["failedToModels"]["b/y"], 1);
    assert_eq!(history["stats"]["totalErrors"], 1);

    let history = fx.json(&["metrics", "model", "b/y"]);
    assert_eq!(history["receivedFromModels"]["a/x"], 1);
    assert_eq!(history["stats"]["totalErrors"], 0);

    let summary = fx.json(&["metrics", "summary"]);
    assert_eq!(summary["totalEvents"], 2);
    assert_eq!(summary["rateLimits"], 1);
    assert_eq!(summary["failovers"], 1);
    assert_eq!(summary["byModel"]["a/x"]["timesFailedFrom"], 1);
    assert_eq!(summary["byModel"]["b/y"]["timesFailedTo"], 1);
}

#[test]
fn unknown_error_changes_nothing() {
    let fx = Fixture::new(&["a/x", "b/y"]);
    let plan = fx.json(&["report", "--model", "a/x", "--error", "segmentation fault"]);
    assert_eq!(plan["kind"], "unknown");
    assert_eq!(plan["nextModel"], "a/x");
    assert!(!fx.state.exists());
    assert!(!fx.metrics.exists());
}

#[test]
fn clear_unblocks_model() {
    let fx = Fixture::new(&["a/x", "b/y"]);
    fx.json(&["report", "--model", "a/x", "--error", "rate limit exceeded"]);

    let cleared = fx.json(&["clear", "a/x"]);
    assert_eq!(cleared["removed"], true);
    assert_eq!(stdout(&fx.run(&["select"])).trim(), "a/x");

    let cleared = fx.json(&["clear"]);
    assert_eq!(cleared["removed"], true);
    assert!(!fx.state.exists());
}

#[test]
fn status_lists_blocked_models() {
    let fx = Fixture::new(&["a/x", "b/y"]);
    fx.json(&["report", "--model", "a/x", "--error", "503 service unavailable"]);

    let status = fx.json(&["status"]);
    assert_eq!(status["selected"], "b/y");
    assert_eq!(status["models"][0]["model"], "a/x");
    assert_eq!(status["models"][0]["available"], false);
    assert_eq!(status["models"][1]["available"], true);

    let output = fx.run(&["status"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("a/x blocked for"));
}

#[test]
fn classify_reports_wait_hint() {
    let fx = Fixture::new(&["a/x"]);
    let result = fx.json(&["classify", "Rate limit reached. Try again in 4m30s"]);
    assert_eq!(result["kind"], "rate_limit");
    assert_eq!(result["waitHintSec"], 270);
    assert_eq!(result["cooldownSec"], 270);

    let result = fx.json(&["classify", "401 Unauthorized"]);
    assert_eq!(result["kind"], "auth_or_scope");
    assert_eq!(result["eventType"], "auth_error");
}

#[test]
fn metrics_time_filter_and_reset() {
    let fx = Fixture::new(&["a/x", "b/y"]);
    fx.json(&["report", "--model", "a/x", "--error", "429"]);

    let summary = fx.json(&["metrics", "summary", "--until", "1000"]);
    assert_eq!(summary["totalEvents"], 0);

    let report = fx.json(&["metrics", "query", "--since", "2000-01-01"]);
    assert_eq!(report["summary"]["totalEvents"], 2);
    assert!(report["modelHistories"]["b/y"].is_object());

    let reset = fx.json(&["metrics", "reset"]);
    assert_eq!(reset["removed"], true);
    assert!(!fx.metrics.exists());
}

#[test]
fn select_without_models_fails() {
    let fx = Fixture::new(&[]);
    let output = fx.run(&["select"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No models configured"));
}

#[test]
fn report_rejects_unconfigured_model() {
    let fx = Fixture::new(&["a/x"]);
    let output = fx.run(&["report", "--model", "z/q", "--error", "429"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not in the configured failover order"));
}

#[test]
fn invalid_timestamp_is_rejected() {
    let fx = Fixture::new(&["a/x"]);
    let output = fx.run(&["metrics", "summary", "--since", "last tuesday"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid timestamp"));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_mfo"))
        .args(["select", "--config"])
        .arg(dir.path().join("nope.toml"))
        .output()
        .expect("failed to run mfo");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Config file not found"));
}
