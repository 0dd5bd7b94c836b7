//! Append-only JSON Lines event log.
//!
//! Writers append whole lines with a single `write_all`; readers skip any
//! line that fails to parse, so a torn or corrupt line never hides its
//! neighbours and no lock is needed.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::event::MetricEvent;

#[derive(Debug, Clone)]
pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, event: &MetricEvent) -> Result<()> {
        self.record_all(std::slice::from_ref(event))
    }

    /// Append several events in one write.
    pub fn record_all(&self, events: &[MetricEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.ensure_parent_dir()?;

        let mut buf = Vec::new();
        for event in events {
            serde_json::to_writer(&mut buf, event).context("failed to serialize metric event")?;
            buf.push(b'\n');
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("failed to open metrics log: {}", self.path.display()))?;
        file.write_all(&buf)
            .with_context(|| format!("failed to append to metrics log: {}", self.path.display()))?;
        file.flush()
            .context("failed to flush metrics log append")?;
        Ok(())
    }

    /// Read every parseable event in append order.
    ///
    /// Missing file, unreadable file and corrupt lines all degrade to
    /// fewer (or zero) events, never to an error.
    pub fn load(&self) -> Vec<MetricEvent> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to open metrics log");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        for (idx, line_result) in BufReader::new(file).split(b'\n').enumerate() {
            let line = match line_result {
                Ok(line) => line,
                Err(error) => {
                    warn!(
                        path = %self.path.display(),
                        line_number = idx + 1,
                        %error,
                        "stopping metrics log read after I/O error"
                    );
                    break;
                }
            };

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice::<MetricEvent>(&line) {
                Ok(event) => events.push(event),
                Err(error) => {
                    warn!(
                        path = %self.path.display(),
                        line_number = idx + 1,
                        %error,
                        "skipping corrupt metrics jsonl line"
                    );
                }
            }
        }

        events
    }

    /// Delete the log. Returns `false` when there was nothing to delete.
    pub fn reset(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error)
                .with_context(|| format!("failed to delete metrics log: {}", self.path.display())),
        }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create metrics dir: {}", parent.display())
            })?;
        }
        Ok(())
    }
}

pub fn record_event(path: &Path, event: &MetricEvent) -> Result<()> {
    MetricsLog::new(path).record(event)
}

pub fn load_events(path: &Path) -> Vec<MetricEvent> {
    MetricsLog::new(path).load()
}

pub fn reset_metrics(path: &Path) -> Result<bool> {
    MetricsLog::new(path).reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ErrorEvent, FailoverEvent};
    use tempfile::tempdir;

    fn rate_limit(ts: i64, model: &str) -> MetricEvent {
        MetricEvent::RateLimit(ErrorEvent {
            ts,
            model: model.to_string(),
            provider: mf_core::provider_of(model).to_string(),
            reason: Some("429".to_string()),
            cooldown_sec: Some(3600),
            trigger: Some("agent_end".to_string()),
            session: Some("sess-1".to_string()),
        })
    }

    #[test]
    fn test_record_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory").join("metrics.jsonl");

        let first = rate_limit(1000, "a/x");
        let second = MetricEvent::Failover(FailoverEvent {
            ts: 1001,
            model: "a/x".to_string(),
            provider: "a".to_string(),
            to: "b/y".to_string(),
            reason: None,
            trigger: None,
            session: None,
        });
        record_event(&path, &first).unwrap();
        record_event(&path, &second).unwrap();

        let loaded = load_events(&path);
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(load_events(&dir.path().join("absent.jsonl")).is_empty());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        fs::write(&path, "").unwrap();
        assert!(load_events(&path).is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let log = MetricsLog::new(&path);

        log.record(&rate_limit(1, "a/x")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(b"{\"type\":\"rate_limit\",\"ts\":\n").unwrap();
            file.write_all(b"not json at all\n").unwrap();
            file.write_all(&[0xff, 0xfe, b'\n']).unwrap();
            file.write_all(b"\n   \n").unwrap();
        }
        log.record(&rate_limit(2, "b/y")).unwrap();

        let loaded = log.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].ts(), 1);
        assert_eq!(loaded[1].ts(), 2);
    }

    #[test]
    fn test_record_all_appends_every_event() {
        let dir = tempdir().unwrap();
        let log = MetricsLog::new(dir.path().join("metrics.jsonl"));
        log.record_all(&[rate_limit(1, "a/x"), rate_limit(2, "a/x")])
            .unwrap();
        log.record_all(&[]).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_reset_reports_whether_file_existed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        assert!(!reset_metrics(&path).unwrap());

        record_event(&path, &rate_limit(1, "a/x")).unwrap();
        assert!(reset_metrics(&path).unwrap());
        assert!(!path.exists());
        assert!(!reset_metrics(&path).unwrap());
    }
}
