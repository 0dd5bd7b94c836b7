//! `--since` / `--until` parsing and human-readable time rendering.

use chrono::{DateTime, NaiveDate, Utc};
use mf_core::AppError;

use crate::cli::RangeArgs;
use mf_metrics::TimeRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Bound {
    Start,
    End,
}

/// Parse epoch seconds, RFC 3339, or `YYYY-MM-DD` (UTC).
///
/// A bare date is the first second of that day for [`Bound::Start`] and the
/// last second for [`Bound::End`], so `--until 2026-03-01` includes the day.
pub(crate) fn parse_timestamp(text: &str, bound: Bound) -> Result<i64, AppError> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.timestamp());
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidTimestamp(text.to_string()))?;
    let time = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_opt(23, 59, 59),
    };
    time.map(|t| t.and_utc().timestamp())
        .ok_or_else(|| AppError::InvalidTimestamp(text.to_string()))
}

impl RangeArgs {
    pub(crate) fn to_range(&self) -> Result<TimeRange, AppError> {
        let since = self
            .since
            .as_deref()
            .map(|s| parse_timestamp(s, Bound::Start))
            .transpose()?;
        let until = self
            .until
            .as_deref()
            .map(|s| parse_timestamp(s, Bound::End))
            .transpose()?;
        Ok(TimeRange::new(since, until))
    }
}

pub(crate) fn format_ts(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// `3h 5m`, `4m 30s`, `45s`.
pub(crate) fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m, s) {
        (0, 0, s) => format!("{s}s"),
        (0, m, 0) => format!("{m}m"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, 0, _) => format!("{h}h"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}
