//! Aggregate counters over the event log.

use std::collections::{BTreeMap, VecDeque};

use mf_core::provider_of;
use serde::Serialize;

use crate::event::{EventKind, MetricEvent};

/// Inclusive `[since, until]` filter over event timestamps; either bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub since: Option<i64>,
    pub until: Option<i64>,
}

impl TimeRange {
    pub fn new(since: Option<i64>, until: Option<i64>) -> Self {
        Self { since, until }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.since.is_none_or(|since| ts >= since) && self.until.is_none_or(|until| ts <= until)
    }

    pub fn filter<'a>(
        &'a self,
        events: &'a [MetricEvent],
    ) -> impl Iterator<Item = &'a MetricEvent> + 'a {
        events.iter().filter(move |event| self.contains(event.ts()))
    }
}

/// Counters for one model or one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub rate_limits: u64,
    pub auth_errors: u64,
    pub unavailable_errors: u64,
    pub times_failed_from: u64,
    pub times_failed_to: u64,
    pub total_cooldown_sec: u64,
    pub cooldown_count: u64,
    pub avg_cooldown_sec: f64,
    pub last_hit_at: Option<i64>,
}

impl ModelStats {
    fn record_error(&mut self, kind: EventKind, ts: i64, cooldown_sec: Option<u64>) {
        match kind {
            EventKind::RateLimit => self.rate_limits += 1,
            EventKind::AuthError => self.auth_errors += 1,
            EventKind::Unavailable => self.unavailable_errors += 1,
            EventKind::Failover => return,
        }
        self.last_hit_at = Some(self.last_hit_at.map_or(ts, |last| last.max(ts)));
        if let Some(secs) = cooldown_sec {
            self.total_cooldown_sec = self.total_cooldown_sec.saturating_add(secs);
            self.cooldown_count += 1;
        }
    }

    fn finalize(&mut self) {
        self.avg_cooldown_sec = average(self.total_cooldown_sec, self.cooldown_count);
    }
}

/// One cooldown in the trailing `recentCooldowns` window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownRecord {
    pub started_at: i64,
    pub duration_sec: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub model: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_events: u64,
    pub rate_limits: u64,
    pub auth_errors: u64,
    pub unavailable_errors: u64,
    pub failovers: u64,
    pub total_cooldown_sec: u64,
    pub cooldown_count: u64,
    pub avg_cooldown_sec: f64,
    pub by_model: BTreeMap<String, ModelStats>,
    pub by_provider: BTreeMap<String, ModelStats>,
    /// Trailing window of cooldowns, oldest first.
    pub recent_cooldowns: Vec<CooldownRecord>,
    /// Earliest included event timestamp (not the filter bound).
    pub since: Option<i64>,
    /// Latest included event timestamp.
    pub until: Option<i64>,
}

pub(crate) fn average(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Fold the events inside `range` into a summary.
pub fn summarize(
    events: &[MetricEvent],
    range: TimeRange,
    max_recent_cooldowns: usize,
) -> MetricsSummary {
    let mut summary = MetricsSummary::default();
    let mut recent: VecDeque<CooldownRecord> = VecDeque::new();

    for event in range.filter(events) {
        let ts = event.ts();
        summary.total_events += 1;
        summary.since = Some(summary.since.map_or(ts, |s| s.min(ts)));
        summary.until = Some(summary.until.map_or(ts, |u| u.max(ts)));

        if let Some(failover) = event.as_failover() {
            summary.failovers += 1;
            entry(&mut summary.by_model, &failover.model).times_failed_from += 1;
            entry(&mut summary.by_model, &failover.to).times_failed_to += 1;
            entry(&mut summary.by_provider, &failover.provider).times_failed_from += 1;
            entry(&mut summary.by_provider, provider_of(&failover.to)).times_failed_to += 1;
            continue;
        }

        let kind = event.kind();
        match kind {
            EventKind::RateLimit => summary.rate_limits += 1,
            EventKind::AuthError => summary.auth_errors += 1,
            EventKind::Unavailable => summary.unavailable_errors += 1,
            EventKind::Failover => {}
        }

        let cooldown = event.cooldown_sec();
        entry(&mut summary.by_model, event.model()).record_error(kind, ts, cooldown);
        entry(&mut summary.by_provider, event.provider()).record_error(kind, ts, cooldown);

        if let Some(secs) = cooldown {
            summary.total_cooldown_sec = summary.total_cooldown_sec.saturating_add(secs);
            summary.cooldown_count += 1;
            if max_recent_cooldowns > 0 {
                if recent.len() == max_recent_cooldowns {
                    recent.pop_front();
                }
                recent.push_back(CooldownRecord {
                    started_at: ts,
                    duration_sec: secs,
                    kind,
                    model: event.model().to_string(),
                    reason: event.reason().map(str::to_string),
                });
            }
        }
    }

    summary.avg_cooldown_sec = average(summary.total_cooldown_sec, summary.cooldown_count);
    summary
        .by_model
        .values_mut()
        .chain(summary.by_provider.values_mut())
        .for_each(ModelStats::finalize);
    summary.recent_cooldowns = recent.into();
    summary
}

fn entry<'a>(map: &'a mut BTreeMap<String, ModelStats>, key: &str) -> &'a mut ModelStats {
    map.entry(key.to_string()).or_default()
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
