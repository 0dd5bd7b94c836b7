//! Per-model event history: own errors, cooldown timeline, failover adjacency.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::event::{EventKind, MetricEvent};
use crate::summary::{TimeRange, average};

/// One entry of a model's cooldown timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownEntry {
    pub started_at: i64,
    pub duration_sec: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Every own error event, with or without a cooldown.
    pub total_errors: u64,
    pub total_cooldown_sec: u64,
    pub avg_cooldown_sec: f64,
    pub max_cooldown_sec: u64,
    pub first_seen: Option<i64>,
    pub last_seen: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHistory {
    pub model: String,
    /// Error events where this model is the subject, in log order.
    pub errors: Vec<MetricEvent>,
    pub cooldowns: Vec<CooldownEntry>,
    pub stats: HistoryStats,
    /// Models this one failed over to, with counts.
    pub failed_to_models: BTreeMap<String, u64>,
    /// Models that failed over to this one, with counts.
    pub received_from_models: BTreeMap<String, u64>,
}

impl ModelHistory {
    fn observe(&mut self, ts: i64) {
        self.stats.first_seen = Some(self.stats.first_seen.map_or(ts, |f| f.min(ts)));
        self.stats.last_seen = Some(self.stats.last_seen.map_or(ts, |l| l.max(ts)));
    }
}

/// Build the history of `model` from the events inside `range`.
pub fn model_history(events: &[MetricEvent], model: &str, range: TimeRange) -> ModelHistory {
    let mut history = ModelHistory {
        model: model.to_string(),
        ..ModelHistory::default()
    };

    for event in range.filter(events) {
        if event.model() == model {
            history.observe(event.ts());
            if let Some(failover) = event.as_failover() {
                *history
                    .failed_to_models
                    .entry(failover.to.clone())
                    .or_default() += 1;
                continue;
            }

            history.stats.total_errors += 1;
            if let Some(secs) = event.cooldown_sec() {
                history.stats.total_cooldown_sec =
                    history.stats.total_cooldown_sec.saturating_add(secs);
                history.stats.max_cooldown_sec = history.stats.max_cooldown_sec.max(secs);
                history.cooldowns.push(CooldownEntry {
                    started_at: event.ts(),
                    duration_sec: secs,
                    kind: event.kind(),
                    reason: event.reason().map(str::to_string),
                    trigger: event.trigger().map(str::to_string),
                    session: event.session().map(str::to_string),
                });
            }
            history.errors.push(event.clone());
        } else if event.to() == Some(model) {
            history.observe(event.ts());
            *history
                .received_from_models
                .entry(event.model().to_string())
                .or_default() += 1;
        }
    }

    history.stats.avg_cooldown_sec = average(
        history.stats.total_cooldown_sec,
        history.cooldowns.len() as u64,
    );
    history
}
