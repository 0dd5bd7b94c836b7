//! Path-based entry points and the combined summary-plus-histories report.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;

use crate::event::MetricEvent;
use crate::history::{ModelHistory, model_history};
use crate::log::load_events;
use crate::summary::{MetricsSummary, TimeRange, summarize};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub summary: MetricsSummary,
    /// Keyed by every model id seen as `model` or `to` in range.
    pub model_histories: BTreeMap<String, ModelHistory>,
}

/// Summary plus a history for every model mentioned inside `range`.
pub fn query(events: &[MetricEvent], range: TimeRange, max_recent_cooldowns: usize) -> MetricsReport {
    let models: BTreeSet<&str> = range
        .filter(events)
        .flat_map(|event| std::iter::once(event.model()).chain(event.to()))
        .collect();

    let model_histories = models
        .into_iter()
        .map(|model| (model.to_string(), model_history(events, model, range)))
        .collect();

    MetricsReport {
        summary: summarize(events, range, max_recent_cooldowns),
        model_histories,
    }
}

pub fn get_metrics_summary(
    metrics_path: &Path,
    range: TimeRange,
    max_recent_cooldowns: usize,
) -> MetricsSummary {
    summarize(&load_events(metrics_path), range, max_recent_cooldowns)
}

pub fn get_model_history(metrics_path: &Path, model: &str, range: TimeRange) -> ModelHistory {
    model_history(&load_events(metrics_path), model, range)
}

pub fn query_metrics(
    metrics_path: &Path,
    range: TimeRange,
    max_recent_cooldowns: usize,
) -> MetricsReport {
    query(&load_events(metrics_path), range, max_recent_cooldowns)
}
