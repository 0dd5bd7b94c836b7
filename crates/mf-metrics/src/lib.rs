//! Failover telemetry: an append-only JSONL event log and the reducers
//! that fold it into summaries and per-model histories.

pub mod event;
pub mod history;
pub mod log;
pub mod query;
pub mod summary;

pub use event::{ErrorEvent, EventKind, FailoverEvent, MetricEvent};
pub use history::{CooldownEntry, HistoryStats, ModelHistory, model_history};
pub use log::{MetricsLog, load_events, record_event, reset_metrics};
pub use query::{MetricsReport, get_metrics_summary, get_model_history, query, query_metrics};
pub use summary::{CooldownRecord, MetricsSummary, ModelStats, TimeRange, summarize};
