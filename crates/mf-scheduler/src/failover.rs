//! Failover planning after a failed turn.
//!
//! Classify, compute a cooldown, block, reselect, and describe what happened
//! as metric events. The caller owns persistence: it saves the mutated
//! [`LimitState`] and appends [`FailoverPlan::events`] to the log.

use chrono::{DateTime, Utc};
use mf_core::{ErrorKind, provider_of};
use mf_metrics::{ErrorEvent, FailoverEvent, MetricEvent};
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::classify;
use crate::cooldown::calculate_cooldown_at;
use crate::selector::first_available_model_at;
use crate::state::LimitState;

/// Longest error text stored as an event or block reason.
pub const MAX_REASON_CHARS: usize = 200;

/// Inputs for one failover decision.
#[derive(Debug, Clone)]
pub struct FailoverRequest<'a> {
    /// Models in priority order.
    pub order: &'a [String],
    pub failed_model: &'a str,
    pub error_text: Option<&'a str>,
    pub default_cooldown_minutes: u64,
    /// Block every model sharing the failed model's provider prefix.
    pub provider_wide_blocking: bool,
    pub trigger: Option<&'a str>,
    pub session: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// Outcome of [`plan_failover`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverPlan {
    pub kind: ErrorKind,
    pub failed_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_sec: Option<u64>,
    pub blocked: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_model: Option<String>,
    pub events: Vec<MetricEvent>,
}

impl FailoverPlan {
    /// Whether the active model should change.
    pub fn switched(&self) -> bool {
        self.next_model
            .as_deref()
            .is_some_and(|next| next != self.failed_model)
    }
}

fn truncate_reason(text: &str) -> String {
    text.chars().take(MAX_REASON_CHARS).collect()
}

pub fn plan_failover(request: &FailoverRequest<'_>, state: &mut LimitState) -> FailoverPlan {
    let now_ts = request.now.timestamp();
    let failed_model = request.failed_model;
    let kind = classify(request.error_text);

    if !kind.triggers_failover() {
        let next_model = first_available_model_at(request.order, state, now_ts).map(str::to_string);
        debug!(model = failed_model, "error not classified; no failover");
        return FailoverPlan {
            kind,
            failed_model: failed_model.to_string(),
            cooldown_sec: None,
            blocked: Vec::new(),
            next_model,
            events: Vec::new(),
        };
    }

    let provider = provider_of(failed_model);
    let cooldown_sec = calculate_cooldown_at(
        failed_model,
        request.error_text,
        request.default_cooldown_minutes,
        request.now,
    );
    let reason = request.error_text.map(truncate_reason);

    let blocked = if request.provider_wide_blocking {
        state.block_provider(request.order, failed_model, now_ts, cooldown_sec, reason.clone())
    } else {
        state.mark_limited(failed_model, now_ts, cooldown_sec, reason.clone());
        vec![failed_model.to_string()]
    };

    let next_model = first_available_model_at(request.order, state, now_ts).map(str::to_string);

    let mut events = Vec::with_capacity(2);
    let error_event = ErrorEvent {
        ts: now_ts,
        model: failed_model.to_string(),
        provider: provider.to_string(),
        reason: reason.clone(),
        cooldown_sec: Some(cooldown_sec),
        trigger: request.trigger.map(str::to_string),
        session: request.session.map(str::to_string),
    };
    events.extend(MetricEvent::from_error_kind(kind, error_event));

    if let Some(next) = next_model.as_deref().filter(|next| *next != failed_model) {
        events.push(MetricEvent::Failover(FailoverEvent {
            ts: now_ts,
            model: failed_model.to_string(),
            provider: provider.to_string(),
            to: next.to_string(),
            reason,
            trigger: request.trigger.map(str::to_string),
            session: request.session.map(str::to_string),
        }));
    }

    info!(
        failed = failed_model,
        kind = %kind,
        cooldown_sec,
        blocked = blocked.len(),
        next = next_model.as_deref().unwrap_or("-"),
        "planned failover"
    );

    FailoverPlan {
        kind,
        failed_model: failed_model.to_string(),
        cooldown_sec: Some(cooldown_sec),
        blocked,
        next_model,
        events,
    }
}
