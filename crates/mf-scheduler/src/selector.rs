//! Next-available-model selection over the persisted block-list.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::state::LimitState;

/// First model in `order` that is not currently blocked.
///
/// When every model is blocked the last one is returned, so a caller
/// always has something to try. `None` only for an empty order.
pub fn first_available_model<'a, S: AsRef<str>>(
    order: &'a [S],
    state: &LimitState,
) -> Option<&'a str> {
    first_available_model_at(order, state, Utc::now().timestamp())
}

pub fn first_available_model_at<'a, S: AsRef<str>>(
    order: &'a [S],
    state: &LimitState,
    now: i64,
) -> Option<&'a str> {
    if let Some(model) = order
        .iter()
        .map(AsRef::as_ref)
        .find(|model| !state.is_blocked(model, now))
    {
        debug!(model, "selected first available model");
        return Some(model);
    }

    let fallback = order.last().map(AsRef::as_ref)?;
    debug!(
        model = fallback,
        candidates = order.len(),
        "all models blocked; falling back to lowest priority"
    );
    Some(fallback)
}

/// Per-model view used by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAvailability {
    pub model: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Availability of every model in `order`, in order.
pub fn availability<S: AsRef<str>>(
    order: &[S],
    state: &LimitState,
    now: i64,
) -> Vec<ModelAvailability> {
    order
        .iter()
        .map(AsRef::as_ref)
        .map(|model| {
            let remaining_secs = state.remaining_secs(model, now);
            ModelAvailability {
                model: model.to_string(),
                available: remaining_secs.is_none(),
                remaining_secs,
                reason: remaining_secs
                    .and_then(|_| state.limited.get(model))
                    .and_then(|entry| entry.reason.clone()),
            }
        })
        .collect()
}
