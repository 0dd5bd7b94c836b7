//! Failover selection: error classification, cooldown computation,
//! block-list persistence and next-model selection.

pub mod classify;
pub mod cooldown;
pub mod failover;
pub mod selector;
pub mod state;
pub mod wait_time;

pub use classify::{
    classify, is_auth_or_scope_like, is_daily_limit_like, is_quota_like, is_rate_limit_like,
    is_temporarily_unavailable_like,
};
pub use cooldown::{
    calculate_cooldown, calculate_cooldown_at, next_midnight, seconds_until_pacific_midnight,
    seconds_until_utc_midnight,
};
pub use failover::{FailoverPlan, FailoverRequest, MAX_REASON_CHARS, plan_failover};
pub use selector::{
    ModelAvailability, availability, first_available_model, first_available_model_at,
};
pub use state::{BlockEntry, LimitState, load_state, reset_state, save_state};
pub use wait_time::{MAX_WAIT_SECS, parse_wait_time};
