//! Cooldown length for a failed model.
//!
//! Decision order: explicit wait hint in the error text, then provider
//! calendar resets, then the configured default.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use mf_core::ProviderFamily;
use tracing::debug;

use crate::classify::{is_daily_limit_like, is_quota_like};
use crate::wait_time::parse_wait_time;

/// Next `00:00:00` local time in `tz`, strictly after `now`.
///
/// Resolved through the zone database, so DST transitions move the UTC
/// instant rather than the local wall-clock time.
pub fn next_midnight<Tz: TimeZone>(tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let mut date = now.with_timezone(tz).date_naive();
    // A zone may skip midnight on a transition day; try the following day.
    for _ in 0..3 {
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
        let Some(naive_midnight) = date.and_hms_opt(0, 0, 0) else {
            continue;
        };
        if let Some(midnight) = tz.from_local_datetime(&naive_midnight).earliest() {
            return midnight.with_timezone(&Utc);
        }
    }
    now + Duration::days(1)
}

fn seconds_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (target - now).num_milliseconds().max(0);
    (((millis + 999) / 1000) as u64).max(1)
}

/// Seconds until the next midnight in America/Los_Angeles.
pub fn seconds_until_pacific_midnight(now: DateTime<Utc>) -> u64 {
    seconds_until(next_midnight(&Los_Angeles, now), now)
}

/// Seconds until the next midnight UTC.
pub fn seconds_until_utc_midnight(now: DateTime<Utc>) -> u64 {
    seconds_until(next_midnight(&Utc, now), now)
}

/// Cooldown for `provider` after `error_text`, measured from now.
///
/// `provider` may be a provider id or a full `provider/model` id; the model
/// name disambiguates gateways that host several families.
pub fn calculate_cooldown(provider: &str, error_text: Option<&str>, default_minutes: u64) -> u64 {
    calculate_cooldown_at(provider, error_text, default_minutes, Utc::now())
}

pub fn calculate_cooldown_at(
    provider: &str,
    error_text: Option<&str>,
    default_minutes: u64,
    now: DateTime<Utc>,
) -> u64 {
    if let Some(secs) = error_text.and_then(parse_wait_time) {
        debug!(provider, secs, "cooldown from explicit wait hint");
        return secs;
    }

    match ProviderFamily::from_provider(provider) {
        ProviderFamily::Gemini if is_quota_like(error_text) => {
            let secs = seconds_until_pacific_midnight(now);
            debug!(provider, secs, "cooldown until Pacific midnight quota reset");
            secs
        }
        ProviderFamily::Anthropic if is_daily_limit_like(error_text) => {
            let secs = seconds_until_utc_midnight(now);
            debug!(provider, secs, "cooldown until UTC midnight daily reset");
            secs
        }
        _ => default_minutes.saturating_mul(60),
    }
}
