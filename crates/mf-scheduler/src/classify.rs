//! Provider error-text classification.
//!
//! The three predicates are independent; [`classify`] applies the
//! rate-limit, auth, unavailable precedence when a single verdict is needed.

use std::sync::OnceLock;

use mf_core::ErrorKind;
use regex::Regex;

/// Proxy identifiers whose errors are known to clear on their own.
const TRANSIENT_PROXY_MARKERS: &[&str] = &["copilot-proxy", "cliproxy", "cli-proxy-api"];

struct ClassifierPatterns {
    rate_limit: Regex,
    auth: Regex,
    unavailable: Regex,
    quota: Regex,
    daily: Regex,
}

fn build_patterns() -> Option<ClassifierPatterns> {
    let proxies = TRANSIENT_PROXY_MARKERS
        .iter()
        .map(|marker| regex::escape(marker))
        .collect::<Vec<_>>()
        .join("|");

    Some(ClassifierPatterns {
        rate_limit: Regex::new(
            r"(?i)\b429\b|rate[\s_-]?limit|resource[\s_-]?exhausted|quota\s+(?:has\s+been\s+)?(?:exceeded|exhausted|reached)|(?:exceeded|exhausted)\s+(?:your\s+|the\s+)?(?:current\s+)?quota|insufficient[\s_]quota|too\s+many\s+requests",
        )
        .ok()?,
        auth: Regex::new(
            r"(?i)\b401\b|missing\s+(?:required\s+)?scopes?|insufficient\s+scopes?|invalid[\s_-](?:x-)?(?:api[\s_-]?)?key|incorrect\s+api\s+key|\bunauthori[sz]ed\b|authentication[\s_]error",
        )
        .ok()?,
        unavailable: Regex::new(&format!(
            r"(?i)cool(?:ing)?[\s_-]?down|temporarily\s+unavailable|service\s+unavailable|\b503\b|\b529\b|overloaded|{proxies}"
        ))
        .ok()?,
        quota: Regex::new(r"(?i)quota|resource[\s_-]?exhausted").ok()?,
        daily: Regex::new(r"(?i)\bdaily\b|per[\s-]day").ok()?,
    })
}

fn patterns() -> Option<&'static ClassifierPatterns> {
    static PATTERNS: OnceLock<Option<ClassifierPatterns>> = OnceLock::new();
    PATTERNS.get_or_init(build_patterns).as_ref()
}

fn matches(text: Option<&str>, pick: impl Fn(&ClassifierPatterns) -> &Regex) -> bool {
    match (text, patterns()) {
        (Some(text), Some(patterns)) => pick(patterns).is_match(text),
        _ => false,
    }
}

/// HTTP 429, "rate limit", RESOURCE_EXHAUSTED, quota exhaustion, "too many requests".
pub fn is_rate_limit_like(text: Option<&str>) -> bool {
    matches(text, |p| &p.rate_limit)
}

/// HTTP 401, missing scope, invalid API key. Never true for rate-limit text.
pub fn is_auth_or_scope_like(text: Option<&str>) -> bool {
    !is_rate_limit_like(text) && matches(text, |p| &p.auth)
}

/// Cooldown notices, "temporarily unavailable", overload, transient proxies.
pub fn is_temporarily_unavailable_like(text: Option<&str>) -> bool {
    matches(text, |p| &p.unavailable)
}

/// Quota wording, used by the Gemini calendar reset rule.
pub fn is_quota_like(text: Option<&str>) -> bool {
    matches(text, |p| &p.quota)
}

/// "daily" / "per day" wording, used by the Anthropic calendar reset rule.
pub fn is_daily_limit_like(text: Option<&str>) -> bool {
    matches(text, |p| &p.daily)
}

/// Single verdict with rate-limit > auth > unavailable > unknown precedence.
pub fn classify(text: Option<&str>) -> ErrorKind {
    if is_rate_limit_like(text) {
        ErrorKind::RateLimit
    } else if is_auth_or_scope_like(text) {
        ErrorKind::AuthOrScope
    } else if is_temporarily_unavailable_like(text) {
        ErrorKind::TemporarilyUnavailable
    } else {
        ErrorKind::Unknown
    }
}
