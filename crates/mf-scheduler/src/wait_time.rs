//! Explicit retry hints in provider error text.

use std::sync::OnceLock;

use regex::Regex;

struct WaitPatterns {
    in_duration: Regex,
    component: Regex,
    after_seconds: Regex,
    retry_after: Regex,
}

fn build_patterns() -> Option<WaitPatterns> {
    const UNITS: &str = r"hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s";
    Some(WaitPatterns {
        in_duration: Regex::new(&format!(
            r"(?i)\bin\s+((?:\d+(?:\.\d+)?\s*(?:{UNITS})(?:\s*,\s*|\s+and\s+|\s*))+)\b"
        ))
        .ok()?,
        component: Regex::new(&format!(r"(?i)(\d+(?:\.\d+)?)\s*({UNITS})")).ok()?,
        after_seconds: Regex::new(r"(?i)\bafter\s+(\d+(?:\.\d+)?)\s*(?:seconds?|secs?|s)\b").ok()?,
        retry_after: Regex::new(r#"(?i)\bretry[-_ ]after["']?\s*[:=]\s*"?(\d+)\b"#).ok()?,
    })
}

fn patterns() -> Option<&'static WaitPatterns> {
    static PATTERNS: OnceLock<Option<WaitPatterns>> = OnceLock::new();
    PATTERNS.get_or_init(build_patterns).as_ref()
}

fn unit_seconds(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().chars().next() {
        Some('h') => 3600.0,
        Some('m') => 60.0,
        _ => 1.0,
    }
}

/// Longest wait accepted from a hint; larger values are clamped.
pub const MAX_WAIT_SECS: u64 = 7 * 24 * 3600;

fn round_up(secs: f64) -> u64 {
    (secs.ceil().max(0.0) as u64).min(MAX_WAIT_SECS)
}

/// Seconds the provider asked us to wait, if the text says so.
///
/// Recognizes `in 4m30s`, `in 30s`, `in 2h`, `in 1 hour and 5 minutes`,
/// `after 60 seconds` and `retry-after: 60`. Components are summed and
/// fractional seconds rounded up, and the result is clamped to
/// [`MAX_WAIT_SECS`]. `None` means "no hint", never zero.
pub fn parse_wait_time(text: &str) -> Option<u64> {
    let patterns = patterns()?;

    if let Some(span) = patterns
        .in_duration
        .captures(text)
        .and_then(|caps| caps.get(1))
    {
        let total: f64 = patterns
            .component
            .captures_iter(span.as_str())
            .filter_map(|caps| {
                let value: f64 = caps.get(1)?.as_str().parse().ok()?;
                Some(value * unit_seconds(caps.get(2)?.as_str()))
            })
            .sum();
        return Some(round_up(total));
    }

    if let Some(value) = patterns
        .after_seconds
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return Some(round_up(value));
    }

    patterns
        .retry_after
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(|secs| secs.min(MAX_WAIT_SECS))
}
