//! Metric event records, one per log line.

use mf_core::ErrorKind;
use serde::{Deserialize, Serialize};

/// Event type tag, as it appears in the `type` field of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RateLimit,
    AuthError,
    Unavailable,
    Failover,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::AuthError => "auth_error",
            Self::Unavailable => "unavailable",
            Self::Failover => "failover",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Failover)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload shared by `rate_limit`, `auth_error` and `unavailable` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Epoch seconds.
    pub ts: i64,
    pub model: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Payload of a `failover` event: the active model moved from `model` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverEvent {
    /// Epoch seconds.
    pub ts: i64,
    pub model: String,
    pub provider: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// One immutable line of the metrics log.
///
/// Serialized flat with a `type` discriminator:
/// `{"type":"rate_limit","ts":1000,"model":"a/x","provider":"a","cooldownSec":3600}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricEvent {
    RateLimit(ErrorEvent),
    AuthError(ErrorEvent),
    Unavailable(ErrorEvent),
    Failover(FailoverEvent),
}

impl MetricEvent {
    /// Wrap an error payload in the variant matching a classifier verdict.
    ///
    /// Returns `None` for [`ErrorKind::Unknown`].
    pub fn from_error_kind(kind: ErrorKind, event: ErrorEvent) -> Option<Self> {
        match kind {
            ErrorKind::RateLimit => Some(Self::RateLimit(event)),
            ErrorKind::AuthOrScope => Some(Self::AuthError(event)),
            ErrorKind::TemporarilyUnavailable => Some(Self::Unavailable(event)),
            ErrorKind::Unknown => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::RateLimit(_) => EventKind::RateLimit,
            Self::AuthError(_) => EventKind::AuthError,
            Self::Unavailable(_) => EventKind::Unavailable,
            Self::Failover(_) => EventKind::Failover,
        }
    }

    /// Error payload, or `None` for failover events.
    pub fn as_error(&self) -> Option<&ErrorEvent> {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => Some(e),
            Self::Failover(_) => None,
        }
    }

    pub fn as_failover(&self) -> Option<&FailoverEvent> {
        match self {
            Self::Failover(f) => Some(f),
            _ => None,
        }
    }

    pub fn ts(&self) -> i64 {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => e.ts,
            Self::Failover(f) => f.ts,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => &e.model,
            Self::Failover(f) => &f.model,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => &e.provider,
            Self::Failover(f) => &f.provider,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => e.reason.as_deref(),
            Self::Failover(f) => f.reason.as_deref(),
        }
    }

    /// Failover target; `None` for error events.
    pub fn to(&self) -> Option<&str> {
        self.as_failover().map(|f| f.to.as_str())
    }

    /// Cooldown length; always `None` for failover events.
    pub fn cooldown_sec(&self) -> Option<u64> {
        self.as_error().and_then(|e| e.cooldown_sec)
    }

    pub fn trigger(&self) -> Option<&str> {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => e.trigger.as_deref(),
            Self::Failover(f) => f.trigger.as_deref(),
        }
    }

    pub fn session(&self) -> Option<&str> {
        match self {
            Self::RateLimit(e) | Self::AuthError(e) | Self::Unavailable(e) => e.session.as_deref(),
            Self::Failover(f) => f.session.as_deref(),
        }
    }
}
