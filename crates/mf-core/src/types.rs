use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Category of a provider error, as decided by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimit,
    AuthOrScope,
    TemporarilyUnavailable,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::AuthOrScope => "auth_or_scope",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
            Self::Unknown => "unknown",
        }
    }

    /// The metric event `type` recorded for this kind.
    ///
    /// `Unknown` errors do not trigger a cooldown and are never recorded.
    pub fn event_type(&self) -> Option<&'static str> {
        match self {
            Self::RateLimit => Some("rate_limit"),
            Self::AuthOrScope => Some("auth_error"),
            Self::TemporarilyUnavailable => Some("unavailable"),
            Self::Unknown => None,
        }
    }

    pub fn triggers_failover(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider family, used to pick calendar-based cooldown rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    Gemini,
    Anthropic,
    OpenAi,
    Other,
}

impl ProviderFamily {
    /// Map a provider id (`google-gemini-cli`, `anthropic`, `openai-codex`, ...)
    /// or a full `provider/model` id to its family.
    ///
    /// A bare `google` prefix is not enough: Google-hosted gateways also
    /// serve Claude, so the Gemini family requires `gemini` in the id.
    pub fn from_provider(provider: &str) -> Self {
        let provider = provider.to_ascii_lowercase();
        if provider.contains("gemini") {
            Self::Gemini
        } else if provider.starts_with("anthropic") || provider.contains("claude") {
            Self::Anthropic
        } else if provider.starts_with("openai") || provider.contains("codex") {
            Self::OpenAi
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "Gemini"),
            Self::Anthropic => write!(f, "Anthropic"),
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Provider prefix of a `provider/model` identifier.
///
/// Identifiers without a `/` are their own provider.
pub fn provider_of(model_id: &str) -> &str {
    model_id
        .split_once('/')
        .map(|(provider, _)| provider)
        .unwrap_or(model_id)
}

/// Output format for CLI responses
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_of_splits_on_first_slash() {
        assert_eq!(provider_of("anthropic/claude-opus-4"), "anthropic");
        assert_eq!(
            provider_of("openrouter/meta-llama/llama-3.1-70b"),
            "openrouter"
        );
    }

    #[test]
    fn test_provider_of_without_slash() {
        assert_eq!(provider_of("local-model"), "local-model");
        assert_eq!(provider_of(""), "");
    }

    #[test]
    fn test_provider_family_mapping() {
        assert_eq!(
            ProviderFamily::from_provider("google-gemini-cli"),
            ProviderFamily::Gemini
        );
        assert_eq!(ProviderFamily::from_provider("google"), ProviderFamily::Other);
        assert_eq!(
            ProviderFamily::from_provider("google/gemini-2.5-pro"),
            ProviderFamily::Gemini
        );
        assert_eq!(
            ProviderFamily::from_provider("google-vertex/claude-opus-4"),
            ProviderFamily::Anthropic
        );
        assert_eq!(
            ProviderFamily::from_provider("Anthropic"),
            ProviderFamily::Anthropic
        );
        assert_eq!(
            ProviderFamily::from_provider("openai-codex"),
            ProviderFamily::OpenAi
        );
        assert_eq!(
            ProviderFamily::from_provider("openrouter"),
            ProviderFamily::Other
        );
    }

    #[test]
    fn test_error_kind_event_type() {
        assert_eq!(ErrorKind::RateLimit.event_type(), Some("rate_limit"));
        assert_eq!(ErrorKind::AuthOrScope.event_type(), Some("auth_error"));
        assert_eq!(
            ErrorKind::TemporarilyUnavailable.event_type(),
            Some("unavailable")
        );
        assert_eq!(ErrorKind::Unknown.event_type(), None);
        assert!(!ErrorKind::Unknown.triggers_failover());
        assert!(ErrorKind::AuthOrScope.triggers_failover());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TemporarilyUnavailable).unwrap();
        assert_eq!(json, "\"temporarily_unavailable\"");
        assert_eq!(ErrorKind::AuthOrScope.to_string(), "auth_or_scope");
    }
}
