use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mf_core::OutputFormat;

#[derive(Parser)]
#[command(name = "mfo", version)]
#[command(about = "Model failover: pick the next usable model and report on rate limits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/model-failover/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Block-list state file (overrides config `state_path`)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Metrics event log (overrides config `metrics_path`)
    #[arg(long, global = true)]
    pub metrics: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the failover order with per-model availability
    Status,

    /// Print the first available model
    Select,

    /// Classify an error message and compute its cooldown
    Classify {
        /// Raw error text from the provider
        text: String,

        /// Provider id used for calendar reset rules (e.g. google-gemini-cli)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Record a failed turn: block the model and pick the next one
    Report {
        /// Model that failed (provider/model)
        #[arg(long)]
        model: String,

        /// Raw error text
        #[arg(long)]
        error: String,

        /// What observed the failure (e.g. agent_end)
        #[arg(long)]
        trigger: Option<String>,

        /// Host session key
        #[arg(long)]
        session: Option<String>,
    },

    /// Remove one block entry, or the whole state file when no model is given
    Clear {
        model: Option<String>,
    },

    /// Query the failover metrics log
    Metrics {
        #[command(subcommand)]
        cmd: MetricsCommands,
    },
}

/// Inclusive time window. Accepts epoch seconds, RFC 3339 or YYYY-MM-DD.
#[derive(Args, Clone, Debug, Default)]
pub struct RangeArgs {
    /// Earliest event timestamp to include
    #[arg(long)]
    pub since: Option<String>,

    /// Latest event timestamp to include (a bare date covers the whole day)
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Subcommand)]
pub enum MetricsCommands {
    /// Aggregate counters, per-model and per-provider breakdowns
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// Number of recent cooldowns to keep (defaults to config)
        #[arg(long)]
        recent: Option<usize>,
    },

    /// Error and failover history of one model
    Model {
        model: String,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Summary plus the history of every model seen in the window
    Query {
        #[command(flatten)]
        range: RangeArgs,

        #[arg(long)]
        recent: Option<usize>,
    },

    /// Delete the metrics log
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mfo", "status", "--config", "/tmp/c.toml", "--format", "json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_report_requires_model_and_error() {
        assert!(Cli::try_parse_from(["mfo", "report", "--model", "a/x"]).is_err());

        let cli = Cli::try_parse_from([
            "mfo", "report", "--model", "a/x", "--error", "429", "--trigger", "agent_end",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                model,
                error,
                trigger,
                session,
            } => {
                assert_eq!(model, "a/x");
                assert_eq!(error, "429");
                assert_eq!(trigger.as_deref(), Some("agent_end"));
                assert_eq!(session, None);
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_metrics_range_flags() {
        let cli = Cli::try_parse_from([
            "mfo", "metrics", "summary", "--since", "2026-01-01", "--recent", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Metrics {
                cmd: MetricsCommands::Summary { range, recent },
            } => {
                assert_eq!(range.since.as_deref(), Some("2026-01-01"));
                assert_eq!(range.until, None);
                assert_eq!(recent, Some(5));
            }
            _ => panic!("expected metrics summary"),
        }
    }

    #[test]
    fn test_default_format_is_text() {
        let cli = Cli::try_parse_from(["mfo", "select"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
    }
}
