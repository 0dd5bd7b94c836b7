use anyhow::Result;
use mf_core::OutputFormat;
use mf_metrics::{
    MetricsSummary, ModelHistory, ModelStats, get_metrics_summary, get_model_history,
    query_metrics, reset_metrics,
};

use crate::cli::{MetricsCommands, RangeArgs};
use crate::context::Context;
use crate::timestamp::{format_duration, format_ts};

pub(crate) fn handle_metrics(ctx: &Context, cmd: MetricsCommands) -> Result<()> {
    match cmd {
        MetricsCommands::Summary { range, recent } => handle_summary(ctx, &range, recent),
        MetricsCommands::Model { model, range } => handle_model(ctx, &model, &range),
        MetricsCommands::Query { range, recent } => handle_query(ctx, &range, recent),
        MetricsCommands::Reset => handle_reset(ctx),
    }
}

fn recent_limit(ctx: &Context, recent: Option<usize>) -> usize {
    recent.unwrap_or(ctx.config.max_recent_cooldowns)
}

fn handle_summary(ctx: &Context, range: &RangeArgs, recent: Option<usize>) -> Result<()> {
    let summary = get_metrics_summary(
        &ctx.metrics_path,
        range.to_range()?,
        recent_limit(ctx, recent),
    );
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary_text(&summary),
    }
    Ok(())
}

fn handle_model(ctx: &Context, model: &str, range: &RangeArgs) -> Result<()> {
    let history = get_model_history(&ctx.metrics_path, model, range.to_range()?);
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
        OutputFormat::Text => print_history_text(&history),
    }
    Ok(())
}

fn handle_query(ctx: &Context, range: &RangeArgs, recent: Option<usize>) -> Result<()> {
    let report = query_metrics(
        &ctx.metrics_path,
        range.to_range()?,
        recent_limit(ctx, recent),
    );
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            print_summary_text(&report.summary);
            for history in report.model_histories.values() {
                println!();
                print_history_text(history);
            }
        }
    }
    Ok(())
}

fn handle_reset(ctx: &Context) -> Result<()> {
    let removed = reset_metrics(&ctx.metrics_path)?;
    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "removed": removed })),
        OutputFormat::Text if removed => {
            println!("Deleted {}", ctx.metrics_path.display());
        }
        OutputFormat::Text => println!("No metrics log at {}", ctx.metrics_path.display()),
    }
    Ok(())
}

fn stats_line(stats: &ModelStats) -> String {
    format!(
        "rate_limit={} auth={} unavailable={} failed_from={} failed_to={} avg_cooldown={}",
        stats.rate_limits,
        stats.auth_errors,
        stats.unavailable_errors,
        stats.times_failed_from,
        stats.times_failed_to,
        format_duration(stats.avg_cooldown_sec.round() as u64),
    )
}

fn print_summary_text(summary: &MetricsSummary) {
    if summary.total_events == 0 {
        println!("No failover events recorded.");
        return;
    }

    if let (Some(since), Some(until)) = (summary.since, summary.until) {
        println!("Events {} .. {}", format_ts(since), format_ts(until));
    }
    println!(
        "Total: {} events ({} rate limits, {} auth errors, {} unavailable, {} failovers)",
        summary.total_events,
        summary.rate_limits,
        summary.auth_errors,
        summary.unavailable_errors,
        summary.failovers,
    );
    println!(
        "Cooldowns: {} totalling {} (avg {})",
        summary.cooldown_count,
        format_duration(summary.total_cooldown_sec),
        format_duration(summary.avg_cooldown_sec.round() as u64),
    );

    println!();
    println!("By model:");
    for (model, stats) in &summary.by_model {
        println!("  {model}: {}", stats_line(stats));
    }
    println!("By provider:");
    for (provider, stats) in &summary.by_provider {
        println!("  {provider}: {}", stats_line(stats));
    }

    if !summary.recent_cooldowns.is_empty() {
        println!();
        println!("Recent cooldowns:");
        for record in &summary.recent_cooldowns {
            println!(
                "  {} {} {} for {}",
                format_ts(record.started_at),
                record.model,
                record.kind,
                format_duration(record.duration_sec),
            );
        }
    }
}

fn print_history_text(history: &ModelHistory) {
    let stats = &history.stats;
    println!("{}", history.model);
    match (stats.first_seen, stats.last_seen) {
        (Some(first), Some(last)) => {
            println!("  seen {} .. {}", format_ts(first), format_ts(last));
        }
        _ => {
            println!("  no events");
            return;
        }
    }
    println!(
        "  errors: {}  cooldown total {} avg {} max {}",
        stats.total_errors,
        format_duration(stats.total_cooldown_sec),
        format_duration(stats.avg_cooldown_sec.round() as u64),
        format_duration(stats.max_cooldown_sec),
    );
    for (to, count) in &history.failed_to_models {
        println!("  failed over to {to}: {count}");
    }
    for (from, count) in &history.received_from_models {
        println!("  received from {from}: {count}");
    }
    for entry in &history.cooldowns {
        println!(
            "  {} {} for {}{}",
            format_ts(entry.started_at),
            entry.kind,
            format_duration(entry.duration_sec),
            entry.reason
                .as_deref()
                .map(|r| format!(": {r}"))
                .unwrap_or_default(),
        );
    }
}
