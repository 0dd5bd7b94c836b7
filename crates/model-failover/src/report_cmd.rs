use anyhow::Result;
use chrono::Utc;
use mf_core::{AppError, OutputFormat, ProviderFamily};
use mf_metrics::MetricsLog;
use mf_scheduler::{
    FailoverPlan, FailoverRequest, calculate_cooldown, classify, load_state, parse_wait_time,
    plan_failover, save_state,
};
use tracing::info;

use crate::context::Context;
use crate::timestamp::format_duration;

/// Handle `mfo classify <text>`.
pub(crate) fn handle_classify(ctx: &Context, text: &str, provider: Option<&str>) -> Result<()> {
    let kind = classify(Some(text));
    let wait_hint = parse_wait_time(text);
    let provider = provider.unwrap_or_default();
    let cooldown = kind.triggers_failover().then(|| {
        calculate_cooldown(provider, Some(text), ctx.config.default_cooldown_minutes)
    });

    match ctx.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "kind": kind,
                "eventType": kind.event_type(),
                "waitHintSec": wait_hint,
                "cooldownSec": cooldown,
                "providerFamily": ProviderFamily::from_provider(provider).to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("kind: {kind}");
            if let Some(secs) = wait_hint {
                println!("wait hint: {secs}s");
            }
            match cooldown {
                Some(secs) => println!("cooldown: {} ({secs}s)", format_duration(secs)),
                None => println!("cooldown: none (not a failover error)"),
            }
        }
    }
    Ok(())
}

/// Handle `mfo report`: plan, persist state, append events, print the plan.
pub(crate) fn handle_report(
    ctx: &Context,
    model: &str,
    error: &str,
    trigger: Option<&str>,
    session: Option<&str>,
) -> Result<()> {
    if ctx.config.models.is_empty() {
        return Err(AppError::NoModelsConfigured.into());
    }
    if !ctx.config.contains_model(model) {
        return Err(AppError::ModelNotConfigured(model.to_string()).into());
    }

    let mut state = load_state(&ctx.state_path);
    let request = FailoverRequest {
        order: &ctx.config.models,
        failed_model: model,
        error_text: Some(error),
        default_cooldown_minutes: ctx.config.default_cooldown_minutes,
        provider_wide_blocking: ctx.config.provider_wide_blocking,
        trigger,
        session,
        now: Utc::now(),
    };
    let plan = plan_failover(&request, &mut state);

    if !plan.blocked.is_empty() {
        save_state(&ctx.state_path, &state)?;
    }
    if !plan.events.is_empty() {
        MetricsLog::new(&ctx.metrics_path).record_all(&plan.events)?;
        info!(
            path = %ctx.metrics_path.display(),
            events = plan.events.len(),
            "recorded failover metrics"
        );
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => print_plan_text(&plan),
    }
    Ok(())
}

fn print_plan_text(plan: &FailoverPlan) {
    println!("{}: {}", plan.failed_model, plan.kind);
    let Some(cooldown) = plan.cooldown_sec else {
        println!("No failover: error is not a rate limit, auth or availability failure.");
        return;
    };
    println!("Blocked for {}:", format_duration(cooldown));
    for model in &plan.blocked {
        println!("  {model}");
    }
    match plan.next_model.as_deref() {
        Some(next) if plan.switched() => println!("Next model: {next}"),
        Some(next) => println!("Next model: {next} (no alternative available)"),
        None => println!("Next model: none"),
    }
}
