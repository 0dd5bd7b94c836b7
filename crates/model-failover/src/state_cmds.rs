use anyhow::Result;
use chrono::Utc;
use mf_core::{AppError, OutputFormat};
use mf_scheduler::{availability, first_available_model_at, load_state, reset_state, save_state};

use crate::context::Context;
use crate::timestamp::{format_duration, format_ts};

/// Handle `mfo status`.
pub(crate) fn handle_status(ctx: &Context) -> Result<()> {
    let state = load_state(&ctx.state_path);
    let now = Utc::now().timestamp();
    let models = &ctx.config.models;
    let view = availability(models, &state, now);
    let selected = first_available_model_at(models, &state, now);

    // Active blocks for models no longer in the configured order.
    let stray: Vec<_> = state
        .active(now)
        .filter(|(model, _)| !ctx.config.contains_model(model))
        .collect();

    match ctx.format {
        OutputFormat::Json => {
            let stray_json: Vec<_> = stray
                .iter()
                .map(|(model, entry)| {
                    serde_json::json!({
                        "model": model,
                        "nextAvailableAt": entry.next_available_at,
                        "reason": entry.reason,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "statePath": ctx.state_path,
                "selected": selected,
                "models": view,
                "otherBlocks": stray_json,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if models.is_empty() {
                eprintln!("No models configured. Add a `models` list to the failover config.");
            }
            for (i, item) in view.iter().enumerate() {
                let marker = if Some(item.model.as_str()) == selected { "*" } else { " " };
                match item.remaining_secs {
                    None => println!("{marker} {}. {} available", i + 1, item.model),
                    Some(secs) => println!(
                        "{marker} {}. {} blocked for {}{}",
                        i + 1,
                        item.model,
                        format_duration(secs),
                        item.reason
                            .as_deref()
                            .map(|r| format!(" ({r})"))
                            .unwrap_or_default()
                    ),
                }
            }
            if !stray.is_empty() {
                println!();
                println!("Blocked models outside the configured order:");
                for (model, entry) in stray {
                    println!("  {} until {}", model, format_ts(entry.next_available_at));
                }
            }
        }
    }
    Ok(())
}

/// Handle `mfo select`.
pub(crate) fn handle_select(ctx: &Context) -> Result<()> {
    let state = load_state(&ctx.state_path);
    let model = first_available_model_at(&ctx.config.models, &state, Utc::now().timestamp())
        .ok_or(AppError::NoModelsConfigured)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "model": model })),
        OutputFormat::Text => println!("{model}"),
    }
    Ok(())
}

/// Handle `mfo clear [model]`.
pub(crate) fn handle_clear(ctx: &Context, model: Option<String>) -> Result<()> {
    let (target, removed) = match model {
        Some(model) => {
            let mut state = load_state(&ctx.state_path);
            let removed = state.clear(&model);
            if removed {
                save_state(&ctx.state_path, &state)?;
            }
            (model, removed)
        }
        None => ("all".to_string(), reset_state(&ctx.state_path)?),
    };

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "cleared": target, "removed": removed })
            );
        }
        OutputFormat::Text if removed => println!("Cleared {target}"),
        OutputFormat::Text => println!("Nothing to clear for {target}"),
    }
    Ok(())
}
