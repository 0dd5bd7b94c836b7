use anyhow::Result;
use clap::Parser;

mod cli;
mod context;
mod metrics_cmd;
mod report_cmd;
mod state_cmds;
mod timestamp;

use cli::{Cli, Commands};
use context::Context;

fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let ctx = Context::resolve(&cli)?;

    match cli.command {
        Commands::Status => state_cmds::handle_status(&ctx)?,
        Commands::Select => state_cmds::handle_select(&ctx)?,
        Commands::Classify { text, provider } => {
            report_cmd::handle_classify(&ctx, &text, provider.as_deref())?;
        }
        Commands::Report {
            model,
            error,
            trigger,
            session,
        } => {
            report_cmd::handle_report(
                &ctx,
                &model,
                &error,
                trigger.as_deref(),
                session.as_deref(),
            )?;
        }
        Commands::Clear { model } => state_cmds::handle_clear(&ctx, model)?,
        Commands::Metrics { cmd } => metrics_cmd::handle_metrics(&ctx, cmd)?,
    }

    Ok(())
}
