//! Command handlers behind the CLI. Each handler takes the shared
//! [`AppContext`] and returns a serializable result; [`run`] prints it as
//! JSON on stdout.

pub mod batch_cmds;
pub mod context;
pub mod package_cmds;
pub mod session_cmds;
pub mod settings_cmds;

pub use context::AppContext;

use crate::cli::{Cli, Commands, ConfigCommand, SessionCommand};
use crate::services::batch::BatchOutcome;
use anyhow::bail;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Execute a parsed command line. Returns whether the operation succeeded,
/// so the binary can pick its exit code; the report is printed either way.
pub fn run(cli: Cli) -> anyhow::Result<bool> {
    let ctx = AppContext::load(cli.config.clone(), cli.data_dir.clone())?;

    match cli.command {
        Commands::Analyze(args) => {
            let report = package_cmds::analyze(&ctx, &args.archive);
            print_json(&report)?;
            Ok(report.success)
        }
        Commands::Repair(args) => {
            let report = package_cmds::repair(&ctx, &args.archive, args.output.as_deref());
            print_json(&report)?;
            Ok(report.success)
        }
        Commands::Instrument(args) => {
            let report = package_cmds::instrument(&ctx, &args.archive);
            print_json(&report)?;
            Ok(report.success)
        }
        Commands::Play(args) => {
            let outcome = package_cmds::play(&ctx, &args.archive);
            print_json(&outcome)?;
            Ok(outcome.is_playable())
        }
        Commands::Batch(args) => {
            let outcome = batch_cmds::run_batch(&ctx, &args)?;
            print_json(&outcome)?;
            let failed = match &outcome {
                BatchOutcome::Analyze(batch) => batch.summary.failed,
                BatchOutcome::Repair(batch) => batch.summary.failed,
            };
            Ok(failed == 0)
        }
        Commands::Session(command) => run_session(&ctx, command),
        Commands::Config(ConfigCommand::Show) => {
            print_json(&settings_cmds::get_settings(&ctx))?;
            Ok(true)
        }
        Commands::Config(ConfigCommand::Init) => {
            let Some(path) = &cli.config else {
                bail!("config init needs a --config path");
            };
            let saved = settings_cmds::save_settings(&ctx).map_err(anyhow::Error::msg)?;
            log::info!("Wrote settings to {}", path.display());
            print_json(&saved)?;
            Ok(true)
        }
    }
}

fn run_session(ctx: &AppContext, command: SessionCommand) -> anyhow::Result<bool> {
    match command {
        SessionCommand::List => print_json(&session_cmds::list_sessions(ctx)?)?,
        SessionCommand::Show { id } => print_json(&session_cmds::show_session(ctx, &id)?)?,
        SessionCommand::Destroy { id } => print_json(&session_cmds::destroy_session(ctx, &id)?)?,
        SessionCommand::Resolve { id, path } => {
            print_json(&session_cmds::resolve_file(ctx, &id, &path)?)?
        }
        SessionCommand::Call { id, method, args } => {
            print_json(&session_cmds::call_api(ctx, &id, &method, &args)?)?
        }
        SessionCommand::Status { id } => print_json(&session_cmds::session_status(ctx, &id)?)?,
    }
    Ok(true)
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
