// rffl entry point.
//
// 1. Parse arguments
// 2. Initialize tracing (stderr; stdout carries command output)
// 3. Load config and lineup rules
// 4. Dispatch the subcommand

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::commands::Session;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let session = Session::load(&cli.base_dir)?;

    let written = match &cli.command {
        Command::Export(args) => Some(commands::run_export(&session, args)?),
        Command::H2h(args) => Some(commands::run_h2h(args)?),
        Command::Draft(args) => Some(commands::run_draft(args)?),
        Command::Transactions(args) => Some(commands::run_transactions(args)?),
        Command::HistoricalRosters(args) => Some(commands::run_historical_rosters(&session, args)?),
        Command::RosterChanges(args) => Some(commands::run_roster_changes(&session, args)?),
        Command::WeeklyRosterChanges(args) => Some(commands::run_weekly_roster_changes(&session, args)?),
        Command::Validate(args) => {
            commands::run_validate(&session, args)?;
            None
        }
        Command::ValidateLineup(args) => {
            commands::run_validate_lineup(&session, args)?;
            None
        }
    };

    if let Some(path) = written {
        info!("wrote {}", path.display());
        println!("{}", path.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "rffl=debug,warn" } else { "rffl=info,warn" };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    Ok(())
}
