// ABOUTME: Entry point for the keel CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use keel::error::Result;
use keel::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose enables debug output for keel only.
    let default_filter = if cli.verbose { "keel=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);
    let config_path = cli.config;

    match cli.command {
        Commands::Deploy { settings, dry_run } => {
            commands::deploy(config_path.as_deref(), settings, dry_run, output).await
        }
        Commands::Rollback { settings } => {
            let config = commands::load_config(config_path.as_deref(), settings)?;
            commands::rollback(config, output).await
        }
        Commands::Check { settings } => {
            let config = commands::load_config(config_path.as_deref(), settings)?;
            commands::check(config, output).await
        }
    }
}
