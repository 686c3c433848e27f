use std::process::ExitCode;

use albumpicker::cli::{Cli, Command};
use albumpicker::commands::{run_copy, run_pick};
use albumpicker::config::{Config, Settings, default_config_path};
use albumpicker::services::{BatchSummary, init_logging};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

fn main() -> ExitCode {
    // .env values become ALBUMPICKER_* defaults for the flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let summary = match &cli.command {
        Command::InitConfig => return init_config(&cli),
        Command::Pick { wipe, .. } => run_pick(&load_config(&cli)?, *wipe)?,
        Command::Copy { album } => run_copy(&load_config(&cli)?, album)?,
    };
    log_summary(&summary);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let (mut settings, _) = Settings::load_or_init(cli.config.as_deref())?;
    settings.apply(&cli.overrides());
    settings.validate()
}

fn init_config(cli: &Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path().context("could not determine config directory")?,
    };

    if path.exists() {
        info!(path = %path.display(), "Config file already exists");
    } else {
        Settings::default().save(&path)?;
        info!(path = %path.display(), "Wrote default config file");
    }
    println!("{}", path.display());
    Ok(())
}

fn log_summary(summary: &BatchSummary) {
    info!(
        total = summary.total,
        processed = summary.processed,
        skipped = summary.skipped,
        "Done"
    );
}
