//! Member Tracker CLI
//!
//! Loads the configuration, logs in to Discord and keeps the tracked
//! message in sync until stopped.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use member_tracker::{
    chat::DiscordClient,
    error::Result,
    models::Config,
    pipeline::{self, PollScheduler, StopReason},
    services::HttpPageSource,
};

/// Member Tracker - keeps a Discord embed in sync with a scraped member count
#[derive(Parser, Debug)]
#[command(name = "member-tracker", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "tracker.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the page and update the tracked message until stopped
    Run,

    /// Fetch the page once and print the counts without touching Discord
    Check,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging from the verbosity flag or the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Log a command failure once and map it to the process exit code.
fn finish(command: &str, result: Result<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{} failed ({} error): {}", command, e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, "info");
            log::error!("Invalid configuration {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.verbose, &config.logging.level);
    log::info!("Loaded configuration from {}", cli.config.display());

    let name = match cli.command {
        Command::Run => "run",
        Command::Check => "check",
        Command::Validate => "validate",
    };
    finish(name, execute(cli.command, Arc::new(config)).await)
}

async fn execute(command: Command, config: Arc<Config>) -> Result<ExitCode> {
    let pages = Arc::new(HttpPageSource::new(&config.http)?);

    match command {
        Command::Validate => {
            log::info!("✓ Config OK");
            Ok(ExitCode::SUCCESS)
        }

        Command::Check => {
            let counts = pipeline::fetch_counts(&*pages, &config).await?;
            log::info!("Member count: {}", counts.total);
            for (i, count) in counts.worlds.iter().enumerate() {
                log::info!("    World {}: {}", i + 1, count);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Run => {
            let token = config.discord.resolve_token()?;
            let chat = Arc::new(DiscordClient::connect(&config.discord, &config.http, token).await?);

            let mut scheduler = PollScheduler::new(Arc::clone(&config), pages, chat);
            let stop = scheduler.stop_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupt received, stopping after the current cycle...");
                    stop.stop();
                }
            });

            log::info!(
                "Tracking {} every {}s in channel {}",
                config.url,
                config.poll_rate,
                config.channel_id
            );
            let Ok(report) = scheduler.run().await else {
                // Acquisition failure, already logged by the scheduler
                return Ok(ExitCode::FAILURE);
            };
            log::info!(
                "Ran {} cycles, {} updates; last count {:?}",
                report.cycles,
                report.pushes,
                report.state.cached_count
            );

            match report.stop {
                StopReason::Requested => Ok(ExitCode::SUCCESS),
                // Already logged by the scheduler
                StopReason::CycleFailed(_) => Ok(ExitCode::FAILURE),
            }
        }
    }
}
