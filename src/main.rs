//! plexsubsync - preferred stream selection for Plex libraries
//!
//! # Usage
//!
//! ```bash
//! export PLEX_URL=http://127.0.0.1:32400
//! export PLEX_TOKEN=xxxxxxxxxxxxxxxxxxxx
//! plexsubsync --library Animes --audio-lang Japanese --sub-lang French
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plexsubsync::cli::{Cli, ExitCode, Output};
use plexsubsync::config::{Config, ConfigError, Settings};
use plexsubsync::{driver, PlexClient};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::InvalidConfig.into();
        }
    };

    match run(settings, cli.quiet).await {
        Ok(code) => code.into(),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::Error.into()
        }
    }
}

/// Merge config file, environment and flags
fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env()?;
    config.apply_cli(cli);
    config.resolve()
}

/// Connect, enumerate the library and process every show
async fn run(settings: Settings, quiet: bool) -> Result<ExitCode> {
    let (client, identity) =
        match PlexClient::connect(&settings.plex_url, &settings.plex_token).await {
            Ok(connected) => connected,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(ExitCode::ConnectionError);
            }
        };
    info!("Server: {} {}", identity.friendly_name, identity.version);

    let section = match client.library_section(&settings.library).await {
        Ok(section) => section,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::ConnectionError);
        }
    };

    let shows = client
        .all_shows(&section)
        .await
        .with_context(|| format!("Failed to list shows of '{}'", section.title))?;

    let mut output = Output::new(std::io::stdout(), quiet);
    driver::run_to_output(
        &client,
        &shows,
        &settings.preferences,
        settings.max_workers,
        &mut output,
    )
    .await
    .context("Failed to write report")?;

    Ok(ExitCode::Success)
}

fn init_tracing(cli: &Cli) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
