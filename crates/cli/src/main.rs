mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crawler_core::{load_config, validate_config};

/// Infinite-scroll catalog crawler
#[derive(Debug, Parser)]
#[command(name = "crawler", version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "CRAWLER_CONFIG", default_value = "crawler.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scroll the catalog feed and write newly discovered links as a batch
    Links,
    /// Visit the next batch of detail pages and store their records
    Details,
    /// Print store statistics
    Stats,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Database path: {:?}", config.database.path);

    match cli.command {
        Command::Links => commands::links(&config).await,
        Command::Details => commands::details(&config).await,
        Command::Stats => commands::stats(&config),
    }
}
