//! privx scheduler binary entry point.
//!
//! Loads TOML configuration, applies the `MINER_URLS` override, starts the
//! health probe and the HTTP surface, and shuts down gracefully on ctrl-c.

use anyhow::Result;
use clap::Parser;
use privx_scheduler::SchedulerConfig;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Committee dispatch and consensus scheduler.
#[derive(Debug, Parser)]
#[command(name = "privx-scheduler", version)]
struct Cli {
    /// Path to the TOML config. Defaults apply if the file does not exist.
    #[arg(short, long, default_value = "scheduler.toml")]
    config: PathBuf,
    /// Override `[server] bind`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = if cli.config.exists() {
        let config = SchedulerConfig::load(&cli.config)?;
        tracing::info!("loaded configuration from {}", cli.config.display());
        config
    } else {
        tracing::info!("{} not found, using defaults", cli.config.display());
        SchedulerConfig::default()
    };
    config.apply_env();
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    config.validate()?;
    tracing::info!(
        workers = config.workers.urls.len(),
        image = config.committee.image,
        video = config.committee.video,
        "scheduler configured"
    );

    let handle = privx_scheduler::serve(&config).await?;
    shutdown_signal().await;
    handle.shutdown().await?;
    tracing::info!("scheduler shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
}
