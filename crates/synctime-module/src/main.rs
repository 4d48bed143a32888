//! sync-at-time - serves the time-window sync sensor
//!
//! This is the entry point for the module process. It wires together:
//! - Configuration loading
//! - Explicit model registration
//! - Component construction and periodic readings
//! - Reload on SIGHUP, graceful close on SIGINT/SIGTERM

mod service;

use anyhow::{Context, Result};
use clap::Parser;
use service::Service;
use std::path::PathBuf;
use std::time::Duration;
use synctime_host_api::Registry;
use synctime_util::default_config_path;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// sync-at-time - report whether uploads should run right now
#[derive(Parser, Debug)]
#[command(name = "sync-at-time")]
#[command(about = "Time-window sync sensor for data upload scheduling", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/sync-at-time/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Override the configured poll interval, in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: Option<u64>,

    /// Print one reading per component as JSON and exit
    #[arg(long)]
    once: bool,
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

async fn run(mut service: Service, poll_override: Option<Duration>) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())
        .context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt())
        .context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup())
        .context("Failed to create SIGHUP handler")?;

    let mut period = poll_override.unwrap_or(service.poll_interval());
    let mut ticker = tokio::time::interval(period);

    info!(poll_interval_secs = period.as_secs(), "Module running");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }

            // SIGHUP - reload configuration
            _ = sighup.recv() => {
                info!("Received SIGHUP, reloading configuration");
                if let Err(e) = service.reload() {
                    error!(error = %format!("{:#}", e), "Reload failed, keeping current components");
                    continue;
                }

                let next = poll_override.unwrap_or(service.poll_interval());
                if next != period {
                    period = next;
                    ticker = tokio::time::interval(period);
                    info!(poll_interval_secs = period.as_secs(), "Poll interval changed");
                }
            }

            _ = ticker.tick() => {
                service.poll();
            }
        }
    }

    service.shutdown();
    info!("Shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mock_time = synctime_util::is_mock_time_active(),
        "sync-at-time starting"
    );

    let mut registry = Registry::new();
    synctime_core::register(&mut registry).context("Failed to register models")?;

    let mut service = Service::load(registry, &args.config)?;
    info!(components = ?service.component_names(), "Components ready");

    if args.once {
        println!("{}", serde_json::to_string_pretty(&service.snapshot())?);
        service.shutdown();
        return Ok(());
    }

    run(service, args.poll_interval.map(Duration::from_secs)).await
}
