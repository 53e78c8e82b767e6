//! endpoint-watch daemon
//!
//! # Architecture Overview
//!
//! ```text
//!   watch-cli / browser
//!          │
//!          ▼
//!   ┌──────────────┐     ┌────────────────────────────────────────────┐
//!   │     api      │────▶│               MonitorService               │
//!   │ axum + auth  │     │  ┌──────────┐  ┌────────────┐  ┌────────┐ │
//!   └──────────────┘     │  │ registry │  │ scheduler  │─▶│dispatch│─┼──▶ probe (HTTP / TCP)
//!                        │  │ + store  │  └────────────┘  └───┬────┘ │
//!   ┌──────────────┐     │  └──────────┘                 ┌───▼────┐ │
//!   │ config watch │────▶│                               │ cache  │ │
//!   └──────────────┘     │                               └────────┘ │
//!                        └────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use endpoint_watch::api::{self, AppState};
use endpoint_watch::config::{load_or_default, watcher::ConfigWatcher, MonitorConfig};
use endpoint_watch::lifecycle::{bootstrap, shutdown_signal, Shutdown};
use endpoint_watch::observability::{logging, metrics};
use endpoint_watch::MonitorService;

#[derive(Parser)]
#[command(name = "endpoint-watch")]
#[command(about = "Monitors websites and SSH hosts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "endpoint-watch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(&cli.config)?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "endpoint-watch starting");

    tracing::info!(
        config_path = %cli.config.display(),
        polling_enabled = config.polling.enabled,
        interval_ms = config.polling.interval_ms,
        api_enabled = config.api.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = bootstrap(&config).await?;
    let shutdown = Shutdown::new();

    let api_task = if config.api.enabled {
        let listener = tokio::net::TcpListener::bind(&config.api.bind_address).await?;
        let state = AppState::new(service.clone(), config.api.api_key.as_str());
        let timeout = std::time::Duration::from_secs(config.api.request_timeout_secs);
        let stop = shutdown.notified();
        Some(tokio::spawn(async move {
            if let Err(e) = api::serve(listener, state, timeout, stop).await {
                tracing::error!(error = %e, "Management API failed");
            }
        }))
    } else {
        None
    };

    // Keep the watcher alive for the lifetime of the process.
    let _watcher = if cli.config.exists() {
        match ConfigWatcher::new(&cli.config, config.clone()).spawn() {
            Ok((watcher, updates)) => {
                tokio::spawn(apply_config_updates(service.clone(), config.clone(), updates, shutdown.clone()));
                Some(watcher)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload unavailable");
                None
            }
        }
    } else {
        None
    };

    shutdown_signal().await;
    shutdown.trigger();

    service.stop_polling();
    if let Some(task) = api_task {
        let _ = task.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Apply polling changes from reloaded configuration files.
async fn apply_config_updates(
    service: std::sync::Arc<MonitorService>,
    mut current: MonitorConfig,
    mut updates: tokio::sync::mpsc::UnboundedReceiver<MonitorConfig>,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            update = updates.recv() => {
                let Some(next) = update else { break };
                let polling_changed = next.polling.enabled != current.polling.enabled
                    || next.polling.interval_ms != current.polling.interval_ms;
                if polling_changed {
                    if next.polling.enabled {
                        service.poll_registry(next.polling.interval());
                    } else {
                        service.stop_polling();
                    }
                    tracing::info!(
                        enabled = next.polling.enabled,
                        interval_ms = next.polling.interval_ms,
                        "Polling configuration applied"
                    );
                }

                let mut rest = next.clone();
                rest.polling.enabled = current.polling.enabled;
                rest.polling.interval_ms = current.polling.interval_ms;
                if rest != current {
                    tracing::warn!("Only polling enabled/interval_ms apply without a restart");
                }
                current = next;
            }
        }
    }
}
