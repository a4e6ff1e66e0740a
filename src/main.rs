//! Prediction server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server ──▶ http::parser ──▶ http::body
//!                                                                            │
//!                                                                            ▼
//!     Client Response                                                  routing::router
//!     ◀────────────── http::response ◀── predict::handlers ◀─────────────────┘
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```
//!
//! One request per connection, one task per connection, connection closed
//! after the response.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use predict_server::config::{self, ServerConfig};
use predict_server::lifecycle::{self, signals, Shutdown};
use predict_server::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "predict-server", version)]
#[command(about = "Numeric prediction endpoint on a minimal HTTP/1.1 server", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port (takes precedence over PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the interface to bind.
    #[arg(long)]
    host: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "predict-server starting");

    if let Err(errors) = config::validation::validate_config(&config) {
        let err = config::ConfigError::Validation(errors);
        tracing::error!(error = %err, "Invalid configuration");
        return Err(err.into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        backlog = config.listener.backlog,
        max_connections = ?config.listener.max_connections,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let grace = Duration::from_secs(config.lifecycle.shutdown_grace_secs);
    let (server, listener) = match lifecycle::start(config).await {
        Ok(started) => started,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };
    let tracker = server.tracker();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match signals::wait_for_termination().await {
            Ok(()) => trigger.trigger(),
            Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
        }
    });

    server.run(listener, server_shutdown).await?;

    if !tracker.drain(grace).await {
        tracing::warn!(
            active_connections = tracker.active_count(),
            "Shutdown grace period elapsed with connections still open"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
