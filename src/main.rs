//! Telemetry load generator.
//!
//! Drives synthetic traffic into a message queue at a controllable rate,
//! with injected failures, latency and corrupted payloads, so a telemetry
//! pipeline downstream has something realistic to observe.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 LOAD GENERATOR                │
//!   control client   │  ┌────────┐    ┌────────────────┐             │
//!   ─────────────────┼─▶│  http  │───▶│ ControlSurface │             │
//!   (curl, CLI)      │  │ server │    │ config + state │             │
//!                    │  └────────┘    └───────┬────────┘             │
//!                    │                        │ start/stop           │
//!                    │                        ▼                      │
//!                    │                ┌────────────────┐             │
//!                    │                │    RunLoop     │             │
//!                    │                │ rate + faults  │             │
//!                    │                └───────┬────────┘             │
//!                    │                        │        invoke-once   │
//!                    │                        ▼             │        │
//!                    │                ┌────────────────┐    │        │    SQS
//!                    │                │  SendGateway   │◀───┘  ──────┼──▶ queue
//!                    │                └────────────────┘             │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use telemetry_loadgen::config::load_config;
use telemetry_loadgen::http::HttpServer;
use telemetry_loadgen::lifecycle::{shutdown_signal, startup, Shutdown};
use telemetry_loadgen::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "telemetry-loadgen")]
#[command(about = "Synthetic traffic generator with fault injection", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!("telemetry-loadgen v{} starting", env!("CARGO_PKG_VERSION"));

    // Installed before the engine so its initial gauges are recorded.
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let control = match startup::build_control(&config).await {
        Ok(control) => control,
        Err(e) => {
            tracing::error!(error = %e, "FATAL: invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        queue_url = config.queue.url.as_deref().unwrap_or_default(),
        region = %config.queue.region,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for control requests");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(control.clone(), &config);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let server_result = tokio::select! {
        result = &mut server_task => result,
        _ = shutdown_signal() => {
            shutdown.trigger();
            (&mut server_task).await
        }
    };

    match server_result {
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server error"),
        Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
        Ok(Ok(())) => {}
    }

    control
        .shutdown(Duration::from_secs(config.shutdown.grace_secs))
        .await;

    tracing::info!("Shutdown complete");
    Ok(())
}
