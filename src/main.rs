use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use floodgate::admission::{AdmissionEngine, EvictionSweeper};
use floodgate::config::FloodgateConfig;
use floodgate::http::HttpServer;

/// Sliding-window admission control service.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on (overrides the config file)
    #[arg(long)]
    listen_addr: Option<SocketAddr>,

    /// Seconds between eviction sweeps (overrides the config file)
    #[arg(long)]
    sweep_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Floodgate Admission Control Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => FloodgateConfig::from_file(path)?,
        None => FloodgateConfig::default(),
    };
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }
    if let Some(secs) = args.sweep_interval_secs {
        config.engine.sweep_interval_secs = secs;
    }
    info!(listen_addr = %config.server.listen_addr, "Configuration loaded");

    // Initialize the admission engine
    let engine = Arc::new(AdmissionEngine::with_default_config(
        config.engine.window_config()?,
    ));
    info!(
        default_window_secs = config.engine.default_window_secs,
        default_limit = config.engine.default_limit,
        "Admission engine initialized"
    );

    // Start the eviction sweeper
    let sweep_interval = config.engine.sweep_interval()?;
    let sweeper = EvictionSweeper::new(engine.clone(), sweep_interval).spawn();
    info!(
        interval_secs = sweep_interval.as_secs(),
        "Eviction sweeper started"
    );

    // Run the server with graceful shutdown on Ctrl+C
    let server = HttpServer::new(config.server.listen_addr, engine);
    server.serve_with_shutdown(shutdown_signal()).await?;

    sweeper.abort();
    info!("Floodgate Admission Control Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
