//! podsim daemon
//!
//! Serves the podsim REST API over in-memory scenario and run stores.

use clap::Parser;
use podsim_api::{cors_layer, create_router, AppState};
use podsim_core::DaemonConfig;
use podsim_store::{RunStore, ScenarioStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// podsimd - pod placement simulator API server
#[derive(Parser, Debug)]
#[command(name = "podsimd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the API server
    #[arg(long)]
    address: Option<String>,

    /// Port for the REST API server
    #[arg(long, env = "PODSIM_PORT")]
    port: Option<u16>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Result<DaemonConfig, podsim_core::PodsimError> {
    let mut config = match &args.config {
        Some(path) => DaemonConfig::from_file(path)?,
        None => DaemonConfig::default(),
    };

    if let Some(address) = &args.address {
        config.api.address = address.clone();
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting podsim daemon v{}", env!("CARGO_PKG_VERSION"));

    // Create stores
    let scenarios = Arc::new(ScenarioStore::new());
    let runs = Arc::new(RunStore::new(config.storage.max_runs));
    let state = Arc::new(AppState::new(
        scenarios.clone(),
        runs.clone(),
        config.scheduler.default_strategy,
    ));

    // Create API router
    let mut router = create_router(state);
    if config.api.cors_enabled {
        router = router.layer(cors_layer(&config.api));
    }

    // Bind and serve
    let addr: SocketAddr = match format!("{}:{}", config.api.address, config.api.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(
                address = %config.api.address,
                port = config.api.port,
                error = %e,
                "Invalid address"
            );
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        %addr,
        default_strategy = %config.scheduler.default_strategy,
        max_runs = config.storage.max_runs,
        "API server listening"
    );

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    info!(
        scenarios = scenarios.len().await,
        runs = runs.len().await,
        "Stores released, daemon stopped"
    );
}
