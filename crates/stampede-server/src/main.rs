#![doc = include_str!("../README.md")]

mod server;

use std::sync::atomic::Ordering;

use clap::Parser;
use server::api::{self, AppState};
use server::config::{CliArgs, ServerConfig};
use server::telemetry::{TelemetryProviders, init_telemetry};
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let state = AppState::new(config.clone());
    let app = api::router(state.clone());

    let listener = TcpListener::bind(config.addr).await?;
    // Pass health checks only once the listener is actually accepting.
    state.healthy.store(true, Ordering::Relaxed);
    log_startup_info(&listener.local_addr()?, &config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state, providers))
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(addr: &std::net::SocketAddr, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting traffic service on {} with full config: {:#?}",
            addr,
            config
        );
    } else {
        tracing::info!(
            "Starting traffic service on {} (pool cap {})",
            addr,
            config.max_pool_size
        );
    }
}

async fn shutdown_signal(state: AppState, _providers: TelemetryProviders) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");

    // 1. Publish the status
    state.healthy.store(false, Ordering::Relaxed);

    // 2. Flush any collected metrics
    #[cfg(feature = "metrics")]
    {
        if let Err(err) = _providers.meter_provider.force_flush() {
            eprintln!("Error flushing metrics: {err:#?}");
        }
        if let Err(err) = _providers.meter_provider.shutdown() {
            eprintln!("Error shutting down meter: {err:#?}");
        }
    }
}
