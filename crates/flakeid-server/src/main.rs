//! # `flakeid-server`
//!
//! Serves one 64-bit Snowflake-style ID per `GET /id64` request.
//!
//! ```bash
//! MACHINE_ID=1 cargo run -p flakeid-server --release
//! curl http://127.0.0.1:8080/id64
//! # {"numeric":1953540352790528,"string":"1953540352790528"}
//! ```

mod server;

use anyhow::Context;
use clap::Parser;
use flakeid::TimeSource;
use server::config::{CliArgs, ServerConfig};
use server::service::{Clock, IdGenerator, handler::router};
use server::telemetry::init_telemetry;
use std::sync::Arc;
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
    let config = ServerConfig::try_from(args).context("configuration error")?;

    let providers = init_telemetry(config.log_level)?;

    let clock = Clock::with_epoch(config.epoch).context("failed to start clock")?;
    let generator = IdGenerator::new(config.machine_id, clock.clone())
        .context("failed to initialize sequence")?;

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    log_startup_info(&config, &clock);

    axum::serve(listener, router(Arc::new(generator)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Service shut down successfully");
    providers.shutdown();
    Ok(())
}

fn log_startup_info(config: &ServerConfig, clock: &Clock) {
    if cfg!(debug_assertions) {
        tracing::debug!("Full config: {:#?}", config);
    }
    tracing::info!("Machine ID = {}", config.machine_id);
    tracing::info!("Current time: {}", clock.current_millis());
    tracing::info!("Starting http server on {}", config.listen);
}

async fn shutdown_signal() {
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
}
