//! `launchpad-api` -- the long-running web server.
//!
//! Normally started by the `launchpad` orchestrator at handoff, which
//! passes `--bind`, `--workers` and `--timeout`. Exits with code 40 if
//! the listen address cannot be bound.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use launchpad_core::error::EXIT_BIND;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use launchpad_api::config::ServerConfig;
use launchpad_api::state::AppState;
use launchpad_api::{app, server};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launchpad_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::parse();
    tracing::info!(
        bind = %config.bind,
        workers = config.workers,
        timeout_secs = ?config.request_timeout().map(|d| d.as_secs()),
        "Loaded server configuration",
    );

    // --- Runtime ---
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> ExitCode {
    // --- Database ---
    let pool = match launchpad_db::create_pool(&config.database_url, config.database_max_connections)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Database connection pool created");

    // --- Listener (bound before anything is served) ---
    let listener = match server::bind(&config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listen address");
            return ExitCode::from(EXIT_BIND as u8);
        }
    };

    let request_timeout = config.request_timeout();
    let state = AppState {
        pool,
        config: Arc::new(config),
    };
    let app = app::build_router(state, request_timeout);

    match listener.local_addr() {
        Ok(addr) => tracing::info!(%addr, "Starting server"),
        Err(_) => tracing::info!("Starting server"),
    }

    if let Err(e) = server::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Graceful shutdown complete");
    ExitCode::SUCCESS
}
