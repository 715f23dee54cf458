//! `launchpad` -- container bootstrap orchestrator.
//!
//! Runs, strictly in order: dependency installation, schema migration,
//! admin provisioning, then hands the process over to the web server.
//! The first failing stage ends the run with a stage-specific exit code.
//!
//! # Exit codes
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 2    | configuration could not be loaded         |
//! | 3    | invalid stage list                        |
//! | 10   | dependency installation failed            |
//! | 20   | schema migration failed                   |
//! | 30   | admin provisioning failed                 |
//! | 40   | server handoff failed (bind / exec)       |
//!
//! See `launchpad_core::config` for the environment variables read.

use std::process::ExitCode;

use launchpad_bootstrap::pipeline;
use launchpad_core::config::BootstrapConfig;
use launchpad_core::error::{EXIT_CONFIG, EXIT_PLAN};
use launchpad_core::sequencer;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "launchpad=info,launchpad_bootstrap=info,launchpad_core=info,launchpad_db=info,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match BootstrapConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, exit_code = EXIT_CONFIG, "Invalid configuration");
            return exit_code(EXIT_CONFIG);
        }
    };

    tracing::info!(
        bind = %config.bind_address,
        workers = config.workers,
        timeout_secs = ?config.timeout_seconds,
        dependency_commands = config.dependency_commands.len(),
        "Loaded bootstrap configuration",
    );

    let stages = pipeline::stages(&config);

    let run = match sequencer::run(&stages).await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!(error = %e, exit_code = EXIT_PLAN, "Invalid stage list");
            return exit_code(EXIT_PLAN);
        }
    };

    match run.failure_cause() {
        Some(failure) => {
            tracing::error!(
                stage = %failure.stage,
                error = %failure.error,
                exit_code = failure.exit_code(),
                elapsed_ms = run.elapsed().as_millis() as u64,
                "Bootstrap aborted",
            );
            exit_code(failure.exit_code())
        }
        // A successful handoff never returns, so this is not reached in
        // production.
        None => ExitCode::SUCCESS,
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
