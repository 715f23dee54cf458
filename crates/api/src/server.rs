//! Listener binding and the serve loop.

use std::io;

use axum::Router;
use launchpad_core::error::BindError;
use tokio::net::TcpListener;

/// Bind `address` (`host:port`), mapping failures onto [`BindError`].
///
/// Nothing is served until the returned listener is passed to [`serve`],
/// so a bind failure is always reported before any request is accepted.
pub async fn bind(address: &str) -> Result<TcpListener, BindError> {
    TcpListener::bind(address).await.map_err(|e| classify(address, e))
}

/// Serve `app` on `listener` until SIGINT or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn classify(address: &str, err: io::Error) -> BindError {
    match err.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::NotFound => BindError::InvalidAddress {
            address: address.to_string(),
            reason: err.to_string(),
        },
        _ => BindError::Unavailable {
            address: address.to_string(),
            reason: err.to_string(),
        },
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly under a container runtime or process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
