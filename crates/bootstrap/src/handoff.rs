//! Service handoff.
//!
//! The last stage of the bootstrap replaces the orchestrator with the
//! long-running server. On Unix the process image is replaced with
//! `exec`, so the server inherits the PID, environment and stdio and a
//! container runtime's signals reach it directly. Elsewhere the server
//! runs as a supervised child and the orchestrator exits with the
//! child's exit code.
//!
//! Address and worker validation, plus a probe bind of the address,
//! happen before the server starts, so a bad or occupied address is a
//! [`BindError`] reported before any request could be accepted.

use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::path::PathBuf;

use launchpad_core::config::BootstrapConfig;
use launchpad_core::error::BindError;
use launchpad_core::sequencer::marker;

/// Default server binary, looked up beside the orchestrator binary.
pub const DEFAULT_SERVER_BINARY: &str = "launchpad-api";

/// Everything needed to start the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffTarget {
    pub bind_address: String,
    pub workers: usize,
    /// `None` or `Some(0)` leaves requests without a timeout.
    pub timeout_seconds: Option<u64>,
    pub program: String,
    /// Leading arguments placed before the bind/worker/timeout flags.
    pub args: Vec<String>,
}

impl HandoffTarget {
    /// Build the target from bootstrap configuration.
    ///
    /// `SERVER_COMMAND` is split on whitespace into program and leading
    /// arguments; without it the bundled `launchpad-api` binary is used.
    pub fn from_config(config: &BootstrapConfig) -> Self {
        let mut parts = config
            .server_command
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string);

        let (program, args) = match parts.next() {
            Some(program) => (program, parts.collect()),
            None => (default_server_program(), Vec::new()),
        };

        Self {
            bind_address: config.bind_address.clone(),
            workers: config.workers,
            timeout_seconds: config.timeout_seconds,
            program,
            args,
        }
    }

    /// Check the input constraints and resolve the bind address.
    pub fn validate(&self) -> Result<SocketAddr, BindError> {
        if self.workers == 0 {
            return Err(BindError::InvalidWorkers(self.workers));
        }

        let invalid = |reason: String| BindError::InvalidAddress {
            address: self.bind_address.clone(),
            reason,
        };

        let mut addrs = self
            .bind_address
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?;
        addrs
            .next()
            .ok_or_else(|| invalid("address resolved to nothing".to_string()))
    }

    /// Full argument list passed to the server program.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--bind".to_string(),
            self.bind_address.clone(),
            "--workers".to_string(),
            self.workers.to_string(),
        ]);
        if let Some(timeout) = self.timeout_seconds {
            args.extend(["--timeout".to_string(), timeout.to_string()]);
        }
        args
    }
}

/// Replace this process with the server described by `target`.
///
/// Never returns on success. Returns a [`BindError`] if the address is
/// invalid or already in use, or if the server program cannot be started.
pub async fn handoff(target: &HandoffTarget) -> Result<Infallible, BindError> {
    let addr = target.validate()?;
    probe_bind(addr, &target.bind_address)?;

    let args = target.command_args();
    tracing::info!(
        program = %target.program,
        args = ?args,
        bind = %target.bind_address,
        workers = target.workers,
        timeout_secs = ?target.timeout_seconds,
        "{}",
        marker("handoff", "transferring control to server"),
    );

    start_server(target, args).await
}

/// Bind and immediately release `addr` so an occupied port is reported
/// here rather than by the server after the orchestrator is gone.
fn probe_bind(addr: SocketAddr, address: &str) -> Result<(), BindError> {
    TcpListener::bind(addr)
        .map(drop)
        .map_err(|e| BindError::Unavailable {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(unix)]
async fn start_server(target: &HandoffTarget, args: Vec<String>) -> Result<Infallible, BindError> {
    use std::os::unix::process::CommandExt;

    // `exec` only returns if the image could not be replaced.
    let err = std::process::Command::new(&target.program).args(&args).exec();
    Err(BindError::Exec {
        program: target.program.clone(),
        reason: err.to_string(),
    })
}

#[cfg(not(unix))]
async fn start_server(target: &HandoffTarget, args: Vec<String>) -> Result<Infallible, BindError> {
    let mut child = tokio::process::Command::new(&target.program)
        .args(&args)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BindError::Exec {
            program: target.program.clone(),
            reason: e.to_string(),
        })?;

    let status = tokio::select! {
        status = child.wait() => status,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, stopping server");
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "Failed to stop server");
            }
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            tracing::error!(error = %e, "Lost track of server process");
            1
        }
    };
    tracing::info!(code, "Server exited");
    std::process::exit(code)
}

fn default_server_program() -> String {
    let binary = format!("{DEFAULT_SERVER_BINARY}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .map(|exe| exe.with_file_name(&binary))
        .filter(|path| path.exists())
        .map(PathBuf::into_os_string)
        .and_then(|path| path.into_string().ok())
        .unwrap_or(binary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(bind: &str, workers: usize, timeout: Option<u64>) -> HandoffTarget {
        HandoffTarget {
            bind_address: bind.to_string(),
            workers,
            timeout_seconds: timeout,
            program: "launchpad-api".to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn command_args_follow_bind_workers_timeout_convention() {
        let mut s = target("0.0.0.0:9999", 4, Some(600));
        s.args = vec!["--preload".to_string()];
        assert_eq!(
            s.command_args(),
            vec!["--preload", "--bind", "0.0.0.0:9999", "--workers", "4", "--timeout", "600"]
        );
    }

    #[test]
    fn unset_timeout_is_not_passed() {
        let args = target("0.0.0.0:9999", 1, None).command_args();
        assert!(!args.contains(&"--timeout".to_string()));
    }

    #[test]
    fn validate_resolves_socket_address() {
        let addr = target("127.0.0.1:8000", 2, None).validate().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn validate_rejects_zero_workers() {
        assert_eq!(
            target("127.0.0.1:8000", 0, None).validate(),
            Err(BindError::InvalidWorkers(0))
        );
    }

    #[test]
    fn server_command_splits_into_program_and_args() {
        let config = launchpad_core::config::BootstrapConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://db/app".to_string()),
            "SERVER_COMMAND" => Some("/opt/app/bin/server --preload".to_string()),
            "WORKERS" => Some("4".to_string()),
            _ => None,
        })
        .unwrap();

        let target = HandoffTarget::from_config(&config);
        assert_eq!(target.program, "/opt/app/bin/server");
        assert_eq!(target.args, vec!["--preload"]);
        assert_eq!(target.workers, 4);
        assert_eq!(target.bind_address, "0.0.0.0:9999");
    }

    #[test]
    fn default_program_is_the_bundled_server() {
        let config = launchpad_core::config::BootstrapConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://db/app".to_string())
        })
        .unwrap();

        let target = HandoffTarget::from_config(&config);
        assert!(target.program.contains(DEFAULT_SERVER_BINARY));
        assert!(target.args.is_empty());
    }
}
