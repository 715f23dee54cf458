//! Bootstrap configuration loaded from environment variables.
//!
//! | Env Var                    | Default                          |
//! |----------------------------|----------------------------------|
//! | `BIND_ADDRESS`             | `0.0.0.0:9999`                   |
//! | `WORKERS`                  | `1`                              |
//! | `TIMEOUT_SECONDS`          | unset (no request timeout)       |
//! | `ADMIN_USERNAME`           | unset                            |
//! | `ADMIN_PASSWORD`           | unset                            |
//! | `ADMIN_EMAIL`              | unset                            |
//! | `DATABASE_URL`             | required                         |
//! | `DATABASE_MAX_CONNECTIONS` | `5`                              |
//! | `DEPENDENCY_COMMANDS`      | empty (`;`-separated commands)   |
//! | `SERVER_COMMAND`           | `launchpad-api` beside this binary |
//!
//! The bind address is kept as a raw string here; it is validated at
//! handoff so a bad address is reported as a bind failure. Missing admin
//! credentials are likewise reported by the provisioning stage.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9999";
pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Separator between entries of `DEPENDENCY_COMMANDS`.
pub const DEPENDENCY_COMMAND_SEPARATOR: char = ';';

/// Admin credentials exactly as configured, before validation.
#[derive(Clone, Default)]
pub struct AdminCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .finish()
    }
}

/// Everything the orchestrator needs to run its stages.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// `host:port` the server is handed off to.
    pub bind_address: String,
    /// Server worker threads.
    pub workers: usize,
    /// Per-request timeout. `None` and `Some(0)` both mean unlimited.
    pub timeout_seconds: Option<u64>,
    pub admin: AdminCredentials,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Installer commands run by the dependency stage, in order.
    pub dependency_commands: Vec<String>,
    /// Program (and leading args) to exec at handoff.
    pub server_command: Option<String>,
}

impl BootstrapConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_address = var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into());

        let workers = match var("WORKERS") {
            Some(raw) => parse("WORKERS", &raw)?,
            None => DEFAULT_WORKERS,
        };

        let timeout_seconds = var("TIMEOUT_SECONDS")
            .map(|raw| parse::<u64>("TIMEOUT_SECONDS", &raw))
            .transpose()?;

        let admin = AdminCredentials {
            username: var("ADMIN_USERNAME").map(|v| v.trim().to_string()),
            password: var("ADMIN_PASSWORD"),
            email: var("ADMIN_EMAIL").map(|v| v.trim().to_string()),
        };

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse("DATABASE_MAX_CONNECTIONS", &raw)?,
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };

        let dependency_commands = var("DEPENDENCY_COMMANDS")
            .map(|raw| split_commands(&raw))
            .unwrap_or_default();

        let server_command = var("SERVER_COMMAND").map(|v| v.trim().to_string());

        Ok(Self {
            bind_address,
            workers,
            timeout_seconds,
            admin,
            database_url,
            database_max_connections,
            dependency_commands,
            server_command,
        })
    }

    /// Request timeout to enforce, if any. Zero means no timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Split a `;`-separated command list, dropping blank entries.
pub fn split_commands(raw: &str) -> Vec<String> {
    raw.split(DEPENDENCY_COMMAND_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
