use std::time::Duration;

use clap::Parser;

/// Server configuration from command-line flags, falling back to
/// environment variables.
///
/// The flags follow the usual `--bind/--workers/--timeout` convention so
/// the orchestrator can hand off to this binary or any compatible server.
///
/// | Flag          | Env Var                    | Default        |
/// |---------------|----------------------------|----------------|
/// | `--bind`      | `BIND_ADDRESS`             | `0.0.0.0:9999` |
/// | `--workers`   | `WORKERS`                  | `1`            |
/// | `--timeout`   | `TIMEOUT_SECONDS`          | unlimited      |
/// | `--database-url` | `DATABASE_URL`          | required       |
/// | `--database-max-connections` | `DATABASE_MAX_CONNECTIONS` | `20` |
#[derive(Debug, Clone, Parser)]
#[command(name = "launchpad-api", version, about = "Launchpad web server")]
pub struct ServerConfig {
    /// Address to listen on, as `host:port`.
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:9999")]
    pub bind: String,

    /// Number of runtime worker threads.
    #[arg(long, env = "WORKERS", default_value_t = 1, value_parser = parse_workers)]
    pub workers: usize,

    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long, env = "TIMEOUT_SECONDS")]
    pub timeout: Option<u64>,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 20)]
    pub database_max_connections: u32,
}

impl ServerConfig {
    /// Request timeout to enforce, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

fn parse_workers(raw: &str) -> Result<usize, String> {
    let workers: usize = raw
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if workers == 0 {
        return Err("worker count must be at least 1".to_string());
    }
    Ok(workers)
}
