//! Auxiliary runtime dependency installation.
//!
//! Runs the installer commands configured in `DEPENDENCY_COMMANDS`
//! (for example `playwright install --with-deps chromium`) one after
//! another. Which commands run is deployment configuration; an empty
//! list is a successful no-op. Idempotence is the installer's contract:
//! these tools skip artifacts that are already present.

use std::process::Stdio;

use launchpad_core::error::DependencyError;
use tokio::process::Command;

/// Run every installer command in order, stopping at the first failure.
pub async fn ensure_dependencies(commands: &[String]) -> Result<(), DependencyError> {
    if commands.is_empty() {
        tracing::info!("No dependency commands configured, nothing to install");
        return Ok(());
    }

    for command in commands {
        run_installer(command).await?;
    }
    Ok(())
}

/// Run a single installer command.
///
/// The command is split on whitespace and executed directly, never
/// through a shell; arguments cannot contain quoted spaces.
async fn run_installer(command: &str) -> Result<(), DependencyError> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| DependencyError::Malformed(format!("empty command '{command}'")))?;

    tracing::info!(command, "Running dependency installer");
    let start = std::time::Instant::now();

    let status = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| DependencyError::Spawn {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    if !status.success() {
        tracing::error!(command, code = ?status.code(), elapsed_ms, "Dependency installer failed");
        return Err(DependencyError::NonZeroExit {
            command: command.to_string(),
            code: status.code(),
        });
    }

    tracing::info!(command, elapsed_ms, "Dependency installer finished");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn commands(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_command_list_is_a_no_op() {
        assert!(ensure_dependencies(&[]).await.is_ok());
    }

    #[tokio::test]
    async fn successful_commands_pass() {
        assert!(ensure_dependencies(&commands(&["true", "true --ignored-arg"]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_with_its_code() {
        let err = ensure_dependencies(&commands(&["true", "false"]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DependencyError::NonZeroExit {
                command: "false".into(),
                code: Some(1),
            }
        );
    }

    #[tokio::test]
    async fn missing_installer_is_a_spawn_error() {
        assert_matches!(
            ensure_dependencies(&commands(&["definitely-not-an-installer-binary"])).await,
            Err(DependencyError::Spawn { command, .. }) if command == "definitely-not-an-installer-binary"
        );
    }

    #[tokio::test]
    async fn blank_command_is_malformed() {
        assert_matches!(
            ensure_dependencies(&commands(&["   "])).await,
            Err(DependencyError::Malformed(_))
        );
    }
}
