//! Error taxonomy for the bootstrap sequence.
//!
//! Every stage reports failure through its own error type. [`StageError`]
//! unifies them so the sequencer can carry one cause, and maps each kind
//! to a distinct process exit code for operators.

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Configuration could not be loaded before any stage ran.
pub const EXIT_CONFIG: i32 = 2;

/// The stage list itself was invalid (empty or duplicate names).
pub const EXIT_PLAN: i32 = 3;

pub const EXIT_DEPENDENCY: i32 = 10;
pub const EXIT_MIGRATION: i32 = 20;
pub const EXIT_PROVISIONING: i32 = 30;
pub const EXIT_BIND: i32 = 40;

// ---------------------------------------------------------------------------
// Stage errors
// ---------------------------------------------------------------------------

/// Failure to materialize auxiliary runtime dependencies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError {
    #[error("Failed to spawn installer '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("Installer '{command}' exited with {}", exit_label(.code))]
    NonZeroExit { command: String, code: Option<i32> },

    #[error("Installer command is malformed: {0}")]
    Malformed(String),
}

/// Failure to bring the storage schema to the current version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("Storage unreachable: {0}")]
    Unreachable(String),

    #[error("Storage health check failed: {0}")]
    HealthCheck(String),

    #[error("Migration failed: {0}")]
    Apply(String),
}

/// Failure to ensure the administrative account exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisioningError {
    #[error("Admin credential {0} is not configured")]
    MissingCredential(&'static str),

    #[error("Admin credentials are invalid: {0}")]
    InvalidCredential(String),

    #[error("Role '{0}' does not exist; has the schema been migrated?")]
    MissingRole(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Failure to hand control to the long-running server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("Invalid bind address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkers(usize),

    #[error("Cannot bind {address}: {reason}")]
    Unavailable { address: String, reason: String },

    #[error("Failed to start server '{program}': {reason}")]
    Exec { program: String, reason: String },
}

/// Any error a stage can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

impl StageError {
    /// Process exit code an operator sees when this error aborts a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Dependency(_) => EXIT_DEPENDENCY,
            Self::Migration(_) => EXIT_MIGRATION,
            Self::Provisioning(_) => EXIT_PROVISIONING,
            Self::Bind(_) => EXIT_BIND,
        }
    }

    /// Short name of the error kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dependency(_) => "dependency",
            Self::Migration(_) => "migration",
            Self::Provisioning(_) => "provisioning",
            Self::Bind(_) => "bind",
        }
    }
}

// ---------------------------------------------------------------------------
// Pre-stage errors
// ---------------------------------------------------------------------------

/// The stage list handed to the sequencer violates its input constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("Stage list is empty")]
    Empty,

    #[error("Stage name '{0}' appears more than once")]
    DuplicateStage(String),
}

/// An environment variable could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var}='{value}' is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_stage_kind() {
        let errors = [
            StageError::from(DependencyError::Malformed("x".into())),
            StageError::from(MigrationError::Apply("x".into())),
            StageError::from(ProvisioningError::MissingCredential("ADMIN_USERNAME")),
            StageError::from(BindError::InvalidWorkers(0)),
        ];
        let codes: Vec<i32> = errors.iter().map(StageError::exit_code).collect();
        assert_eq!(codes, vec![10, 20, 30, 40]);
    }

    #[test]
    fn non_zero_exit_message_names_command_and_code() {
        let err = DependencyError::NonZeroExit {
            command: "playwright install chromium".into(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "Installer 'playwright install chromium' exited with exit code 1"
        );

        let killed = DependencyError::NonZeroExit {
            command: "apt-get".into(),
            code: None,
        };
        assert!(killed.to_string().contains("terminated by signal"));
    }

    #[test]
    fn stage_error_is_transparent_over_its_cause() {
        let err = StageError::from(MigrationError::Unreachable("connection refused".into()));
        assert_eq!(err.to_string(), "Storage unreachable: connection refused");
        assert_eq!(err.kind(), "migration");
    }
}
