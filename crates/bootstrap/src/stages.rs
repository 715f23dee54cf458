//! [`StageAction`] adapters binding each bootstrap stage to its
//! collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use launchpad_core::config::AdminCredentials;
use launchpad_core::error::{MigrationError, ProvisioningError, StageError};
use launchpad_core::stage::StageAction;
use launchpad_db::provision::{ensure_admin, AdminOutcome};

use crate::database::Database;
use crate::dependencies::ensure_dependencies;
use crate::handoff::{handoff, HandoffTarget};

/// Installs auxiliary runtime dependencies.
pub struct DependencyStage {
    pub commands: Vec<String>,
}

#[async_trait]
impl StageAction for DependencyStage {
    async fn execute(&self) -> Result<(), StageError> {
        ensure_dependencies(&self.commands).await?;
        Ok(())
    }
}

/// Brings the schema to the latest version.
pub struct MigrationStage {
    pub database: Arc<Database>,
}

#[async_trait]
impl StageAction for MigrationStage {
    async fn execute(&self) -> Result<(), StageError> {
        let pool = self
            .database
            .pool()
            .await
            .map_err(|e| MigrationError::Unreachable(e.to_string()))?;

        launchpad_db::health_check(pool)
            .await
            .map_err(|e| MigrationError::HealthCheck(e.to_string()))?;

        launchpad_db::run_migrations(pool)
            .await
            .map_err(|e| MigrationError::Apply(e.to_string()))?;

        match launchpad_db::applied_migrations(pool).await {
            Ok(versions) => {
                tracing::info!(applied = versions.len(), "Database schema is up to date");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Schema migrated but applied versions could not be read");
            }
        }
        Ok(())
    }
}

/// Ensures the configured admin account exists.
pub struct AdminStage {
    pub database: Arc<Database>,
    pub credentials: AdminCredentials,
}

#[async_trait]
impl StageAction for AdminStage {
    async fn execute(&self) -> Result<(), StageError> {
        let pool = self
            .database
            .pool()
            .await
            .map_err(|e| ProvisioningError::Storage(e.to_string()))?;

        match ensure_admin(pool, &self.credentials).await? {
            AdminOutcome::Created(id) => tracing::info!(user_id = id, "Admin account provisioned"),
            AdminOutcome::AlreadyPresent(id) => {
                tracing::info!(user_id = id, "Admin account already provisioned")
            }
        }
        Ok(())
    }
}

/// Hands the process over to the long-running server.
pub struct HandoffStage {
    pub target: HandoffTarget,
}

#[async_trait]
impl StageAction for HandoffStage {
    async fn execute(&self) -> Result<(), StageError> {
        match handoff(&self.target).await {
            Ok(never) => match never {},
            Err(e) => Err(e.into()),
        }
    }
}
