//! Idempotent admin account provisioning.
//!
//! [`ensure_admin`] guarantees exactly one administrative account exists
//! for the configured identity. Running it again with the same
//! configuration is a no-op; it never duplicates the account and never
//! overwrites the stored password of an existing admin.

use launchpad_core::config::AdminCredentials;
use launchpad_core::error::ProvisioningError;
use launchpad_core::password::hash_password;
use launchpad_core::roles::ROLE_ADMIN;
use launchpad_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};
use crate::repositories::{RoleRepo, UserRepo};

/// What [`ensure_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    /// A new admin account was inserted.
    Created(DbId),
    /// The configured admin already existed and was left unchanged.
    AlreadyPresent(DbId),
}

impl AdminOutcome {
    pub fn user_id(self) -> DbId {
        match self {
            Self::Created(id) | Self::AlreadyPresent(id) => id,
        }
    }
}

/// Ensure the configured admin account exists.
///
/// Fails with [`ProvisioningError::Conflict`] when the configured username
/// belongs to a non-admin, when the configured email belongs to another
/// user, or when a different admin account already exists.
pub async fn ensure_admin(
    pool: &PgPool,
    credentials: &AdminCredentials,
) -> Result<AdminOutcome, ProvisioningError> {
    let admin = credentials.resolve()?;

    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await
        .map_err(storage)?
        .ok_or_else(|| ProvisioningError::MissingRole(ROLE_ADMIN.to_string()))?;

    if let Some(existing) = UserRepo::find_by_username(pool, &admin.username)
        .await
        .map_err(storage)?
    {
        return existing_account(existing, role.id);
    }

    if let Some(owner) = UserRepo::find_by_email(pool, &admin.email)
        .await
        .map_err(storage)?
    {
        return Err(ProvisioningError::Conflict(format!(
            "email '{}' already belongs to user '{}'",
            admin.email, owner.username
        )));
    }

    let other_admins = UserRepo::usernames_with_role(pool, role.id)
        .await
        .map_err(storage)?;
    if !other_admins.is_empty() {
        return Err(ProvisioningError::Conflict(format!(
            "a different admin account already exists ({}); refusing to create '{}'",
            other_admins.join(", "),
            admin.username
        )));
    }

    let password_hash =
        hash_password(&admin.password).map_err(|e| ProvisioningError::Hashing(e.to_string()))?;

    let input = CreateUser {
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash,
        role_id: role.id,
    };

    match UserRepo::create_if_absent(pool, &input)
        .await
        .map_err(storage)?
    {
        Some(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "Admin account created");
            Ok(AdminOutcome::Created(user.id))
        }
        None => {
            // Another process inserted a conflicting row between our checks
            // and the insert.
            let existing = UserRepo::find_by_username(pool, &admin.username)
                .await
                .map_err(storage)?
                .ok_or_else(|| {
                    ProvisioningError::Conflict(format!(
                        "email '{}' was claimed concurrently by another user",
                        admin.email
                    ))
                })?;
            existing_account(existing, role.id)
        }
    }
}

fn existing_account(user: User, admin_role_id: DbId) -> Result<AdminOutcome, ProvisioningError> {
    if user.role_id != admin_role_id {
        return Err(ProvisioningError::Conflict(format!(
            "user '{}' exists but is not an admin",
            user.username
        )));
    }
    if !user.is_active {
        tracing::warn!(user_id = user.id, username = %user.username, "Admin account exists but is deactivated");
    }
    tracing::info!(user_id = user.id, username = %user.username, "Admin account already exists, leaving it unchanged");
    Ok(AdminOutcome::AlreadyPresent(user.id))
}

fn storage(err: sqlx::Error) -> ProvisioningError {
    ProvisioningError::Storage(err.to_string())
}
