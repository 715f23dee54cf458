//! Admin identity validation.
//!
//! Turns the raw [`AdminCredentials`] from the environment into a
//! [`NewAdmin`] that is safe to persist, or a [`ProvisioningError`]
//! naming what is wrong.

use validator::Validate;

use crate::config::AdminCredentials;
use crate::error::ProvisioningError;
use crate::password::{validate_password_strength, MIN_PASSWORD_LENGTH};

/// Longest accepted username, matching the `users.username` column.
pub const MAX_USERNAME_LENGTH: u64 = 150;

/// A validated admin identity with its plaintext password.
#[derive(Clone, Validate)]
pub struct NewAdmin {
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AdminCredentials {
    /// Check that every credential is present and well-formed.
    pub fn resolve(&self) -> Result<NewAdmin, ProvisioningError> {
        let username = self
            .username
            .clone()
            .ok_or(ProvisioningError::MissingCredential("ADMIN_USERNAME"))?;
        let password = self
            .password
            .clone()
            .ok_or(ProvisioningError::MissingCredential("ADMIN_PASSWORD"))?;
        let email = self
            .email
            .clone()
            .ok_or(ProvisioningError::MissingCredential("ADMIN_EMAIL"))?;

        let admin = NewAdmin {
            username,
            email,
            password,
        };

        admin
            .validate()
            .map_err(|e| ProvisioningError::InvalidCredential(e.to_string()))?;
        validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
            .map_err(ProvisioningError::InvalidCredential)?;

        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn creds(username: Option<&str>, password: Option<&str>, email: Option<&str>) -> AdminCredentials {
        AdminCredentials {
            username: username.map(Into::into),
            password: password.map(Into::into),
            email: email.map(Into::into),
        }
    }

    #[test]
    fn complete_credentials_resolve() {
        let admin = creds(Some("admin"), Some("long-enough"), Some("admin@example.com"))
            .resolve()
            .unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "admin@example.com");
    }

    #[test]
    fn each_missing_credential_is_named() {
        assert_matches!(
            creds(None, Some("long-enough"), Some("a@b.io")).resolve(),
            Err(ProvisioningError::MissingCredential("ADMIN_USERNAME"))
        );
        assert_matches!(
            creds(Some("admin"), None, Some("a@b.io")).resolve(),
            Err(ProvisioningError::MissingCredential("ADMIN_PASSWORD"))
        );
        assert_matches!(
            creds(Some("admin"), Some("long-enough"), None).resolve(),
            Err(ProvisioningError::MissingCredential("ADMIN_EMAIL"))
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert_matches!(
            creds(Some("admin"), Some("long-enough"), Some("not-an-email")).resolve(),
            Err(ProvisioningError::InvalidCredential(_))
        );
    }

    #[test]
    fn short_password_is_rejected() {
        assert_matches!(
            creds(Some("admin"), Some("short"), Some("a@b.io")).resolve(),
            Err(ProvisioningError::InvalidCredential(msg)) if msg.contains("at least 8")
        );
    }

    #[test]
    fn username_at_the_length_limit_is_accepted() {
        let name = "a".repeat(MAX_USERNAME_LENGTH as usize);
        let admin = creds(Some(&name), Some("long-enough"), Some("a@b.io"))
            .resolve()
            .unwrap();
        assert_eq!(admin.username.len(), MAX_USERNAME_LENGTH as usize);
    }

    #[test]
    fn overlong_username_is_rejected() {
        let long = "a".repeat(MAX_USERNAME_LENGTH as usize + 1);
        assert_matches!(
            creds(Some(&long), Some("long-enough"), Some("a@b.io")).resolve(),
            Err(ProvisioningError::InvalidCredential(_))
        );
    }
}
