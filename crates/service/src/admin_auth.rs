//! Shared-secret check for the admin pages.

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminAuthError {
    #[error("Password is required")]
    MissingPassword,
    #[error("Invalid password")]
    InvalidPassword,
}

/// Compares submitted passwords against the configured admin secret.
#[derive(Clone)]
pub struct AdminAuth {
    secret_digest: [u8; 32],
}

impl AdminAuth {
    pub fn new(secret: &str) -> Self {
        Self { secret_digest: Sha256::digest(secret.as_bytes()).into() }
    }

    /// Digests are compared instead of raw strings so the comparison does
    /// not short-circuit on the first differing byte of the secret.
    pub fn verify(&self, password: Option<&str>) -> Result<(), AdminAuthError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(AdminAuthError::MissingPassword)?;
        let digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        let diff = digest
            .iter()
            .zip(self.secret_digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            info!(event = "admin_login", "admin authentication succeeded");
            Ok(())
        } else {
            warn!(event = "admin_login_failed", "admin authentication failed");
            Err(AdminAuthError::InvalidPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_outcomes() {
        let auth = AdminAuth::new("12345");
        assert_eq!(auth.verify(Some("12345")), Ok(()));
        assert_eq!(auth.verify(Some("1234")), Err(AdminAuthError::InvalidPassword));
        assert_eq!(auth.verify(Some("")), Err(AdminAuthError::MissingPassword));
        assert_eq!(auth.verify(None), Err(AdminAuthError::MissingPassword));
    }
}
