//! Password hashing and the credential-checking login adapter.
//!
//! Hashes are Argon2id PHC strings. Verification runs on the blocking pool
//! because a single check takes tens of milliseconds of CPU.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{LoginService, UserDirectory, UserDirectoryError};
use crate::domain::{DependencyPolicy, Error, LoginCredentials, UserId};

/// Failure to produce a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Hash `password` with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError {
            message: err.to_string(),
        })
}

/// Check `password` against a stored PHC hash.
///
/// A malformed stored hash is logged and treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(%error, "stored password hash is malformed");
            return false;
        }
    };
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(error) => {
            warn!(%error, "password verification failed");
            false
        }
    }
}

/// `LoginService` that checks credentials against directory hashes.
#[derive(Clone)]
pub struct Argon2LoginService {
    directory: Arc<dyn UserDirectory>,
    policy: DependencyPolicy,
}

impl Argon2LoginService {
    /// Create the service over a directory adapter.
    pub fn new(directory: Arc<dyn UserDirectory>, policy: DependencyPolicy) -> Self {
        Self { directory, policy }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

#[async_trait]
impl LoginService for Argon2LoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .policy
            .call(
                UserDirectoryError::DEPENDENCY,
                self.directory.find_credentials(credentials.email()),
            )
            .await?;
        let Some(stored) = stored else {
            debug!("login attempt for unknown email or user without password");
            return Err(invalid_credentials());
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = stored.password_hash;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))?;
        if matches {
            Ok(stored.user_id)
        } else {
            debug!(user_id = %stored.user_id, "login attempt with wrong password");
            Err(invalid_credentials())
        }
    }
}
