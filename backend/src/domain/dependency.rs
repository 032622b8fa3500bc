//! Timeout and retry policy for calls into backing stores.
//!
//! Every store call made by the services goes through [`DependencyPolicy`],
//! which bounds it with the configured timeout. Idempotent upserts may be
//! retried once when the store is unreachable or slow; nothing else is
//! retried.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::AssignmentError;

/// Timeout applied to each store call when nothing is configured.
pub const DEFAULT_DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounds store calls with a timeout and optional single retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyPolicy {
    timeout: Duration,
}

impl Default for DependencyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DEPENDENCY_TIMEOUT)
    }
}

impl DependencyPolicy {
    /// Policy with the given per-call timeout.
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Per-call timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Await `operation` for at most the configured timeout.
    ///
    /// # Errors
    /// Returns [`AssignmentError::DependencyTimeout`] on expiry, otherwise the
    /// operation's own error converted into the service taxonomy.
    pub async fn call<T, E, F>(
        &self,
        dependency: &'static str,
        operation: F,
    ) -> Result<T, AssignmentError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AssignmentError>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                let timeout_ms = self.timeout_ms();
                warn!(dependency, timeout_ms, "dependency call timed out");
                Err(AssignmentError::DependencyTimeout {
                    dependency,
                    timeout_ms,
                })
            }
        }
    }

    /// Like [`Self::call`], but retries once after a dependency failure.
    ///
    /// Only use this for idempotent writes such as upserts.
    pub async fn call_idempotent<T, E, F, Fut>(
        &self,
        dependency: &'static str,
        mut operation: F,
    ) -> Result<T, AssignmentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<AssignmentError>,
    {
        match self.call(dependency, operation()).await {
            Err(error) if error.is_dependency_failure() => {
                warn!(dependency, %error, "retrying idempotent dependency call");
                self.call(dependency, operation()).await
            }
            other => other,
        }
    }
}
