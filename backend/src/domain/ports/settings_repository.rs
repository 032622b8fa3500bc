//! Port for the persisted system settings record.
//!
//! # Revision Semantics
//!
//! - Nothing is stored until the first save; callers treat that as revision 0.
//! - Each save names the revision the caller read and writes `revision + 1`.
//! - A save whose expected revision does not match the stored one fails with
//!   [`SettingsRepositoryError::RevisionMismatch`].

use async_trait::async_trait;

use crate::domain::SystemSettings;

use super::define_port_error;

define_port_error! {
    /// Errors raised by settings repository adapters.
    pub enum SettingsRepositoryError for "settings repository" {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "settings repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "settings repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Port for settings storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the stored settings, if any.
    async fn load(&self) -> Result<Option<SystemSettings>, SettingsRepositoryError>;

    /// Save `settings` if the stored revision equals `expected_revision`.
    ///
    /// `settings.revision` must already hold the new revision.
    async fn save(
        &self,
        settings: &SystemSettings,
        expected_revision: u32,
    ) -> Result<(), SettingsRepositoryError>;
}
