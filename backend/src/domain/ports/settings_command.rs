//! Driving ports for the shared system settings record.

use async_trait::async_trait;

use crate::domain::{AssignmentError, SettingsPatch, SystemSettings, UserId};

/// Request to change the settings record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSettingsRequest {
    pub patch: SettingsPatch,
    /// Revision the caller last read; zero before the first save.
    pub expected_revision: u32,
    pub updated_by: UserId,
}

/// Reads the settings record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsQuery: Send + Sync {
    /// Stored settings, or the defaults at revision 0.
    async fn fetch_settings(&self) -> Result<SystemSettings, AssignmentError>;
}

/// Writes the settings record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsCommand: Send + Sync {
    /// Apply a patch if the stored revision still equals the expected one.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::RevisionMismatch`] when another writer got
    /// there first.
    async fn update_settings(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<SystemSettings, AssignmentError>;
}
