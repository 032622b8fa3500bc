//! System settings service.
//!
//! The settings record is shared by every server instance and never cached
//! in process. Writers must name the revision they read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    SettingsCommand, SettingsQuery, SettingsRepositoryError, StorePorts, UpdateSettingsRequest,
};
use crate::domain::{AssignmentError, DependencyPolicy, SystemSettings, validate_year};

/// Stored settings, or the defaults for the current year at revision 0.
pub(crate) async fn current_settings(
    stores: &StorePorts,
    policy: &DependencyPolicy,
    clock: &dyn Clock,
) -> Result<SystemSettings, AssignmentError> {
    match policy
        .call(SettingsRepositoryError::DEPENDENCY, stores.settings.load())
        .await?
    {
        Some(settings) => Ok(settings),
        None => Ok(SystemSettings::defaults(clock.utc().year())?),
    }
}

/// Domain service implementing the settings driving ports.
#[derive(Clone)]
pub struct SettingsService {
    stores: StorePorts,
    policy: DependencyPolicy,
    clock: Arc<dyn Clock>,
}

impl SettingsService {
    /// Create the service over the shared store ports.
    pub fn new(stores: StorePorts, policy: DependencyPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            policy,
            clock,
        }
    }
}

#[async_trait]
impl SettingsQuery for SettingsService {
    async fn fetch_settings(&self) -> Result<SystemSettings, AssignmentError> {
        current_settings(&self.stores, &self.policy, self.clock.as_ref()).await
    }
}

#[async_trait]
impl SettingsCommand for SettingsService {
    async fn update_settings(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<SystemSettings, AssignmentError> {
        if let Some(year) = request.patch.current_year {
            validate_year(year)?;
        }
        let current = current_settings(&self.stores, &self.policy, self.clock.as_ref()).await?;
        if current.revision != request.expected_revision {
            return Err(AssignmentError::RevisionMismatch {
                expected: request.expected_revision,
                actual: current.revision,
            });
        }

        let mut next = current;
        request.patch.apply_to(&mut next);
        next.revision = request.expected_revision + 1;
        next.updated_by = Some(request.updated_by);
        next.updated_at = Some(self.clock.utc());
        self.policy
            .call(
                SettingsRepositoryError::DEPENDENCY,
                self.stores.settings.save(&next, request.expected_revision),
            )
            .await?;
        info!(
            revision = next.revision,
            updated_by = %request.updated_by,
            "system settings updated"
        );
        Ok(next)
    }
}
