//! PostgreSQL-backed `SettingsRepository` adapter.
//!
//! The settings live in a single row (`id = 1`). The first save inserts it;
//! later saves update it only when the stored revision still matches what
//! the caller read. A zero-row update means someone else saved first.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::SystemSettings;
use crate::domain::ports::{SettingsRepository, SettingsRepositoryError};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_pool_error_message};
use super::models::{SETTINGS_ROW_ID, SettingsRow, cast_revision, cast_revision_for_db};
use super::pool::{DbPool, PoolError};
use super::schema::system_settings;

/// Diesel-backed implementation of the settings port.
#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SettingsRepositoryError {
    SettingsRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> SettingsRepositoryError {
    match classify_diesel_error(error, "settings operation") {
        DieselFailure::Connection(message) => SettingsRepositoryError::connection(message),
        DieselFailure::NotFound => SettingsRepositoryError::query("record not found"),
        DieselFailure::UniqueViolation { .. } | DieselFailure::ForeignKeyViolation { .. } => {
            SettingsRepositoryError::query("settings row rejected by a constraint")
        }
        DieselFailure::Query(message) => SettingsRepositoryError::query(message),
    }
}

fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}

async fn stored_revision(conn: &mut AsyncPgConnection) -> Result<u32, SettingsRepositoryError> {
    let revision: Option<i32> = system_settings::table
        .find(SETTINGS_ROW_ID)
        .select(system_settings::revision)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    Ok(revision.map_or(0, cast_revision))
}

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn load(&self) -> Result<Option<SystemSettings>, SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SettingsRow> = system_settings::table
            .find(SETTINGS_ROW_ID)
            .select(SettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| SystemSettings::try_from(row).map_err(SettingsRepositoryError::query))
            .transpose()
    }

    async fn save(
        &self,
        settings: &SystemSettings,
        expected_revision: u32,
    ) -> Result<(), SettingsRepositoryError> {
        let row = SettingsRow::from(settings);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if expected_revision == 0 {
            return match diesel::insert_into(system_settings::table)
                .values(&row)
                .execute(&mut conn)
                .await
            {
                Ok(_) => Ok(()),
                Err(error) if is_unique_violation(&error) => {
                    let actual = stored_revision(&mut conn).await?;
                    Err(SettingsRepositoryError::revision_mismatch(0_u32, actual))
                }
                Err(error) => Err(map_diesel_error(error)),
            };
        }

        let updated = diesel::update(
            system_settings::table
                .find(SETTINGS_ROW_ID)
                .filter(system_settings::revision.eq(cast_revision_for_db(expected_revision))),
        )
        .set(&row)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            let actual = stored_revision(&mut conn).await?;
            return Err(SettingsRepositoryError::revision_mismatch(
                expected_revision,
                actual,
            ));
        }
        Ok(())
    }
}
