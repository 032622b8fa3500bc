//! PostgreSQL-backed `DepartmentRepository` adapter.
//!
//! Deleting a department relies on the foreign keys: courses and users drop
//! the reference (`ON DELETE SET NULL`) and instructor links are removed
//! (`ON DELETE CASCADE`) in the same statement.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DepartmentRepository, DepartmentRepositoryError};
use crate::domain::{Department, DepartmentCode, DepartmentId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, map_pool_error_message, order_by_ids,
};
use super::models::{DepartmentChangeset, DepartmentRow, NewDepartmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::departments;

/// Diesel-backed implementation of the department port.
#[derive(Clone)]
pub struct DieselDepartmentRepository {
    pool: DbPool,
}

impl DieselDepartmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DepartmentRepositoryError {
    DepartmentRepositoryError::connection(map_pool_error_message(error))
}

/// Map a write failure, reporting unique violations against `code`.
fn map_write_error(
    error: diesel::result::Error,
    code: &DepartmentCode,
) -> DepartmentRepositoryError {
    match classify_diesel_error(error, "department operation") {
        DieselFailure::UniqueViolation { .. } => {
            DepartmentRepositoryError::duplicate_code(code.as_ref())
        }
        failure => map_failure(failure),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DepartmentRepositoryError {
    map_failure(classify_diesel_error(error, "department operation"))
}

fn map_failure(failure: DieselFailure) -> DepartmentRepositoryError {
    match failure {
        DieselFailure::Connection(message) => DepartmentRepositoryError::connection(message),
        DieselFailure::NotFound => DepartmentRepositoryError::query("record not found"),
        DieselFailure::UniqueViolation { constraint }
        | DieselFailure::ForeignKeyViolation { constraint } => {
            DepartmentRepositoryError::query(format!(
                "constraint {} rejected the write",
                constraint.as_deref().unwrap_or("unknown")
            ))
        }
        DieselFailure::Query(message) => DepartmentRepositoryError::query(message),
    }
}

fn to_department(row: DepartmentRow) -> Result<Department, DepartmentRepositoryError> {
    Department::try_from(row).map_err(DepartmentRepositoryError::query)
}

#[async_trait]
impl DepartmentRepository for DieselDepartmentRepository {
    async fn list(&self) -> Result<Vec<Department>, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DepartmentRow> = departments::table
            .select(DepartmentRow::as_select())
            .order_by(departments::code.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(Department::try_from),
            DepartmentRepositoryError::query,
        )
    }

    async fn find_by_ids(
        &self,
        ids: &[DepartmentId],
    ) -> Result<Vec<Department>, DepartmentRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DepartmentRow> = departments::table
            .filter(departments::id.eq_any(uuids))
            .select(DepartmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let found = collect_rows(
            rows.into_iter().map(Department::try_from),
            DepartmentRepositoryError::query,
        )?;
        Ok(order_by_ids(ids, found, |department| department.id))
    }

    async fn find_by_code(
        &self,
        code: &DepartmentCode,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DepartmentRow> = departments::table
            .filter(departments::code.eq(code.as_ref()))
            .select(DepartmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_department).transpose()
    }

    async fn insert(
        &self,
        department: &Department,
    ) -> Result<Department, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: DepartmentRow = diesel::insert_into(departments::table)
            .values(&NewDepartmentRow::from_domain(department))
            .returning(DepartmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &department.code))?;
        to_department(row)
    }

    async fn update(
        &self,
        department: &Department,
    ) -> Result<Option<Department>, DepartmentRepositoryError> {
        let changeset = DepartmentChangeset {
            code: department.code.as_ref(),
            name: department.name.as_ref(),
            description: department.description.as_deref(),
            updated_at: Utc::now(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DepartmentRow> =
            diesel::update(departments::table.find(*department.id.as_uuid()))
                .set(&changeset)
                .returning(DepartmentRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|err| map_write_error(err, &department.code))?;
        row.map(to_department).transpose()
    }

    async fn delete(&self, id: DepartmentId) -> Result<bool, DepartmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(departments::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
