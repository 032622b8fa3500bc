//! PostgreSQL-backed `EnrollmentRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError};
use crate::domain::{EnrolledCourse, Enrollment, UserId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, map_pool_error_message,
};
use super::models::{EnrolledCourseRow, NewEnrollmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, enrollments};

/// Diesel-backed implementation of the enrollment port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EnrollmentRepositoryError {
    EnrollmentRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> EnrollmentRepositoryError {
    match classify_diesel_error(error, "enrollment operation") {
        DieselFailure::Connection(message) => EnrollmentRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => EnrollmentRepositoryError::duplicate(),
        DieselFailure::ForeignKeyViolation { .. } => {
            EnrollmentRepositoryError::query("referenced student or course does not exist")
        }
        DieselFailure::NotFound => EnrollmentRepositoryError::query("record not found"),
        DieselFailure::Query(message) => EnrollmentRepositoryError::query(message),
    }
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn list_for_students(
        &self,
        student_ids: &[UserId],
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = student_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EnrolledCourseRow> = enrollments::table
            .inner_join(courses::table)
            .filter(enrollments::student_id.eq_any(ids))
            .select((
                enrollments::student_id,
                enrollments::course_id,
                courses::code,
                courses::name,
                enrollments::status,
                enrollments::grade,
            ))
            .order_by((enrollments::student_id.asc(), courses::code.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(EnrolledCourse::try_from),
            EnrollmentRepositoryError::query,
        )
    }

    async fn insert(
        &self,
        enrollment: &Enrollment,
    ) -> Result<Enrollment, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(enrollments::table)
            .values(&NewEnrollmentRow::from_domain(enrollment))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(enrollment.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for enrollment error mapping.
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, EnrollmentRepositoryError::duplicate())]
    #[case(
        DatabaseErrorKind::ClosedConnection,
        EnrollmentRepositoryError::connection("database connection error")
    )]
    fn database_errors_map_to_port_errors(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: EnrollmentRepositoryError,
    ) {
        let err = map_diesel_error(DieselError::DatabaseError(
            kind,
            Box::new("rejected".to_owned()),
        ));
        assert_eq!(err, expected);
    }
}
