//! PostgreSQL-backed `CourseRepository` adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseCode, CourseFilter, CourseId, DepartmentId, InstructorFilter};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, map_pool_error_message, order_by_ids,
};
use super::models::{CourseChangeset, CourseRow, NewCourseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, departments};

/// Diesel-backed implementation of the course port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    CourseRepositoryError::connection(map_pool_error_message(error))
}

fn map_write_error(error: diesel::result::Error, code: &CourseCode) -> CourseRepositoryError {
    match classify_diesel_error(error, "course operation") {
        DieselFailure::UniqueViolation { .. } => {
            CourseRepositoryError::duplicate_code(code.as_ref())
        }
        failure => map_failure(failure),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CourseRepositoryError {
    map_failure(classify_diesel_error(error, "course operation"))
}

fn map_failure(failure: DieselFailure) -> CourseRepositoryError {
    match failure {
        DieselFailure::Connection(message) => CourseRepositoryError::connection(message),
        DieselFailure::NotFound => CourseRepositoryError::query("record not found"),
        DieselFailure::ForeignKeyViolation { .. } => {
            CourseRepositoryError::query("referenced department or instructor does not exist")
        }
        DieselFailure::UniqueViolation { .. } => CourseRepositoryError::query("duplicate course"),
        DieselFailure::Query(message) => CourseRepositoryError::query(message),
    }
}

fn to_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, CourseRepositoryError> {
    collect_rows(rows.into_iter().map(Course::try_from), CourseRepositoryError::query)
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut query = courses::table.select(CourseRow::as_select()).into_boxed();
        if let Some(department_id) = filter.department_id {
            query = query.filter(courses::department_id.eq(*department_id.as_uuid()));
        }
        query = match filter.instructor {
            InstructorFilter::Any => query,
            InstructorFilter::AssignedTo(instructor_id) => {
                query.filter(courses::instructor_id.eq(*instructor_id.as_uuid()))
            }
            InstructorFilter::Unassigned => query.filter(courses::instructor_id.is_null()),
        };
        if filter.active_only {
            query = query.filter(courses::is_active.eq(true));
        }
        if filter.missing_department {
            query = query.filter(courses::department_id.is_null());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = query
            .order_by(courses::code.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_courses(rows)
    }

    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::id.eq_any(uuids))
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(order_by_ids(ids, to_courses(rows)?, |course| course.id))
    }

    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::code.eq(code.as_ref()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Course::try_from(row).map_err(CourseRepositoryError::query))
            .transpose()
    }

    async fn insert(&self, course: &Course) -> Result<Course, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: CourseRow = diesel::insert_into(courses::table)
            .values(&NewCourseRow::from_domain(course))
            .returning(CourseRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &course.code))?;
        Course::try_from(row).map_err(CourseRepositoryError::query)
    }

    async fn update(&self, course: &Course) -> Result<Option<Course>, CourseRepositoryError> {
        let changeset = CourseChangeset::from_domain(course, Utc::now());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = diesel::update(courses::table.find(*course.id.as_uuid()))
            .set(&changeset)
            .returning(CourseRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, &course.code))?;
        row.map(|row| Course::try_from(row).map_err(CourseRepositoryError::query))
            .transpose()
    }

    async fn fill_missing_departments(
        &self,
        assignments: &[(CourseId, DepartmentId)],
    ) -> Result<usize, CourseRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        if assignments.is_empty() {
            return Ok(0);
        }
        let pairs: Vec<(Uuid, Uuid)> = assignments
            .iter()
            .map(|(course_id, department_id)| (*course_id.as_uuid(), *department_id.as_uuid()))
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let requested: Vec<Uuid> =
                    pairs.iter().map(|(_, department)| *department).collect();
                let existing: Vec<Uuid> = departments::table
                    .filter(departments::id.eq_any(requested))
                    .select(departments::id)
                    .load(conn)
                    .await?;

                let mut written = 0;
                for (course_id, department_id) in
                    pairs.iter().filter(|(_, department)| existing.contains(department))
                {
                    written += diesel::update(
                        courses::table
                            .find(*course_id)
                            .filter(courses::department_id.is_null()),
                    )
                    .set((
                        courses::department_id.eq(Some(*department_id)),
                        courses::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)
                    .await?;
                }
                Ok::<usize, diesel::result::Error>(written)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for course error mapping.
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn unique_violations_name_the_code() {
        let code = CourseCode::new("cs101").expect("code");
        let err = map_write_error(
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value".to_owned()),
            ),
            &code,
        );
        assert_eq!(err, CourseRepositoryError::duplicate_code("CS101"));
    }

    #[rstest]
    fn foreign_key_violations_are_query_errors() {
        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("courses_department_id_fkey".to_owned()),
        ));
        assert!(matches!(err, CourseRepositoryError::Query { .. }));
    }
}
