//! PostgreSQL-backed `InstructorAssignmentRepository` adapter.
//!
//! Course ownership lives in two places: the `instructor_courses` link and
//! `courses.instructor_id`. Every write that touches one updates the other
//! inside the same transaction, and the unique index on
//! `instructor_courses.course_id` keeps a course to a single owner.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{InstructorAssignmentRepository, InstructorAssignmentRepositoryError};
use crate::domain::{CourseAssignment, CourseId, DepartmentAssignment, DepartmentId, UserId};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_pool_error_message};
use super::models::{CourseLinkRow, DepartmentLinkRow};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, instructor_courses, instructor_departments};

/// Diesel-backed implementation of the assignment link port.
#[derive(Clone)]
pub struct DieselInstructorAssignmentRepository {
    pool: DbPool,
}

impl DieselInstructorAssignmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InstructorAssignmentRepositoryError {
    InstructorAssignmentRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> InstructorAssignmentRepositoryError {
    match classify_diesel_error(error, "assignment operation") {
        DieselFailure::Connection(message) => {
            InstructorAssignmentRepositoryError::connection(message)
        }
        DieselFailure::NotFound | DieselFailure::ForeignKeyViolation { .. } => {
            InstructorAssignmentRepositoryError::query(
                "referenced instructor, department or course does not exist",
            )
        }
        DieselFailure::UniqueViolation { .. } => {
            InstructorAssignmentRepositoryError::query("course already has another owner")
        }
        DieselFailure::Query(message) => InstructorAssignmentRepositoryError::query(message),
    }
}

/// Upsert a department link, keeping its list position on update.
async fn upsert_department_row(
    conn: &mut AsyncPgConnection,
    row: &DepartmentLinkRow,
) -> QueryResult<DepartmentLinkRow> {
    diesel::insert_into(instructor_departments::table)
        .values(row)
        .on_conflict((
            instructor_departments::instructor_id,
            instructor_departments::department_id,
        ))
        .do_update()
        .set((
            instructor_departments::is_primary.eq(excluded(instructor_departments::is_primary)),
            instructor_departments::assigned_by.eq(excluded(instructor_departments::assigned_by)),
            instructor_departments::assigned_at.eq(excluded(instructor_departments::assigned_at)),
        ))
        .returning(DepartmentLinkRow::as_returning())
        .get_result(conn)
        .await
}

/// Make `row.instructor_id` the owner of `row.course_id`.
///
/// Fails with `NotFound` when the course does not exist.
async fn take_course_ownership(
    conn: &mut AsyncPgConnection,
    row: &CourseLinkRow,
) -> QueryResult<CourseLinkRow> {
    let owned = diesel::update(courses::table.find(row.course_id))
        .set(courses::instructor_id.eq(Some(row.instructor_id)))
        .execute(conn)
        .await?;
    if owned == 0 {
        return Err(diesel::result::Error::NotFound);
    }
    diesel::delete(
        instructor_courses::table
            .filter(instructor_courses::course_id.eq(row.course_id))
            .filter(instructor_courses::instructor_id.ne(row.instructor_id)),
    )
    .execute(conn)
    .await?;
    diesel::insert_into(instructor_courses::table)
        .values(row)
        .on_conflict((
            instructor_courses::instructor_id,
            instructor_courses::course_id,
        ))
        .do_update()
        .set((
            instructor_courses::is_primary.eq(excluded(instructor_courses::is_primary)),
            instructor_courses::assigned_by.eq(excluded(instructor_courses::assigned_by)),
            instructor_courses::assigned_at.eq(excluded(instructor_courses::assigned_at)),
        ))
        .returning(CourseLinkRow::as_returning())
        .get_result(conn)
        .await
}

/// Drop the instructor's course links (all, or one) and clear ownership of
/// the released courses. Returns how many links were removed.
async fn release_courses(
    conn: &mut AsyncPgConnection,
    instructor_id: Uuid,
    course_id: Option<Uuid>,
) -> QueryResult<usize> {
    let released: Vec<Uuid> = match course_id {
        Some(course_id) => {
            diesel::delete(
                instructor_courses::table
                    .filter(instructor_courses::instructor_id.eq(instructor_id))
                    .filter(instructor_courses::course_id.eq(course_id)),
            )
            .returning(instructor_courses::course_id)
            .get_results(conn)
            .await?
        }
        None => {
            diesel::delete(
                instructor_courses::table
                    .filter(instructor_courses::instructor_id.eq(instructor_id)),
            )
            .returning(instructor_courses::course_id)
            .get_results(conn)
            .await?
        }
    };
    if !released.is_empty() {
        diesel::update(
            courses::table
                .filter(courses::id.eq_any(released.clone()))
                .filter(courses::instructor_id.eq(instructor_id)),
        )
        .set(courses::instructor_id.eq(None::<Uuid>))
        .execute(conn)
        .await?;
    }
    Ok(released.len())
}

#[async_trait]
impl InstructorAssignmentRepository for DieselInstructorAssignmentRepository {
    async fn department_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, InstructorAssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DepartmentLinkRow> = instructor_departments::table
            .filter(instructor_departments::instructor_id.eq(*instructor_id.as_uuid()))
            .select(DepartmentLinkRow::as_select())
            .order_by(instructor_departments::position.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(DepartmentAssignment::from).collect())
    }

    async fn upsert_department_link(
        &self,
        link: &DepartmentAssignment,
    ) -> Result<DepartmentAssignment, InstructorAssignmentRepositoryError> {
        let row = DepartmentLinkRow::from(link);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = upsert_department_row(&mut conn, &row)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn replace_department_links(
        &self,
        instructor_id: UserId,
        links: &[DepartmentAssignment],
    ) -> Result<Vec<DepartmentAssignment>, InstructorAssignmentRepositoryError> {
        let instructor = *instructor_id.as_uuid();
        let rows: Vec<DepartmentLinkRow> = links.iter().map(DepartmentLinkRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(
                        instructor_departments::table
                            .filter(instructor_departments::instructor_id.eq(instructor)),
                    )
                    .execute(conn)
                    .await?;
                    let mut stored = Vec::with_capacity(rows.len());
                    for row in &rows {
                        stored.push(upsert_department_row(conn, row).await?);
                    }
                    Ok::<_, diesel::result::Error>(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into_iter().map(DepartmentAssignment::from).collect())
    }

    async fn remove_department_links(
        &self,
        instructor_id: UserId,
        department_id: Option<DepartmentId>,
    ) -> Result<usize, InstructorAssignmentRepositoryError> {
        let instructor = *instructor_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = match department_id {
            Some(department_id) => {
                diesel::delete(
                    instructor_departments::table
                        .filter(instructor_departments::instructor_id.eq(instructor))
                        .filter(
                            instructor_departments::department_id.eq(*department_id.as_uuid()),
                        ),
                )
                .execute(&mut conn)
                .await
            }
            None => {
                diesel::delete(
                    instructor_departments::table
                        .filter(instructor_departments::instructor_id.eq(instructor)),
                )
                .execute(&mut conn)
                .await
            }
        };
        removed.map_err(map_diesel_error)
    }

    async fn course_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<CourseAssignment>, InstructorAssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseLinkRow> = instructor_courses::table
            .filter(instructor_courses::instructor_id.eq(*instructor_id.as_uuid()))
            .select(CourseLinkRow::as_select())
            .order_by((
                instructor_courses::assigned_at.asc(),
                instructor_courses::course_id.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CourseAssignment::from).collect())
    }

    async fn upsert_course_link(
        &self,
        link: &CourseAssignment,
    ) -> Result<CourseAssignment, InstructorAssignmentRepositoryError> {
        let row = CourseLinkRow::from(link);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = conn
            .transaction(|conn| {
                async move { take_course_ownership(conn, &row).await }.scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn replace_course_links(
        &self,
        instructor_id: UserId,
        links: &[CourseAssignment],
    ) -> Result<Vec<CourseAssignment>, InstructorAssignmentRepositoryError> {
        let instructor = *instructor_id.as_uuid();
        let rows: Vec<CourseLinkRow> = links.iter().map(CourseLinkRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored = conn
            .transaction(|conn| {
                async move {
                    release_courses(conn, instructor, None).await?;
                    let mut stored = Vec::with_capacity(rows.len());
                    for row in &rows {
                        stored.push(take_course_ownership(conn, row).await?);
                    }
                    Ok::<_, diesel::result::Error>(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into_iter().map(CourseAssignment::from).collect())
    }

    async fn remove_course_links(
        &self,
        instructor_id: UserId,
        course_id: Option<CourseId>,
    ) -> Result<usize, InstructorAssignmentRepositoryError> {
        let instructor = *instructor_id.as_uuid();
        let course = course_id.map(|id| *id.as_uuid());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move { release_courses(conn, instructor, course).await }.scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
