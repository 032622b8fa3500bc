//! Port for course master data in the catalog store.

use async_trait::async_trait;

use crate::domain::{Course, CourseCode, CourseFilter, CourseId, DepartmentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repository adapters.
    pub enum CourseRepositoryError for "course repository" {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "course repository query failed: {message}",
        /// Another course already uses the code.
        DuplicateCode { code: String } =>
            "course code {code} is already in use",
    }
}

/// Port for course storage.
///
/// `Course::instructor_id` is owned by the instructor assignment repository;
/// [`CourseRepository::update`] leaves it untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Courses matching the filter, ordered by code.
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Courses whose id is in `ids`. Missing ids are simply absent.
    async fn find_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Course with the given code.
    async fn find_by_code(
        &self,
        code: &CourseCode,
    ) -> Result<Option<Course>, CourseRepositoryError>;

    /// Insert a new, unassigned course.
    async fn insert(&self, course: &Course) -> Result<Course, CourseRepositoryError>;

    /// Replace the editable fields of a course. Returns `None` when absent.
    async fn update(&self, course: &Course) -> Result<Option<Course>, CourseRepositoryError>;

    /// Record departments for courses that have none yet.
    ///
    /// Courses that already carry a department are skipped. Returns the
    /// number of courses written.
    async fn fill_missing_departments(
        &self,
        assignments: &[(CourseId, DepartmentId)],
    ) -> Result<usize, CourseRepositoryError>;
}
