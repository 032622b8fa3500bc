//! Port for instructor department and course links.
//!
//! Links are unique on their (instructor, target) pair. Upserts update
//! `is_primary` and `assigned_by` in place, so writing the same link twice
//! is idempotent. Replace operations are atomic: readers never observe the
//! intermediate empty state.

use async_trait::async_trait;

use crate::domain::{CourseAssignment, CourseId, DepartmentAssignment, DepartmentId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by assignment repository adapters.
    pub enum InstructorAssignmentRepositoryError for "assignment repository" {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "assignment repository query failed: {message}",
    }
}

/// Port for instructor assignment links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstructorAssignmentRepository: Send + Sync {
    /// Department links held by an instructor.
    async fn department_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<DepartmentAssignment>, InstructorAssignmentRepositoryError>;

    /// Insert or update one department link.
    async fn upsert_department_link(
        &self,
        link: &DepartmentAssignment,
    ) -> Result<DepartmentAssignment, InstructorAssignmentRepositoryError>;

    /// Atomically replace every department link held by an instructor.
    async fn replace_department_links(
        &self,
        instructor_id: UserId,
        links: &[DepartmentAssignment],
    ) -> Result<Vec<DepartmentAssignment>, InstructorAssignmentRepositoryError>;

    /// Remove one department link, or all of them when `department_id` is
    /// `None`. Returns the number of links removed.
    async fn remove_department_links(
        &self,
        instructor_id: UserId,
        department_id: Option<DepartmentId>,
    ) -> Result<usize, InstructorAssignmentRepositoryError>;

    /// Course links held by an instructor.
    async fn course_links(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<CourseAssignment>, InstructorAssignmentRepositoryError>;

    /// Insert or update one course link and make the instructor the course
    /// owner. Any other instructor's link for the course is removed.
    async fn upsert_course_link(
        &self,
        link: &CourseAssignment,
    ) -> Result<CourseAssignment, InstructorAssignmentRepositoryError>;

    /// Atomically replace every course link held by an instructor.
    ///
    /// Courses the instructor loses are left unassigned; courses in `links`
    /// move to the instructor as in [`Self::upsert_course_link`].
    async fn replace_course_links(
        &self,
        instructor_id: UserId,
        links: &[CourseAssignment],
    ) -> Result<Vec<CourseAssignment>, InstructorAssignmentRepositoryError>;

    /// Remove one course link, or all of them when `course_id` is `None`, and
    /// clear the owner of each affected course. Returns the number removed.
    async fn remove_course_links(
        &self,
        instructor_id: UserId,
        course_id: Option<CourseId>,
    ) -> Result<usize, InstructorAssignmentRepositoryError>;
}
