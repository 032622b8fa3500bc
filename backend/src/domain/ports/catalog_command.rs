//! Driving port for catalog master-data writes.
//!
//! None of these operations can set a course's instructor; ownership only
//! changes through [`super::AssignmentCommand`].

use async_trait::async_trait;

use crate::domain::{
    AssignmentError, Course, CourseCode, CourseDraft, CourseId, Department, DepartmentCode,
    DepartmentDraft, DepartmentId, Enrollment, User, UserId, UserPatch,
};

/// Course whose department was filled in by the backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfilledCourse {
    pub course_id: CourseId,
    pub course_code: CourseCode,
    pub department_id: DepartmentId,
    pub department_code: DepartmentCode,
}

/// Outcome of [`CatalogCommand::backfill_course_departments`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub updated: Vec<BackfilledCourse>,
    /// Courses no department code prefixes; left without a department.
    pub unmatched: Vec<CourseCode>,
}

/// Driving port for catalog writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    /// Create a department; codes are unique regardless of case.
    async fn create_department(
        &self,
        draft: DepartmentDraft,
    ) -> Result<Department, AssignmentError>;

    /// Replace a department's code, name and description.
    async fn update_department(
        &self,
        id: DepartmentId,
        draft: DepartmentDraft,
    ) -> Result<Department, AssignmentError>;

    /// Delete a department. Its courses lose their department and its
    /// instructor links are removed.
    async fn delete_department(&self, id: DepartmentId) -> Result<(), AssignmentError>;

    /// Create an unassigned course.
    async fn create_course(&self, draft: CourseDraft) -> Result<Course, AssignmentError>;

    /// Edit a course, keeping its instructor.
    async fn update_course(
        &self,
        id: CourseId,
        draft: CourseDraft,
    ) -> Result<Course, AssignmentError>;

    /// Record a department for every course that lacks one, using the code
    /// prefix matcher without a fallback.
    async fn backfill_course_departments(&self) -> Result<BackfillReport, AssignmentError>;

    /// Change a user's role, home department or student number.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, AssignmentError>;

    /// Enroll a student in a course.
    async fn enroll(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<Enrollment, AssignmentError>;
}
