//! Driving port for read models derived from assignments.
//!
//! Every answer is recomputed from the stores on each call.

use async_trait::async_trait;

use crate::domain::{
    AssignmentError, Course, CourseCode, Department, DepartmentAssignment, DepartmentId,
    DepartmentMatch, EnrolledCourse, User, UserId,
};

/// Which departments a roster was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterScope {
    /// The instructor's department links.
    AssignedDepartments,
    /// The instructor has no links; their home department was used.
    HomeDepartment,
    /// Neither links nor a home department exist; the roster is empty.
    NoDepartmentAssigned,
}

impl RosterScope {
    /// Stable lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssignedDepartments => "assigned_departments",
            Self::HomeDepartment => "home_department",
            Self::NoDepartmentAssigned => "no_department_assigned",
        }
    }
}

/// Student entry in a roster, optionally annotated with enrollments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterStudent {
    pub student: User,
    pub courses: Vec<EnrolledCourse>,
}

impl RosterStudent {
    /// Number of annotated enrollments.
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }
}

/// Students visible to an instructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRoster {
    pub instructor_id: UserId,
    pub scope: RosterScope,
    pub department_ids: Vec<DepartmentId>,
    pub students: Vec<RosterStudent>,
    /// Whether enrollment annotations were requested.
    pub courses_included: bool,
    /// Set when annotations were requested but could not be loaded.
    pub enrichment_failed: bool,
}

/// Department link joined with the department record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorDepartment {
    pub link: DepartmentAssignment,
    pub department: Department,
}

/// Driving port for assignment-derived reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentQuery: Send + Sync {
    /// Students whose home department is one the instructor covers.
    async fn students_visible_to(
        &self,
        instructor_id: UserId,
        include_courses: bool,
    ) -> Result<StudentRoster, AssignmentError>;

    /// Courses owned by the instructor.
    async fn courses_assigned_to(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, AssignmentError>;

    /// The instructor's department links with department details.
    async fn departments_assigned_to(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<InstructorDepartment>, AssignmentError>;

    /// Courses without an owning instructor.
    async fn unassigned_courses(&self) -> Result<Vec<Course>, AssignmentError>;

    /// Best-effort guess of a course code's department.
    async fn department_for(
        &self,
        course_code: &CourseCode,
    ) -> Result<Option<DepartmentMatch>, AssignmentError>;
}
