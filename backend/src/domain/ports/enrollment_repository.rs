//! Port for student enrollments in the catalog store.

use async_trait::async_trait;

use crate::domain::{EnrolledCourse, Enrollment, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment repository adapters.
    pub enum EnrollmentRepositoryError for "enrollment repository" {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "enrollment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "enrollment repository query failed: {message}",
        /// The student is already enrolled in the course.
        Duplicate =>
            "the student is already enrolled in this course",
    }
}

/// Port for enrollment storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Enrollments of the given students joined with course code and name.
    async fn list_for_students(
        &self,
        student_ids: &[UserId],
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError>;

    /// Insert an enrollment, unique per (student, course).
    async fn insert(&self, enrollment: &Enrollment)
    -> Result<Enrollment, EnrollmentRepositoryError>;
}
