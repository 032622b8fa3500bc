//! Driving port for catalog reads.

use async_trait::async_trait;

use crate::domain::{AssignmentError, Course, CourseFilter, Department, User, UserFilter, UserId};

/// Driving port for catalog and directory listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// All departments ordered by code.
    async fn list_departments(&self) -> Result<Vec<Department>, AssignmentError>;

    /// Courses matching `filter`, ordered by code.
    async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, AssignmentError>;

    /// Directory users matching `filter`.
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, AssignmentError>;

    /// A single directory user.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AssignmentError>;
}
