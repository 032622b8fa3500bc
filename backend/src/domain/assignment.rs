//! Instructor assignment links.
//!
//! An instructor is linked to departments (many-to-many) and owns courses.
//! Both link kinds are unique on their (instructor, target) pair so upserts
//! are idempotent.

use chrono::{DateTime, Utc};

use super::{CourseId, DepartmentId, UserId};

/// Link between an instructor and a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentAssignment {
    pub instructor_id: UserId,
    pub department_id: DepartmentId,
    pub is_primary: bool,
    /// Administrator who wrote the link; absent for migrated rows.
    pub assigned_by: Option<UserId>,
    pub assigned_at: DateTime<Utc>,
}

/// Link between an instructor and a course they own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseAssignment {
    pub instructor_id: UserId,
    pub course_id: CourseId,
    pub is_primary: bool,
    pub assigned_by: Option<UserId>,
    pub assigned_at: DateTime<Utc>,
}

/// Options shared by both assign operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentOptions {
    /// Clear every existing link for the instructor before writing the new set.
    pub replace_existing: bool,
    /// Acting administrator recorded on each link.
    pub assigned_by: UserId,
}

impl AssignmentOptions {
    /// Replace-existing semantics.
    pub const fn replace(assigned_by: UserId) -> Self {
        Self {
            replace_existing: true,
            assigned_by,
        }
    }

    /// Append semantics.
    pub const fn append(assigned_by: UserId) -> Self {
        Self {
            replace_existing: false,
            assigned_by,
        }
    }
}
