//! Student enrollments in courses.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CatalogName, CourseCode, CourseId, UserId};

/// Raised when an enrollment status label is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enrollment status must be one of active, dropped or completed")]
pub struct UnknownEnrollmentStatus;

/// Lifecycle state of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Dropped,
    Completed,
}

impl EnrollmentStatus {
    /// Stable lowercase label used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dropped => "dropped",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = UnknownEnrollmentStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "dropped" => Ok(Self::Dropped),
            "completed" => Ok(Self::Completed),
            _ => Err(UnknownEnrollmentStatus),
        }
    }
}

/// Enrollment record, unique per (student, course).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub student_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub grade: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}

/// Enrollment joined with the course code and name, used to annotate rosters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledCourse {
    pub student_id: UserId,
    pub course_id: CourseId,
    pub code: CourseCode,
    pub name: CatalogName,
    pub status: EnrollmentStatus,
    pub grade: Option<String>,
}
