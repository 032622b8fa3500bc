//! Error taxonomy of the assignment consistency service.
//!
//! Every failure carries a stable machine-readable kind plus enough detail
//! for a caller to fix the request, such as the codes of the departments an
//! instructor lacks. Validation failures are raised before any write.
//! Dependency failures are a separate class so callers know which
//! operations are safe to retry.

use serde_json::{Value, json};
use thiserror::Error;

use super::ports::{
    CourseRepositoryError, DepartmentRepositoryError, EnrollmentRepositoryError,
    InstructorAssignmentRepositoryError, SettingsRepositoryError, UserDirectoryError,
};
use super::{CatalogValidationError, CourseId, DepartmentId, ErrorCode, Role, UserId};

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure raised by assignment, query, catalog and settings operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    /// The request is malformed.
    #[error("{message}")]
    InvalidRequest { message: String },
    /// The instructor named by the request does not exist.
    #[error("instructor {instructor_id} not found")]
    InstructorNotFound { instructor_id: UserId },
    /// A user named by the request does not exist.
    #[error("user {user_id} not found")]
    UserNotFound { user_id: UserId },
    /// The user exists but cannot teach.
    #[error("user {user_id} has role {role}; instructor or admin required")]
    NotAnInstructor { user_id: UserId, role: Role },
    /// A user expected to be a student has a different role.
    #[error("user {user_id} has role {role}; student required")]
    NotAStudent { user_id: UserId, role: Role },
    /// One or more departments do not exist.
    #[error("departments not found: {}", join(.department_ids))]
    DepartmentNotFound { department_ids: Vec<DepartmentId> },
    /// One or more courses do not exist.
    #[error("courses not found: {}", join(.course_ids))]
    CourseNotFound { course_ids: Vec<CourseId> },
    /// The instructor lacks the departments of the requested courses.
    #[error("instructor is not assigned to departments: {}", .departments.join(", "))]
    DepartmentNotAssigned { departments: Vec<String> },
    /// Requested courses have no recorded department, so coverage cannot be
    /// proven.
    #[error("courses have no department: {}", .course_codes.join(", "))]
    CourseDepartmentMissing { course_codes: Vec<String> },
    /// The write collides with an existing record.
    #[error("{message}")]
    Conflict { message: String },
    /// The settings record changed since the caller read it.
    #[error("revision mismatch: expected {expected}, found {actual}")]
    RevisionMismatch { expected: u32, actual: u32 },
    /// A backing store failed.
    #[error("{dependency} unavailable: {message}")]
    DependencyUnavailable {
        dependency: &'static str,
        message: String,
    },
    /// A backing store did not answer within the timeout.
    #[error("{dependency} timed out after {timeout_ms} ms")]
    DependencyTimeout {
        dependency: &'static str,
        timeout_ms: u64,
    },
}

impl AssignmentError {
    /// Convenience constructor for [`Self::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Self::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InstructorNotFound { .. } => "instructor_not_found",
            Self::UserNotFound { .. } => "user_not_found",
            Self::NotAnInstructor { .. } => "not_an_instructor",
            Self::NotAStudent { .. } => "not_a_student",
            Self::DepartmentNotFound { .. } => "department_not_found",
            Self::CourseNotFound { .. } => "course_not_found",
            Self::DepartmentNotAssigned { .. } => "department_not_assigned",
            Self::CourseDepartmentMissing { .. } => "course_department_missing",
            Self::Conflict { .. } | Self::RevisionMismatch { .. } => "conflict",
            Self::DependencyUnavailable { .. } => "dependency_unavailable",
            Self::DependencyTimeout { .. } => "dependency_timeout",
        }
    }

    /// Whether the failure came from a backing store rather than the request.
    pub const fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            Self::DependencyUnavailable { .. } | Self::DependencyTimeout { .. }
        )
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest { .. }
            | Self::NotAnInstructor { .. }
            | Self::NotAStudent { .. }
            | Self::DepartmentNotAssigned { .. }
            | Self::CourseDepartmentMissing { .. } => ErrorCode::InvalidRequest,
            Self::InstructorNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::DepartmentNotFound { .. }
            | Self::CourseNotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } | Self::RevisionMismatch { .. } => ErrorCode::Conflict,
            Self::DependencyUnavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::DependencyTimeout { .. } => ErrorCode::GatewayTimeout,
        }
    }

    fn details(&self) -> Value {
        let kind = self.kind();
        match self {
            Self::InvalidRequest { .. } | Self::Conflict { .. } => json!({ "kind": kind }),
            Self::InstructorNotFound { instructor_id } => {
                json!({ "kind": kind, "instructorId": instructor_id })
            }
            Self::UserNotFound { user_id } => json!({ "kind": kind, "userId": user_id }),
            Self::NotAnInstructor { user_id, role } | Self::NotAStudent { user_id, role } => {
                json!({ "kind": kind, "userId": user_id, "role": role })
            }
            Self::DepartmentNotFound { department_ids } => {
                json!({ "kind": kind, "departmentIds": department_ids })
            }
            Self::CourseNotFound { course_ids } => {
                json!({ "kind": kind, "courseIds": course_ids })
            }
            Self::DepartmentNotAssigned { departments } => {
                json!({ "kind": kind, "departments": departments })
            }
            Self::CourseDepartmentMissing { course_codes } => {
                json!({ "kind": kind, "courseCodes": course_codes })
            }
            Self::RevisionMismatch { expected, actual } => json!({
                "kind": kind,
                "code": "revision_mismatch",
                "expectedRevision": expected,
                "actualRevision": actual,
            }),
            Self::DependencyUnavailable { dependency, .. } => {
                json!({ "kind": kind, "dependency": dependency })
            }
            Self::DependencyTimeout {
                dependency,
                timeout_ms,
            } => json!({ "kind": kind, "dependency": dependency, "timeoutMs": timeout_ms }),
        }
    }
}

impl From<AssignmentError> for super::Error {
    fn from(error: AssignmentError) -> Self {
        super::Error::new(error.error_code(), error.to_string()).with_details(error.details())
    }
}

impl From<CatalogValidationError> for AssignmentError {
    fn from(error: CatalogValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

fn unavailable(dependency: &'static str, message: String) -> AssignmentError {
    AssignmentError::DependencyUnavailable {
        dependency,
        message,
    }
}

impl From<UserDirectoryError> for AssignmentError {
    fn from(error: UserDirectoryError) -> Self {
        match error {
            UserDirectoryError::DuplicateEmail { .. } => Self::conflict(error.to_string()),
            UserDirectoryError::Connection { .. } | UserDirectoryError::Query { .. } => {
                unavailable(UserDirectoryError::DEPENDENCY, error.to_string())
            }
        }
    }
}

impl From<DepartmentRepositoryError> for AssignmentError {
    fn from(error: DepartmentRepositoryError) -> Self {
        match error {
            DepartmentRepositoryError::DuplicateCode { .. } => Self::conflict(error.to_string()),
            DepartmentRepositoryError::Connection { .. }
            | DepartmentRepositoryError::Query { .. } => {
                unavailable(DepartmentRepositoryError::DEPENDENCY, error.to_string())
            }
        }
    }
}

impl From<CourseRepositoryError> for AssignmentError {
    fn from(error: CourseRepositoryError) -> Self {
        match error {
            CourseRepositoryError::DuplicateCode { .. } => Self::conflict(error.to_string()),
            CourseRepositoryError::Connection { .. } | CourseRepositoryError::Query { .. } => {
                unavailable(CourseRepositoryError::DEPENDENCY, error.to_string())
            }
        }
    }
}

impl From<InstructorAssignmentRepositoryError> for AssignmentError {
    fn from(error: InstructorAssignmentRepositoryError) -> Self {
        unavailable(
            InstructorAssignmentRepositoryError::DEPENDENCY,
            error.to_string(),
        )
    }
}

impl From<EnrollmentRepositoryError> for AssignmentError {
    fn from(error: EnrollmentRepositoryError) -> Self {
        match error {
            EnrollmentRepositoryError::Duplicate => Self::conflict(error.to_string()),
            EnrollmentRepositoryError::Connection { .. }
            | EnrollmentRepositoryError::Query { .. } => {
                unavailable(EnrollmentRepositoryError::DEPENDENCY, error.to_string())
            }
        }
    }
}

impl From<SettingsRepositoryError> for AssignmentError {
    fn from(error: SettingsRepositoryError) -> Self {
        match error {
            SettingsRepositoryError::RevisionMismatch { expected, actual } => {
                Self::RevisionMismatch { expected, actual }
            }
            SettingsRepositoryError::Connection { .. } | SettingsRepositoryError::Query { .. } => {
                unavailable(SettingsRepositoryError::DEPENDENCY, error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Error;
    use rstest::rstest;

    #[rstest]
    fn department_not_assigned_lists_codes() {
        let error = AssignmentError::DepartmentNotAssigned {
            departments: vec!["MATH".to_owned(), "PHYS".to_owned()],
        };
        assert_eq!(
            error.to_string(),
            "instructor is not assigned to departments: MATH, PHYS"
        );

        let envelope = Error::from(error);
        assert_eq!(envelope.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            envelope.details(),
            Some(&json!({ "kind": "department_not_assigned", "departments": ["MATH", "PHYS"] }))
        );
    }

    #[rstest]
    #[case(
        AssignmentError::InstructorNotFound { instructor_id: UserId::random() },
        ErrorCode::NotFound
    )]
    #[case(
        AssignmentError::NotAnInstructor { user_id: UserId::random(), role: Role::Student },
        ErrorCode::InvalidRequest
    )]
    #[case(AssignmentError::conflict("taken"), ErrorCode::Conflict)]
    #[case(
        AssignmentError::DependencyUnavailable { dependency: "x", message: "down".to_owned() },
        ErrorCode::ServiceUnavailable
    )]
    #[case(
        AssignmentError::DependencyTimeout { dependency: "x", timeout_ms: 10 },
        ErrorCode::GatewayTimeout
    )]
    fn maps_to_envelope_codes(#[case] error: AssignmentError, #[case] expected: ErrorCode) {
        let kind = error.kind();
        let envelope = Error::from(error);
        assert_eq!(envelope.code(), expected);
        assert_eq!(
            envelope
                .details()
                .and_then(|details| details.get("kind"))
                .and_then(Value::as_str),
            Some(kind)
        );
    }

    #[rstest]
    fn connection_failures_name_the_dependency() {
        let error = AssignmentError::from(CourseRepositoryError::connection("refused"));
        assert!(error.is_dependency_failure());
        assert!(matches!(
            error,
            AssignmentError::DependencyUnavailable {
                dependency: "course repository",
                ..
            }
        ));
    }

    #[rstest]
    fn duplicate_codes_become_conflicts() {
        let error = AssignmentError::from(DepartmentRepositoryError::duplicate_code("CS"));
        assert_eq!(error.kind(), "conflict");
        assert!(!error.is_dependency_failure());
    }

    #[rstest]
    fn revision_mismatch_carries_revisions() {
        let error = AssignmentError::from(SettingsRepositoryError::revision_mismatch(1_u32, 3_u32));
        let envelope = Error::from(error);
        let details = envelope.details().expect("details");
        assert_eq!(details.get("expectedRevision"), Some(&json!(1)));
        assert_eq!(details.get("actualRevision"), Some(&json!(3)));
    }
}
