//! Domain primitives, services and ports.
//!
//! Purpose: Define strongly typed catalog and directory entities plus the
//! services that keep instructor assignments consistent with departments.
//! Keep types transport agnostic; adapters translate at the edges.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - AssignmentError: assignment taxonomy with stable kinds.
//! - AssignmentService / AssignmentQueryService: assignment writer and
//!   derived-query engine.
//! - CatalogService / SettingsService: catalog administration and the
//!   persisted settings record.
//! - DependencyPolicy: timeout and retry wrapper for store calls.

pub mod assignment;
pub mod assignment_error;
pub mod assignment_query_service;
pub mod assignment_service;
pub mod assignment_validator;
pub mod auth;
pub mod catalog_service;
pub mod course;
pub mod department;
pub mod department_matcher;
pub mod dependency;
pub mod enrollment;
pub mod error;
pub mod ids;
pub mod ports;
#[cfg(test)]
pub(crate) mod service_fixtures;
pub mod settings;
pub mod settings_service;
pub mod trace_id;
pub mod user;

pub use self::assignment::{AssignmentOptions, CourseAssignment, DepartmentAssignment};
pub use self::assignment_error::AssignmentError;
pub use self::assignment_query_service::AssignmentQueryService;
pub use self::assignment_service::AssignmentService;
pub use self::auth::{Actor, LoginCredentials, LoginValidationError};
pub use self::catalog_service::CatalogService;
pub use self::course::{
    Course, CourseCode, CourseDraft, CourseFilter, InstructorFilter, Semester, YEAR_MAX, YEAR_MIN,
    validate_year,
};
pub use self::department::{
    CATALOG_NAME_MAX, CatalogName, CatalogValidationError, Department, DepartmentCode,
    DepartmentDraft,
};
pub use self::department_matcher::{DepartmentMatch, MatchSource};
pub use self::dependency::{DEFAULT_DEPENDENCY_TIMEOUT, DependencyPolicy};
pub use self::enrollment::{
    EnrolledCourse, Enrollment, EnrollmentStatus, UnknownEnrollmentStatus,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::ids::{CourseId, DepartmentId, InvalidIdError, UserId};
pub use self::settings::{DEFAULT_DEPARTMENT_CODE, SettingsPatch, SystemSettings};
pub use self::settings_service::SettingsService;
pub use self::trace_id::TraceId;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, NewUser, Role, STUDENT_NUMBER_MAX,
    StoredCredentials, StudentNumber, User, UserFilter, UserPatch, UserValidationError,
};

