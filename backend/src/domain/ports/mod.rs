//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`UserDirectory`]) describe the stores the
//! services read and write. Driving ports (`*Command`, `*Query`,
//! [`LoginService`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_command;
mod assignment_query;
mod catalog_command;
mod catalog_query;
mod course_repository;
mod department_repository;
mod enrollment_repository;
mod instructor_assignment_repository;
mod login_service;
mod settings_command;
mod settings_repository;
mod user_directory;

use std::sync::Arc;

#[cfg(test)]
pub use assignment_command::MockAssignmentCommand;
pub use assignment_command::{
    AssignCoursesRequest, AssignDepartmentsRequest, AssignmentCommand, AssignmentReport,
    CourseAssignmentReport, DepartmentAssignmentReport, ItemOutcome, ItemResult,
};
#[cfg(test)]
pub use assignment_query::MockAssignmentQuery;
pub use assignment_query::{
    AssignmentQuery, InstructorDepartment, RosterScope, RosterStudent, StudentRoster,
};
#[cfg(test)]
pub use catalog_command::MockCatalogCommand;
pub use catalog_command::{BackfillReport, BackfilledCourse, CatalogCommand};
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::CatalogQuery;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError};
#[cfg(test)]
pub use department_repository::MockDepartmentRepository;
pub use department_repository::{DepartmentRepository, DepartmentRepositoryError};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{EnrollmentRepository, EnrollmentRepositoryError};
#[cfg(test)]
pub use instructor_assignment_repository::MockInstructorAssignmentRepository;
pub use instructor_assignment_repository::{
    InstructorAssignmentRepository, InstructorAssignmentRepositoryError,
};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use settings_command::{MockSettingsCommand, MockSettingsQuery};
pub use settings_command::{SettingsCommand, SettingsQuery, UpdateSettingsRequest};
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
pub use settings_repository::{SettingsRepository, SettingsRepositoryError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{UserDirectory, UserDirectoryError};

/// Driven ports shared by the domain services.
#[derive(Clone)]
pub struct StorePorts {
    pub users: Arc<dyn UserDirectory>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub assignments: Arc<dyn InstructorAssignmentRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl StorePorts {
    /// Bundle one adapter that implements every driven port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserDirectory
            + DepartmentRepository
            + CourseRepository
            + InstructorAssignmentRepository
            + EnrollmentRepository
            + SettingsRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            departments: store.clone(),
            courses: store.clone(),
            assignments: store.clone(),
            enrollments: store.clone(),
            settings: store,
        }
    }
}
