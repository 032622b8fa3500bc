//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven store ports, backed by PostgreSQL
//! through `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Validation and assignment rules stay in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic multi-row writes**: replace-existing batches and course
//!   ownership moves run inside one transaction.
//!
//! # Example
//!
//! ```ignore
//! use coursework::outbound::persistence::{DbPool, PoolConfig, store_ports};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/coursework")).await?;
//! let ports = store_ports(pool);
//! ```

mod diesel_course_repository;
mod diesel_department_repository;
mod diesel_enrollment_repository;
pub(crate) mod diesel_helpers;
mod diesel_instructor_assignment_repository;
mod diesel_settings_repository;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

use std::sync::Arc;

use crate::domain::ports::StorePorts;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_department_repository::DieselDepartmentRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_instructor_assignment_repository::DieselInstructorAssignmentRepository;
pub use diesel_settings_repository::DieselSettingsRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Build the driven ports over one shared pool.
pub fn store_ports(pool: DbPool) -> StorePorts {
    StorePorts {
        users: Arc::new(DieselUserDirectory::new(pool.clone())),
        departments: Arc::new(DieselDepartmentRepository::new(pool.clone())),
        courses: Arc::new(DieselCourseRepository::new(pool.clone())),
        assignments: Arc::new(DieselInstructorAssignmentRepository::new(pool.clone())),
        enrollments: Arc::new(DieselEnrollmentRepository::new(pool.clone())),
        settings: Arc::new(DieselSettingsRepository::new(pool)),
    }
}
