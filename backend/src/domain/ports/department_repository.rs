//! Port for department master data in the catalog store.

use async_trait::async_trait;

use crate::domain::{Department, DepartmentCode, DepartmentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by department repository adapters.
    pub enum DepartmentRepositoryError for "department repository" {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "department repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "department repository query failed: {message}",
        /// Another department already uses the code.
        DuplicateCode { code: String } =>
            "department code {code} is already in use",
    }
}

/// Port for department storage.
///
/// Codes are unique case-insensitively; adapters store them upper-cased and
/// report [`DepartmentRepositoryError::DuplicateCode`] on collisions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// All departments ordered by code.
    async fn list(&self) -> Result<Vec<Department>, DepartmentRepositoryError>;

    /// Departments whose id is in `ids`. Missing ids are simply absent.
    async fn find_by_ids(
        &self,
        ids: &[DepartmentId],
    ) -> Result<Vec<Department>, DepartmentRepositoryError>;

    /// Department with the given code.
    async fn find_by_code(
        &self,
        code: &DepartmentCode,
    ) -> Result<Option<Department>, DepartmentRepositoryError>;

    /// Insert a new department.
    async fn insert(&self, department: &Department)
    -> Result<Department, DepartmentRepositoryError>;

    /// Replace an existing department. Returns `None` when it does not exist.
    async fn update(
        &self,
        department: &Department,
    ) -> Result<Option<Department>, DepartmentRepositoryError>;

    /// Delete a department.
    ///
    /// Courses referencing it lose their department and instructor links to
    /// it are removed. Returns `false` when it did not exist.
    async fn delete(&self, id: DepartmentId) -> Result<bool, DepartmentRepositoryError>;
}
