//! Port for the directory store holding user records.
//!
//! The directory is consulted, not owned: this service reads roles and home
//! departments, applies administrator edits, and the bootstrap tool creates
//! the first administrator through it.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, StoredCredentials, User, UserFilter, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by directory adapters.
    pub enum UserDirectoryError for "directory store" {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "directory connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "directory query failed: {message}",
        /// A user with the same email already exists.
        DuplicateEmail { email: String } =>
            "a user with email {email} already exists",
    }
}

/// Port for reading and editing directory users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserDirectoryError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError>;

    /// Fetch the stored password hash for an email, if the user has one.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserDirectoryError>;

    /// List users matching the filter, ordered by email.
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserDirectoryError>;

    /// Apply a patch. Returns `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserDirectoryError>;

    /// Insert a new user with a password hash.
    async fn create(&self, new_user: &NewUser) -> Result<User, UserDirectoryError>;

    /// Replace a user's password hash. Returns `false` when the user is absent.
    async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, UserDirectoryError>;

    /// Number of users holding the admin role.
    async fn count_admins(&self) -> Result<u64, UserDirectoryError>;
}
