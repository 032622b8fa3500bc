//! PostgreSQL-backed `UserDirectory` adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{
    EmailAddress, NewUser, Role, StoredCredentials, User, UserFilter, UserId, UserPatch,
};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, map_pool_error_message,
};
use super::models::{CredentialsRow, NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the directory port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    UserDirectoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    match classify_diesel_error(error, "directory operation") {
        DieselFailure::Connection(message) => UserDirectoryError::connection(message),
        DieselFailure::NotFound => UserDirectoryError::query("record not found"),
        DieselFailure::UniqueViolation { .. } => UserDirectoryError::query("duplicate user"),
        DieselFailure::ForeignKeyViolation { .. } => {
            UserDirectoryError::query("referenced department does not exist")
        }
        DieselFailure::Query(message) => UserDirectoryError::query(message),
    }
}

fn map_create_error(error: diesel::result::Error, email: &EmailAddress) -> UserDirectoryError {
    match &error {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => UserDirectoryError::duplicate_email(email.as_ref()),
        _ => map_diesel_error(error),
    }
}

fn to_user(row: UserRow) -> Result<User, UserDirectoryError> {
    User::try_from(row).map_err(UserDirectoryError::query)
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialsRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.and_then(|row| {
            row.password_hash.map(|password_hash| StoredCredentials {
                user_id: UserId::from_uuid(row.id),
                password_hash,
            })
        }))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        if let Some(department_ids) = &filter.department_ids {
            let ids: Vec<Uuid> = department_ids.iter().map(|id| *id.as_uuid()).collect();
            query = query.filter(users::department_id.eq_any(ids));
        }
        let rows: Vec<UserRow> = query
            .order_by(users::email.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(User::try_from), UserDirectoryError::query)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserDirectoryError> {
        let changeset = UserChangeset {
            display_name: patch.display_name.as_ref().map(AsRef::as_ref),
            role: patch.role.map(Role::as_str),
            department_id: patch
                .department_id
                .map(|department| department.map(|id| *id.as_uuid())),
            student_number: patch
                .student_number
                .as_ref()
                .map(|number| number.as_ref().map(AsRef::as_ref)),
            updated_at: Utc::now(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, UserDirectoryError> {
        let user = &new_user.user;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            display_name: user.display_name.as_ref(),
            role: user.role.as_str(),
            student_number: user.student_number.as_ref().map(AsRef::as_ref),
            department_id: user.department_id.map(|id| *id.as_uuid()),
            password_hash: &new_user.password_hash,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_create_error(err, &user.email))?;
        to_user(stored)
    }

    async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<bool, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*id.as_uuid()))
            .set((
                users::password_hash.eq(password_hash),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn count_admins(&self) -> Result<u64, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = users::table
            .filter(users::role.eq(Role::Admin.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(count).map_err(|_| UserDirectoryError::query("negative admin count"))
    }
}
