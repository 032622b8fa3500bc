//! Authentication and authorisation primitives.
//!
//! Login payloads are validated here before a handler talks to a port. The
//! [`Actor`] type carries the authenticated caller's identity and role into
//! authorisation checks.

use zeroize::Zeroizing;

use super::{EmailAddress, Error, Role, User, UserId, UserValidationError};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// The password is zeroised when the credentials are dropped.
///
/// # Examples
/// ```
/// use coursework::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Admin@Uni.edu", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "admin@uni.edu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|_: UserValidationError| {
            LoginValidationError::InvalidEmail
        })?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the directory lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Authenticated caller of a driving operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    /// Require the administrator role.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }

    /// Allow the subject themself or an administrator.
    pub fn require_self_or_admin(&self, subject: UserId) -> Result<(), Error> {
        if self.role == Role::Admin || self.id == subject {
            Ok(())
        } else {
            Err(Error::forbidden(
                "only the instructor or an administrator may read this resource",
            ))
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}
