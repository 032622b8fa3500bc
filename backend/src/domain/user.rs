//! Directory user model.
//!
//! Users are owned by the directory store. This service reads them to check
//! roles and home departments, and edits the role, home department and
//! student number on behalf of administrators.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DepartmentId, UserId};

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 100;

/// Maximum allowed length for a student number.
pub const STUDENT_NUMBER_MAX: usize = 32;

/// Validation errors for directory user values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Email address is not of the form `local@domain`.
    #[error("email address is not valid")]
    InvalidEmail,
    /// Display name is empty once trimmed.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Display name exceeds [`DISPLAY_NAME_MAX`].
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
    /// Student number is empty or too long.
    #[error("student id must be between 1 and {max} characters")]
    InvalidStudentNumber { max: usize },
    /// Role string is not one of the known roles.
    #[error("role must be one of student, instructor or admin")]
    UnknownRole,
}

/// Role held by a directory user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Enrolled learner.
    Student,
    /// Teaching staff.
    Instructor,
    /// Administrator with write access to master data.
    Admin,
}

impl Role {
    /// Stable lowercase label used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }

    /// Whether users with this role may be assigned departments and courses.
    pub const fn can_teach(self) -> bool {
        matches!(self, Self::Instructor | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, normalised to lower case.
///
/// # Examples
/// ```
/// use coursework::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Ada@Example.edu ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.edu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = value.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name. Surrounding whitespace is removed.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Institution-issued student number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentNumber(String);

impl StudentNumber {
    /// Validate a student number. Surrounding whitespace is removed.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() || trimmed.chars().count() > STUDENT_NUMBER_MAX {
            return Err(UserValidationError::InvalidStudentNumber {
                max: STUDENT_NUMBER_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for StudentNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<StudentNumber> for String {
    fn from(value: StudentNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for StudentNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Directory user as seen by this service.
///
/// Password hashes never appear here; they stay inside the directory adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub role: Role,
    pub student_number: Option<StudentNumber>,
    /// Home department.
    pub department_id: Option<DepartmentId>,
}

/// Filter applied when listing directory users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    /// Restrict to users whose home department is one of these.
    pub department_ids: Option<Vec<DepartmentId>>,
}

impl UserFilter {
    /// Students whose home department is in `department_ids`.
    pub fn students_in(department_ids: Vec<DepartmentId>) -> Self {
        Self {
            role: Some(Role::Student),
            department_ids: Some(department_ids),
        }
    }

    /// Whether `user` satisfies this filter.
    pub fn matches(&self, user: &User) -> bool {
        let role_ok = self.role.is_none_or(|role| role == user.role);
        let department_ok = self.department_ids.as_ref().is_none_or(|ids| {
            user.department_id
                .is_some_and(|department| ids.contains(&department))
        });
        role_ok && department_ok
    }
}

/// Partial update applied to a directory user by an administrator.
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub display_name: Option<DisplayName>,
    pub role: Option<Role>,
    pub department_id: Option<Option<DepartmentId>>,
    pub student_number: Option<Option<StudentNumber>>,
}

impl UserPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.role.is_none()
            && self.department_id.is_none()
            && self.student_number.is_none()
    }

    /// Apply the patch to an in-memory user record.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.display_name {
            user.display_name = name.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(department_id) = self.department_id {
            user.department_id = department_id;
        }
        if let Some(student_number) = &self.student_number {
            user.student_number = student_number.clone();
        }
    }
}

/// New directory record created by the bootstrap tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user: User,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Stored login material for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn student() -> User {
        User {
            id: UserId::random(),
            email: EmailAddress::new("s@uni.edu").expect("email"),
            display_name: DisplayName::new("Sam Student").expect("name"),
            role: Role::Student,
            student_number: None,
            department_id: None,
        }
    }

    #[rstest]
    #[case("student", Role::Student)]
    #[case(" Instructor ", Role::Instructor)]
    #[case("ADMIN", Role::Admin)]
    fn parses_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("role"), expected);
    }

    #[rstest]
    fn only_instructors_and_admins_teach() {
        assert!(!Role::Student.can_teach());
        assert!(Role::Instructor.can_teach());
        assert!(Role::Admin.can_teach());
    }

    #[rstest]
    #[case("plain")]
    #[case("a@b")]
    #[case("two@@at.edu")]
    fn rejects_malformed_email(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw).expect_err("invalid"),
            UserValidationError::InvalidEmail
        );
    }

    #[rstest]
    fn display_name_is_trimmed_and_bounded() {
        assert_eq!(DisplayName::new("  Ada ").expect("name").as_ref(), "Ada");
        assert_eq!(
            DisplayName::new("   ").expect_err("empty"),
            UserValidationError::EmptyDisplayName
        );
        assert!(DisplayName::new("x".repeat(DISPLAY_NAME_MAX + 1)).is_err());
    }

    #[rstest]
    fn filter_matches_role_and_department(mut student: User) {
        let department = DepartmentId::random();
        let filter = UserFilter::students_in(vec![department]);
        assert!(!filter.matches(&student));

        student.department_id = Some(department);
        assert!(filter.matches(&student));

        student.role = Role::Instructor;
        assert!(!filter.matches(&student));
    }

    #[rstest]
    fn patch_clears_optional_fields(mut student: User) {
        student.department_id = Some(DepartmentId::random());
        let patch = UserPatch {
            department_id: Some(None),
            role: Some(Role::Instructor),
            ..UserPatch::default()
        };
        patch.apply_to(&mut student);
        assert_eq!(student.department_id, None);
        assert_eq!(student.role, Role::Instructor);
    }
}
