//! Department master data.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DepartmentId;

/// Maximum allowed length for department and course names.
pub const CATALOG_NAME_MAX: usize = 200;

/// Validation errors for catalog master data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogValidationError {
    /// Department code does not match `[A-Z0-9]{2,10}`.
    #[error("department code must be 2-10 letters or digits, got {value:?}")]
    InvalidDepartmentCode { value: String },
    /// Course code does not match the accepted pattern.
    #[error("course code must start with a letter or digit and be 2-20 characters, got {value:?}")]
    InvalidCourseCode { value: String },
    /// Name is empty once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds [`CATALOG_NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// Semester label is unknown.
    #[error("semester must be one of fall, spring, summer or winter")]
    UnknownSemester,
    /// Academic year is outside the supported range.
    #[error("year must be between {min} and {max}")]
    YearOutOfRange { min: i32, max: i32 },
}

static DEPARTMENT_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn department_code_regex() -> &'static Regex {
    DEPARTMENT_CODE_RE.get_or_init(|| {
        Regex::new("^[A-Z0-9]{2,10}$")
            .unwrap_or_else(|error| panic!("department code regex failed to compile: {error}"))
    })
}

/// Department code, stored upper-cased so uniqueness is case-insensitive.
///
/// # Examples
/// ```
/// use coursework::domain::DepartmentCode;
///
/// let code = DepartmentCode::new("math").unwrap();
/// assert_eq!(code.as_ref(), "MATH");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DepartmentCode(String);

impl DepartmentCode {
    /// Normalise and validate a department code.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
        let normalised = value.as_ref().trim().to_ascii_uppercase();
        if !department_code_regex().is_match(&normalised) {
            return Err(CatalogValidationError::InvalidDepartmentCode {
                value: value.as_ref().to_owned(),
            });
        }
        Ok(Self(normalised))
    }

    /// Code length in characters; codes are ASCII so this equals bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; validated codes are at least two characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for DepartmentCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DepartmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DepartmentCode> for String {
    fn from(value: DepartmentCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for DepartmentCode {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated department or course name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatalogName(String);

impl CatalogName {
    /// Trim and validate a name.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CatalogValidationError::EmptyName);
        }
        if trimmed.chars().count() > CATALOG_NAME_MAX {
            return Err(CatalogValidationError::NameTooLong {
                max: CATALOG_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CatalogName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CatalogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CatalogName> for String {
    fn from(value: CatalogName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CatalogName {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Department record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: DepartmentId,
    pub code: DepartmentCode,
    pub name: CatalogName,
    pub description: Option<String>,
}

/// Values supplied when creating or replacing a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDraft {
    pub code: DepartmentCode,
    pub name: CatalogName,
    pub description: Option<String>,
}

impl DepartmentDraft {
    /// Materialise the draft under the given id.
    pub fn into_department(self, id: DepartmentId) -> Department {
        Department {
            id,
            code: self.code,
            name: self.name,
            description: self.description,
        }
    }
}
