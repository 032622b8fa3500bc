//! Course master data.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{CatalogName, CatalogValidationError, CourseId, DepartmentId, UserId};

/// Earliest academic year accepted for a course offering.
pub const YEAR_MIN: i32 = 1900;
/// Latest academic year accepted for a course offering.
pub const YEAR_MAX: i32 = 2200;

static COURSE_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn course_code_regex() -> &'static Regex {
    COURSE_CODE_RE.get_or_init(|| {
        Regex::new("^[A-Z0-9][A-Z0-9 _-]{1,19}$")
            .unwrap_or_else(|error| panic!("course code regex failed to compile: {error}"))
    })
}

/// Course code, stored upper-cased so uniqueness is case-insensitive.
///
/// # Examples
/// ```
/// use coursework::domain::CourseCode;
///
/// let code = CourseCode::new("cs101").unwrap();
/// assert_eq!(code.as_ref(), "CS101");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Normalise and validate a course code.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
        let normalised = value.as_ref().trim().to_ascii_uppercase();
        if !course_code_regex().is_match(&normalised) {
            return Err(CatalogValidationError::InvalidCourseCode {
                value: value.as_ref().to_owned(),
            });
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Academic term in which a course runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semester {
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Semester {
    /// Stable lowercase label used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fall => "fall",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Winter => "winter",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = CatalogValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fall" => Ok(Self::Fall),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "winter" => Ok(Self::Winter),
            _ => Err(CatalogValidationError::UnknownSemester),
        }
    }
}

/// Validate an academic year.
pub fn validate_year(year: i32) -> Result<i32, CatalogValidationError> {
    if (YEAR_MIN..=YEAR_MAX).contains(&year) {
        Ok(year)
    } else {
        Err(CatalogValidationError::YearOutOfRange {
            min: YEAR_MIN,
            max: YEAR_MAX,
        })
    }
}

/// Course record.
///
/// `department_id` is the single source of truth for the owning department.
/// `instructor_id` is only written through the assignment writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub code: CourseCode,
    pub name: CatalogName,
    pub department_id: Option<DepartmentId>,
    pub instructor_id: Option<UserId>,
    pub semester: Semester,
    pub year: i32,
    pub is_active: bool,
}

/// Values supplied when creating or editing a course.
///
/// Deliberately carries no instructor so course edits cannot bypass the
/// department coverage check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub code: CourseCode,
    pub name: CatalogName,
    pub department_id: Option<DepartmentId>,
    pub semester: Semester,
    pub year: i32,
    pub is_active: bool,
}

impl CourseDraft {
    /// Materialise the draft as a new, unassigned course.
    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            code: self.code,
            name: self.name,
            department_id: self.department_id,
            instructor_id: None,
            semester: self.semester,
            year: self.year,
            is_active: self.is_active,
        }
    }

    /// Overwrite the editable fields of `course`, keeping its instructor.
    pub fn apply_to(self, course: &mut Course) {
        course.code = self.code;
        course.name = self.name;
        course.department_id = self.department_id;
        course.semester = self.semester;
        course.year = self.year;
        course.is_active = self.is_active;
    }
}

/// Instructor criterion for course listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstructorFilter {
    /// Any course regardless of owner.
    #[default]
    Any,
    /// Courses owned by the given instructor.
    AssignedTo(UserId),
    /// Courses without an owning instructor.
    Unassigned,
}

/// Filter applied when listing courses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub department_id: Option<DepartmentId>,
    pub instructor: InstructorFilter,
    pub active_only: bool,
    /// Only courses whose department is not recorded.
    pub missing_department: bool,
}

impl CourseFilter {
    /// Courses owned by `instructor_id`.
    pub fn assigned_to(instructor_id: UserId) -> Self {
        Self {
            instructor: InstructorFilter::AssignedTo(instructor_id),
            ..Self::default()
        }
    }

    /// Courses with no owning instructor.
    pub fn unassigned() -> Self {
        Self {
            instructor: InstructorFilter::Unassigned,
            ..Self::default()
        }
    }

    /// Courses whose department is not recorded.
    pub fn missing_department() -> Self {
        Self {
            missing_department: true,
            ..Self::default()
        }
    }

    /// Whether `course` satisfies this filter.
    pub fn matches(&self, course: &Course) -> bool {
        let department_ok = self
            .department_id
            .is_none_or(|id| course.department_id == Some(id));
        let instructor_ok = match self.instructor {
            InstructorFilter::Any => true,
            InstructorFilter::AssignedTo(id) => course.instructor_id == Some(id),
            InstructorFilter::Unassigned => course.instructor_id.is_none(),
        };
        let active_ok = !self.active_only || course.is_active;
        let missing_ok = !self.missing_department || course.department_id.is_none();
        department_ok && instructor_ok && active_ok && missing_ok
    }
}
