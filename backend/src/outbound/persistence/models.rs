//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types re-run the
//! domain validators, so a row edited by hand into an invalid shape surfaces
//! as a query error rather than a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    CatalogName, Course, CourseAssignment, CourseCode, CourseId, Department,
    DepartmentAssignment, DepartmentCode, DepartmentId, DisplayName, EmailAddress, EnrolledCourse,
    Enrollment, EnrollmentStatus, Role, Semester, StudentNumber, SystemSettings, User, UserId,
};

use super::schema::{
    courses, departments, enrollments, instructor_courses, instructor_departments,
    system_settings, users,
};

/// Primary key of the single settings row.
pub(crate) const SETTINGS_ROW_ID: i16 = 1;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading directory users without credentials.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub student_number: Option<String>,
    pub department_id: Option<Uuid>,
}

/// Row struct for the credential lookup used by login.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: Uuid,
    pub password_hash: Option<String>,
}

/// Insertable struct for creating directory users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub student_number: Option<&'a str>,
    pub department_id: Option<Uuid>,
    pub password_hash: &'a str,
}

/// Changeset for administrator edits. `None` leaves a column untouched;
/// `Some(None)` clears a nullable one.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub display_name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub department_id: Option<Option<Uuid>>,
    pub student_number: Option<Option<&'a str>>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: EmailAddress::new(&row.email).map_err(|err| err.to_string())?,
            display_name: DisplayName::new(&row.display_name).map_err(|err| err.to_string())?,
            role: row.role.parse::<Role>().map_err(|err| err.to_string())?,
            student_number: row
                .student_number
                .map(StudentNumber::new)
                .transpose()
                .map_err(|err| err.to_string())?,
            department_id: row.department_id.map(DepartmentId::from_uuid),
        })
    }
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

/// Row struct for reading departments.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DepartmentRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Insertable struct for new departments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = departments)]
pub(crate) struct NewDepartmentRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
}

/// Changeset replacing every editable department column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = departments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DepartmentChangeset<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewDepartmentRow<'a> {
    pub(crate) fn from_domain(department: &'a Department) -> Self {
        Self {
            id: *department.id.as_uuid(),
            code: department.code.as_ref(),
            name: department.name.as_ref(),
            description: department.description.as_deref(),
        }
    }
}

impl TryFrom<DepartmentRow> for Department {
    type Error = String;

    fn try_from(row: DepartmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DepartmentId::from_uuid(row.id),
            code: DepartmentCode::new(&row.code).map_err(|err| err.to_string())?,
            name: CatalogName::new(&row.name).map_err(|err| err.to_string())?,
            description: row.description,
        })
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// Row struct for reading courses.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub department_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub semester: String,
    pub year: i32,
    pub is_active: bool,
}

/// Insertable struct for new courses.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub name: &'a str,
    pub department_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub semester: &'a str,
    pub year: i32,
    pub is_active: bool,
}

/// Changeset for course edits. The owning instructor is absent on purpose:
/// only the assignment adapter writes it.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CourseChangeset<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub department_id: Option<Uuid>,
    pub semester: &'a str,
    pub year: i32,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewCourseRow<'a> {
    pub(crate) fn from_domain(course: &'a Course) -> Self {
        Self {
            id: *course.id.as_uuid(),
            code: course.code.as_ref(),
            name: course.name.as_ref(),
            department_id: course.department_id.map(|id| *id.as_uuid()),
            instructor_id: course.instructor_id.map(|id| *id.as_uuid()),
            semester: course.semester.as_str(),
            year: course.year,
            is_active: course.is_active,
        }
    }
}

impl<'a> CourseChangeset<'a> {
    pub(crate) fn from_domain(course: &'a Course, updated_at: DateTime<Utc>) -> Self {
        Self {
            code: course.code.as_ref(),
            name: course.name.as_ref(),
            department_id: course.department_id.map(|id| *id.as_uuid()),
            semester: course.semester.as_str(),
            year: course.year,
            is_active: course.is_active,
            updated_at,
        }
    }
}

impl TryFrom<CourseRow> for Course {
    type Error = String;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CourseId::from_uuid(row.id),
            code: CourseCode::new(&row.code).map_err(|err| err.to_string())?,
            name: CatalogName::new(&row.name).map_err(|err| err.to_string())?,
            department_id: row.department_id.map(DepartmentId::from_uuid),
            instructor_id: row.instructor_id.map(UserId::from_uuid),
            semester: row.semester.parse::<Semester>().map_err(|err| err.to_string())?,
            year: row.year,
            is_active: row.is_active,
        })
    }
}

// ---------------------------------------------------------------------------
// Instructor links
// ---------------------------------------------------------------------------

/// Row struct for instructor department links.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = instructor_departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DepartmentLinkRow {
    pub instructor_id: Uuid,
    pub department_id: Uuid,
    pub is_primary: bool,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
}

/// Row struct for instructor course links.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = instructor_courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseLinkRow {
    pub instructor_id: Uuid,
    pub course_id: Uuid,
    pub is_primary: bool,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
}

impl From<&DepartmentAssignment> for DepartmentLinkRow {
    fn from(link: &DepartmentAssignment) -> Self {
        Self {
            instructor_id: *link.instructor_id.as_uuid(),
            department_id: *link.department_id.as_uuid(),
            is_primary: link.is_primary,
            assigned_by: link.assigned_by.map(|id| *id.as_uuid()),
            assigned_at: link.assigned_at,
        }
    }
}

impl From<DepartmentLinkRow> for DepartmentAssignment {
    fn from(row: DepartmentLinkRow) -> Self {
        Self {
            instructor_id: UserId::from_uuid(row.instructor_id),
            department_id: DepartmentId::from_uuid(row.department_id),
            is_primary: row.is_primary,
            assigned_by: row.assigned_by.map(UserId::from_uuid),
            assigned_at: row.assigned_at,
        }
    }
}

impl From<&CourseAssignment> for CourseLinkRow {
    fn from(link: &CourseAssignment) -> Self {
        Self {
            instructor_id: *link.instructor_id.as_uuid(),
            course_id: *link.course_id.as_uuid(),
            is_primary: link.is_primary,
            assigned_by: link.assigned_by.map(|id| *id.as_uuid()),
            assigned_at: link.assigned_at,
        }
    }
}

impl From<CourseLinkRow> for CourseAssignment {
    fn from(row: CourseLinkRow) -> Self {
        Self {
            instructor_id: UserId::from_uuid(row.instructor_id),
            course_id: CourseId::from_uuid(row.course_id),
            is_primary: row.is_primary,
            assigned_by: row.assigned_by.map(UserId::from_uuid),
            assigned_at: row.assigned_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

/// Insertable struct for enrollments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub(crate) struct NewEnrollmentRow<'a> {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub status: &'a str,
    pub grade: Option<&'a str>,
    pub enrolled_at: DateTime<Utc>,
}

impl<'a> NewEnrollmentRow<'a> {
    pub(crate) fn from_domain(enrollment: &'a Enrollment) -> Self {
        Self {
            student_id: *enrollment.student_id.as_uuid(),
            course_id: *enrollment.course_id.as_uuid(),
            status: enrollment.status.as_str(),
            grade: enrollment.grade.as_deref(),
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

/// Enrollment joined with its course's code and name.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct EnrolledCourseRow {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub code: String,
    pub name: String,
    pub status: String,
    pub grade: Option<String>,
}

impl TryFrom<EnrolledCourseRow> for EnrolledCourse {
    type Error = String;

    fn try_from(row: EnrolledCourseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: UserId::from_uuid(row.student_id),
            course_id: CourseId::from_uuid(row.course_id),
            code: CourseCode::new(&row.code).map_err(|err| err.to_string())?,
            name: CatalogName::new(&row.name).map_err(|err| err.to_string())?,
            status: row
                .status
                .parse::<EnrollmentStatus>()
                .map_err(|err| err.to_string())?,
            grade: row.grade,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Row struct for the single settings record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = system_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SettingsRow {
    pub id: i16,
    pub default_department_code: String,
    pub current_semester: String,
    pub current_year: i32,
    pub allow_self_enrollment: bool,
    pub revision: i32,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Cast database revision (`i32`) to domain revision (`u32`).
#[expect(
    clippy::cast_sign_loss,
    reason = "revision is non-negative by table constraint"
)]
pub(crate) fn cast_revision(revision: i32) -> u32 {
    revision as u32
}

/// Cast domain revision (`u32`) to database revision (`i32`).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revisions stay far below i32::MAX"
)]
pub(crate) fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

impl From<&SystemSettings> for SettingsRow {
    fn from(settings: &SystemSettings) -> Self {
        Self {
            id: SETTINGS_ROW_ID,
            default_department_code: settings.default_department_code.as_ref().to_owned(),
            current_semester: settings.current_semester.as_str().to_owned(),
            current_year: settings.current_year,
            allow_self_enrollment: settings.allow_self_enrollment,
            revision: cast_revision_for_db(settings.revision),
            updated_by: settings.updated_by.map(|id| *id.as_uuid()),
            updated_at: settings.updated_at,
        }
    }
}

impl TryFrom<SettingsRow> for SystemSettings {
    type Error = String;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            default_department_code: DepartmentCode::new(&row.default_department_code)
                .map_err(|err| err.to_string())?,
            current_semester: row
                .current_semester
                .parse::<Semester>()
                .map_err(|err| err.to_string())?,
            current_year: row.current_year,
            allow_self_enrollment: row.allow_self_enrollment,
            revision: cast_revision(row.revision),
            updated_by: row.updated_by.map(UserId::from_uuid),
            updated_at: row.updated_at,
        })
    }
}
