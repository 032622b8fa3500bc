//! Wire representations for the REST API.
//!
//! Request bodies are parsed into domain drafts here so handlers only see
//! validated values. Responses use camelCase JSON and plain UUID strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{
    AssignmentReport, BackfillReport, CourseAssignmentReport, DepartmentAssignmentReport,
    InstructorDepartment, ItemOutcome, RosterStudent, StudentRoster,
};
use crate::domain::{
    AssignmentError, CatalogName, Course, CourseAssignment, CourseCode, CourseDraft, Department,
    DepartmentAssignment, DepartmentCode, DepartmentDraft, DepartmentMatch, DisplayName,
    EnrolledCourse, Enrollment, Error, Role, Semester, SettingsPatch, StudentNumber,
    SystemSettings, User, UserPatch, validate_year,
};

use super::validation::{
    FieldName, empty_patch_error, invalid_value_error, missing_field_error, parse_id,
    parse_id_list, parse_optional_id,
};

/// Distinguish an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

// Requests

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "registrar@uni.edu")]
    pub email: String,
    pub password: String,
}

/// Body for creating or replacing a department.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    #[schema(example = "MATH")]
    pub code: String,
    #[schema(example = "Mathematics")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DepartmentRequest {
    /// Validate into a department draft.
    pub fn into_draft(self) -> Result<DepartmentDraft, Error> {
        Ok(DepartmentDraft {
            code: DepartmentCode::new(&self.code)
                .map_err(|err| invalid_value_error(FieldName::new("code"), err))?,
            name: CatalogName::new(&self.name)
                .map_err(|err| invalid_value_error(FieldName::new("name"), err))?,
            description: blank_to_none(self.description),
        })
    }
}

/// Body for creating or editing a course. It carries no instructor;
/// ownership changes through the instructor routes.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    #[schema(example = "MATH201")]
    pub code: String,
    #[schema(example = "Linear Algebra")]
    pub name: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[schema(example = "fall")]
    pub semester: String,
    #[schema(example = 2026)]
    pub year: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CourseRequest {
    /// Validate into a course draft.
    pub fn into_draft(self) -> Result<CourseDraft, Error> {
        Ok(CourseDraft {
            code: CourseCode::new(&self.code)
                .map_err(|err| invalid_value_error(FieldName::new("code"), err))?,
            name: CatalogName::new(&self.name)
                .map_err(|err| invalid_value_error(FieldName::new("name"), err))?,
            department_id: parse_optional_id(
                self.department_id.as_deref(),
                FieldName::new("departmentId"),
            )?,
            semester: self
                .semester
                .parse::<Semester>()
                .map_err(|err| invalid_value_error(FieldName::new("semester"), err))?,
            year: validate_year(self.year)
                .map_err(|err| invalid_value_error(FieldName::new("year"), err))?,
            is_active: self.is_active,
        })
    }
}

/// Body for `PUT /instructors/{id}/departments`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignDepartmentsBody {
    pub department_ids: Vec<String>,
    /// Clear the instructor's current links first. Defaults to true.
    #[serde(default = "default_true")]
    pub replace_existing: bool,
}

/// Body for `PUT /instructors/{id}/courses`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCoursesBody {
    pub course_ids: Vec<String>,
    /// Release the instructor's current courses first. Defaults to true.
    #[serde(default = "default_true")]
    pub replace_existing: bool,
}

/// Body for `PATCH /users/{id}`. Absent fields are left unchanged and
/// `null` clears an optional field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatchRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    #[schema(example = "instructor")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub department_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub student_number: Option<Option<String>>,
}

impl UserPatchRequest {
    /// Validate into a directory patch; an empty patch is rejected.
    pub fn into_patch(self) -> Result<UserPatch, Error> {
        let patch = UserPatch {
            display_name: self
                .display_name
                .map(|name| {
                    DisplayName::new(name)
                        .map_err(|err| invalid_value_error(FieldName::new("displayName"), err))
                })
                .transpose()?,
            role: self
                .role
                .map(|role| {
                    role.parse::<Role>()
                        .map_err(|err| invalid_value_error(FieldName::new("role"), err))
                })
                .transpose()?,
            department_id: self
                .department_id
                .map(|id| parse_optional_id(id.as_deref(), FieldName::new("departmentId")))
                .transpose()?,
            student_number: self
                .student_number
                .map(|number| {
                    blank_to_none(number)
                        .map(|raw| {
                            StudentNumber::new(raw).map_err(|err| {
                                invalid_value_error(FieldName::new("studentNumber"), err)
                            })
                        })
                        .transpose()
                })
                .transpose()?,
        };
        if patch.is_empty() {
            return Err(empty_patch_error());
        }
        Ok(patch)
    }
}

/// Body for `POST /enrollments`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub student_id: String,
    pub course_id: String,
}

/// Body for `PUT /settings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    /// Revision returned by the last read; `0` before the first save.
    pub expected_revision: Option<u32>,
    #[serde(default)]
    pub default_department_code: Option<String>,
    #[serde(default)]
    pub current_semester: Option<String>,
    #[serde(default)]
    pub current_year: Option<i32>,
    #[serde(default)]
    pub allow_self_enrollment: Option<bool>,
}

impl SettingsRequest {
    /// Validate into the expected revision and a settings patch.
    pub fn into_patch(self) -> Result<(u32, SettingsPatch), Error> {
        let expected = self
            .expected_revision
            .ok_or_else(|| missing_field_error(FieldName::new("expectedRevision")))?;
        let patch = SettingsPatch {
            default_department_code: self
                .default_department_code
                .map(|code| {
                    DepartmentCode::new(code).map_err(|err| {
                        invalid_value_error(FieldName::new("defaultDepartmentCode"), err)
                    })
                })
                .transpose()?,
            current_semester: self
                .current_semester
                .map(|semester| {
                    semester.parse::<Semester>().map_err(|err| {
                        invalid_value_error(FieldName::new("currentSemester"), err)
                    })
                })
                .transpose()?,
            current_year: self
                .current_year
                .map(|year| {
                    validate_year(year)
                        .map_err(|err| invalid_value_error(FieldName::new("currentYear"), err))
                })
                .transpose()?,
            allow_self_enrollment: self.allow_self_enrollment,
        };
        Ok((expected, patch))
    }
}

/// Query for `DELETE /instructors/{id}/departments`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UnassignDepartmentQuery {
    /// Remove only this link; omit to remove every link.
    pub department_id: Option<String>,
}

/// Query for `DELETE /instructors/{id}/courses`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UnassignCourseQuery {
    /// Release only this course; omit to release every owned course.
    pub course_id: Option<String>,
}

/// Query for `GET /instructors/{id}/students`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RosterQuery {
    /// Annotate each student with their enrollments.
    #[serde(default)]
    pub include_courses: bool,
}

/// Query for `GET /departments/match`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DepartmentMatchQuery {
    pub course_code: Option<String>,
}

/// Query for `GET /courses`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    pub department_id: Option<String>,
    pub instructor_id: Option<String>,
    /// Only courses without an owning instructor.
    #[serde(default)]
    pub unassigned: bool,
    /// Only active courses.
    #[serde(default)]
    pub active: bool,
}

/// Query for `GET /users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub department_id: Option<String>,
}

// Responses

/// Directory user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    #[schema(example = "instructor")]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Uuid>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.to_string(),
            display_name: user.display_name.to_string(),
            role: user.role.as_str().to_owned(),
            student_number: user
                .student_number
                .as_ref()
                .map(|number| number.as_ref().to_owned()),
            department_id: user.department_id.map(|id| *id.as_uuid()),
        }
    }
}

/// Department record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Department> for DepartmentResponse {
    fn from(department: &Department) -> Self {
        Self {
            id: *department.id.as_uuid(),
            code: department.code.to_string(),
            name: department.name.to_string(),
            description: department.description.clone(),
        }
    }
}

/// Course record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub department_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub semester: String,
    pub year: i32,
    pub is_active: bool,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: *course.id.as_uuid(),
            code: course.code.to_string(),
            name: course.name.to_string(),
            department_id: course.department_id.map(|id| *id.as_uuid()),
            instructor_id: course.instructor_id.map(|id| *id.as_uuid()),
            semester: course.semester.as_str().to_owned(),
            year: course.year,
            is_active: course.is_active,
        }
    }
}

/// Instructor to department link.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAssignmentResponse {
    pub instructor_id: Uuid,
    pub department_id: Uuid,
    pub is_primary: bool,
    pub assigned_by: Option<Uuid>,
    #[schema(value_type = String, format = DateTime)]
    pub assigned_at: DateTime<Utc>,
}

impl From<&DepartmentAssignment> for DepartmentAssignmentResponse {
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

/// Instructor to course ownership link.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseAssignmentResponse {
    pub instructor_id: Uuid,
    pub course_id: Uuid,
    pub is_primary: bool,
    pub assigned_by: Option<Uuid>,
    #[schema(value_type = String, format = DateTime)]
    pub assigned_at: DateTime<Utc>,
}

impl From<&CourseAssignment> for CourseAssignmentResponse {
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

/// One requested id that could not be written in an append batch.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailureResponse {
    pub id: Uuid,
    #[schema(example = "dependency_unavailable")]
    pub kind: String,
    pub message: String,
}

impl ItemFailureResponse {
    fn new(id: Uuid, error: &AssignmentError) -> Self {
        Self {
            id,
            kind: error.kind().to_owned(),
            message: error.to_string(),
        }
    }
}

fn split_report<Id, L, R>(
    report: &AssignmentReport<Id, L>,
    id_of: impl Fn(&Id) -> Uuid,
    link_of: impl Fn(&L) -> R,
) -> (Vec<R>, Vec<ItemFailureResponse>) {
    let mut assigned = Vec::new();
    let mut failed = Vec::new();
    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Assigned(link) => assigned.push(link_of(link)),
            ItemOutcome::Failed(error) => {
                failed.push(ItemFailureResponse::new(id_of(&item.id), error));
            }
        }
    }
    (assigned, failed)
}

/// Outcome of a department assignment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAssignmentReportResponse {
    pub instructor_id: Uuid,
    pub replaced_existing: bool,
    pub assigned: Vec<DepartmentAssignmentResponse>,
    pub failed: Vec<ItemFailureResponse>,
}

impl From<&DepartmentAssignmentReport> for DepartmentAssignmentReportResponse {
    fn from(report: &DepartmentAssignmentReport) -> Self {
        let (assigned, failed) = split_report(
            report,
            |id| *id.as_uuid(),
            |link| DepartmentAssignmentResponse::from(link),
        );
        Self {
            instructor_id: *report.instructor_id.as_uuid(),
            replaced_existing: report.replaced_existing,
            assigned,
            failed,
        }
    }
}

/// Outcome of a course assignment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseAssignmentReportResponse {
    pub instructor_id: Uuid,
    pub replaced_existing: bool,
    pub assigned: Vec<CourseAssignmentResponse>,
    pub failed: Vec<ItemFailureResponse>,
}

impl From<&CourseAssignmentReport> for CourseAssignmentReportResponse {
    fn from(report: &CourseAssignmentReport) -> Self {
        let (assigned, failed) = split_report(
            report,
            |id| *id.as_uuid(),
            |link| CourseAssignmentResponse::from(link),
        );
        Self {
            instructor_id: *report.instructor_id.as_uuid(),
            replaced_existing: report.replaced_existing,
            assigned,
            failed,
        }
    }
}

/// Number of links removed by an unassign call.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnassignResponse {
    pub removed: usize,
}

/// Department link with department details.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDepartmentResponse {
    pub department: DepartmentResponse,
    pub is_primary: bool,
    pub assigned_by: Option<Uuid>,
    #[schema(value_type = String, format = DateTime)]
    pub assigned_at: DateTime<Utc>,
}

impl From<&InstructorDepartment> for InstructorDepartmentResponse {
    fn from(entry: &InstructorDepartment) -> Self {
        Self {
            department: DepartmentResponse::from(&entry.department),
            is_primary: entry.link.is_primary,
            assigned_by: entry.link.assigned_by.map(|id| *id.as_uuid()),
            assigned_at: entry.link.assigned_at,
        }
    }
}

/// Enrollment shown on a roster.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourseResponse {
    pub course_id: Uuid,
    pub code: String,
    pub name: String,
    #[schema(example = "active")]
    pub status: String,
    pub grade: Option<String>,
}

impl From<&EnrolledCourse> for EnrolledCourseResponse {
    fn from(course: &EnrolledCourse) -> Self {
        Self {
            course_id: *course.course_id.as_uuid(),
            code: course.code.to_string(),
            name: course.name.to_string(),
            status: course.status.as_str().to_owned(),
            grade: course.grade.clone(),
        }
    }
}

/// Student on a roster, annotated when courses were requested.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterStudentResponse {
    pub student: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<EnrolledCourseResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_count: Option<usize>,
}

impl RosterStudentResponse {
    fn new(entry: &RosterStudent, courses_included: bool) -> Self {
        let (courses, course_count) = if courses_included {
            (
                Some(entry.courses.iter().map(EnrolledCourseResponse::from).collect()),
                Some(entry.course_count()),
            )
        } else {
            (None, None)
        };
        Self {
            student: UserResponse::from(&entry.student),
            courses,
            course_count,
        }
    }
}

/// Students visible to an instructor.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub instructor_id: Uuid,
    #[schema(example = "assigned_departments")]
    pub scope: String,
    pub department_ids: Vec<Uuid>,
    pub courses_included: bool,
    pub enrichment_failed: bool,
    pub students: Vec<RosterStudentResponse>,
}

impl From<&StudentRoster> for RosterResponse {
    fn from(roster: &StudentRoster) -> Self {
        Self {
            instructor_id: *roster.instructor_id.as_uuid(),
            scope: roster.scope.as_str().to_owned(),
            department_ids: roster.department_ids.iter().map(|id| *id.as_uuid()).collect(),
            courses_included: roster.courses_included,
            enrichment_failed: roster.enrichment_failed,
            students: roster
                .students
                .iter()
                .map(|entry| RosterStudentResponse::new(entry, roster.courses_included))
                .collect(),
        }
    }
}

/// Best-effort department guess for a course code.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentMatchResponse {
    pub course_code: String,
    pub department: Option<DepartmentResponse>,
    /// `prefix` or `fallback`; absent when nothing matched.
    pub source: Option<String>,
}

impl DepartmentMatchResponse {
    /// Build the response for `course_code`.
    pub fn new(course_code: &CourseCode, found: Option<&DepartmentMatch>) -> Self {
        Self {
            course_code: course_code.to_string(),
            department: found.map(|found| DepartmentResponse::from(&found.department)),
            source: found.map(|found| found.source.as_str().to_owned()),
        }
    }
}

/// Course whose department was filled in by the backfill.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackfilledCourseResponse {
    pub course_id: Uuid,
    pub course_code: String,
    pub department_id: Uuid,
    pub department_code: String,
}

/// Outcome of the department backfill.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackfillResponse {
    pub updated: Vec<BackfilledCourseResponse>,
    pub unmatched: Vec<String>,
}

impl From<&BackfillReport> for BackfillResponse {
    fn from(report: &BackfillReport) -> Self {
        Self {
            updated: report
                .updated
                .iter()
                .map(|course| BackfilledCourseResponse {
                    course_id: *course.course_id.as_uuid(),
                    course_code: course.course_code.to_string(),
                    department_id: *course.department_id.as_uuid(),
                    department_code: course.department_code.to_string(),
                })
                .collect(),
            unmatched: report.unmatched.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Enrollment record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[schema(example = "active")]
    pub status: String,
    pub grade: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub enrolled_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            student_id: *enrollment.student_id.as_uuid(),
            course_id: *enrollment.course_id.as_uuid(),
            status: enrollment.status.as_str().to_owned(),
            grade: enrollment.grade.clone(),
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

/// System settings record.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[schema(example = "CS")]
    pub default_department_code: String,
    #[schema(example = "fall")]
    pub current_semester: String,
    pub current_year: i32,
    pub allow_self_enrollment: bool,
    /// Send this back as `expectedRevision` when updating.
    pub revision: u32,
    pub updated_by: Option<Uuid>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&SystemSettings> for SettingsResponse {
    fn from(settings: &SystemSettings) -> Self {
        Self {
            default_department_code: settings.default_department_code.to_string(),
            current_semester: settings.current_semester.as_str().to_owned(),
            current_year: settings.current_year,
            allow_self_enrollment: settings.allow_self_enrollment,
            revision: settings.revision,
            updated_by: settings.updated_by.map(|id| *id.as_uuid()),
            updated_at: settings.updated_at,
        }
    }
}

/// Parse the id list of an assign body.
pub(crate) fn parse_assign_ids<T: std::str::FromStr>(
    values: &[String],
    field: &'static str,
) -> Result<Vec<T>, Error> {
    parse_id_list(values, FieldName::new(field))
}

/// Parse a required query id.
pub(crate) fn parse_required_query_id<T: std::str::FromStr>(
    value: Option<&str>,
    field: &'static str,
) -> Result<T, Error> {
    let field = FieldName::new(field);
    let raw = value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    parse_id(raw, field)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn course_requests_normalise_codes_and_default_to_active() {
        let request: CourseRequest = serde_json::from_value(json!({
            "code": "math201",
            "name": "Linear Algebra",
            "semester": "Fall",
            "year": 2026
        }))
        .expect("request");
        let draft = request.into_draft().expect("draft");
        assert_eq!(draft.code.as_ref(), "MATH201");
        assert_eq!(draft.semester, Semester::Fall);
        assert!(draft.is_active);
        assert_eq!(draft.department_id, None);
    }

    #[rstest]
    #[case(json!({"code": "x", "name": "n", "semester": "fall", "year": 2026}), "code")]
    #[case(json!({"code": "CS1", "name": " ", "semester": "fall", "year": 2026}), "name")]
    #[case(json!({"code": "CS1", "name": "n", "semester": "autumn", "year": 2026}), "semester")]
    #[case(json!({"code": "CS1", "name": "n", "semester": "fall", "year": 1800}), "year")]
    #[case(
        json!({"code": "CS1", "name": "n", "semester": "fall", "year": 2026, "departmentId": "x"}),
        "departmentId"
    )]
    fn invalid_course_fields_are_named(#[case] body: serde_json::Value, #[case] field: &str) {
        let request: CourseRequest = serde_json::from_value(body).expect("request");
        let err = request.into_draft().expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details().expect("details")["field"], field);
    }

    #[rstest]
    fn user_patches_distinguish_null_from_absent() {
        let clear: UserPatchRequest =
            serde_json::from_value(json!({"departmentId": null})).expect("request");
        assert_eq!(clear.into_patch().expect("patch").department_id, Some(None));

        let empty: UserPatchRequest = serde_json::from_value(json!({})).expect("request");
        let err = empty.into_patch().expect_err("empty patch");
        assert_eq!(err.details().expect("details")["code"], "empty_patch");
    }

    #[rstest]
    fn settings_requests_require_a_revision() {
        let request: SettingsRequest =
            serde_json::from_value(json!({"currentYear": 2027})).expect("request");
        let err = request.into_patch().expect_err("missing revision");
        assert_eq!(err.details().expect("details")["field"], "expectedRevision");
    }

    #[rstest]
    fn assign_bodies_replace_by_default() {
        let body: AssignDepartmentsBody =
            serde_json::from_value(json!({"departmentIds": []})).expect("body");
        assert!(body.replace_existing);
    }
}
