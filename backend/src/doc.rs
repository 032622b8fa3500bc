//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: the request/response DTOs and the error envelope wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`])
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::dto::{
    AssignCoursesBody, AssignDepartmentsBody, BackfillResponse, BackfilledCourseResponse,
    CourseAssignmentReportResponse, CourseAssignmentResponse, CourseRequest, CourseResponse,
    DepartmentAssignmentReportResponse, DepartmentAssignmentResponse, DepartmentMatchResponse,
    DepartmentRequest, DepartmentResponse, EnrolledCourseResponse, EnrollmentRequest,
    EnrollmentResponse, InstructorDepartmentResponse, ItemFailureResponse, LoginRequest,
    RosterResponse, RosterStudentResponse, SettingsRequest, SettingsResponse, UnassignResponse,
    UserPatchRequest, UserResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Coursework backend API",
        description = "Department, course and instructor assignment administration with derived student rosters."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user_profile,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::update_user,
        crate::inbound::http::instructors::assign_departments,
        crate::inbound::http::instructors::unassign_department,
        crate::inbound::http::instructors::list_departments,
        crate::inbound::http::instructors::assign_courses,
        crate::inbound::http::instructors::unassign_course,
        crate::inbound::http::instructors::list_courses,
        crate::inbound::http::instructors::list_students,
        crate::inbound::http::departments::list_departments,
        crate::inbound::http::departments::create_department,
        crate::inbound::http::departments::update_department,
        crate::inbound::http::departments::delete_department,
        crate::inbound::http::departments::match_department,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::unassigned_courses,
        crate::inbound::http::courses::backfill_departments,
        crate::inbound::http::enrollments::enroll,
        crate::inbound::http::settings::get_settings,
        crate::inbound::http::settings::update_settings,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        UserResponse,
        UserPatchRequest,
        DepartmentRequest,
        DepartmentResponse,
        DepartmentMatchResponse,
        CourseRequest,
        CourseResponse,
        BackfillResponse,
        BackfilledCourseResponse,
        AssignDepartmentsBody,
        AssignCoursesBody,
        DepartmentAssignmentResponse,
        CourseAssignmentResponse,
        DepartmentAssignmentReportResponse,
        CourseAssignmentReportResponse,
        ItemFailureResponse,
        UnassignResponse,
        InstructorDepartmentResponse,
        RosterResponse,
        RosterStudentResponse,
        EnrolledCourseResponse,
        EnrollmentRequest,
        EnrollmentResponse,
        SettingsRequest,
        SettingsResponse,
    )),
    tags(
        (name = "users", description = "Login, session and directory users"),
        (name = "instructors", description = "Instructor department and course assignments"),
        (name = "departments", description = "Department catalog"),
        (name = "courses", description = "Course catalog"),
        (name = "enrollments", description = "Student enrollments"),
        (name = "settings", description = "System settings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
