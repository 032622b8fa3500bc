//! Instructor assignment handlers.
//!
//! ```text
//! PUT /api/v1/instructors/{id}/departments {"departmentIds":["..."],"replaceExisting":true}
//! PUT /api/v1/instructors/{id}/courses {"courseIds":["..."]}
//! GET /api/v1/instructors/{id}/students?includeCourses=true
//! ```
//!
//! Writes are administrator-only. Reads are open to the instructor named in
//! the path and to administrators.

use actix_web::{delete, get, put, web};
use tracing::info;

use crate::domain::ports::{AssignCoursesRequest, AssignDepartmentsRequest};
use crate::domain::{Actor, AssignmentOptions, CourseId, DepartmentId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_actor, require_admin};
use crate::inbound::http::dto::{
    AssignCoursesBody, AssignDepartmentsBody, CourseAssignmentReportResponse, CourseResponse,
    DepartmentAssignmentReportResponse, InstructorDepartmentResponse, RosterQuery,
    RosterResponse, UnassignCourseQuery, UnassignDepartmentQuery, UnassignResponse,
    parse_assign_ids,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

fn instructor_id(path: web::Path<String>) -> ApiResult<UserId> {
    parse_id(&path.into_inner(), FieldName::new("id"))
}

fn options_for(actor: &Actor, replace_existing: bool) -> AssignmentOptions {
    if replace_existing {
        AssignmentOptions::replace(actor.id)
    } else {
        AssignmentOptions::append(actor.id)
    }
}

async fn require_reader(
    state: &HttpState,
    session: &SessionContext,
    instructor_id: UserId,
) -> ApiResult<Actor> {
    let actor = current_actor(state, session).await?;
    actor.require_self_or_admin(instructor_id)?;
    Ok(actor)
}

/// Assign departments to an instructor.
///
/// Replace mode swaps the whole set atomically. Append mode reports each
/// department separately.
#[utoipa::path(
    put,
    path = "/api/v1/instructors/{id}/departments",
    params(("id" = String, Path, description = "Instructor id")),
    request_body = AssignDepartmentsBody,
    responses(
        (status = 200, description = "Per-department outcome", body = DepartmentAssignmentReportResponse),
        (status = 400, description = "Invalid request or not an instructor", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor or department", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 504, description = "Store timed out", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "assignDepartments"
)]
#[put("/instructors/{id}/departments")]
pub async fn assign_departments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AssignDepartmentsBody>,
) -> ApiResult<web::Json<DepartmentAssignmentReportResponse>> {
    let actor = require_admin(&state, &session).await?;
    let instructor_id = instructor_id(path)?;
    let body = payload.into_inner();
    let department_ids: Vec<DepartmentId> =
        parse_assign_ids(&body.department_ids, "departmentIds")?;
    let report = state
        .assignments
        .assign_departments(AssignDepartmentsRequest {
            instructor_id,
            department_ids,
            options: options_for(&actor, body.replace_existing),
        })
        .await?;
    Ok(web::Json(DepartmentAssignmentReportResponse::from(&report)))
}

/// Remove one department link, or every link when no department is named.
#[utoipa::path(
    delete,
    path = "/api/v1/instructors/{id}/departments",
    params(("id" = String, Path, description = "Instructor id"), UnassignDepartmentQuery),
    responses(
        (status = 200, description = "Number of links removed", body = UnassignResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "unassignDepartment"
)]
#[delete("/instructors/{id}/departments")]
pub async fn unassign_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<UnassignDepartmentQuery>,
) -> ApiResult<web::Json<UnassignResponse>> {
    let actor = require_admin(&state, &session).await?;
    let instructor_id = instructor_id(path)?;
    let department_id = parse_optional_id(
        query.department_id.as_deref(),
        FieldName::new("departmentId"),
    )?;
    let removed = state
        .assignments
        .unassign_department(instructor_id, department_id)
        .await?;
    info!(%instructor_id, actor = %actor.id, removed, "department links removed");
    Ok(web::Json(UnassignResponse { removed }))
}

/// Departments an instructor is assigned to, primary first.
#[utoipa::path(
    get,
    path = "/api/v1/instructors/{id}/departments",
    params(("id" = String, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Assigned departments", body = [InstructorDepartmentResponse]),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "instructorDepartments"
)]
#[get("/instructors/{id}/departments")]
pub async fn list_departments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<InstructorDepartmentResponse>>> {
    let instructor_id = instructor_id(path)?;
    require_reader(&state, &session, instructor_id).await?;
    let departments = state
        .assignment_query
        .departments_assigned_to(instructor_id)
        .await?;
    Ok(web::Json(
        departments
            .iter()
            .map(InstructorDepartmentResponse::from)
            .collect(),
    ))
}

/// Assign courses to an instructor.
///
/// Every course must belong to a department the instructor is assigned to;
/// otherwise nothing is written.
#[utoipa::path(
    put,
    path = "/api/v1/instructors/{id}/courses",
    params(("id" = String, Path, description = "Instructor id")),
    request_body = AssignCoursesBody,
    responses(
        (status = 200, description = "Per-course outcome", body = CourseAssignmentReportResponse),
        (status = 400, description = "Invalid request, department not assigned or course department missing", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor or course", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 504, description = "Store timed out", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "assignCourses"
)]
#[put("/instructors/{id}/courses")]
pub async fn assign_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AssignCoursesBody>,
) -> ApiResult<web::Json<CourseAssignmentReportResponse>> {
    let actor = require_admin(&state, &session).await?;
    let instructor_id = instructor_id(path)?;
    let body = payload.into_inner();
    let course_ids: Vec<CourseId> = parse_assign_ids(&body.course_ids, "courseIds")?;
    let report = state
        .assignments
        .assign_courses(AssignCoursesRequest {
            instructor_id,
            course_ids,
            options: options_for(&actor, body.replace_existing),
        })
        .await?;
    Ok(web::Json(CourseAssignmentReportResponse::from(&report)))
}

/// Release one owned course, or every owned course when none is named.
#[utoipa::path(
    delete,
    path = "/api/v1/instructors/{id}/courses",
    params(("id" = String, Path, description = "Instructor id"), UnassignCourseQuery),
    responses(
        (status = 200, description = "Number of courses released", body = UnassignResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "unassignCourse"
)]
#[delete("/instructors/{id}/courses")]
pub async fn unassign_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<UnassignCourseQuery>,
) -> ApiResult<web::Json<UnassignResponse>> {
    let actor = require_admin(&state, &session).await?;
    let instructor_id = instructor_id(path)?;
    let course_id = parse_optional_id(query.course_id.as_deref(), FieldName::new("courseId"))?;
    let removed = state
        .assignments
        .unassign_course(instructor_id, course_id)
        .await?;
    info!(%instructor_id, actor = %actor.id, removed, "courses released");
    Ok(web::Json(UnassignResponse { removed }))
}

/// Courses owned by an instructor.
#[utoipa::path(
    get,
    path = "/api/v1/instructors/{id}/courses",
    params(("id" = String, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Owned courses", body = [CourseResponse]),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "instructorCourses"
)]
#[get("/instructors/{id}/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    let instructor_id = instructor_id(path)?;
    require_reader(&state, &session, instructor_id).await?;
    let courses = state
        .assignment_query
        .courses_assigned_to(instructor_id)
        .await?;
    Ok(web::Json(courses.iter().map(CourseResponse::from).collect()))
}

/// Students whose home department the instructor may see.
#[utoipa::path(
    get,
    path = "/api/v1/instructors/{id}/students",
    params(("id" = String, Path, description = "Instructor id"), RosterQuery),
    responses(
        (status = 200, description = "Visible students", body = RosterResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown instructor", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["instructors"],
    operation_id = "instructorStudents"
)]
#[get("/instructors/{id}/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<RosterQuery>,
) -> ApiResult<web::Json<RosterResponse>> {
    let instructor_id = instructor_id(path)?;
    require_reader(&state, &session, instructor_id).await?;
    let roster = state
        .assignment_query
        .students_visible_to(instructor_id, query.include_courses)
        .await?;
    Ok(web::Json(RosterResponse::from(&roster)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        DepartmentAssignmentReport, ItemOutcome, ItemResult, MockAssignmentCommand,
    };
    use crate::domain::service_fixtures::fixture_timestamp;
    use crate::domain::{AssignmentError, DepartmentAssignment};
    use crate::inbound::http::test_utils::{TestCampus, api_app, login_as};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn put_json<S>(
        app: &S,
        cookie: actix_web::cookie::Cookie<'static>,
        uri: &str,
        body: Value,
    ) -> actix_web::dev::ServiceResponse
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        actix_test::call_service(
            app,
            actix_test::TestRequest::put()
                .uri(uri)
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn only_administrators_assign_departments() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.instructor).await;

        let res = put_json(
            &app,
            cookie,
            &format!("/api/v1/instructors/{}/departments", campus.instructor.id),
            json!({ "departmentIds": [campus.cs.id.to_string()] }),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn course_outside_assigned_departments_is_rejected_with_codes() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;

        let assigned = put_json(
            &app,
            cookie.clone(),
            &format!("/api/v1/instructors/{}/departments", campus.instructor.id),
            json!({ "departmentIds": [campus.cs.id.to_string()] }),
        )
        .await;
        assert_eq!(assigned.status(), StatusCode::OK);

        let res = put_json(
            &app,
            cookie,
            &format!("/api/v1/instructors/{}/courses", campus.instructor.id),
            json!({ "courseIds": [campus.cs101.id.to_string(), campus.math201.id.to_string()] }),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["kind"], "department_not_assigned");
        assert_eq!(body["details"]["departments"], json!(["MATH"]));
    }

    #[actix_web::test]
    async fn append_mode_lists_failed_items_alongside_assigned_ones() {
        let campus = TestCampus::seed().await;
        let instructor_id = campus.instructor.id;
        let (cs, math) = (campus.cs.id, campus.math.id);
        let mut command = MockAssignmentCommand::new();
        command
            .expect_assign_departments()
            .withf(move |request| {
                !request.options.replace_existing && request.department_ids == vec![cs, math]
            })
            .times(1)
            .returning(move |request| {
                Ok(DepartmentAssignmentReport {
                    instructor_id,
                    replaced_existing: false,
                    items: vec![
                        ItemResult {
                            id: cs,
                            outcome: ItemOutcome::Assigned(DepartmentAssignment {
                                instructor_id,
                                department_id: cs,
                                is_primary: true,
                                assigned_by: Some(request.options.assigned_by),
                                assigned_at: fixture_timestamp(),
                            }),
                        },
                        ItemResult {
                            id: math,
                            outcome: ItemOutcome::Failed(AssignmentError::conflict(
                                "link changed concurrently",
                            )),
                        },
                    ],
                })
            });
        let mut state = campus.state();
        state.assignments = Arc::new(command);
        let app = actix_test::init_service(api_app(state)).await;
        let cookie = login_as(&app, &campus.admin).await;

        let res = put_json(
            &app,
            cookie,
            &format!("/api/v1/instructors/{instructor_id}/departments"),
            json!({
                "departmentIds": [cs.to_string(), math.to_string()],
                "replaceExisting": false,
            }),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: DepartmentAssignmentReportResponse = actix_test::read_body_json(res).await;
        assert!(!body.replaced_existing);
        let assigned: Vec<_> = body.assigned.iter().map(|link| link.department_id).collect();
        assert_eq!(assigned, vec![*cs.as_uuid()]);
        assert_eq!(body.failed.len(), 1);
        assert_eq!(body.failed[0].id, *math.as_uuid());
        assert_eq!(body.failed[0].kind, "conflict");
    }

    #[actix_web::test]
    async fn malformed_ids_name_the_field_and_index() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;

        let res = put_json(
            &app,
            cookie,
            &format!("/api/v1/instructors/{}/courses", campus.instructor.id),
            json!({ "courseIds": [campus.cs101.id.to_string(), "nope"] }),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "courseIds");
        assert_eq!(body["details"]["index"], 1);
    }

    #[actix_web::test]
    async fn other_instructors_cannot_read_a_roster() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.cs_student).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/instructors/{}/students", campus.instructor.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn roster_follows_assigned_departments() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let admin = login_as(&app, &campus.admin).await;
        put_json(
            &app,
            admin,
            &format!("/api/v1/instructors/{}/departments", campus.instructor.id),
            json!({ "departmentIds": [campus.cs.id.to_string()] }),
        )
        .await;
        let instructor = login_as(&app, &campus.instructor).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/instructors/{}/students?includeCourses=true",
                    campus.instructor.id
                ))
                .cookie(instructor)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: RosterResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.scope, "assigned_departments");
        assert!(body.courses_included);
        let students: Vec<_> = body.students.iter().map(|entry| entry.student.id).collect();
        assert_eq!(students, vec![*campus.cs_student.id.as_uuid()]);
    }

    #[actix_web::test]
    async fn unassigning_every_department_reports_the_count() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;
        put_json(
            &app,
            cookie.clone(),
            &format!("/api/v1/instructors/{}/departments", campus.instructor.id),
            json!({ "departmentIds": [campus.cs.id.to_string(), campus.math.id.to_string()] }),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/instructors/{}/departments", campus.instructor.id))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: UnassignResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.removed, 2);

        let listed = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/instructors/{}/departments", campus.instructor.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let departments: Vec<InstructorDepartmentResponse> =
            actix_test::read_body_json(listed).await;
        assert!(departments.is_empty());
    }
}
