//! Course catalog handlers.
//!
//! ```text
//! GET /api/v1/courses?departmentId=...&active=true
//! POST /api/v1/courses {"code":"CS101","name":"Intro","departmentId":"...","semester":"fall","year":2026}
//! GET /api/v1/courses/unassigned
//! POST /api/v1/courses/backfill-departments
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use tracing::info;

use crate::domain::{CourseFilter, CourseId, Error, InstructorFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_actor, require_admin};
use crate::inbound::http::dto::{BackfillResponse, CourseListQuery, CourseRequest, CourseResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

fn course_filter(query: &CourseListQuery) -> Result<CourseFilter, Error> {
    let department_id =
        parse_optional_id(query.department_id.as_deref(), FieldName::new("departmentId"))?;
    let instructor_id =
        parse_optional_id(query.instructor_id.as_deref(), FieldName::new("instructorId"))?;
    let instructor = match (instructor_id, query.unassigned) {
        (Some(_), true) => {
            return Err(Error::invalid_request(
                "instructorId and unassigned cannot be combined",
            ));
        }
        (Some(id), false) => InstructorFilter::AssignedTo(id),
        (None, true) => InstructorFilter::Unassigned,
        (None, false) => InstructorFilter::Any,
    };
    Ok(CourseFilter {
        department_id,
        instructor,
        active_only: query.active,
        missing_department: false,
    })
}

/// List courses ordered by code.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(CourseListQuery),
    responses(
        (status = 200, description = "Courses", body = [CourseResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CourseListQuery>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    current_actor(&state, &session).await?;
    let filter = course_filter(&query)?;
    let courses = state.catalog_query.list_courses(&filter).await?;
    Ok(web::Json(courses.iter().map(CourseResponse::from).collect()))
}

/// Create a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Created course", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown department", body = ErrorSchema),
        (status = 409, description = "Duplicate code", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_admin(&state, &session).await?;
    let draft = payload.into_inner().into_draft()?;
    let course = state.catalog.create_course(draft).await?;
    info!(course_id = %course.id, actor = %actor.id, "course created via api");
    Ok(HttpResponse::Created().json(CourseResponse::from(&course)))
}

/// Replace a course's catalog fields. The owning instructor is untouched.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Updated course", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown course or department", body = ErrorSchema),
        (status = 409, description = "Duplicate code", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<web::Json<CourseResponse>> {
    require_admin(&state, &session).await?;
    let id: CourseId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let draft = payload.into_inner().into_draft()?;
    let course = state.catalog.update_course(id, draft).await?;
    Ok(web::Json(CourseResponse::from(&course)))
}

/// Courses without an owning instructor.
#[utoipa::path(
    get,
    path = "/api/v1/courses/unassigned",
    responses(
        (status = 200, description = "Unowned courses", body = [CourseResponse]),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "unassignedCourses"
)]
#[get("/courses/unassigned")]
pub async fn unassigned_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    require_admin(&state, &session).await?;
    let courses = state.assignment_query.unassigned_courses().await?;
    Ok(web::Json(courses.iter().map(CourseResponse::from).collect()))
}

/// Fill in the department of courses recorded without one, by code prefix.
#[utoipa::path(
    post,
    path = "/api/v1/courses/backfill-departments",
    responses(
        (status = 200, description = "Updated and unmatched courses", body = BackfillResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "backfillCourseDepartments"
)]
#[post("/courses/backfill-departments")]
pub async fn backfill_departments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<BackfillResponse>> {
    let actor = require_admin(&state, &session).await?;
    let report = state.catalog.backfill_course_departments().await?;
    info!(
        actor = %actor.id,
        updated = report.updated.len(),
        unmatched = report.unmatched.len(),
        "backfill requested"
    );
    Ok(web::Json(BackfillResponse::from(&report)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::inbound::http::test_utils::{TestCampus, api_app, login_as};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    fn combining_instructor_and_unassigned_is_rejected() {
        let query = CourseListQuery {
            instructor_id: Some(crate::domain::UserId::random().to_string()),
            unassigned: true,
            ..CourseListQuery::default()
        };
        let err = course_filter(&query).expect_err("conflicting filter");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn empty_query_lists_everything() {
        let filter = course_filter(&CourseListQuery::default()).expect("filter");
        assert_eq!(filter, CourseFilter::default());
    }

    #[actix_web::test]
    async fn courses_filter_by_department() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.cs_student).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/courses?departmentId={}", campus.math.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<CourseResponse> = actix_test::read_body_json(res).await;
        let codes: Vec<_> = body.iter().map(|course| course.code.as_str()).collect();
        assert_eq!(codes, vec!["MATH201"]);
    }

    #[actix_web::test]
    async fn students_cannot_create_courses() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.cs_student).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/courses")
                .cookie(cookie)
                .set_json(json!({
                    "code": "CS102",
                    "name": "Data structures",
                    "departmentId": campus.cs.id.to_string(),
                    "semester": "fall",
                    "year": 2026,
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn invalid_years_name_the_field() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/courses")
                .cookie(cookie)
                .set_json(json!({
                    "code": "CS102",
                    "name": "Data structures",
                    "semester": "fall",
                    "year": 1066,
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "year");
    }

    #[actix_web::test]
    async fn unassigned_listing_shrinks_after_assignment() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;
        for (uri, body) in [
            (
                format!("/api/v1/instructors/{}/departments", campus.instructor.id),
                json!({ "departmentIds": [campus.cs.id.to_string()] }),
            ),
            (
                format!("/api/v1/instructors/{}/courses", campus.instructor.id),
                json!({ "courseIds": [campus.cs101.id.to_string()] }),
            ),
        ] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::put()
                    .uri(&uri)
                    .cookie(cookie.clone())
                    .set_json(body)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/courses/unassigned")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<CourseResponse> = actix_test::read_body_json(res).await;
        let codes: Vec<_> = body.iter().map(|course| course.code.as_str()).collect();
        assert_eq!(codes, vec!["MATH201"]);
    }

    #[actix_web::test]
    async fn backfill_fills_departments_by_prefix() {
        let campus = TestCampus::seed().await;
        let app = actix_test::init_service(api_app(campus.state())).await;
        let cookie = login_as(&app, &campus.admin).await;
        for code in ["MATH310", "BIO100"] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/courses")
                    .cookie(cookie.clone())
                    .set_json(json!({
                        "code": code,
                        "name": "Orphaned course",
                        "semester": "spring",
                        "year": 2027,
                    }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/courses/backfill-departments")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: BackfillResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.updated.len(), 1);
        assert_eq!(body.updated[0].course_code, "MATH310");
        assert_eq!(body.updated[0].department_code, "MATH");
        assert_eq!(body.unmatched, vec!["BIO100".to_owned()]);
    }
}
