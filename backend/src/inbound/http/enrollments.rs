//! Enrollment handler.
//!
//! ```text
//! POST /api/v1/enrollments {"studentId":"...","courseId":"..."}
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::{CourseId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::dto::{EnrollmentRequest, EnrollmentResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Enroll a student in a course.
#[utoipa::path(
    post,
    path = "/api/v1/enrollments",
    request_body = EnrollmentRequest,
    responses(
        (status = 201, description = "Created enrollment", body = EnrollmentResponse),
        (status = 400, description = "Invalid request or not a student", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown student or course", body = ErrorSchema),
        (status = 409, description = "Already enrolled", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "enrollStudent"
)]
#[post("/enrollments")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EnrollmentRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let body = payload.into_inner();
    let student_id: UserId = parse_id(&body.student_id, FieldName::new("studentId"))?;
    let course_id: CourseId = parse_id(&body.course_id, FieldName::new("courseId"))?;
    let enrollment = state.catalog.enroll(student_id, course_id).await?;
    Ok(HttpResponse::Created().json(EnrollmentResponse::from(&enrollment)))
}
