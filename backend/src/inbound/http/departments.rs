//! Department catalog handlers.
//!
//! ```text
//! GET /api/v1/departments
//! POST /api/v1/departments {"code":"CS","name":"Computer Science"}
//! GET /api/v1/departments/match?courseCode=CS101
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::domain::{CourseCode, DepartmentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_actor, require_admin};
use crate::inbound::http::dto::{
    DepartmentMatchQuery, DepartmentMatchResponse, DepartmentRequest, DepartmentResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, missing_field_error, parse_id,
};

/// List every department ordered by code.
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments", body = [DepartmentResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "listDepartments"
)]
#[get("/departments")]
pub async fn list_departments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DepartmentResponse>>> {
    current_actor(&state, &session).await?;
    let departments = state.catalog_query.list_departments().await?;
    Ok(web::Json(
        departments.iter().map(DepartmentResponse::from).collect(),
    ))
}

/// Create a department; codes are unique.
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = DepartmentRequest,
    responses(
        (status = 201, description = "Created department", body = DepartmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Duplicate code", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "createDepartment"
)]
#[post("/departments")]
pub async fn create_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DepartmentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = require_admin(&state, &session).await?;
    let draft = payload.into_inner().into_draft()?;
    let department = state.catalog.create_department(draft).await?;
    info!(department_id = %department.id, code = %department.code, actor = %actor.id, "department created");
    Ok(HttpResponse::Created().json(DepartmentResponse::from(&department)))
}

/// Replace a department's code, name and description.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    params(("id" = String, Path, description = "Department id")),
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Updated department", body = DepartmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown department", body = ErrorSchema),
        (status = 409, description = "Duplicate code", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "updateDepartment"
)]
#[put("/departments/{id}")]
pub async fn update_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<DepartmentRequest>,
) -> ApiResult<web::Json<DepartmentResponse>> {
    require_admin(&state, &session).await?;
    let id: DepartmentId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let draft = payload.into_inner().into_draft()?;
    let department = state.catalog.update_department(id, draft).await?;
    Ok(web::Json(DepartmentResponse::from(&department)))
}

/// Delete a department together with its instructor links.
///
/// Courses and students keep their rows with the department cleared.
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    params(("id" = String, Path, description = "Department id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown department", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "deleteDepartment"
)]
#[delete("/departments/{id}")]
pub async fn delete_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = require_admin(&state, &session).await?;
    let id: DepartmentId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    state.catalog.delete_department(id).await?;
    info!(department_id = %id, actor = %actor.id, "department deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Resolve the department a course code belongs to.
///
/// The longest department code prefixing the course code wins; otherwise the
/// configured default department is reported as a fallback.
#[utoipa::path(
    get,
    path = "/api/v1/departments/match",
    params(DepartmentMatchQuery),
    responses(
        (status = 200, description = "Matched department, if any", body = DepartmentMatchResponse),
        (status = 400, description = "Invalid course code", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "matchDepartment"
)]
#[get("/departments/match")]
pub async fn match_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DepartmentMatchQuery>,
) -> ApiResult<web::Json<DepartmentMatchResponse>> {
    current_actor(&state, &session).await?;
    let field = FieldName::new("courseCode");
    let raw = query
        .course_code
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    let code = CourseCode::new(raw).map_err(|err| invalid_value_error(field, err))?;
    let found = state.assignment_query.department_for(&code).await?;
    Ok(web::Json(DepartmentMatchResponse::new(&code, found.as_ref())))
}
