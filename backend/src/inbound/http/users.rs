//! Login, session and directory handlers.
//!
//! ```text
//! POST /api/v1/login {"email":"admin@uni.edu","password":"password"}
//! GET /api/v1/users/me
//! PATCH /api/v1/users/{id} {"role":"instructor"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Role, UserFilter, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::{LoginRequest, UserListQuery, UserPatchRequest, UserResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, parse_id, parse_optional_id,
};

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => Error::invalid_request("email must be a valid address")
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Directory unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.sign_in(&user_id)?;
    info!(%user_id, "user logged in");
    Ok(HttpResponse::Ok().finish())
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

/// Directory record of the logged-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// List directory users, optionally filtered by role and home department.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    require_admin(&state, &session).await?;
    let query = query.into_inner();
    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|err| invalid_value_error(FieldName::new("role"), err))?;
    let department_id =
        parse_optional_id(query.department_id.as_deref(), FieldName::new("departmentId"))?;
    let filter = UserFilter {
        role,
        department_ids: department_id.map(|id| vec![id]),
    };
    let users = state.catalog_query.list_users(&filter).await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Change a user's role, home department, display name or student number.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserPatchRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown user or department", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UserPatchRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = require_admin(&state, &session).await?;
    let id: UserId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let patch = payload.into_inner().into_patch()?;
    let user = state.catalog.update_user(id, patch).await?;
    info!(user_id = %id, actor = %actor.id, role = user.role.as_str(), "user updated");
    Ok(web::Json(UserResponse::from(&user)))
}
