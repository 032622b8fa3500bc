//! OpenAPI stand-ins for the domain error envelope.
//!
//! `domain::Error` stays free of utoipa derives; these mirror its JSON shape
//! and are registered under the names `ApiError` and `ApiErrorCode`.

use utoipa::ToSchema;

/// Machine-readable error class. `details.kind` narrows it further.
#[derive(ToSchema)]
#[schema(as = ApiErrorCode)]
pub enum ErrorCodeSchema {
    /// Validation failed; includes assignment rejections.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No valid session.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Signed in but lacking the role.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// Unknown instructor, department, course or user.
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate code, duplicate enrollment or stale settings revision.
    #[schema(rename = "conflict")]
    Conflict,
    /// A store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// A store call exceeded the dependency timeout.
    #[schema(rename = "gateway_timeout")]
    GatewayTimeout,
    /// Redacted server fault.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error body returned by every endpoint.
#[derive(ToSchema)]
#[schema(as = ApiError, rename_all = "camelCase")]
#[expect(dead_code, reason = "only read by utoipa")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "instructor is not assigned to departments: MATH")]
    message: String,
    /// Matches the `trace-id` response header.
    #[schema(example = "6c1d8e2f-3a4b-4c5d-9e6f-7a8b9c0d1e2f")]
    trace_id: Option<String>,
    /// Structured context; `kind` names the specific failure, for example
    /// `department_not_assigned` or `dependency_timeout`.
    details: Option<serde_json::Value>,
}
