//! HTTP rendering of the domain error envelope.
//!
//! Each `ErrorCode` maps to one status. Assignment rejections keep their
//! `details.kind` payload so clients can tell `department_not_assigned` from
//! a plain validation failure. Store outages and timeouts are logged with the
//! dependency they name, and a 503 advertises a short `Retry-After`. Internal
//! errors lose their message and details before they leave the process.

use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Seconds a client should wait before retrying after a store outage.
const RETRY_AFTER_SECS: &str = "1";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn detail<'a>(error: &'a Error, field: &str) -> Option<&'a str> {
    error
        .details()
        .and_then(|details| details.get(field))
        .and_then(|value| value.as_str())
}

/// Specific failure kind carried in `details.kind`, if any.
pub(crate) fn error_kind(error: &Error) -> Option<&str> {
    detail(error, "kind")
}

fn log_rejection(error: &Error) {
    let kind = error_kind(error).unwrap_or("unspecified");
    match error.code() {
        ErrorCode::ServiceUnavailable | ErrorCode::GatewayTimeout => warn!(
            kind,
            dependency = detail(error, "dependency").unwrap_or("unknown"),
            message = error.message(),
            "store dependency failed"
        ),
        ErrorCode::InternalError => error!(message = error.message(), "request failed"),
        _ => debug!(kind, code = ?error.code(), "request rejected"),
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_rejection(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::ServiceUnavailable {
            builder.insert_header((RETRY_AFTER, RETRY_AFTER_SECS));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}
