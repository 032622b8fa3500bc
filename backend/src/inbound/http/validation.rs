//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection carries `details.field` and `details.code` so clients can
//! point at the offending input.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    EmptyPatch,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::EmptyPatch => "empty_patch",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

pub(crate) fn empty_patch_error() -> Error {
    field_error(
        FieldName::new("body"),
        ErrorCode::EmptyPatch,
        "request must change at least one field",
    )
}

/// Reject a field whose value failed domain validation.
pub(crate) fn invalid_value_error(field: FieldName, reason: impl Display) -> Error {
    field_error(
        field,
        ErrorCode::InvalidValue,
        format!("{}: {reason}", field.as_str()),
    )
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    Error::invalid_request(format!("{} must be a valid UUID", field.as_str())).with_details(
        json!({
            "field": field.as_str(),
            "value": value,
            "code": ErrorCode::InvalidUuid.as_str(),
        }),
    )
}

/// Parse a single identifier.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.parse().map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an optional identifier; blank strings count as absent.
pub(crate) fn parse_optional_id<T: FromStr>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_id(raw, field))
        .transpose()
}

/// Parse a list of identifiers, reporting the index of the first bad one.
pub(crate) fn parse_id_list<T: FromStr>(
    values: &[String],
    field: FieldName,
) -> Result<Vec<T>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            value.parse().map_err(|_| {
                Error::invalid_request(format!("{} must contain valid UUIDs", field.as_str()))
                    .with_details(json!({
                        "field": field.as_str(),
                        "index": index,
                        "value": value,
                        "code": ErrorCode::InvalidUuid.as_str(),
                    }))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{DepartmentId, UserId};
    use rstest::rstest;
    use serde_json::Value;

    const ID_FIELD: FieldName = FieldName::new("id");

    #[rstest]
    fn parses_ids_and_reports_bad_values() {
        let id = UserId::random();
        assert_eq!(parse_id::<UserId>(&id.to_string(), ID_FIELD).expect("id"), id);

        let err = parse_id::<UserId>("nope", ID_FIELD).expect_err("invalid");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "id");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "nope");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn blank_optional_ids_are_absent(#[case] raw: Option<&str>) {
        let parsed = parse_optional_id::<DepartmentId>(raw, ID_FIELD).expect("absent");
        assert_eq!(parsed, None);
    }

    #[rstest]
    fn list_errors_name_the_index() {
        let values = vec![DepartmentId::random().to_string(), "bad".to_owned()];
        let err = parse_id_list::<DepartmentId>(&values, FieldName::new("departmentIds"))
            .expect_err("invalid");
        let details = err.details().expect("details");
        assert_eq!(details.get("index").and_then(Value::as_u64), Some(1));
        assert_eq!(details["field"], "departmentIds");
    }

    #[rstest]
    fn invalid_values_prefix_the_field() {
        let err = invalid_value_error(FieldName::new("year"), "out of range");
        assert_eq!(err.message(), "year: out of range");
        assert_eq!(err.details().expect("details")["code"], "invalid_value");
    }
}
