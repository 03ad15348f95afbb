//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces `invalid_request` errors with a `details` object of
//! the form `{"field": ..., "code": ..., "value": ...}`.

use std::str::FromStr;

use chrono::NaiveDate;
use pagination::{CursorError, PageRequest};
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidValue,
    InvalidCursor,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidValue => "invalid_value",
            Self::InvalidCursor => "invalid_cursor",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Wrap a domain validation failure for `field`. The rejected value is not
/// echoed, since it may be a password.
pub(crate) fn invalid_field(field: FieldName, err: impl std::fmt::Display) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::InvalidValue.as_str(),
    }))
}

/// Parse a typed identifier such as `UniversityId` from a path segment.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.parse().map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

/// Parse a closed vocabulary value such as a status filter.
pub(crate) fn parse_choice<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| {
        field_error(field, ErrorCode::InvalidValue, err.to_string(), value)
    })
}

/// Parse an optional query parameter through [`parse_choice`].
pub(crate) fn parse_optional_choice<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map(|raw| parse_choice(raw, field)).transpose()
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        field_error(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be a YYYY-MM-DD date", field.as_str()),
            value,
        )
    })
}

/// Build a page request from `limit` and `cursor` query parameters.
pub(crate) fn page_request(limit: Option<u32>, cursor: Option<&str>) -> Result<PageRequest, Error> {
    PageRequest::new(limit, cursor).map_err(|err: CursorError| {
        field_error(
            FieldName::new("cursor"),
            ErrorCode::InvalidCursor,
            err.to_string(),
            cursor.unwrap_or_default(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MeetingStatus, UniversityId};
    use rstest::rstest;

    #[rstest]
    fn bad_uuid_names_the_field() {
        let err = parse_id::<UniversityId>("nope", FieldName::new("universityId"))
            .expect_err("invalid");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "universityId");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case("PENDING", Some(MeetingStatus::Pending))]
    #[case("CONFIRMED", Some(MeetingStatus::Confirmed))]
    fn statuses_parse(#[case] raw: &str, #[case] expected: Option<MeetingStatus>) {
        let parsed = parse_optional_choice::<MeetingStatus>(Some(raw), FieldName::new("status"))
            .expect("valid");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let err = parse_choice::<MeetingStatus>("pending", FieldName::new("status"))
            .expect_err("case sensitive");
        assert_eq!(err.details().expect("details")["code"], "invalid_value");
    }

    #[rstest]
    #[case("2026-02-30")]
    #[case("01/03/2026")]
    fn bad_dates(#[case] raw: &str) {
        assert!(parse_date(raw, FieldName::new("from")).is_err());
    }

    #[rstest]
    fn garbage_cursor_is_rejected() {
        let err = page_request(Some(10), Some("%%%")).expect_err("bad cursor");
        assert_eq!(err.details().expect("details")["code"], "invalid_cursor");
    }
}
