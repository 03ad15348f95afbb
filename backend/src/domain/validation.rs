//! Shared field validation helpers producing `invalid_request` errors with
//! `{ "field", "code" }` details.

use serde_json::json;

use super::Error;

/// Build an `invalid_request` error naming the offending field.
pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

/// Trim `raw` and require it to be non-empty and at most `max` characters.
pub(crate) fn required_text(field: &str, raw: &str, max: usize) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(field_error(field, "required", format!("{field} is required")));
    }
    bounded(field, trimmed, 1, max)
}

/// Like [`required_text`] but with a minimum length.
pub(crate) fn text_between(field: &str, raw: &str, min: usize, max: usize) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(field_error(field, "required", format!("{field} is required")));
    }
    bounded(field, trimmed, min, max)
}

/// Blank input becomes `None`; anything else must satisfy [`required_text`].
pub(crate) fn optional_text(
    field: &str,
    raw: Option<&str>,
    max: usize,
) -> Result<Option<String>, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_text(field, value, max).map(Some),
    }
}

/// Require `value` to lie in `min..=max`.
pub(crate) fn in_range<T>(field: &str, value: T, min: T, max: T) -> Result<T, Error>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(field_error(
            field,
            "out_of_range",
            format!("{field} must be between {min} and {max}"),
        ));
    }
    Ok(value)
}

fn bounded(field: &str, trimmed: &str, min: usize, max: usize) -> Result<String, Error> {
    let length = trimmed.chars().count();
    if length < min {
        return Err(field_error(
            field,
            "too_short",
            format!("{field} must be at least {min} characters"),
        ));
    }
    if length > max {
        return Err(field_error(
            field,
            "too_long",
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  ", "required")]
    #[case("ab", "too_short")]
    #[case("abcdefghijk", "too_long")]
    fn text_between_reports_code(#[case] raw: &str, #[case] code: &str) {
        let err = text_between("subject", raw, 3, 10).expect_err("invalid text");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "subject");
        assert_eq!(details["code"], code);
    }

    #[rstest]
    fn optional_text_maps_blank_to_none() {
        assert_eq!(optional_text("city", Some("   "), 10).expect("ok"), None);
        assert_eq!(
            optional_text("city", Some(" Nairobi "), 10).expect("ok").as_deref(),
            Some("Nairobi")
        );
    }

    #[rstest]
    #[case(14, false)]
    #[case(15, true)]
    #[case(240, true)]
    #[case(241, false)]
    fn in_range_is_inclusive(#[case] value: i32, #[case] ok: bool) {
        assert_eq!(in_range("duration", value, 15, 240).is_ok(), ok);
    }
}
