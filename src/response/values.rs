//! Lenient scalar parsing for response fields
//!
//! Every function returns `None` for blank input. Callers decide whether a
//! non-blank value that fails to parse is worth a fault.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Outcome of reading an optional field
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Field<T> {
    /// Absent or blank
    Missing,
    /// Present and parsed
    Value(T),
    /// Present but unusable
    Invalid(String),
}

impl<T> Field<T> {
    pub(crate) fn read(raw: Option<&str>, parse: impl FnOnce(&str) -> Option<T>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Field::Missing,
            Some(text) => match parse(text) {
                Some(value) => Field::Value(value),
                None => Field::Invalid(text.to_string()),
            },
        }
    }
}

/// Decimal in plain or scientific notation
pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .map(|d| d.normalize())
}

/// Non-negative whole number; `52.0` is accepted, `52.5` is not
pub(crate) fn parse_whole(raw: &str) -> Option<u32> {
    let value = parse_decimal(raw)?;
    if !value.fract().is_zero() {
        return None;
    }
    value.to_u32()
}

/// RFC 3339, offset-less ISO date-time (read as UTC) or plain date
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("95", "95" ; "integer")]
    #[test_case(" 1234.50 ", "1234.5" ; "surrounding whitespace")]
    #[test_case("-0.25", "-0.25" ; "negative")]
    #[test_case("1.5e2", "150" ; "scientific")]
    fn test_parse_decimal(raw: &str, expected: &str) {
        assert_eq!(parse_decimal(raw).unwrap().to_string(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("high" ; "word")]
    #[test_case("1,234" ; "grouped")]
    fn test_parse_decimal_rejects(raw: &str) {
        assert!(parse_decimal(raw).is_none());
    }

    #[test_case("52", Some(52) ; "integer")]
    #[test_case("52.0", Some(52) ; "integral decimal")]
    #[test_case("52.5", None ; "fractional")]
    #[test_case("-1", None ; "negative")]
    #[test_case("abc", None ; "not a number")]
    fn test_parse_whole(raw: &str, expected: Option<u32>) {
        assert_eq!(parse_whole(raw), expected);
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = Utc.with_ymd_and_hms(2010, 3, 4, 5, 0, 0).unwrap();

        assert_eq!(parse_datetime("2010-03-04T05:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2010-03-04T00:00:00.000-05:00"), Some(expected));
        assert_eq!(parse_datetime("2010-03-04T05:00:00"), Some(expected));
        assert_eq!(parse_datetime("2010-03-04 05:00:00.000"), Some(expected));
        assert_eq!(
            parse_datetime("2010-03-04"),
            Some(Utc.with_ymd_and_hms(2010, 3, 4, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2010-13-45").is_none());
    }

    #[test]
    fn test_field_read() {
        assert_eq!(Field::read(None, parse_whole), Field::Missing);
        assert_eq!(Field::read(Some("  "), parse_whole), Field::Missing);
        assert_eq!(Field::read(Some("7"), parse_whole), Field::Value(7));
        assert_eq!(
            Field::read(Some(" x "), parse_whole),
            Field::Invalid("x".to_string())
        );
    }
}
