//! Locale-independent numeric formatting for request fields
//!
//! The service reads numeric request fields as raw tokens, so they are
//! rendered with a `.` decimal point, no grouping separators, at most six
//! fractional digits and no trailing zeros. The output never depends on the
//! host environment.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Maximum number of fractional digits rendered
pub const MAX_FRACTION_DIGITS: u32 = 6;

/// Formats a number for the request document
///
/// Works from the shortest decimal text that reads back as `value`, so
/// binary expansion digits never reach the output. Returns `None` for values
/// that are not finite or lie outside the [`Decimal`] range.
///
/// # Examples
///
/// ```
/// use i2b2_pdo::request::format::format_number;
///
/// assert_eq!(format_number(1234.5).as_deref(), Some("1234.5"));
/// assert_eq!(format_number(50.0).as_deref(), Some("50"));
/// assert_eq!(format_number(1.0 / 3.0).as_deref(), Some("0.333333"));
/// assert_eq!(format_number(f64::NAN), None);
/// ```
pub fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let decimal = Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))?;
    Some(format_decimal(decimal))
}

/// Formats an already exact decimal for the request document
pub fn format_decimal(value: Decimal) -> String {
    value
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointNearestEven)
        .normalize()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, "0" ; "zero")]
    #[test_case(-0.0, "0" ; "negative zero")]
    #[test_case(1.0, "1" ; "one")]
    #[test_case(50.0, "50" ; "integral value")]
    #[test_case(1234.5, "1234.5" ; "no grouping separator")]
    #[test_case(1234567.0, "1234567" ; "millions stay ungrouped")]
    #[test_case(0.1, "0.1" ; "binary fraction trimmed")]
    #[test_case(2.0000004, "2" ; "rounded below sixth digit")]
    #[test_case(0.1234567, "0.123457" ; "six fractional digits")]
    #[test_case(-12.25, "-12.25" ; "negative")]
    #[test_case(9007199254740.99, "9007199254740.99" ; "large magnitude keeps shortest digits")]
    #[test_case(123456789012345.67, "123456789012345.67" ; "fifteen integral digits")]
    #[test_case(1e20, "100000000000000000000" ; "large integral")]
    fn test_format_number(value: f64, expected: &str) {
        assert_eq!(format_number(value).as_deref(), Some(expected));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        assert_eq!(format_number(f64::NAN), None);
        assert_eq!(format_number(f64::INFINITY), None);
        assert_eq!(format_number(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_out_of_decimal_range_rejected() {
        assert_eq!(format_number(1e29), None);
        assert_eq!(format_number(-1e29), None);
    }

    #[test]
    fn test_format_decimal_trims_trailing_zeros() {
        let value = Decimal::from_str("10.500000").unwrap();
        assert_eq!(format_decimal(value), "10.5");
    }

    #[test]
    fn test_format_decimal_midpoint_rounds_to_even() {
        let value = Decimal::from_str("0.0000125").unwrap();
        assert_eq!(format_decimal(value), "0.000012");
    }
}
