//! Boundary numeric coercion.

/// Parse a provider-supplied numeric string.
///
/// Missing, malformed, or non-finite values yield `0.0`; one bad field must
/// not fail a whole batch.
#[must_use]
pub fn parse_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse an optional numeric string, keeping absence distinct from zero.
#[must_use]
pub fn parse_optional_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Percent change of `change` against `previous_close`.
///
/// Returns `0.0` when there is no usable previous close.
#[must_use]
pub fn change_percent(change: f64, previous_close: f64) -> f64 {
    if previous_close > 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_valid() {
        assert_eq!(parse_number("150.25"), 150.25);
        assert_eq!(parse_number(" -3 "), -3.0);
    }

    #[test]
    fn parse_number_invalid_is_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number("NaN"), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
    }

    #[test]
    fn parse_optional_number_keeps_absence() {
        assert_eq!(parse_optional_number(None), None);
        assert_eq!(parse_optional_number(Some("bad")), None);
        assert_eq!(parse_optional_number(Some("1.5")), Some(1.5));
    }

    #[test]
    fn change_percent_guards_zero_close() {
        assert_eq!(change_percent(2.0, 0.0), 0.0);
        assert_eq!(change_percent(2.0, -1.0), 0.0);
        assert!((change_percent(2.0, 188.0) - 1.063_829_787).abs() < 1e-6);
    }
}
