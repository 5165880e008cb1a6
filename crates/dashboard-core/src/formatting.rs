/// Placeholder shown wherever a sentinel (`None`) value would be printed.
pub const NOT_AVAILABLE: &str = "n/a";

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // "-0.00" reads badly; only negative values that survive rounding get a sign.
    if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format an invoiced amount with two decimals and a euro suffix.
///
/// ```
/// use dashboard_core::formatting::format_amount;
///
/// assert_eq!(format_amount(1234.5), "1,234.50 €");
/// ```
pub fn format_amount(amount: f64) -> String {
    format!("{} €", format_number(amount, 2))
}

/// Format an optional statistic, printing [`NOT_AVAILABLE`] for `None`.
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format_number(v, decimals),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format an optional percentage as e.g. `"37.5%"`.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", format_number(v, 1)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(12345678.9, 1), "12,345,678.9");
    }

    #[test]
    fn test_format_number_rounds() {
        assert_eq!(format_number(2.345, 1), "2.3");
        assert_eq!(format_number(0.999, 2), "1.00");
    }

    #[test]
    fn test_format_number_negative_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00 €");
        assert_eq!(format_amount(1500.0), "1,500.00 €");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(8.0), 1), "8.0");
        assert_eq!(format_optional(None, 1), "n/a");
        assert_eq!(format_optional(Some(f64::NAN), 1), "n/a");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(60.0)), "60.0%");
        assert_eq!(format_percentage(None), "n/a");
    }
}
