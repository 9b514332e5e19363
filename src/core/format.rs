//! Presentation helpers for the formatted fields of a pool record.

use num_format::{Locale, ToFormattedString};

/// Formats `value` with thousands separators, rounded to `max_decimals` and
/// trimmed of trailing zeros down to `min_decimals`.
pub fn format_currency(value: f64, min_decimals: usize, max_decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let max_decimals = max_decimals.max(min_decimals);
    let fixed = format!("{:.*}", max_decimals, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.to_string();
    while frac.len() > min_decimals && frac.ends_with('0') {
        frac.pop();
    }

    let grouped = int_part
        .parse::<u128>()
        .map_or_else(|_| int_part.to_string(), |n| n.to_formatted_string(&Locale::en));

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Dollar amount with up to four decimals, as shown for TVL and balances.
pub fn format_usd(value: f64) -> String {
    format!("${}", format_currency(value, 0, 4))
}

/// Formats a ratio as a percentage with two decimals (`0.05` -> `5.00%`).
pub fn format_percent(ratio: f64) -> String {
    let pct = if ratio.is_finite() { ratio * 100.0 } else { 0.0 };
    format!("{pct:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, 0, 4), "1,234.5");
        assert_eq!(format_currency(100.0, 0, 4), "100");
        assert_eq!(format_currency(0.123456, 0, 4), "0.1235");
        assert_eq!(format_currency(5.0, 2, 4), "5.00");
        assert_eq!(format_currency(1234567.0, 0, 2), "1,234,567");
        assert_eq!(format_currency(-42.5, 0, 2), "-42.5");
        assert_eq!(format_currency(f64::NAN, 0, 2), "0");
        assert_eq!(format_currency(12_345_678_901.5, 0, 2), "12,345,678,901.5");
    }

    #[test]
    fn test_format_usd_and_percent() {
        assert_eq!(format_usd(1500.25), "$1,500.25");
        assert_eq!(format_percent(0.05), "5.00%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(0.1234), "12.34%");
    }
}
