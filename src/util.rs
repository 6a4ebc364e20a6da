// Utility helpers for parsing and formatting.
//
// This module centralizes all the "dirty" cell-value handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a monetary cell in the source system's Brazilian convention:
/// optional `R$` prefix, `.` as the thousands separator, `,` as the decimal
/// separator.
///
/// - `"R$ 1.234,56"` parses to `1234.56`.
/// - Returns `None` for blanks and anything non-numeric after cleanup;
///   the loader zero-fills those.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = s
        .strip_prefix("R$")
        .or_else(|| s.strip_prefix("r$"))
        .unwrap_or(s)
        .trim_start();
    if s.is_empty() {
        return None;
    }
    let cleaned = s.replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok()
}

/// Parse a percentage cell directly as a decimal number. A trailing `%` and a
/// decimal comma are tolerated. Missing and unparsable values stay missing so
/// downstream means can exclude them instead of averaging in zeros.
pub fn parse_percent(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%').trim_end();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }
    if s.contains(',') && !s.contains('.') {
        return s.replace(',', ".").parse::<f64>().ok();
    }
    None
}

/// Parse a student-count cell. The literal sentinel `n/A` means
/// "not applicable" and maps to zero; other non-numeric values return `None`
/// and are zero-filled by the loader.
pub fn parse_count(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.eq_ignore_ascii_case("n/a") {
        return Some(0.0);
    }
    s.parse::<f64>().ok()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Render a monetary value the way the source system does: `R$` prefix,
/// `.` grouping separators, no decimal places.
pub fn format_currency(n: f64) -> String {
    format!("R$ {}", (n.round() as i64).to_formatted_string(&Locale::pt))
}

pub fn format_percent(p: f64) -> String {
    format!("{:.1}%", p)
}

/// Grouped-thousands rendering for student counts, same separators as the
/// monetary columns.
pub fn format_count(n: u64) -> String {
    n.to_formatted_string(&Locale::pt)
}

pub fn format_int(n: usize) -> String {
    // Used for counts in console messages (e.g., `9,855 rows loaded`).
    (n as i64).to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_parses_brazilian_format() {
        assert_eq!(parse_currency("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_currency("r$ 500"), Some(500.0));
        assert_eq!(parse_currency("2.000,00"), Some(2000.0));
        assert_eq!(parse_currency("R$ -1.000,50"), Some(-1000.5));
    }

    #[test]
    fn currency_rejects_non_numeric() {
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("   "), None);
        assert_eq!(parse_currency("R$"), None);
        assert_eq!(parse_currency("isento"), None);
    }

    #[test]
    fn percent_preserves_missing() {
        assert_eq!(parse_percent("12.5"), Some(12.5));
        assert_eq!(parse_percent("12,5"), Some(12.5));
        assert_eq!(parse_percent("10%"), Some(10.0));
        assert_eq!(parse_percent(""), None);
        assert_eq!(parse_percent("n/A"), None);
    }

    #[test]
    fn count_maps_sentinel_to_zero() {
        assert_eq!(parse_count("n/A"), Some(0.0));
        assert_eq!(parse_count("N/a"), Some(0.0));
        assert_eq!(parse_count("1"), Some(1.0));
        assert_eq!(parse_count("1.0"), Some(1.0));
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn currency_formatting_matches_source_rendering() {
        assert_eq!(format_currency(1234.56), "R$ 1.235");
        assert_eq!(format_currency(0.0), "R$ 0");
        assert_eq!(format_currency(-1500.0), "R$ -1.500");
        assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000");
    }

    #[test]
    fn percent_and_count_formatting() {
        assert_eq!(format_percent(12.34), "12.3%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_count(1234), "1.234");
    }

    #[test]
    fn average_skips_nothing_and_handles_empty() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[10.0, 20.0]), 15.0);
    }
}
