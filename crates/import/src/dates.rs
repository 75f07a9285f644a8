//! Start-date normalization for imported rows.

use chrono::{Days, NaiveDate};

/// Spreadsheet serial values outside this range are not treated as dates.
const SERIAL_RANGE: std::ops::RangeInclusive<i64> = 1000..=50000;

/// Fixed date substituted when a cell cannot be interpreted at all, so
/// repeated imports of the same file stay identical.
pub fn fallback_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

/// Normalizes a raw date cell.
///
/// Accepts ISO `YYYY-MM-DD`, day-first `DD/MM/YYYY` (also with `-` or `.`
/// separators), and integer spreadsheet serials counted from 1899-12-30.
/// Anything else gets the fixed fallback date; a row never fails on its
/// date cell.
pub fn normalize_date(raw: &str) -> NaiveDate {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback_date();
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date;
    }

    for sep in ['/', '-', '.'] {
        if let Some(date) = parse_day_first(trimmed, sep) {
            return date;
        }
    }

    if let Ok(serial) = trimmed.parse::<i64>() {
        if SERIAL_RANGE.contains(&serial) {
            if let Some(date) = from_serial(serial) {
                return date;
            }
        }
    }

    fallback_date()
}

fn parse_day_first(s: &str, sep: char) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year_part = parts[2].trim();
    if year_part.len() != 4 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn from_serial(serial: i64) -> Option<NaiveDate> {
    // Spreadsheets count day 1 as 1900-01-01 but carry the fictitious
    // 1900-02-29, so modern serials line up with a 1899-12-30 epoch.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_iso_dates_pass_through() {
        assert_eq!(normalize_date("2025-03-15"), iso("2025-03-15"));
        assert_eq!(normalize_date("  2025-03-15  "), iso("2025-03-15"));
    }

    #[test]
    fn test_day_first_formats() {
        assert_eq!(normalize_date("15/03/2025"), iso("2025-03-15"));
        assert_eq!(normalize_date("15-03-2025"), iso("2025-03-15"));
        assert_eq!(normalize_date("15.03.2025"), iso("2025-03-15"));
        assert_eq!(normalize_date("1/2/2025"), iso("2025-02-01"));
    }

    #[test]
    fn test_spreadsheet_serials() {
        assert_eq!(normalize_date("45292"), iso("2024-01-01"));
        assert_eq!(normalize_date("44927"), iso("2023-01-01"));
    }

    #[test]
    fn test_serials_outside_range_fall_back() {
        assert_eq!(normalize_date("999"), fallback_date());
        assert_eq!(normalize_date("50001"), fallback_date());
        assert_eq!(normalize_date("-45292"), fallback_date());
    }

    #[test]
    fn test_garbage_gets_the_fixed_fallback() {
        assert_eq!(normalize_date(""), fallback_date());
        assert_eq!(normalize_date("soon"), fallback_date());
        assert_eq!(normalize_date("31/02/2025"), fallback_date());
        assert_eq!(normalize_date("1/2/25"), fallback_date());
        assert_eq!(fallback_date(), iso("2025-01-01"));
    }
}
