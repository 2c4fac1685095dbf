//! Lenient calendar-date handling for CRM timestamps.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Query-string format the CRM expects for date filters.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse the calendar day of a CRM date or timestamp.
///
/// Returns `None` for sentinels like `"Por definir"` and anything else that
/// isn't a recognisable date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    // Date part only; also covers "YYYY-MM-DD HH" and other odd time suffixes.
    let head = trimmed.split_whitespace().next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}

/// Whole days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// First day of the sales operating year containing `today`.
///
/// The operating year runs from September 1 through August 31.
pub fn operating_year_start(today: NaiveDate) -> NaiveDate {
    let year = if today.month() >= 9 {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, 9, 1).unwrap_or(today)
}

/// Default listing window: operating year start through today.
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (operating_year_start(today), today)
}

pub fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Days left in the calendar month after `today`.
pub fn days_remaining_in_month(today: NaiveDate) -> i64 {
    let last = month_start(today)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(today);
    days_between(today, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-09-01 10:30:00"), Some(d(2024, 9, 1)));
        assert_eq!(parse_date("2024-09-01 10:30"), Some(d(2024, 9, 1)));
        assert_eq!(parse_date("2024-09-01"), Some(d(2024, 9, 1)));
        assert_eq!(parse_date("15-10-2024"), Some(d(2024, 10, 15)));
        assert_eq!(parse_date("15/10/2024"), Some(d(2024, 10, 15)));
        assert_eq!(parse_date("2024-09-01T08:00:00-03:00"), Some(d(2024, 9, 1)));
        assert_eq!(parse_date("  2024-09-01 9 "), Some(d(2024, 9, 1)));
    }

    #[test]
    fn test_parse_date_rejects_sentinels() {
        assert_eq!(parse_date("Por definir"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }

    #[test]
    fn test_operating_year_start() {
        assert_eq!(operating_year_start(d(2024, 9, 1)), d(2024, 9, 1));
        assert_eq!(operating_year_start(d(2024, 12, 31)), d(2024, 9, 1));
        assert_eq!(operating_year_start(d(2025, 3, 10)), d(2024, 9, 1));
        assert_eq!(operating_year_start(d(2025, 8, 31)), d(2024, 9, 1));
    }

    #[test]
    fn test_default_window_ends_today() {
        let today = d(2025, 2, 14);
        assert_eq!(default_window(today), (d(2024, 9, 1), today));
    }

    #[test]
    fn test_days_remaining_in_month() {
        assert_eq!(days_remaining_in_month(d(2024, 9, 10)), 20);
        assert_eq!(days_remaining_in_month(d(2024, 2, 29)), 0);
        assert_eq!(days_remaining_in_month(d(2024, 12, 1)), 30);
    }
}
