//! Lenient date/time parsing for dataset cells and alert timestamps.
//!
//! Input files come from spreadsheets and exports with no agreed format, so
//! parsing tries a fixed list of layouts and gives up quietly. Callers treat a
//! `None` as "no usable date" and skip whatever rule needed it.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Layout used when writing alert timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%b %d, %Y %I:%M %p",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y"];

/// Parses a date or date-time cell into a local wall-clock instant.
///
/// Date-only values resolve to midnight. Values carrying an offset are
/// converted to local time.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(s, layout).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Renders an alert timestamp.
#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local wall-clock time.
#[must_use]
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Hours elapsed from `from` to `to` (negative if `to` is earlier).
#[must_use]
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use test_case::test_case;

    #[test_case("2025-07-10 14:30:00" ; "space separated")]
    #[test_case("2025-07-10T14:30:00" ; "iso t separated")]
    #[test_case("2025-07-10 14:30" ; "no seconds")]
    #[test_case("07/10/2025 14:30" ; "us layout")]
    #[test_case("Jul 10, 2025 02:30 PM" ; "review layout")]
    fn parses_datetime_layouts(raw: &str) {
        let dt = parse_datetime(raw).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 7, 10).unwrap());
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn date_only_is_midnight() {
        let dt = parse_datetime("2025-07-10").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn fractional_seconds_round_trip() {
        let dt = parse_datetime("2025-07-10 14:30:00.123456").unwrap();
        assert_eq!(format_timestamp(&dt), "2025-07-10 14:30:00.123456");
    }

    #[test]
    fn whole_seconds_render_without_fraction() {
        let dt = parse_datetime("2025-07-10 14:30:05").unwrap();
        assert_eq!(format_timestamp(&dt), "2025-07-10 14:30:05");
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("not a date" ; "garbage")]
    #[test_case("2025-13-40" ; "out of range")]
    fn rejects_unparseable(raw: &str) {
        assert!(parse_datetime(raw).is_none());
    }

    #[test]
    fn hours_between_signs() {
        let a = parse_datetime("2025-07-10 00:00:00").unwrap();
        let b = parse_datetime("2025-07-12 06:00:00").unwrap();
        assert!((hours_between(a, b) - 54.0).abs() < 1e-9);
        assert!((hours_between(b, a) + 54.0).abs() < 1e-9);
    }
}
