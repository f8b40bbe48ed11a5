//! Wall-clock date parsing shared by front-matter, helpers and the feed.
//!
//! Dates carry no timezone. An offset in an RFC 3339 string is honoured only
//! to pick the local wall-clock reading it was written in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Accepted layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date string.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]`, the same with a space
/// separator, and RFC 3339 with an offset or `Z`.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.len() < 10 {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Interpret an integer as milliseconds since the Unix epoch.
pub fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// RFC 2822 rendering for feeds, reading the wall-clock value as UTC.
pub fn to_rfc2822(dt: NaiveDateTime) -> String {
    Utc.from_utc_datetime(&dt).to_rfc2822()
}

/// `1st`, `2nd`, `3rd`, `4th`, ..., `11th`, `21st`.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date_only() {
        let dt = parse_date("2020-01-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 1, 1));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_datetime_variants() {
        for s in [
            "2020-01-01T01:00",
            "2020-01-01T01:00:00",
            "2020-01-01 01:00",
            "2020-01-01 01:00:00",
        ] {
            let dt = parse_date(s).unwrap_or_else(|| panic!("failed to parse {s}"));
            assert_eq!(dt.hour(), 1, "{s}");
        }
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let dt = parse_date("2020-01-01T01:00:00+05:00").unwrap();
        assert_eq!(dt.hour(), 1);
        let dt = parse_date("2020-01-01T01:00:00Z").unwrap();
        assert_eq!(dt.hour(), 1);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("2020-13-01").is_none());
        assert!(parse_date("2020-02-30").is_none());
        assert!(parse_date("2020").is_none());
    }

    #[test]
    fn test_epoch_millis() {
        let dt = from_epoch_millis(1_577_840_400_000).unwrap();
        assert_eq!(dt, parse_date("2020-01-01T01:00:00").unwrap());
    }

    #[test]
    fn test_to_rfc2822() {
        let dt = parse_date("2024-01-15").unwrap();
        assert_eq!(to_rfc2822(dt), "Mon, 15 Jan 2024 00:00:00 +0000");
    }

    #[test]
    fn test_ordinal() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (31, "31st"),
        ];
        for (n, expected) in cases {
            assert_eq!(ordinal(n), expected);
        }
    }
}
