//! Feed timestamp parsing.
//!
//! Feeds in the wild use RFC 822/2822 dates (RSS), RFC 3339 dates (Atom) and
//! a long tail of near-misses. The grammars below are tried in a fixed order
//! and the first match wins. Month and weekday names are the English set.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Formats carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%a %b %d %H:%M:%S %z %Y",
];

/// Formats without any zone; read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
];

/// Date-only formats; read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%a, %d %b %Y", "%d %b %Y", "%B %d, %Y"];

/// Zone abbreviations seen in feeds that RFC 2822 does not define.
const ZONE_OFFSETS: &[(&str, &str)] = &[
    ("UT", "+0000"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("WET", "+0000"),
    ("WEST", "+0100"),
    ("BST", "+0100"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
    ("MSK", "+0300"),
    ("IST", "+0530"),
    ("SGT", "+0800"),
    ("HKT", "+0800"),
    ("JST", "+0900"),
    ("KST", "+0900"),
    ("AEST", "+1000"),
    ("AEDT", "+1100"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
    ("AST", "-0400"),
    ("ADT", "-0300"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
    ("AKST", "-0900"),
    ("AKDT", "-0800"),
    ("HST", "-1000"),
];

/// Parses a feed date string into a UTC timestamp.
///
/// Returns `None` when no known grammar matches. Never panics.
///
/// # Examples
///
/// ```
/// use feednorm::feed::parse_date;
///
/// let date = parse_date("Sun, 06 Sep 2009 16:45:00 +0000").unwrap();
/// assert_eq!(date.to_rfc3339(), "2009-09-06T16:45:00+00:00");
///
/// assert!(parse_date("yesterday-ish").is_none());
/// ```
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    with_numeric_zone(value)
        .and_then(|v| parse_known(&v))
        .or_else(|| parse_known(value))
        .or_else(|| with_zulu_offset(value).and_then(|v| parse_known(&v)))
        // Feeds frequently carry a weekday that disagrees with the date.
        .or_else(|| without_weekday(value).and_then(parse_date))
}

fn parse_known(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
        .map(|date| date.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

/// Replaces a trailing zone abbreviation with its numeric offset.
fn with_numeric_zone(value: &str) -> Option<String> {
    let (head, zone) = value.rsplit_once(' ')?;
    let zone = zone.to_ascii_uppercase();
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, offset)| format!("{} {offset}", head.trim_end()))
}

/// Rewrites a `Z` glued to the time (`18:30Z`) as `+00:00`.
fn with_zulu_offset(value: &str) -> Option<String> {
    let head = value.strip_suffix(['Z', 'z'])?;
    if !head.ends_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{head}+00:00"))
}

/// Strips a leading `Weekday,` prefix.
fn without_weekday(value: &str) -> Option<&str> {
    let (weekday, rest) = value.split_once(',')?;
    if weekday.is_empty() || !weekday.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(rest.trim_start())
}
