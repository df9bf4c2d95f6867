//! Next-refresh scheduling from RSS `ttl`, `skipHours` and `skipDays` hints.
//!
//! Hours and weekdays are evaluated in UTC.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};

use super::diagnostics::{Diagnostic, Diagnostics};

/// Scheduling hints carried by an RSS channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshHints {
    /// Minutes the feed may be cached. `None` or `Some(0)` means no hint.
    pub ttl_minutes: Option<u32>,
    /// Hours (0-23) during which the feed should not be fetched.
    pub skip_hours: Vec<u32>,
    /// Weekday names during which the feed should not be fetched.
    pub skip_days: Vec<String>,
}

/// Computes when a feed should next be fetched.
///
/// Without a TTL the result is `now + default_interval`. Otherwise the
/// candidate `now + ttl` is pushed past skip-hours and then past skip-days:
///
/// - skip-hours are checked once each, in ascending order; a match moves the
///   candidate to the top of the following hour
/// - skip-days are rescanned after every match until the candidate's weekday
///   is not listed; a match moves the candidate into the next calendar day
///
/// If every weekday is listed the day scan stops after one full week.
pub fn next_refresh(
    now: DateTime<Utc>,
    hints: &RefreshHints,
    default_interval: Duration,
) -> DateTime<Utc> {
    schedule(now, hints, default_interval, &mut Diagnostics::default())
}

pub(crate) fn schedule(
    now: DateTime<Utc>,
    hints: &RefreshHints,
    default_interval: Duration,
    diagnostics: &mut Diagnostics,
) -> DateTime<Utc> {
    let ttl = match hints.ttl_minutes {
        Some(ttl) if ttl > 0 => ttl,
        _ => return now + default_interval,
    };

    let mut next = now + Duration::minutes(i64::from(ttl));

    let mut skip_hours = hints.skip_hours.clone();
    skip_hours.sort_unstable();
    for hour in skip_hours {
        if hour == next.hour() {
            next += Duration::minutes(60 - i64::from(next.minute()));
        }
    }

    let skip_days: Vec<String> = hints.skip_days.iter().map(|d| title_case(d)).collect();
    let mut advanced = 0;
    while skip_days.iter().any(|day| day == weekday_name(next.weekday())) {
        if advanced == 7 {
            diagnostics.push(Diagnostic::AllDaysSkipped);
            break;
        }
        next += Duration::hours(24 - i64::from(next.hour()));
        advanced += 1;
    }

    next
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Upper-cases the first letter of every word and leaves the rest alone,
/// so `"monday"` matches but `"MONDAY"` does not.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric() && c != '_';
    }
    out
}
