//! Natural-language distances between two instants ("3 days ago", "in 2 hours").

use chrono::{DateTime, Datelike as _, Months, TimeZone, Utc};

use super::date::parse_timestamp;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Unit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}
impl Unit {
    fn name(self) -> &'static str {
        match self {
            Unit::Year => "year",
            Unit::Quarter => "quarter",
            Unit::Month => "month",
            Unit::Week => "week",
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
        }
    }
}

/// Parses `input` as wall-clock time in `source` and describes it relative to `now`.
///
/// Returns an empty string if `input` is not a valid timestamp.
pub fn format_relative<Tz: TimeZone>(input: &str, source: &Tz, now: DateTime<Utc>) -> String {
    parse_timestamp(input, source)
        .map(|instant| relative_to(instant, now))
        .unwrap_or_default()
}

/// Describes `instant` relative to `now` using the largest unit with a non-zero count.
pub fn relative_to(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let months = whole_months(now, instant);
    let elapsed = instant.signed_duration_since(now);

    let counts = [
        (Unit::Year, months / 12),
        (Unit::Quarter, months / 3),
        (Unit::Month, months),
        (Unit::Week, elapsed.num_weeks()),
        (Unit::Day, elapsed.num_days()),
        (Unit::Hour, elapsed.num_hours()),
        (Unit::Minute, elapsed.num_minutes()),
        (Unit::Second, elapsed.num_seconds()),
    ];

    match counts.into_iter().find(|(_, count)| *count != 0) {
        Some((unit, count)) => phrase(count.unsigned_abs(), unit, count < 0),
        None => phrase(0, Unit::Second, instant < now),
    }
}

fn phrase(count: u64, unit: Unit, past: bool) -> String {
    let name = unit.name();
    let unit = if count == 1 {
        name.to_string()
    } else {
        format!("{name}s")
    };
    if past {
        format!("{count} {unit} ago")
    } else {
        format!("in {count} {unit}")
    }
}

/// Number of whole calendar months from `from` to `to`, negative if `to` is earlier.
fn whole_months(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    if to < from {
        return -whole_months(to, from);
    }

    let mut months =
        i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month());
    // Only count the last month if its day and time of day have been reached
    if months > 0
        && let Ok(span) = u32::try_from(months)
        && from
            .checked_add_months(Months::new(span))
            .is_some_and(|shifted| shifted > to)
    {
        months -= 1;
    }
    months
}
