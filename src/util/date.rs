use std::{convert::Infallible, fmt, str::FromStr};

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use constants::{DEBRID_TIME_ZONE, INVALID_DATE};
use serde::{Deserialize, Serialize};

use super::relative::format_relative;

/// Time-of-day shapes, extended then basic. `%.f` also matches an absent fractional part.
const CLOCK_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// e.g. "Oct 14, 2023"
const SHORT_FORMAT: &str = "%b %-d, %Y";
/// e.g. "October 14, 2023 at 3:04 PM CEST"
const LONG_FORMAT: &str = "%B %-d, %Y at %-I:%M %p %Z";
/// [`LONG_FORMAT`] without the zone, for zones that are labelled by offset
const LONG_FORMAT_NO_ZONE: &str = "%B %-d, %Y at %-I:%M %p";

#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// Numeric year, abbreviated month and day
    Short,
    /// Full date with time of day and zone
    #[default]
    Long,
}
impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateStyle::Short => SHORT_FORMAT,
            DateStyle::Long => LONG_FORMAT,
        }
    }
}
// Anything other than "short" falls back to the long style, same as the web frontend.
impl FromStr for DateStyle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "short" {
            DateStyle::Short
        } else {
            DateStyle::Long
        })
    }
}

/// Parses an ISO-8601 timestamp into an instant.
///
/// Accepts calendar dates in extended (`2023-10-14`) or basic (`20231014`) form, as well
/// as `2023-10` and `2023`, optionally followed by `T` or a space and a time of day
/// (`12`, `12:30`, `12:30:00.5`, `1230`, `123000`). The time may end in `Z` or an offset
/// (`+02`, `+0200`, `+02:00`).
///
/// Timestamps with an explicit offset keep their instant. Timestamps without one are read
/// as wall-clock time in `zone`. Returns `None` if the input is not a date.
pub fn parse_timestamp<Tz: TimeZone>(input: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let (date, time) = match input.split_once(['T', ' ']) {
        Some((date, time)) => (date, Some(time)),
        None => (input, None),
    };
    let date = parse_calendar_date(date)?;

    let (naive, offset) = match time {
        Some(time) => {
            let (clock, offset) = split_offset(time)?;
            (date.and_time(parse_clock(clock)?), offset)
        }
        None => (date.and_hms_opt(0, 0, 0)?, None),
    };

    match offset {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        None => localize(&naive, zone).map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    let (year, month, day) = match s.len() {
        4 => (s, "01", "01"),
        7 if s.get(4..5) == Some("-") => (s.get(..4)?, s.get(5..)?, "01"),
        8 => (s.get(..4)?, s.get(4..6)?, s.get(6..)?),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(
        i32::try_from(digits(year)?).ok()?,
        digits(month)?,
        digits(day)?,
    )
}

/// Splits a trailing `Z`, `±HH`, `±HHMM` or `±HH:MM` off a time of day.
fn split_offset(time: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(clock) = time.strip_suffix(['Z', 'z']) {
        return Some((clock, FixedOffset::east_opt(0)));
    }
    let Some(at) = time.rfind(['+', '-']) else {
        return Some((time, None));
    };

    let (clock, offset) = time.split_at(at);
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let offset = &offset[1..];
    let (hours, minutes) = match offset.len() {
        2 => (offset, "00"),
        4 => (offset.get(..2)?, offset.get(2..)?),
        5 if offset.get(2..3) == Some(":") => (offset.get(..2)?, offset.get(3..)?),
        _ => return None,
    };
    let (hours, minutes) = (digits(hours)?, digits(minutes)?);
    if hours > 23 || minutes > 59 {
        return None;
    }
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    Some((clock, Some(FixedOffset::east_opt(sign * seconds)?)))
}

fn parse_clock(clock: &str) -> Option<NaiveTime> {
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())
        .or_else(|| match clock.len() {
            2 => NaiveTime::from_hms_opt(digits(clock)?, 0, 0),
            _ => None,
        })
}

/// An all-ASCII-digit field
fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Resolves a wall-clock time in `zone`. Ambiguous times take the earlier instant and
/// times skipped by a DST transition are pushed forward by an hour.
fn localize<Tz: TimeZone>(naive: &NaiveDateTime, zone: &Tz) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
        zone.from_local_datetime(&shifted).earliest()
    })
}

/// Renders an instant in the viewer's zone.
pub fn render<Tz: TimeZone>(instant: DateTime<Utc>, target: &Tz, style: DateStyle) -> String
where
    Tz::Offset: fmt::Display,
{
    instant
        .with_timezone(target)
        .format(style.pattern())
        .to_string()
}

/// Renders an instant in a zone that has no abbreviation of its own, such as [`Local`],
/// labelling the long style with its offset the way browsers do ("GMT+2").
pub fn render_with_gmt_offset<Tz: TimeZone>(
    instant: DateTime<Utc>,
    target: &Tz,
    style: DateStyle,
) -> String {
    let local = instant.with_timezone(target).fixed_offset();
    match style {
        DateStyle::Short => local.format(SHORT_FORMAT).to_string(),
        DateStyle::Long => format!(
            "{} {}",
            local.format(LONG_FORMAT_NO_ZONE),
            gmt_label(*local.offset())
        ),
    }
}

/// "GMT", "GMT+2", "GMT-5", "GMT+5:30"
fn gmt_label(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "GMT".to_string();
    }

    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    match (minutes / 60, minutes % 60) {
        (hours, 0) => format!("GMT{sign}{hours}"),
        (hours, minutes) => format!("GMT{sign}{hours}:{minutes:02}"),
    }
}

/// Parses `input` as wall-clock time in `source` and renders it in `target`.
///
/// Never fails: unparseable input renders as [`INVALID_DATE`].
pub fn format_in_zone<Src, Dst>(
    input: &str,
    source: &Src,
    target: &Dst,
    style: DateStyle,
) -> String
where
    Src: TimeZone,
    Dst: TimeZone,
    Dst::Offset: fmt::Display,
{
    format_parsed(input, source, |instant| render(instant, target, style))
}

fn format_parsed<Src: TimeZone>(
    input: &str,
    source: &Src,
    show: impl FnOnce(DateTime<Utc>) -> String,
) -> String {
    match parse_timestamp(input, source) {
        Some(instant) => show(instant),
        None => {
            tracing::debug!("Could not parse timestamp {input:?}");
            INVALID_DATE.to_string()
        }
    }
}

/// Formats a Real-Debrid timestamp (Paris wall-clock time) in the local zone.
pub fn format_rd_date(input: &str, style: DateStyle) -> String {
    format_parsed(input, &DEBRID_TIME_ZONE, |instant| {
        render_with_gmt_offset(instant, &Local, style)
    })
}

/// Formats a UTC timestamp in the local zone, or relative to now if `relative` is set.
///
/// Relative output for an unparseable timestamp is empty.
pub fn format_date(input: &str, style: DateStyle, relative: bool) -> String {
    if relative {
        format_relative(input, &Utc, Utc::now())
    } else {
        format_parsed(input, &Utc, |instant| {
            render_with_gmt_offset(instant, &Local, style)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, Asia::Tokyo, Europe::Paris};

    #[test]
    fn test_style_parsing() {
        assert_eq!("short".parse::<DateStyle>().unwrap(), DateStyle::Short);
        assert_eq!("long".parse::<DateStyle>().unwrap(), DateStyle::Long);
        // Unknown styles use the long format
        assert_eq!("medium".parse::<DateStyle>().unwrap(), DateStyle::Long);
        assert_eq!("SHORT".parse::<DateStyle>().unwrap(), DateStyle::Long);
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2023, 10, 14, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2023-10-14T12:30:00Z", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14T12:30:00", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14T12:30", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14 12:30:00", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14T12:30:00.000", &Utc), Some(expected));
        assert_eq!(
            parse_timestamp("2023-10-14", &Utc),
            Some(Utc.with_ymd_and_hms(2023, 10, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_offsets() {
        let expected = Utc.with_ymd_and_hms(2023, 10, 14, 12, 30, 0).unwrap();
        // No seconds before the offset
        assert_eq!(parse_timestamp("2023-10-14T12:30Z", &Paris), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14T14:30+02:00", &Utc), Some(expected));
        // Compact offsets
        assert_eq!(parse_timestamp("2023-10-14T14:30:00+0200", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14T14:30:00+02", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14T07:00:00-0530", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2023-10-14 12:30:00Z", &Paris), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_basic_format() {
        let expected = Utc.with_ymd_and_hms(2023, 10, 14, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("20231014T123000Z", &Paris), Some(expected));
        assert_eq!(parse_timestamp("20231014T1230", &Utc), Some(expected));
        assert_eq!(parse_timestamp("20231014T143000+0200", &Utc), Some(expected));
        assert_eq!(
            parse_timestamp("20231014", &Utc),
            Some(Utc.with_ymd_and_hms(2023, 10, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_reduced_precision() {
        assert_eq!(
            parse_timestamp("2023-10", &Utc),
            Some(Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2023", &Utc),
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2023-10-14T12", &Utc),
            Some(Utc.with_ymd_and_hms(2023, 10, 14, 12, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2023-10-14T14", &Paris),
            Some(Utc.with_ymd_and_hms(2023, 10, 14, 12, 0, 0).unwrap())
        );
        assert_eq!(
            format_in_zone("2023-10", &Utc, &Utc, DateStyle::Long),
            "October 1, 2023 at 12:00 AM UTC"
        );
    }

    #[test]
    fn test_parse_timestamp_uses_source_zone_for_naive_input() {
        // 14:30 in Paris during summer time is 12:30 UTC
        assert_eq!(
            parse_timestamp("2023-10-14T14:30:00", &Paris),
            Some(Utc.with_ymd_and_hms(2023, 10, 14, 12, 30, 0).unwrap())
        );
        // Winter time is one hour ahead of UTC
        assert_eq!(
            parse_timestamp("2023-01-14T14:30:00", &Paris),
            Some(Utc.with_ymd_and_hms(2023, 1, 14, 13, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_explicit_offset_wins() {
        assert_eq!(
            parse_timestamp("2023-10-14T12:30:00+00:00", &Paris),
            Some(Utc.with_ymd_and_hms(2023, 10, 14, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_dst_gap() {
        // 02:30 does not exist in Paris on 2023-03-26, it resolves to 03:30 CEST
        assert_eq!(
            parse_timestamp("2023-03-26T02:30:00", &Paris),
            Some(Utc.with_ymd_and_hms(2023, 3, 26, 1, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("", &Utc), None);
        assert_eq!(parse_timestamp("yesterday", &Utc), None);
        assert_eq!(parse_timestamp("2023-13-45T00:00:00", &Utc), None);
        assert_eq!(parse_timestamp("2023-10-14T25", &Utc), None);
        assert_eq!(parse_timestamp("2023-10-14T12:30+2", &Utc), None);
        assert_eq!(parse_timestamp("2023-10-14T12:30+24:00", &Utc), None);
        assert_eq!(parse_timestamp("2023-1", &Utc), None);
        assert_eq!(parse_timestamp("2023-10-14T", &Utc), None);
        assert_eq!(parse_timestamp("20231O14", &Utc), None);
    }

    #[test]
    fn test_format_short() {
        assert_eq!(
            format_in_zone("2023-10-14T12:30:00Z", &Utc, &New_York, DateStyle::Short),
            "Oct 14, 2023"
        );
        // Late evening UTC is already the next day in Tokyo
        assert_eq!(
            format_in_zone("2023-10-14T22:00:00", &Utc, &Tokyo, DateStyle::Short),
            "Oct 15, 2023"
        );
    }

    #[test]
    fn test_format_long() {
        assert_eq!(
            format_in_zone("2023-10-14T12:30:00Z", &Utc, &New_York, DateStyle::Long),
            "October 14, 2023 at 8:30 AM EDT"
        );
        assert_eq!(
            format_in_zone("2023-10-14T12:30:00Z", &Utc, &Utc, DateStyle::Long),
            "October 14, 2023 at 12:30 PM UTC"
        );
    }

    #[test]
    fn test_format_with_gmt_offset() {
        let instant = Utc.with_ymd_and_hms(2023, 10, 14, 12, 30, 0).unwrap();
        let zone = |hours: i32, minutes: i32| {
            FixedOffset::east_opt(hours * 3600 + minutes * 60).unwrap()
        };

        assert_eq!(
            render_with_gmt_offset(instant, &zone(2, 0), DateStyle::Long),
            "October 14, 2023 at 2:30 PM GMT+2"
        );
        assert_eq!(
            render_with_gmt_offset(instant, &zone(-5, 0), DateStyle::Long),
            "October 14, 2023 at 7:30 AM GMT-5"
        );
        assert_eq!(
            render_with_gmt_offset(instant, &zone(5, 30), DateStyle::Long),
            "October 14, 2023 at 6:00 PM GMT+5:30"
        );
        assert_eq!(
            render_with_gmt_offset(instant, &Utc, DateStyle::Long),
            "October 14, 2023 at 12:30 PM GMT"
        );
        assert_eq!(
            render_with_gmt_offset(instant, &zone(-13, 0), DateStyle::Short),
            "Oct 13, 2023"
        );
    }

    #[test]
    fn test_format_local_long_ends_with_gmt_label() {
        let output = format_date("2023-10-14T12:30:00Z", DateStyle::Long, false);
        assert!(output.starts_with("October 1"), "{output}");
        assert!(output.contains(" GMT"), "{output}");
    }

    #[test]
    fn test_format_debrid_source_zone() {
        // Real-Debrid reports Paris wall-clock time
        assert_eq!(
            format_in_zone("2023-10-14T14:30:00", &DEBRID_TIME_ZONE, &Utc, DateStyle::Long),
            "October 14, 2023 at 12:30 PM UTC"
        );
        assert_eq!(
            format_in_zone("2023-10-14T14:30:00", &DEBRID_TIME_ZONE, &Paris, DateStyle::Long),
            "October 14, 2023 at 2:30 PM CEST"
        );
    }

    #[test]
    fn test_format_is_deterministic() {
        let first = format_in_zone("2024-02-29T23:59:59Z", &Utc, &Tokyo, DateStyle::Long);
        let second = format_in_zone("2024-02-29T23:59:59Z", &Utc, &Tokyo, DateStyle::Long);
        assert_eq!(first, second);
        assert_eq!(first, "March 1, 2024 at 8:59 AM JST");
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(
            format_in_zone("not a date", &Utc, &Utc, DateStyle::Short),
            INVALID_DATE
        );
        assert_eq!(format_rd_date("not a date", DateStyle::Long), INVALID_DATE);
        assert_eq!(format_date("not a date", DateStyle::Short, false), INVALID_DATE);
        assert_eq!(format_date("not a date", DateStyle::Short, true), "");
    }

    #[test]
    fn test_format_date_relative_for_past() {
        let past = (Utc::now() - TimeDelta::hours(3)).to_rfc3339();
        let output = format_date(&past, DateStyle::Long, true);
        assert!(!output.is_empty());
        assert!(output.ends_with("ago"), "{output}");
    }
}
