//! Date/time normalization.
//!
//! Every timestamp that crosses into or out of the task core is kept in one
//! canonical local-time encoding, `YYYY-MM-DDTHH:mm` (the same shape as an
//! HTML `datetime-local` input). [`normalize`] turns the loose inputs users
//! and older records produce into that form, or returns `None` when the input
//! carries no usable moment.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// `chrono` format string of the canonical encoding.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

static CANONICAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}$").unwrap());

static BARE_TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})[.:]([0-9]{2})$").unwrap());

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    // `%B` also takes abbreviated month names when parsing.
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%B %d %Y"];

/// Normalizes `input` against the local clock and time zone.
///
/// See [`normalize_at`] for the accepted encodings.
pub fn normalize(input: Option<&str>) -> Option<String> {
    normalize_at(input, &Local::now())
}

/// Normalizes `input` to the canonical `YYYY-MM-DDTHH:mm` form.
///
/// `now` supplies both "today" (for bare times such as `7.07`) and the zone
/// every parsed moment is expressed in. The rules, in order:
///
/// * absent, empty or blank input yields `None`;
/// * a value already in canonical form is returned unchanged, it is never
///   re-parsed;
/// * `H.MM`, `HH.MM`, `H:MM` or `HH:MM` means today at that wall-clock time
///   (hours 0-23, minutes 0-59, anything else yields `None`);
/// * anything else goes through the general parser and is re-expressed in
///   the local zone of `now`, dropping seconds. Unparsable input yields
///   `None`.
pub fn normalize_at<Tz: TimeZone>(input: Option<&str>, now: &DateTime<Tz>) -> Option<String> {
    let raw = input?.trim();
    if raw.is_empty() {
        return None;
    }

    if CANONICAL_PATTERN.is_match(raw) {
        return Some(raw.to_string());
    }

    if let Some(captures) = BARE_TIME_PATTERN.captures(raw) {
        let hours: u32 = captures[1].parse().ok()?;
        let minutes: u32 = captures[2].parse().ok()?;
        let Some(moment) = now.date_naive().and_hms_opt(hours, minutes, 0) else {
            tracing::debug!(input = raw, "bare time out of range");
            return None;
        };
        return Some(format_canonical(&moment));
    }

    let parsed = parse_with_offset(raw)
        .map(|moment| moment.with_timezone(&now.timezone()).naive_local())
        .or_else(|| parse_naive(raw));

    match parsed {
        Some(moment) => Some(format_canonical(&moment)),
        None => {
            tracing::debug!(input = raw, "unrecognised date/time input");
            None
        }
    }
}

fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment);
    }
    if let Ok(moment) = DateTime::parse_from_rfc2822(raw) {
        return Some(moment);
    }

    // `%z` does not accept a zulu marker.
    let zulu;
    let raw = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(rest) => {
            zulu = format!("{rest}+00:00");
            zulu.as_str()
        }
        None => raw,
    };

    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a canonical string. Non-canonical input yields `None`.
pub fn parse_canonical(value: &str) -> Option<NaiveDateTime> {
    if !CANONICAL_PATTERN.is_match(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, CANONICAL_FORMAT).ok()
}

pub fn format_canonical(value: &NaiveDateTime) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

/// `YYYY-MM-DD`, the prefix a canonical timestamp shares with its date.
pub fn local_date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The date portion (first ten characters) of a canonical timestamp.
pub fn date_part(canonical: &str) -> Option<&str> {
    if CANONICAL_PATTERN.is_match(canonical) {
        canonical.get(..10)
    } else {
        None
    }
}

/// Combines a calendar date with an `HH:MM` time string.
pub fn combine_date_and_time(date: NaiveDate, time: &str) -> Option<NaiveDateTime> {
    let (hours, minutes) = time.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    date.and_hms_opt(hours, minutes, 0)
}

pub fn now_canonical() -> String {
    format_canonical(&Local::now().naive_local())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
