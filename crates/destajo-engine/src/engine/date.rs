//! Date normalization.
//!
//! Delivery sheets carry dates in several shapes depending on where the rows
//! came from: the Sheets query API emits `Date(2024,0,15)` literals, hand-typed
//! cells hold day-first `15/01/2024`, exported workbooks hold serial numbers.
//! [`normalize`] folds all of them into a canonical `YYYY-MM-DD` string, and
//! [`to_display`] turns that back into `DD/MM/YYYY` for the table.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::record::RawValue;

/// Serial number of 1970-01-01 in the spreadsheet epoch (day 0 = 1899-12-30).
pub const SERIAL_UNIX_EPOCH: f64 = 25_569.0;
const MS_PER_DAY: f64 = 86_400_000.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

fn date_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Date\((\d+),(\d+),(\d+)(?:,(\d+),(\d+),(\d+))?\)$")
            .expect("date literal regex must compile")
    })
}

fn day_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})$").expect("day-first regex must compile")
    })
}

fn canonical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("canonical regex must compile"))
}

/// Convert a raw date value into `YYYY-MM-DD`.
///
/// Never fails: anything that does not resolve to a real calendar date yields
/// an empty string. Encodings are tried in a fixed order and the first match
/// wins:
///
/// 1. `Date(Y,M,D[,h,m,s])` with a zero-based month, in UTC
/// 2. day-first `D/M/YYYY` or `D-M-YYYY`
/// 3. canonical `YYYY-MM-DD`, returned as-is
/// 4. a spreadsheet serial number
/// 5. generic date text (RFC 3339, RFC 2822, ISO date-times, month names)
pub fn normalize(raw: &RawValue) -> String {
    match raw {
        RawValue::Empty => String::new(),
        RawValue::Number(serial) => from_serial(*serial).map(canonical).unwrap_or_default(),
        RawValue::Text(s) => normalize_text(s.trim()),
    }
}

/// [`normalize`] for plain text, e.g. a date typed into a filter box.
pub fn normalize_str(s: &str) -> String {
    normalize_text(s.trim())
}

fn normalize_text(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    if s.starts_with("Date(") {
        if let Some(date) = parse_date_literal(s) {
            return canonical(date);
        }
    }

    if let Some(caps) = day_first_re().captures(s) {
        let parsed = (|| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })();
        return parsed.map(canonical).unwrap_or_default();
    }

    if canonical_re().is_match(s) {
        return match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(_) => s.to_string(),
            Err(_) => String::new(),
        };
    }

    parse_generic(s).map(canonical).unwrap_or_default()
}

/// Format a canonical `YYYY-MM-DD` string as `DD/MM/YYYY`.
///
/// Works component-wise on the string; empty or malformed input yields `""`.
pub fn to_display(canonical: &str) -> String {
    let mut parts = canonical.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d)) if !y.is_empty() && !m.is_empty() && !d.is_empty() => {
            format!("{}/{}/{}", d, m, y)
        }
        _ => String::new(),
    }
}

fn canonical(date: NaiveDate) -> String {
    use chrono::Datelike;
    if !(0..=9999).contains(&date.year()) {
        return String::new();
    }
    date.format("%Y-%m-%d").to_string()
}

/// `Date(Y,M,D,h,m,s)` as a UTC calendar constructor would read it: the month
/// is zero-based and out-of-range components roll over into the next unit.
fn parse_date_literal(s: &str) -> Option<NaiveDate> {
    let caps = date_literal_re().captures(s)?;
    let component = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let mut year = component(1)?;
    // Two-digit years belong to the 1900s, as with Date.UTC.
    if (0..=99).contains(&year) {
        year += 1900;
    }
    let month = component(2)?;
    let day = component(3)?;

    let year = i32::try_from(year.checked_add(month.div_euclid(12))?).ok()?;
    let month = u32::try_from(month.rem_euclid(12)).ok()? + 1;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;

    let seconds = (day - 1)
        .checked_mul(86_400)?
        .checked_add(component(4)?.checked_mul(3_600)?)?
        .checked_add(component(5)?.checked_mul(60)?)?
        .checked_add(component(6)?)?;
    let instant = start.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
    Some(instant.date())
}

fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - SERIAL_UNIX_EPOCH) * MS_PER_DAY).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
}

fn parse_generic(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}
