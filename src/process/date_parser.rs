use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{RawCell, SkipReason};

/// Day zero of the spreadsheet serial date system. Serial 1 lands on 1899-12-31, which
/// keeps modern serials aligned with spreadsheets that count a phantom 1900-02-29.
static SERIAL_EPOCH: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1899, 12, 30).expect("serial epoch is a valid date"));

/// `d/m/y`, optionally followed by a time part.
static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})(?:[ T].*)?$")
        .expect("day-first pattern should compile")
});

/// `y/m/d`, optionally followed by a time part.
static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})(?:[ T].*)?$")
        .expect("year-first pattern should compile")
});

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%d %b %Y",
];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Decode a draw date cell.
///
/// Numbers are serial day counts, text with `/` is day/month/year, anything else goes
/// through a list of common calendar formats.
pub fn parse_draw_date(cell: &RawCell) -> Result<NaiveDate, SkipReason> {
    match cell {
        RawCell::Number(serial) => {
            serial_to_date(*serial).ok_or_else(|| SkipReason::InvalidDate(cell.display()))
        }
        RawCell::Text(s) => {
            let s = s.trim();
            let parsed = if s.contains('/') {
                parse_slash_date(s)
            } else {
                parse_calendar_date(s)
            };
            parsed.ok_or_else(|| SkipReason::InvalidDate(s.to_string()))
        }
        RawCell::Absent => Err(SkipReason::MissingDate),
    }
}

/// Serial day count → calendar date. The fractional (time of day) part is dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days.abs() > 3_000_000.0 {
        return None;
    }
    SERIAL_EPOCH.checked_add_signed(Duration::days(days as i64))
}

/// `01/05/2020`, `1/5/2020`, `01/05/20` or `2020/05/01`.
pub fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    if let Some(c) = DAY_FIRST.captures(s) {
        let day: u32 = c[1].parse().ok()?;
        let month: u32 = c[2].parse().ok()?;
        let year = expand_year(&c[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let c = YEAR_FIRST.captures(s)?;
    let year: i32 = c[1].parse().ok()?;
    let month: u32 = c[2].parse().ok()?;
    let day: u32 = c[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years pivot like `%y`: 00–68 → 20xx, 69–99 → 19xx.
fn expand_year(y: &str) -> Option<i32> {
    let n: i32 = y.parse().ok()?;
    Some(match y.len() {
        2 if n < 69 => 2000 + n,
        2 => 1900 + n,
        _ => n,
    })
}

fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
