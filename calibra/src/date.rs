//! Observation-day parsing and day deltas.

use chrono::{Datelike, NaiveDate};

/// Parses the `YYYY-MM-DD` day of an observation timestamp.
///
/// Anything after the day (`T22:01:07`, ` 22:01`) is ignored. Returns `None`
/// for malformed or impossible dates and for years before 1. The day must be
/// zero-padded with a four-digit unsigned year.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.trim().split(['T', ' ']).next()?;
    if !is_iso_day_shape(day) {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .filter(|date| date.year() > 0)
}

fn is_iso_day_shape(day: &str) -> bool {
    let bytes = day.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Signed day count from `master` to `light`.
///
/// Non-negative when the master was taken on or before the light's day.
pub fn days_between(light: NaiveDate, master: NaiveDate) -> i64 {
    (light - master).num_days()
}
