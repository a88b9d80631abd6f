//! Release date decoding.
//!
//! Catalog dates come as `YYYY`, `YYYY-MM` or `YYYY-MM-DD`. They are decoded
//! to a sortable `YYYYMMDD` integer, padding incomplete dates toward the
//! earliest plausible day for albums and singles and the latest otherwise.

use chrono::NaiveDate;

/// How to complete a year-only date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePadding {
    /// January 1st
    Earliest,
    /// December 31st
    Latest,
}

/// Decode a raw date to `YYYYMMDD`, or 0 when unusable.
///
/// Only digits are considered. A 4-digit year is padded per `padding`;
/// 6 or 7 digits (year and month) are padded to day 28.
pub fn decode_date(raw: &str, padding: DatePadding) -> u32 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let full = match digits.len() {
        4 => match padding {
            DatePadding::Earliest => format!("{digits}0101"),
            DatePadding::Latest => format!("{digits}1231"),
        },
        6 | 7 => format!("{}28", &digits[..6]),
        8 => digits,
        _ => return 0,
    };
    let value: u32 = full.parse().unwrap_or(0);
    if to_naive(value).is_some() { value } else { 0 }
}

fn to_naive(date: u32) -> Option<NaiveDate> {
    if date == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt((date / 10_000) as i32, (date / 100) % 100, date % 100)
}

/// Absolute distance in days between two decoded dates
pub fn date_distance_days(a: u32, b: u32) -> Option<i64> {
    let a = to_naive(a)?;
    let b = to_naive(b)?;
    Some((a - b).num_days().abs())
}

/// Year of a decoded date
pub fn year_of(date: u32) -> Option<u32> {
    (date != 0).then_some(date / 10_000)
}

/// Sort key placing unknown dates last
pub fn sort_key(date: u32) -> u32 {
    if date == 0 { u32::MAX } else { date }
}
