//! Calendar day value and its canonical storage key.
//!
//! # Responsibility
//! - Represent one calendar day without any time-of-day component.
//! - Derive the canonical `YYYY-MM-DD` key used for annotation identity.
//!
//! # Invariants
//! - Two `CalendarDate`s denoting the same day always yield the same `DateKey`.
//! - Datetime inputs are reduced to their own-zone calendar day before any
//!   formatting happens.
//! - `DateKey::parse` accepts only keys that `CalendarDate::key` could have
//!   produced.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<year>[+-]\d{4,}|\d{4})-(?P<month>\d{2})-(?P<day>\d{2})$")
        .expect("valid date key regex")
});

/// Date construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDateError {
    /// Month index outside `1..=12`.
    MonthOutOfRange(u32),
    /// Day does not exist in the given month.
    DayOutOfRange { year: i32, month: u32, day: u32 },
    /// Year cannot be represented by the date backend.
    YearOutOfRange(i32),
}

impl Display for InvalidDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonthOutOfRange(month) => {
                write!(f, "month {month} is out of range; expected 1..=12")
            }
            Self::DayOutOfRange { year, month, day } => {
                write!(f, "day {day} does not exist in {year}-{month:02}")
            }
            Self::YearOutOfRange(year) => write!(f, "year {year} is out of supported range"),
        }
    }
}

impl Error for InvalidDateError {}

/// Persisted key that is not a canonical date key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeyError {
    pub raw: String,
}

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a canonical YYYY-MM-DD date key", self.raw)
    }
}

impl Error for DateKeyError {}

/// One calendar day. Month and day are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Builds a date from year, 1-based month and 1-based day.
    ///
    /// # Errors
    /// - `MonthOutOfRange` when `month` is outside `1..=12`.
    /// - `YearOutOfRange` when the year itself is not representable.
    /// - `DayOutOfRange` when the month has no such day.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, InvalidDateError> {
        if !(1..=12).contains(&month) {
            return Err(InvalidDateError::MonthOutOfRange(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(InvalidDateError::YearOutOfRange(year));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(InvalidDateError::DayOutOfRange { year, month, day })
    }

    /// Wraps an already-valid naive date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Reduces a zoned datetime to the calendar day it falls on in its own
    /// time zone. Time-of-day is dropped before the key is ever derived.
    pub fn from_datetime<Tz: TimeZone>(value: &DateTime<Tz>) -> Self {
        Self(value.date_naive())
    }

    /// Current calendar day in the local time zone.
    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Weekday position in a Sunday-first week (0 = Sunday .. 6 = Saturday).
    pub fn weekday_index(&self) -> usize {
        self.0.weekday().num_days_from_sunday() as usize
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Canonical storage key for this day.
    pub fn key(&self) -> DateKey {
        DateKey::from(*self)
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_key(self.0))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

/// Canonical `YYYY-MM-DD` identity of a calendar day.
///
/// Years outside `0..=9999` use the signed ISO 8601 expanded form
/// (`+10000-01-01`, `-0001-12-31`). Ordering is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    date: CalendarDate,
    text: String,
}

impl DateKey {
    /// Parses a persisted key, accepting only canonical forms of real dates.
    pub fn parse(raw: &str) -> Result<Self, DateKeyError> {
        let invalid = || DateKeyError {
            raw: raw.to_string(),
        };

        let caps = DATE_KEY_RE.captures(raw).ok_or_else(|| invalid())?;
        let year: i32 = caps["year"].parse().map_err(|_| invalid())?;
        let month: u32 = caps["month"].parse().map_err(|_| invalid())?;
        let day: u32 = caps["day"].parse().map_err(|_| invalid())?;

        let date = CalendarDate::new(year, month, day).map_err(|_| invalid())?;
        let key = Self::from(date);
        if key.text != raw {
            return Err(invalid());
        }
        Ok(key)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Calendar day this key identifies.
    pub fn date(&self) -> CalendarDate {
        self.date
    }
}

impl From<CalendarDate> for DateKey {
    fn from(value: CalendarDate) -> Self {
        Self {
            text: format_key(value.0),
            date: value,
        }
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

fn format_key(date: NaiveDate) -> String {
    let year = date.year();
    if (0..=9999).contains(&year) {
        format!("{year:04}-{:02}-{:02}", date.month(), date.day())
    } else {
        format!("{year:+05}-{:02}-{:02}", date.month(), date.day())
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarDate, DateKey, InvalidDateError};
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn key_zero_pads_month_and_day() {
        let date = CalendarDate::new(2024, 3, 5).unwrap();
        assert_eq!(date.key().as_str(), "2024-03-05");
    }

    #[test]
    fn key_uses_expanded_form_outside_four_digit_years() {
        assert_eq!(
            CalendarDate::new(-1, 12, 31).unwrap().key().as_str(),
            "-0001-12-31"
        );
        assert_eq!(
            CalendarDate::new(10_000, 1, 1).unwrap().key().as_str(),
            "+10000-01-01"
        );
        assert_eq!(
            CalendarDate::new(33, 7, 4).unwrap().key().as_str(),
            "0033-07-04"
        );
    }

    #[test]
    fn datetime_is_reduced_to_its_own_zone_day() {
        // 23:30 at UTC-5 is already the next day in UTC.
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let late_evening = offset.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap();
        assert_eq!(
            CalendarDate::from_datetime(&late_evening).key().as_str(),
            "2024-03-15"
        );

        let midnight_utc = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(
            CalendarDate::from_datetime(&midnight_utc).key(),
            CalendarDate::new(2024, 3, 15).unwrap().key()
        );
    }

    #[test]
    fn new_rejects_invalid_components() {
        assert_eq!(
            CalendarDate::new(2024, 0, 1).unwrap_err(),
            InvalidDateError::MonthOutOfRange(0)
        );
        assert_eq!(
            CalendarDate::new(2023, 2, 29).unwrap_err(),
            InvalidDateError::DayOutOfRange {
                year: 2023,
                month: 2,
                day: 29
            }
        );
        assert_eq!(
            CalendarDate::new(i32::MAX, 1, 1).unwrap_err(),
            InvalidDateError::YearOutOfRange(i32::MAX)
        );
    }

    #[test]
    fn parse_accepts_canonical_keys_only() {
        let key = DateKey::parse("2024-02-29").unwrap();
        assert_eq!(key.date(), CalendarDate::new(2024, 2, 29).unwrap());
        assert!(DateKey::parse("-0001-12-31").is_ok());

        for raw in [
            "2024-2-29",
            "2023-02-29",
            "2024-13-01",
            "+2024-01-01",
            "2024-01-01T00:00:00Z",
            " 2024-01-01",
            "",
        ] {
            assert!(DateKey::parse(raw).is_err(), "accepted `{raw}`");
        }
    }

    #[test]
    fn key_order_is_chronological() {
        let before = CalendarDate::new(-1, 1, 1).unwrap().key();
        let after = CalendarDate::new(2024, 1, 1).unwrap().key();
        assert!(before < after);
    }
}
