//! Month grid generation.
//!
//! # Responsibility
//! - Map a (year, month) pair to a fixed Sunday-first 6×7 display grid.
//! - Provide month navigation that wraps across year boundaries.
//!
//! # Invariants
//! - A grid always has exactly `GRID_SLOTS` slots.
//! - Filled slots are exactly the days of the requested month, in order,
//!   starting at the weekday index of day 1.
//! - Slots outside the month are blank; adjacent-month dates never appear.
//! - Months are 1-based; out-of-range months fail instead of clamping.

mod cursor;

pub use cursor::MonthCursor;

use crate::model::date::{CalendarDate, InvalidDateError};
use chrono::{Datelike, NaiveDate};

/// Days per displayed week.
pub const WEEK_DAYS: usize = 7;
/// Displayed weeks per month.
pub const GRID_WEEKS: usize = 6;
/// Total slots in a month grid.
pub const GRID_SLOTS: usize = WEEK_DAYS * GRID_WEEKS;

/// Fixed 42-slot month view. Blank slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    year: i32,
    month: u32,
    slots: [Option<CalendarDate>; GRID_SLOTS],
}

impl CalendarGrid {
    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month shown by this grid.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn slots(&self) -> &[Option<CalendarDate>; GRID_SLOTS] {
        &self.slots
    }

    /// Rows of seven slots, Sunday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<CalendarDate>]> {
        self.slots.chunks(WEEK_DAYS)
    }

    /// Filled slots in display order.
    pub fn days(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Number of blank slots before day 1.
    pub fn leading_blanks(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_none()).count()
    }
}

/// Builds the display grid for a 1-based month.
///
/// # Errors
/// - `MonthOutOfRange` for months outside `1..=12`.
/// - `YearOutOfRange` for years the date backend cannot represent.
pub fn generate(year: i32, month: u32) -> Result<CalendarGrid, InvalidDateError> {
    let first = first_of_month(year, month)?;
    let offset = first.weekday().num_days_from_sunday() as usize;
    let day_count = days_in_month(year, month)?;

    // Built per day number: chrono's day iterator stops short of NaiveDate::MAX.
    let mut slots = [None; GRID_SLOTS];
    for (slot, day) in slots[offset..].iter_mut().zip(1..=day_count) {
        *slot = Some(CalendarDate::new(year, month, day)?);
    }

    Ok(CalendarGrid { year, month, slots })
}

/// Number of days in a 1-based month, leap-year aware.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, InvalidDateError> {
    first_of_month(year, month)?;
    Ok(match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    })
}

/// Weekday index of day 1 in a Sunday-first week (0 = Sunday).
pub fn first_weekday_index(year: i32, month: u32) -> Result<usize, InvalidDateError> {
    Ok(first_of_month(year, month)?
        .weekday()
        .num_days_from_sunday() as usize)
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, InvalidDateError> {
    if !(1..=12).contains(&month) {
        return Err(InvalidDateError::MonthOutOfRange(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(InvalidDateError::YearOutOfRange(year))
}

#[cfg(test)]
mod tests {
    use super::{days_in_month, generate, is_leap_year};

    #[test]
    fn leap_rule_covers_century_exceptions() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(-4));
    }

    #[test]
    fn february_lengths() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
    }

    #[test]
    fn weeks_are_six_rows_of_seven() {
        let grid = generate(2024, 1).unwrap();
        let rows: Vec<_> = grid.weeks().collect();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row.len() == 7));
    }
}
