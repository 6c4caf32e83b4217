//! Month navigation state.

use super::{generate, CalendarGrid};
use crate::model::date::{CalendarDate, InvalidDateError};

/// Currently displayed month. Month is 1-based.
///
/// `next`/`prev` wrap December and January into the adjacent year, so callers
/// never do month arithmetic themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    /// Creates a cursor, validating the month and year.
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidDateError> {
        CalendarDate::new(year, month, 1)?;
        Ok(Self { year, month })
    }

    /// Cursor for the month that contains `date`.
    pub fn containing(date: CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Cursor for the local current month.
    pub fn today() -> Self {
        Self::containing(CalendarDate::today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Following month, rolling into January of the next year.
    pub fn next(&self) -> Result<Self, InvalidDateError> {
        if self.month == 12 {
            let year = self
                .year
                .checked_add(1)
                .ok_or(InvalidDateError::YearOutOfRange(self.year))?;
            Self::new(year, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Preceding month, rolling into December of the previous year.
    pub fn prev(&self) -> Result<Self, InvalidDateError> {
        if self.month == 1 {
            let year = self
                .year
                .checked_sub(1)
                .ok_or(InvalidDateError::YearOutOfRange(self.year))?;
            Self::new(year, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Display grid for this month.
    pub fn grid(&self) -> Result<CalendarGrid, InvalidDateError> {
        generate(self.year, self.month)
    }
}
