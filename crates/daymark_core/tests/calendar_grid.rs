use daymark_core::grid::{days_in_month, first_weekday_index, WEEK_DAYS};
use daymark_core::{generate, CalendarDate, InvalidDateError, MonthCursor, GRID_SLOTS};
use chrono::{Datelike, NaiveDate, Weekday};

#[test]
fn every_month_has_42_slots_and_exact_day_count() {
    for year in [-400, -1, 0, 1, 1582, 1900, 1970, 2000, 2023, 2024, 2100, 9999] {
        for month in 1..=12 {
            let grid = generate(year, month).unwrap();
            assert_eq!(grid.slots().len(), GRID_SLOTS);
            assert_eq!(
                grid.days().count() as u32,
                days_in_month(year, month).unwrap(),
                "{year}-{month}"
            );
        }
    }
}

#[test]
fn last_and_first_representable_months_are_complete() {
    let max = NaiveDate::MAX;
    let grid = generate(max.year(), max.month()).unwrap();
    assert_eq!(
        grid.days().count() as u32,
        days_in_month(max.year(), max.month()).unwrap()
    );
    assert_eq!(grid.days().last(), Some(CalendarDate::from_naive(max)));

    let min = NaiveDate::MIN;
    let grid = generate(min.year(), min.month()).unwrap();
    assert_eq!(
        grid.days().count() as u32,
        days_in_month(min.year(), min.month()).unwrap()
    );
    assert_eq!(grid.days().next(), Some(CalendarDate::from_naive(min)));
}

#[test]
fn february_day_counts_follow_leap_rules() {
    for (year, expected) in [(2024, 29), (2023, 28), (2000, 29), (1900, 28)] {
        let grid = generate(year, 2).unwrap();
        assert_eq!(grid.days().count(), expected, "february {year}");
    }
}

#[test]
fn first_filled_slot_matches_true_weekday() {
    // January 2024 starts on a Monday.
    let grid = generate(2024, 1).unwrap();
    assert_eq!(grid.leading_blanks(), 1);
    assert_eq!(grid.slots()[1], Some(CalendarDate::new(2024, 1, 1).unwrap()));

    for year in [1899, 1970, 2024, 2031] {
        for month in 1..=12 {
            let expected = NaiveDate::from_ymd_opt(year, month, 1)
                .unwrap()
                .weekday()
                .num_days_from_sunday() as usize;
            let grid = generate(year, month).unwrap();
            assert_eq!(grid.leading_blanks(), expected, "{year}-{month}");
            assert_eq!(first_weekday_index(year, month).unwrap(), expected);
        }
    }
}

#[test]
fn filled_slots_are_consecutive_days_of_the_month_only() {
    let grid = generate(2024, 3).unwrap();
    let offset = grid.leading_blanks();

    for (index, slot) in grid.slots().iter().enumerate() {
        match slot {
            Some(date) => {
                assert_eq!(date.year(), 2024);
                assert_eq!(date.month(), 3);
                assert_eq!(date.day() as usize, index - offset + 1);
                assert_eq!(date.weekday_index(), index % WEEK_DAYS);
            }
            None => assert!(index < offset || index >= offset + 31),
        }
    }
}

#[test]
fn short_months_leave_trailing_slots_blank() {
    // February 2015 starts on Sunday and fills exactly four rows.
    let grid = generate(2015, 2).unwrap();
    assert_eq!(grid.leading_blanks(), 0);
    assert!(grid.slots()[28..].iter().all(Option::is_none));
    assert_eq!(grid.weeks().count(), 6);
    assert_eq!(
        grid.slots()[0].map(|date| date.as_naive().weekday()),
        Some(Weekday::Sun)
    );
}

#[test]
fn out_of_range_months_fail_fast() {
    assert_eq!(
        generate(2024, 0).unwrap_err(),
        InvalidDateError::MonthOutOfRange(0)
    );
    assert_eq!(
        generate(2024, 13).unwrap_err(),
        InvalidDateError::MonthOutOfRange(13)
    );
}

#[test]
fn unrepresentable_years_fail_instead_of_wrapping() {
    assert_eq!(
        generate(i32::MAX, 1).unwrap_err(),
        InvalidDateError::YearOutOfRange(i32::MAX)
    );
    assert_eq!(
        generate(i32::MIN, 12).unwrap_err(),
        InvalidDateError::YearOutOfRange(i32::MIN)
    );
}

#[test]
fn generate_is_deterministic() {
    assert_eq!(generate(1999, 12).unwrap(), generate(1999, 12).unwrap());
}

#[test]
fn cursor_wraps_across_year_boundaries() {
    let december = MonthCursor::new(2023, 12).unwrap();
    let january = december.next().unwrap();
    assert_eq!((january.year(), january.month()), (2024, 1));
    assert_eq!(january.prev().unwrap(), december);

    let year_zero = MonthCursor::new(0, 1).unwrap().prev().unwrap();
    assert_eq!((year_zero.year(), year_zero.month()), (-1, 12));

    let grid = january.grid().unwrap();
    assert_eq!((grid.year(), grid.month()), (2024, 1));
}

#[test]
fn cursor_rejects_invalid_months_and_tracks_dates() {
    assert_eq!(
        MonthCursor::new(2024, 13).unwrap_err(),
        InvalidDateError::MonthOutOfRange(13)
    );

    let date = CalendarDate::new(2024, 7, 19).unwrap();
    let cursor = MonthCursor::containing(date);
    assert_eq!((cursor.year(), cursor.month()), (2024, 7));
    assert!(cursor.grid().unwrap().days().any(|day| day == date));
}
