use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::TimeRange;

// 6 full weeks, enough for any month whatever its first weekday
pub const GRID_DAYS: usize = 42;

/// Years accepted from `YYYY-MM` month parameters.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDay {
    pub date: NaiveDate,
    /// False for the leading and trailing days borrowed from adjacent months.
    pub in_month: bool,
}

pub fn start_of_month(reference: NaiveDate) -> NaiveDate {
    reference.with_day(1).unwrap_or(reference)
}

/// First day of the month `offset` months away from `reference`'s month.
pub fn shift_month(reference: NaiveDate, offset: i32) -> NaiveDate {
    let first = start_of_month(reference);
    let months = Months::new(offset.unsigned_abs());
    let shifted = if offset >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    };
    shifted.unwrap_or(first)
}

/// Sunday on or before the first of the month; `None` past the calendar's edge.
pub fn grid_start(reference: NaiveDate) -> Option<NaiveDate> {
    let first = start_of_month(reference);
    let weekday = first.weekday().num_days_from_sunday() as i64;
    first.checked_sub_signed(Duration::days(weekday))
}

pub fn month_grid(reference: NaiveDate) -> Option<Vec<GridDay>> {
    let first = start_of_month(reference);
    let grid: Vec<GridDay> = grid_start(reference)?
        .iter_days()
        .take(GRID_DAYS)
        .map(|date| GridDay {
            date,
            in_month: date.year() == first.year() && date.month() == first.month(),
        })
        .collect();
    (grid.len() == GRID_DAYS).then_some(grid)
}

/// UTC span `[grid start, grid start + 42 days)` to fetch for the grid.
pub fn grid_range(reference: NaiveDate) -> Option<TimeRange> {
    let start = grid_start(reference)?;
    let end = start.checked_add_signed(Duration::days(GRID_DAYS as i64))?;
    Some(TimeRange {
        from: Utc.from_utc_datetime(&start.and_time(chrono::NaiveTime::MIN)),
        to: Utc.from_utc_datetime(&end.and_time(chrono::NaiveTime::MIN)),
    })
}

/// Parses `YYYY-MM` (or a full `YYYY-MM-DD`) into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
        .filter(|date| SUPPORTED_YEARS.contains(&date.year()))
        .map(start_of_month)
}
