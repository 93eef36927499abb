use crate::core::conventions::CalendarConventions;
use crate::domain::model::DayRecord;
use crate::domain::ports::HolidayCalendar;
use chrono::{Datelike, NaiveDate, Weekday};
use std::sync::Arc;

pub fn quarter_of(month: u32) -> u32 {
    (month + 2) / 3
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 會計年度與季度。起始月(含)之後的月份算入下一個會計年度。
pub fn fiscal_year_quarter(year: i32, month: u32, fiscal_year_start_month: u32) -> (i32, u32) {
    if month >= fiscal_year_start_month {
        (year + 1, quarter_of(month - fiscal_year_start_month + 1))
    } else {
        (year, quarter_of(month + 12 - fiscal_year_start_month + 1))
    }
}

/// Derives every attribute of `date`. Pure: the only input besides the date is
/// the injected conventions and holiday predicate.
pub fn compute(
    date: NaiveDate,
    conventions: &CalendarConventions,
    holidays: &dyn HolidayCalendar,
) -> DayRecord {
    let year = date.year();
    let month = date.month();
    let weekday = date.weekday();
    let (fiscal_year, fiscal_quarter) =
        fiscal_year_quarter(year, month, conventions.fiscal_year_start_month());

    DayRecord {
        date,
        day: date.day(),
        month,
        year,
        quarter: quarter_of(month),
        day_of_week: weekday.num_days_from_sunday(),
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        is_holiday: holidays.is_holiday(date),
        day_of_year: date.ordinal(),
        week_of_year: date.iso_week().week(),
        is_leap_year: is_leap_year(year),
        season: conventions.season_for_month(month).to_string(),
        fiscal_year,
        fiscal_quarter,
    }
}

/// Bundles the conventions and holiday predicate so callers only pass dates.
#[derive(Clone)]
pub struct DayAttributeCalculator {
    conventions: Arc<CalendarConventions>,
    holidays: Arc<dyn HolidayCalendar>,
}

impl DayAttributeCalculator {
    pub fn new(conventions: Arc<CalendarConventions>, holidays: Arc<dyn HolidayCalendar>) -> Self {
        Self {
            conventions,
            holidays,
        }
    }

    pub fn compute(&self, date: NaiveDate) -> DayRecord {
        compute(date, &self.conventions, self.holidays.as_ref())
    }

    pub fn conventions(&self) -> &CalendarConventions {
        &self.conventions
    }
}

impl std::fmt::Debug for DayAttributeCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DayAttributeCalculator")
            .field("conventions", &self.conventions)
            .finish_non_exhaustive()
    }
}
