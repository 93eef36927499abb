use crate::domain::ports::HolidayCalendar;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Every day is a working day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// United States federal holidays, following the year each rule took effect.
///
/// Years before 1870 have no federal holidays. The Monday rules for
/// Washington's Birthday, Memorial Day, Columbus Day and Veterans Day start in
/// 1971; earlier years use the fixed dates in force at the time.
///
/// With `observed` set, a holiday falling on Saturday is also flagged on the
/// preceding Friday and one on Sunday on the following Monday.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsFederalHolidays {
    observed: bool,
}

/// First year with statutory federal holidays.
pub const FIRST_FEDERAL_HOLIDAY_YEAR: i32 = 1870;
/// First year of the Uniform Monday Holiday rules.
const MONDAY_HOLIDAYS_FROM: i32 = 1971;

impl UsFederalHolidays {
    pub fn new(observed: bool) -> Self {
        Self { observed }
    }

    /// Holidays on their nominal dates for `year`.
    pub fn holidays_in_year(year: i32) -> Vec<NaiveDate> {
        if year < FIRST_FEDERAL_HOLIDAY_YEAR {
            return Vec::new();
        }

        let fixed = |month: u32, day: u32| NaiveDate::from_ymd_opt(year, month, day);
        let nth = |month: u32, weekday: Weekday, n: u8| {
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
        };
        let monday_rules = year >= MONDAY_HOLIDAYS_FROM;

        let mut holidays = vec![
            // New Year's Day
            fixed(1, 1),
            // Independence Day
            fixed(7, 4),
            // Christmas
            fixed(12, 25),
        ];

        // Thanksgiving
        holidays.push(if year >= 1942 {
            nth(11, Weekday::Thu, 4)
        } else {
            last_weekday_of_month(year, 11, Weekday::Thu)
        });

        // Washington's Birthday
        if monday_rules {
            holidays.push(nth(2, Weekday::Mon, 3));
        } else if year >= 1879 {
            holidays.push(fixed(2, 22));
        }

        // Memorial Day
        if monday_rules {
            holidays.push(last_weekday_of_month(year, 5, Weekday::Mon));
        } else if year >= 1888 {
            holidays.push(fixed(5, 30));
        }

        // Labor Day
        if year >= 1894 {
            holidays.push(nth(9, Weekday::Mon, 1));
        }

        // Columbus Day
        if monday_rules {
            holidays.push(nth(10, Weekday::Mon, 2));
        } else if year >= 1937 {
            holidays.push(fixed(10, 12));
        }

        // Veterans Day, moved to October from 1971 through 1977
        if (MONDAY_HOLIDAYS_FROM..=1977).contains(&year) {
            holidays.push(nth(10, Weekday::Mon, 4));
        } else if year >= 1938 {
            holidays.push(fixed(11, 11));
        }

        if year >= 1986 {
            // Martin Luther King Jr. Day
            holidays.push(nth(1, Weekday::Mon, 3));
        }
        if year >= 2021 {
            // Juneteenth
            holidays.push(fixed(6, 19));
        }

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().flatten().collect();
        holidays.sort();
        holidays
    }

    fn observed_date(date: NaiveDate) -> Option<NaiveDate> {
        match date.weekday() {
            Weekday::Sat => date.checked_sub_days(Days::new(1)),
            Weekday::Sun => date.checked_add_days(Days::new(1)),
            _ => None,
        }
    }
}

impl HolidayCalendar for UsFederalHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        let year = date.year();
        if Self::holidays_in_year(year).contains(&date) {
            return true;
        }
        if !self.observed {
            return false;
        }
        // New Year's Day on a Saturday is observed on December 31 of the prior year
        [year, year + 1]
            .into_iter()
            .flat_map(Self::holidays_in_year)
            .filter_map(Self::observed_date)
            .any(|observed| observed == date)
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = first_of_next.pred_opt()?;
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last.checked_sub_days(Days::new(u64::from(back)))
}

/// An explicit list of holiday dates, e.g. company closures.
#[derive(Debug, Clone, Default)]
pub struct FixedDateHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl FixedDateHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl HolidayCalendar for FixedDateHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// A date is a holiday when any member calendar says so.
#[derive(Clone, Default)]
pub struct CompositeHolidays {
    calendars: Vec<Arc<dyn HolidayCalendar>>,
}

impl CompositeHolidays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, calendar: Arc<dyn HolidayCalendar>) -> Self {
        self.calendars.push(calendar);
        self
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }
}

impl HolidayCalendar for CompositeHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.calendars.iter().any(|calendar| calendar.is_holiday(date))
    }
}
