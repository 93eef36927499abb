use crate::core::conventions::SUPPORTED_YEARS;
use crate::utils::error::{CalendarError, Result};
use chrono::NaiveDate;
use std::iter::FusedIterator;

/// Inclusive span from January 1 of the start year to December 31 of the end
/// year. Iterating it always starts over from the first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateRange {
    pub fn for_years(start_year: i32, end_year: i32) -> Result<Self> {
        if start_year > end_year {
            return Err(CalendarError::InvertedRangeError {
                start_year,
                end_year,
            });
        }

        let first = NaiveDate::from_ymd_opt(start_year, 1, 1).ok_or_else(|| {
            CalendarError::InvalidYearError {
                field: "start".to_string(),
                year: start_year,
                min: SUPPORTED_YEARS.0,
                max: SUPPORTED_YEARS.1,
            }
        })?;
        let last = NaiveDate::from_ymd_opt(end_year, 12, 31).ok_or_else(|| {
            CalendarError::InvalidYearError {
                field: "end".to_string(),
                year: end_year,
                min: SUPPORTED_YEARS.0,
                max: SUPPORTED_YEARS.1,
            }
        })?;

        Ok(Self { first, last })
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    /// Number of calendar days in the range, leap days included.
    pub fn len(&self) -> usize {
        days_between(self.first, self.last)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> DateSequence {
        DateSequence {
            next: Some(self.first),
            last: self.last,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = DateSequence;

    fn into_iter(self) -> DateSequence {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = NaiveDate;
    type IntoIter = DateSequence;

    fn into_iter(self) -> DateSequence {
        self.iter()
    }
}

fn days_between(first: NaiveDate, last: NaiveDate) -> usize {
    let span = last.signed_duration_since(first).num_days();
    usize::try_from(span + 1).unwrap_or(0)
}

/// Lazy ascending walk over a `DateRange`, one day per step.
#[derive(Debug, Clone)]
pub struct DateSequence {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for DateSequence {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current < self.last {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |next| days_between(next, self.last));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateSequence {}

impl FusedIterator for DateSequence {}

/// `{start_year}-01-01 ..= {end_year}-12-31`, ascending.
pub fn generate(start_year: i32, end_year: i32) -> Result<DateSequence> {
    Ok(DateRange::for_years(start_year, end_year)?.iter())
}
