use crate::core::conventions::CalendarConventions;
use crate::domain::model::LoadRequest;
use crate::utils::error::{CalendarError, Result};

fn check_year(field: &str, year: i32, conventions: &CalendarConventions) -> Result<()> {
    let bounds = conventions.valid_years();
    if bounds.contains(year) {
        Ok(())
    } else {
        Err(CalendarError::InvalidYearError {
            field: field.to_string(),
            year,
            min: bounds.min,
            max: bounds.max,
        })
    }
}

/// Checks both years against the configured bounds (start first), then their order.
pub fn validate(start_year: i32, end_year: i32, conventions: &CalendarConventions) -> Result<()> {
    check_year("start", start_year, conventions)?;
    check_year("end", end_year, conventions)?;

    if start_year > end_year {
        return Err(CalendarError::InvertedRangeError {
            start_year,
            end_year,
        });
    }

    Ok(())
}

impl LoadRequest {
    pub fn validate(&self, conventions: &CalendarConventions) -> Result<()> {
        validate(self.start_year, self.end_year, conventions)
    }
}
