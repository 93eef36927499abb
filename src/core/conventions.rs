use crate::utils::error::{CalendarError, Result};
use std::collections::HashSet;

/// Years any conventions may allow; chrono represents all of them.
pub const SUPPORTED_YEARS: (i32, i32) = (1, 9999);

/// Meteorological seasons, northern hemisphere.
pub const NORTHERN_SEASONS: [(&str, u32); 4] =
    [("Spring", 3), ("Summer", 6), ("Autumn", 9), ("Winter", 12)];

/// Northern seasons shifted by six months.
pub const SOUTHERN_SEASONS: [(&str, u32); 4] =
    [("Autumn", 3), ("Winter", 6), ("Spring", 9), ("Summer", 12)];

pub const DEFAULT_FISCAL_YEAR_START_MONTH: u32 = 10;
pub const DEFAULT_MIN_YEAR: i32 = 1000;
pub const DEFAULT_MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonBoundary {
    pub start_month: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// 曆法慣例：季節起始月、會計年度起始月、允許的年份範圍。
///
/// 建立後不可變更，由呼叫端建立一次後明確傳給需要的元件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConventions {
    /// sorted by `start_month`, ascending, no duplicate months
    seasons: Vec<SeasonBoundary>,
    fiscal_year_start_month: u32,
    valid_years: YearBounds,
}

impl CalendarConventions {
    pub fn new<I, S>(
        seasons: I,
        fiscal_year_start_month: u32,
        min_year: i32,
        max_year: i32,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut boundaries: Vec<SeasonBoundary> = seasons
            .into_iter()
            .map(|(name, start_month)| SeasonBoundary {
                start_month,
                name: name.into(),
            })
            .collect();

        if boundaries.is_empty() {
            return Err(CalendarError::configuration(
                "at least one season must be configured",
            ));
        }

        let mut seen_months = HashSet::new();
        for season in &boundaries {
            if season.name.trim().is_empty() {
                return Err(CalendarError::configuration("season names cannot be blank"));
            }
            if !(1..=12).contains(&season.start_month) {
                return Err(CalendarError::configuration(format!(
                    "season '{}' starts in month {}, expected 1-12",
                    season.name, season.start_month
                )));
            }
            if !seen_months.insert(season.start_month) {
                return Err(CalendarError::configuration(format!(
                    "more than one season starts in month {}",
                    season.start_month
                )));
            }
        }

        if !(1..=12).contains(&fiscal_year_start_month) {
            return Err(CalendarError::configuration(format!(
                "fiscal year start month {} is outside 1-12",
                fiscal_year_start_month
            )));
        }

        if min_year > max_year {
            return Err(CalendarError::configuration(format!(
                "minimum year {} is greater than maximum year {}",
                min_year, max_year
            )));
        }

        let (lowest, highest) = SUPPORTED_YEARS;
        if min_year < lowest || max_year > highest {
            return Err(CalendarError::configuration(format!(
                "year bounds {}..={} fall outside the supported range {}..={}",
                min_year, max_year, lowest, highest
            )));
        }

        boundaries.sort_by_key(|s| s.start_month);

        Ok(Self {
            seasons: boundaries,
            fiscal_year_start_month,
            valid_years: YearBounds {
                min: min_year,
                max: max_year,
            },
        })
    }

    /// Cyclic nearest-predecessor lookup: the season with the greatest start
    /// month not after `month`, wrapping to the last season of the wheel.
    pub fn season_for_month(&self, month: u32) -> &str {
        let idx = self.seasons.partition_point(|s| s.start_month <= month);
        let season = if idx == 0 {
            self.seasons.last()
        } else {
            self.seasons.get(idx - 1)
        };
        // seasons is never empty after construction
        season.map(|s| s.name.as_str()).unwrap_or_default()
    }

    pub fn seasons(&self) -> &[SeasonBoundary] {
        &self.seasons
    }

    pub fn fiscal_year_start_month(&self) -> u32 {
        self.fiscal_year_start_month
    }

    pub fn valid_years(&self) -> YearBounds {
        self.valid_years
    }
}

impl Default for CalendarConventions {
    fn default() -> Self {
        Self {
            seasons: NORTHERN_SEASONS
                .iter()
                .map(|(name, start_month)| SeasonBoundary {
                    start_month: *start_month,
                    name: name.to_string(),
                })
                .collect(),
            fiscal_year_start_month: DEFAULT_FISCAL_YEAR_START_MONTH,
            valid_years: YearBounds {
                min: DEFAULT_MIN_YEAR,
                max: DEFAULT_MAX_YEAR,
            },
        }
    }
}
