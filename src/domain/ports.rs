use crate::domain::model::DayRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Row-oriented storage for the generated table. Primary key is `DayRecord::date`;
/// a duplicate date must be reported as `CalendarError::DuplicateDateError`.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn count(&self) -> Result<u64>;

    /// Removes every row. Calling it on an empty store is a no-op.
    async fn truncate(&self) -> Result<()>;

    async fn insert_batch(&self, rows: &[DayRecord]) -> Result<()>;

    async fn insert(&self, row: &DayRecord) -> Result<()> {
        self.insert_batch(std::slice::from_ref(row)).await
    }

    /// Human readable name of the target, used in logs and summaries.
    fn describe(&self) -> String {
        "row store".to_string()
    }
}

pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl<F> HolidayCalendar for F
where
    F: Fn(NaiveDate) -> bool + Send + Sync,
{
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Asked once per run when the store already holds rows.
pub trait TruncateDecider: Send + Sync {
    fn confirm_truncate(&self, existing_rows: u64) -> bool;
}

impl<F> TruncateDecider for F
where
    F: Fn(u64) -> bool + Send + Sync,
{
    fn confirm_truncate(&self, existing_rows: u64) -> bool {
        self(existing_rows)
    }
}
