use crate::domain::model::DayRecord;
use crate::domain::ports::RowStore;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 以記憶體保存的資料表，clone 後共用同一份資料
#[derive(Debug, Clone, Default)]
pub struct InMemoryRowStore {
    rows: Arc<Mutex<BTreeMap<NaiveDate, DayRecord>>>,
}

impl InMemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row, ordered by date.
    pub async fn rows(&self) -> Vec<DayRecord> {
        let rows = self.rows.lock().await;
        rows.values().cloned().collect()
    }

    pub async fn get(&self, date: NaiveDate) -> Option<DayRecord> {
        let rows = self.rows.lock().await;
        rows.get(&date).cloned()
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn count(&self) -> Result<u64> {
        let rows = self.rows.lock().await;
        Ok(rows.len() as u64)
    }

    async fn truncate(&self) -> Result<()> {
        let mut rows = self.rows.lock().await;
        rows.clear();
        Ok(())
    }

    /// A batch with any duplicate date is rejected whole.
    async fn insert_batch(&self, batch: &[DayRecord]) -> Result<()> {
        let mut rows = self.rows.lock().await;

        let mut incoming = BTreeSet::new();
        for record in batch {
            if rows.contains_key(&record.date) || !incoming.insert(record.date) {
                return Err(CalendarError::DuplicateDateError { date: record.date });
            }
        }

        for record in batch {
            rows.insert(record.date, record.clone());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory table".to_string()
    }
}
