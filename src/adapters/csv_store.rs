use crate::domain::model::DayRecord;
use crate::domain::ports::RowStore;
use crate::utils::error::{CalendarError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// 以 CSV 檔保存的資料表：`{base_path}/{table_name}.csv`。
///
/// 第一列是欄位名稱，每次 `insert_batch` 追加到檔尾。主鍵索引在第一次使用時從既有檔案載入。
#[derive(Debug)]
pub struct CsvRowStore {
    path: PathBuf,
    index: Mutex<Option<BTreeSet<NaiveDate>>>,
}

impl CsvRowStore {
    pub fn new(base_path: impl AsRef<Path>, table_name: &str) -> Self {
        Self::at_path(base_path.as_ref().join(format!("{}.csv", table_name)))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every row, in file order.
    pub fn read_all(&self) -> Result<Vec<DayRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<DayRecord>() {
            records.push(row?);
        }
        Ok(records)
    }

    fn load_index(&self) -> Result<BTreeSet<NaiveDate>> {
        let mut index = BTreeSet::new();
        for record in self.read_all()? {
            if !index.insert(record.date) {
                return Err(CalendarError::backend(format!(
                    "{} contains {} more than once",
                    self.path.display(),
                    record.date
                )));
            }
        }
        tracing::debug!("Loaded {} keys from {}", index.len(), self.path.display());
        Ok(index)
    }

    fn append(&self, rows: &[DayRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let write_header = self.is_empty_file()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for record in rows {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn is_empty_file(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RowStore for CsvRowStore {
    async fn count(&self) -> Result<u64> {
        let mut guard = self.index.lock().await;
        if guard.is_none() {
            *guard = Some(self.load_index()?);
        }
        Ok(guard.as_ref().map_or(0, |index| index.len() as u64))
    }

    async fn truncate(&self) -> Result<()> {
        let mut guard = self.index.lock().await;
        if self.path.exists() {
            fs::File::create(&self.path)?;
        }
        *guard = Some(BTreeSet::new());
        Ok(())
    }

    async fn insert_batch(&self, rows: &[DayRecord]) -> Result<()> {
        let mut guard = self.index.lock().await;
        let index = match guard.take() {
            Some(index) => index,
            None => self.load_index()?,
        };
        let index = &*guard.insert(index);

        let mut incoming = BTreeSet::new();
        for record in rows {
            if index.contains(&record.date) || !incoming.insert(record.date) {
                return Err(CalendarError::DuplicateDateError { date: record.date });
            }
        }

        if let Err(e) = self.append(rows) {
            // 寫入可能只完成一部分，下次使用時從檔案重建索引
            tracing::warn!("Write to {} failed, dropping cached keys", self.path.display());
            *guard = None;
            return Err(e);
        }

        guard.get_or_insert_with(BTreeSet::new).extend(incoming);
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
