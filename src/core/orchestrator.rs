use crate::core::calculator::DayAttributeCalculator;
use crate::core::sequence::DateRange;
use crate::domain::model::{DayRecord, LoadRequest};
use crate::domain::ports::{RowStore, TruncateDecider};
use crate::utils::error::{LoadPhase, Result};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// 載入流程的狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Validating,
    CheckingExisting,
    Truncating,
    Inserting,
    Reporting,
    Done,
    Aborted,
}

/// 載入完成後的摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub target: String,
    pub start_year: i32,
    pub end_year: i32,
    /// rows written by this run
    pub rows_inserted: u64,
    /// `count()` after the last insert
    pub row_count: u64,
    /// rows removed by the truncate step, 0 when the store was empty
    pub truncated_rows: u64,
    pub elapsed_ms: u64,
}

impl LoadSummary {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Added {} records starting from {} to {} taking {:.2} seconds.",
            self.row_count,
            self.start_year,
            self.end_year,
            self.elapsed().as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Completed(LoadSummary),
    /// The store already held rows and the decider refused to truncate them.
    Declined { existing_rows: u64 },
}

impl LoadOutcome {
    pub fn summary(&self) -> Option<&LoadSummary> {
        match self {
            LoadOutcome::Completed(summary) => Some(summary),
            LoadOutcome::Declined { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, LoadOutcome::Completed(_))
    }
}

/// Drives one load: validate, check existing rows, optionally truncate, insert
/// every day of the range in ascending order, then report.
///
/// At most one orchestrator should write to a given store at a time.
pub struct LoadOrchestrator<S: RowStore, D: TruncateDecider> {
    store: S,
    calculator: DayAttributeCalculator,
    decider: D,
    batch_size: usize,
    state: LoadState,
}

impl<S: RowStore, D: TruncateDecider> LoadOrchestrator<S, D> {
    pub fn new(store: S, calculator: DayAttributeCalculator, decider: D) -> Self {
        Self {
            store,
            calculator,
            decider,
            batch_size: DEFAULT_BATCH_SIZE,
            state: LoadState::Idle,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&mut self, request: LoadRequest) -> Result<LoadOutcome> {
        let started = Instant::now();

        // 驗證
        self.transition(LoadState::Validating);
        let range = match request
            .validate(self.calculator.conventions())
            .and_then(|_| DateRange::for_years(request.start_year, request.end_year))
        {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("Rejected load request {:?}: {}", request, e);
                self.transition(LoadState::Aborted);
                return Err(e);
            }
        };

        // 檢查既有資料
        self.transition(LoadState::CheckingExisting);
        let counted = self.store.count().await;
        let existing_rows = self.guard(LoadPhase::PreCheck, counted)?;

        let mut truncated_rows = 0;
        if existing_rows > 0 {
            if !self.decider.confirm_truncate(existing_rows) {
                tracing::warn!(
                    "{} already holds {} rows and truncation was declined; nothing loaded",
                    self.store.describe(),
                    existing_rows
                );
                self.transition(LoadState::Aborted);
                return Ok(LoadOutcome::Declined { existing_rows });
            }

            self.transition(LoadState::Truncating);
            tracing::info!(
                "Truncating {} existing rows from {}",
                existing_rows,
                self.store.describe()
            );
            let truncated = self.store.truncate().await;
            self.guard(LoadPhase::Truncate, truncated)?;
            truncated_rows = existing_rows;
        }

        // 產生並寫入
        self.transition(LoadState::Inserting);
        tracing::info!(
            "Generating {} days from {} to {}",
            range.len(),
            range.first(),
            range.last()
        );
        let mut batch = Vec::with_capacity(self.batch_size.min(range.len()));
        let mut rows_inserted: u64 = 0;
        for date in range.iter() {
            batch.push(self.calculator.compute(date));
            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut rows_inserted).await?;
            }
        }
        self.flush(&mut batch, &mut rows_inserted).await?;

        // 報告
        self.transition(LoadState::Reporting);
        let counted = self.store.count().await;
        let row_count = self.guard(LoadPhase::Report, counted)?;
        if row_count != rows_inserted {
            tracing::warn!(
                "Inserted {} rows but the store now reports {}",
                rows_inserted,
                row_count
            );
        }

        let summary = LoadSummary {
            target: self.store.describe(),
            start_year: request.start_year,
            end_year: request.end_year,
            rows_inserted,
            row_count,
            truncated_rows,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!("{}", summary);

        self.transition(LoadState::Done);
        Ok(LoadOutcome::Completed(summary))
    }

    async fn flush(&mut self, batch: &mut Vec<DayRecord>, rows_inserted: &mut u64) -> Result<()> {
        let Some(last) = batch.last().map(|record| record.date) else {
            return Ok(());
        };

        let written = self.store.insert_batch(batch.as_slice()).await;
        self.guard(LoadPhase::Insert, written)?;

        *rows_inserted += batch.len() as u64;
        tracing::debug!("Inserted {} rows (through {})", rows_inserted, last);
        batch.clear();
        Ok(())
    }

    /// Any store failure ends the run in `Aborted`, tagged with the phase.
    fn guard<T>(&mut self, phase: LoadPhase, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            let err = e.in_phase(phase);
            tracing::error!("Load aborted: {}", err);
            self.transition(LoadState::Aborted);
            err
        })
    }

    fn transition(&mut self, next: LoadState) {
        tracing::debug!("Load state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
