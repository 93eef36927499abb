use calendar_table::adapters::holidays::UsFederalHolidays;
use calendar_table::{
    CalendarConventions, CalendarError, CsvRowStore, DayAttributeCalculator, InMemoryRowStore,
    LoadOrchestrator, LoadOutcome, LoadRequest, LoadState, RowStore, TruncatePolicy,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;

fn calculator() -> DayAttributeCalculator {
    DayAttributeCalculator::new(
        Arc::new(CalendarConventions::default()),
        Arc::new(UsFederalHolidays::new(false)),
    )
}

#[tokio::test]
async fn test_load_single_year_into_empty_store() {
    let store = InMemoryRowStore::new();
    let mut orchestrator =
        LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);

    let outcome = orchestrator.run(LoadRequest::new(2015, 2015)).await.unwrap();

    assert_eq!(orchestrator.state(), LoadState::Done);
    let summary = outcome.summary().unwrap();
    assert_eq!(summary.rows_inserted, 365);
    assert_eq!(summary.row_count, 365);
    assert_eq!(store.count().await.unwrap(), 365);

    let rows = store.rows().await;
    assert_eq!(rows.first().unwrap().date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    assert_eq!(rows.last().unwrap().date, NaiveDate::from_ymd_opt(2015, 12, 31).unwrap());
    // New Year's Day comes from the injected holiday calendar
    assert!(rows[0].is_holiday);
    assert!(!rows[1].is_holiday);
}

#[tokio::test]
async fn test_leap_year_and_multi_year_counts() {
    let store = InMemoryRowStore::new();
    let mut orchestrator =
        LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);

    orchestrator.run(LoadRequest::new(2023, 2025)).await.unwrap();

    // 2023 + 2024 (leap) + 2025
    assert_eq!(store.count().await.unwrap(), 1096);
}

#[tokio::test]
async fn test_inverted_range_aborts_without_touching_store() {
    let store = InMemoryRowStore::new();
    let mut seed = LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);
    seed.run(LoadRequest::new(2015, 2015)).await.unwrap();

    let mut orchestrator =
        LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Always);
    let err = orchestrator.run(LoadRequest::new(2021, 2020)).await.unwrap_err();

    assert!(matches!(err, CalendarError::InvertedRangeError { .. }));
    assert_eq!(orchestrator.state(), LoadState::Aborted);
    assert_eq!(store.count().await.unwrap(), 365);
}

#[tokio::test]
async fn test_invalid_year_aborts_before_store_access() {
    let store = InMemoryRowStore::new();
    let mut orchestrator =
        LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Always);

    let err = orchestrator.run(LoadRequest::new(999, 2000)).await.unwrap_err();

    assert!(matches!(err, CalendarError::InvalidYearError { year: 999, .. }));
    assert_eq!(orchestrator.state(), LoadState::Aborted);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_declined_truncate_leaves_store_unchanged() {
    let store = InMemoryRowStore::new();
    let mut seed = LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);
    seed.run(LoadRequest::new(2015, 2015)).await.unwrap();
    let before = store.rows().await;

    let mut orchestrator =
        LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);
    let outcome = orchestrator.run(LoadRequest::new(2016, 2017)).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Declined { existing_rows: 365 });
    assert!(!outcome.is_completed());
    assert_eq!(orchestrator.state(), LoadState::Aborted);
    assert_eq!(store.count().await.unwrap(), 365);
    assert_eq!(store.rows().await, before);
}

#[tokio::test]
async fn test_accepted_truncate_replaces_rows() {
    let store = InMemoryRowStore::new();
    let mut seed = LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);
    seed.run(LoadRequest::new(2015, 2015)).await.unwrap();

    let mut orchestrator =
        LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Always);
    let outcome = orchestrator.run(LoadRequest::new(2016, 2016)).await.unwrap();

    let summary = outcome.summary().unwrap();
    assert_eq!(summary.truncated_rows, 365);
    assert_eq!(summary.row_count, 366);
    let rows = store.rows().await;
    assert!(rows.iter().all(|row| row.year == 2016));
}

#[tokio::test]
async fn test_reload_after_truncate_is_identical() {
    let store = InMemoryRowStore::new();
    let mut first = LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);
    first.run(LoadRequest::new(2020, 2020)).await.unwrap();
    let first_rows = store.rows().await;

    store.truncate().await.unwrap();
    let mut second = LoadOrchestrator::new(store.clone(), calculator(), TruncatePolicy::Never);
    second.run(LoadRequest::new(2020, 2020)).await.unwrap();
    let second_rows = store.rows().await;

    assert_eq!(first_rows.len(), 366);
    assert_eq!(first_rows, second_rows);
    assert_eq!(
        serde_json::to_vec(&first_rows).unwrap(),
        serde_json::to_vec(&second_rows).unwrap()
    );
}

#[tokio::test]
async fn test_csv_store_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let store = CsvRowStore::new(temp_dir.path(), "date_dimension");
    let mut orchestrator =
        LoadOrchestrator::new(store, calculator(), TruncatePolicy::Never).with_batch_size(64);

    let outcome = orchestrator.run(LoadRequest::new(2024, 2024)).await.unwrap();
    assert_eq!(outcome.summary().unwrap().row_count, 366);

    let path = temp_dir.path().join("date_dimension.csv");
    let reopened = CsvRowStore::at_path(&path);
    let rows = reopened.read_all().unwrap();
    assert_eq!(rows.len(), 366);
    assert!(rows.windows(2).all(|pair| pair[0].date < pair[1].date));

    let leap_day = rows
        .iter()
        .find(|row| row.date == NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        .unwrap();
    assert_eq!(leap_day.day_of_year, 60);
    assert!(leap_day.is_leap_year);
    assert_eq!(leap_day.season, "Winter");
    assert_eq!(leap_day.fiscal_year, 2024);
    assert_eq!(leap_day.fiscal_quarter, 2);
}

#[tokio::test]
async fn test_csv_rerun_prompts_through_decider() {
    let temp_dir = TempDir::new().unwrap();
    let mut first = LoadOrchestrator::new(
        CsvRowStore::new(temp_dir.path(), "calendar"),
        calculator(),
        TruncatePolicy::Never,
    );
    first.run(LoadRequest::new(2021, 2021)).await.unwrap();

    let mut declined = LoadOrchestrator::new(
        CsvRowStore::new(temp_dir.path(), "calendar"),
        calculator(),
        TruncatePolicy::Never,
    );
    let outcome = declined.run(LoadRequest::new(2021, 2022)).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Declined { existing_rows: 365 });

    let mut forced = LoadOrchestrator::new(
        CsvRowStore::new(temp_dir.path(), "calendar"),
        calculator(),
        TruncatePolicy::Always,
    );
    let outcome = forced.run(LoadRequest::new(2021, 2022)).await.unwrap();
    assert_eq!(outcome.summary().unwrap().row_count, 730);
    assert_eq!(forced.store().read_all().unwrap().len(), 730);
}

#[tokio::test]
async fn test_duplicate_in_store_is_fatal() {
    let store = InMemoryRowStore::new();
    // a row the orchestrator will try to insert again, left behind after the pre-check
    let stray = calculator().compute(NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());

    struct SneakyStore {
        inner: InMemoryRowStore,
        stray: calendar_table::DayRecord,
    }

    #[async_trait::async_trait]
    impl RowStore for SneakyStore {
        async fn count(&self) -> calendar_table::Result<u64> {
            self.inner.count().await
        }

        async fn truncate(&self) -> calendar_table::Result<()> {
            self.inner.truncate().await
        }

        async fn insert_batch(
            &self,
            rows: &[calendar_table::DayRecord],
        ) -> calendar_table::Result<()> {
            if self.inner.count().await? == 0 {
                self.inner.insert(&self.stray).await?;
            }
            self.inner.insert_batch(rows).await
        }
    }

    let mut orchestrator = LoadOrchestrator::new(
        SneakyStore {
            inner: store.clone(),
            stray,
        },
        calculator(),
        TruncatePolicy::Never,
    )
    .with_batch_size(1000);

    let err = orchestrator.run(LoadRequest::new(2015, 2015)).await.unwrap_err();

    match err {
        CalendarError::DuplicateDateError { date } => {
            assert_eq!(date, NaiveDate::from_ymd_opt(2015, 6, 1).unwrap())
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(orchestrator.state(), LoadState::Aborted);
}
