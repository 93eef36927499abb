pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{csv_store::CsvRowStore, memory_store::InMemoryRowStore, prompt::TruncatePolicy};
pub use config::CalendarConfig;
pub use crate::core::{
    calculator::DayAttributeCalculator,
    conventions::CalendarConventions,
    orchestrator::{LoadOrchestrator, LoadOutcome, LoadState, LoadSummary},
    sequence::{DateRange, DateSequence},
};
pub use domain::model::{DayRecord, LoadRequest};
pub use domain::ports::{HolidayCalendar, RowStore, TruncateDecider};
pub use utils::error::{CalendarError, Result};
