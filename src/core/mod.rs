pub mod calculator;
pub mod conventions;
pub mod orchestrator;
pub mod range;
pub mod sequence;

pub use crate::domain::model::{DayRecord, LoadRequest};
pub use crate::domain::ports::{HolidayCalendar, RowStore, TruncateDecider};
pub use crate::utils::error::Result;
