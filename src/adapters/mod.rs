// Adapters layer: concrete row stores, holiday calendars and the truncate prompt.

pub mod csv_store;
pub mod holidays;
pub mod memory_store;
pub mod prompt;
