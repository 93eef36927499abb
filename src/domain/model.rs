use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日期維度表的一列，以 `date` 為主鍵
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub quarter: u32,
    /// 0 = Sunday ... 6 = Saturday
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub day_of_year: u32,
    /// ISO-8601 week number
    pub week_of_year: u32,
    pub is_leap_year: bool,
    pub season: String,
    pub fiscal_year: i32,
    pub fiscal_quarter: u32,
}

/// 一次產生請求的年份範圍（含頭尾）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub start_year: i32,
    pub end_year: i32,
}

impl LoadRequest {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }
}
