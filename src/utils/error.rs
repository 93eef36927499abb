use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// 載入流程中可能失敗的階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    PreCheck,
    Truncate,
    Insert,
    Report,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadPhase::PreCheck => "pre-check",
            LoadPhase::Truncate => "truncate",
            LoadPhase::Insert => "insert",
            LoadPhase::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid {field} year {year}: must be between {min} and {max}")]
    InvalidYearError {
        field: String,
        year: i32,
        min: i32,
        max: i32,
    },

    #[error("Starting year {start_year} is greater than ending year {end_year}")]
    InvertedRangeError { start_year: i32, end_year: i32 },

    #[error("Store operation failed during {phase}: {source}")]
    StoreError {
        phase: LoadPhase,
        source: Box<CalendarError>,
    },

    #[error("Duplicate date rejected by store: {date}")]
    DuplicateDateError { date: NaiveDate },

    #[error("Store backend error: {message}")]
    BackendError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    Integrity,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 可重試，例如儲存層暫時失敗
    Medium,
    /// 輸入或設定錯誤，需使用者修正
    High,
    /// 資料完整性或系統錯誤
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CalendarError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CalendarError::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        CalendarError::BackendError {
            message: message.into(),
        }
    }

    /// 將儲存層錯誤包裝為帶有階段資訊的錯誤；重複主鍵保持原樣
    pub fn in_phase(self, phase: LoadPhase) -> Self {
        match self {
            err @ CalendarError::DuplicateDateError { .. } => err,
            err @ CalendarError::StoreError { .. } => err,
            other => CalendarError::StoreError {
                phase,
                source: Box::new(other),
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CalendarError::ConfigurationError { .. }
            | CalendarError::InvalidConfigValueError { .. }
            | CalendarError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CalendarError::InvalidYearError { .. } | CalendarError::InvertedRangeError { .. } => {
                ErrorCategory::Input
            }
            CalendarError::StoreError { .. }
            | CalendarError::BackendError { .. }
            | CalendarError::CsvError(_) => ErrorCategory::Storage,
            CalendarError::DuplicateDateError { .. } => ErrorCategory::Integrity,
            CalendarError::IoError(_) | CalendarError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Integrity | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CalendarError::ConfigurationError { .. }
            | CalendarError::InvalidConfigValueError { .. } => {
                "Check the [calendar], [seasons] and [table] sections of the config file"
                    .to_string()
            }
            CalendarError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            CalendarError::InvalidYearError { min, max, .. } => {
                format!("Use a year between {} and {}", min, max)
            }
            CalendarError::InvertedRangeError { .. } => {
                "Swap --start and --end so the starting year comes first".to_string()
            }
            CalendarError::StoreError { phase, .. } => format!(
                "The {} step failed; verify the output location is writable and re-run",
                phase
            ),
            CalendarError::DuplicateDateError { .. } => {
                "Truncate the table (--force) and run the load again".to_string()
            }
            CalendarError::BackendError { .. } | CalendarError::CsvError(_) => {
                "Inspect or remove the existing table file and re-run".to_string()
            }
            CalendarError::IoError(_) | CalendarError::SerializationError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalendarError::InvalidYearError { field, .. } => {
                format!("Invalid {} year format. {}", field, self)
            }
            CalendarError::InvertedRangeError { .. } => {
                "Starting year is greater than ending.".to_string()
            }
            CalendarError::StoreError { phase, source } => {
                format!("Could not complete the {} step: {}", phase, source)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_phase_wraps_backend_errors() {
        let err = CalendarError::backend("disk full").in_phase(LoadPhase::Insert);
        match err {
            CalendarError::StoreError { phase, .. } => assert_eq!(phase, LoadPhase::Insert),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_in_phase_keeps_duplicate_dates_fatal() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let err = CalendarError::DuplicateDateError { date }.in_phase(LoadPhase::Insert);
        assert!(matches!(err, CalendarError::DuplicateDateError { .. }));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().exit_code(), 3);
    }

    #[test]
    fn test_input_errors_are_high_severity() {
        let err = CalendarError::InvertedRangeError {
            start_year: 2021,
            end_year: 2020,
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity().exit_code(), 1);
        assert_eq!(err.user_friendly_message(), "Starting year is greater than ending.");
    }

    #[test]
    fn test_store_error_message_names_phase() {
        let err = CalendarError::backend("locked").in_phase(LoadPhase::Truncate);
        assert!(err.to_string().contains("truncate"));
        assert!(err.to_string().contains("locked"));
    }
}
