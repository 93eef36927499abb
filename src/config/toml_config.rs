use crate::adapters::holidays::{
    CompositeHolidays, FixedDateHolidays, NoHolidays, UsFederalHolidays,
};
use crate::core::conventions::{
    CalendarConventions, DEFAULT_FISCAL_YEAR_START_MONTH, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR,
    NORTHERN_SEASONS, SOUTHERN_SEASONS, SUPPORTED_YEARS,
};
use crate::core::orchestrator::DEFAULT_BATCH_SIZE;
use crate::domain::ports::HolidayCalendar;
use crate::utils::error::{CalendarError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub table: TableConfig,
    pub calendar: CalendarSection,
    /// 季節名稱 -> 起始月份；有設定時覆蓋 `calendar.season_preset`
    pub seasons: Option<BTreeMap<String, u32>>,
    pub holidays: HolidayConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub name: String,
    pub output_dir: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "date_dimension".to_string(),
            output_dir: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPreset {
    #[default]
    Northern,
    Southern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
    pub fiscal_year_start_month: u32,
    pub min_year: i32,
    pub max_year: i32,
    pub season_preset: SeasonPreset,
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: DEFAULT_FISCAL_YEAR_START_MONTH,
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
            season_preset: SeasonPreset::Northern,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidaySource {
    #[default]
    UsFederal,
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayConfig {
    pub calendar: HolidaySource,
    pub observed: bool,
    pub extra_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub batch_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl CalendarConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalendarError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No config file at {}, using built-in defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| {
            CalendarError::configuration(format!("TOML parsing error: {}", e))
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    fn season_entries(&self) -> Vec<(String, u32)> {
        match &self.seasons {
            Some(seasons) => seasons
                .iter()
                .map(|(name, month)| (name.clone(), *month))
                .collect(),
            None => {
                let preset = match self.calendar.season_preset {
                    SeasonPreset::Northern => NORTHERN_SEASONS,
                    SeasonPreset::Southern => SOUTHERN_SEASONS,
                };
                preset
                    .iter()
                    .map(|(name, month)| (name.to_string(), *month))
                    .collect()
            }
        }
    }

    pub fn conventions(&self) -> Result<CalendarConventions> {
        CalendarConventions::new(
            self.season_entries(),
            self.calendar.fiscal_year_start_month,
            self.calendar.min_year,
            self.calendar.max_year,
        )
    }

    pub fn holiday_calendar(&self) -> Arc<dyn HolidayCalendar> {
        let base: Arc<dyn HolidayCalendar> = match self.holidays.calendar {
            HolidaySource::UsFederal => Arc::new(UsFederalHolidays::new(self.holidays.observed)),
            HolidaySource::None => Arc::new(NoHolidays),
        };

        if self.holidays.extra_dates.is_empty() {
            return base;
        }

        Arc::new(
            CompositeHolidays::new()
                .with(base)
                .with(Arc::new(FixedDateHolidays::new(
                    self.holidays.extra_dates.iter().copied(),
                ))),
        )
    }

    pub fn output_dir(&self) -> &str {
        &self.table.output_dir
    }

    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    pub fn batch_size(&self) -> usize {
        self.load.batch_size
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_identifier("table.name", &self.table.name)?;
        validation::validate_path("table.output_dir", &self.table.output_dir)?;
        validation::validate_month(
            "calendar.fiscal_year_start_month",
            self.calendar.fiscal_year_start_month,
        )?;

        let (lowest, highest) = SUPPORTED_YEARS;
        validation::validate_range("calendar.min_year", self.calendar.min_year, lowest, highest)?;
        validation::validate_range("calendar.max_year", self.calendar.max_year, lowest, highest)?;
        if self.calendar.min_year > self.calendar.max_year {
            return Err(CalendarError::InvalidConfigValueError {
                field: "calendar.min_year".to_string(),
                value: self.calendar.min_year.to_string(),
                reason: format!("Must not exceed calendar.max_year ({})", self.calendar.max_year),
            });
        }

        if let Some(seasons) = &self.seasons {
            for (name, month) in seasons {
                validation::validate_month(&format!("seasons.{}", name), *month)?;
            }
        }

        validation::validate_positive_number("load.batch_size", self.load.batch_size, 1)?;

        // 季節表的完整性由 CalendarConventions 負責檢查
        self.conventions().map(|_| ())
    }
}

impl Validate for CalendarConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
