use crate::config::toml_config::CalendarConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "calendar-table.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "calendar-table")]
#[command(about = "Generate a date dimension table for a range of years")]
pub struct CliConfig {
    /// First year to generate (asked interactively when omitted)
    #[arg(long)]
    pub start: Option<i32>,

    /// Last year to generate, defaults to the current year
    #[arg(long)]
    pub end: Option<i32>,

    /// Path to TOML configuration file [default: calendar-table.toml]
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override table.output_dir from the config file
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Override table.name from the config file
    #[arg(long)]
    pub table_name: Option<String>,

    #[arg(long, help = "Truncate a non-empty table without asking")]
    pub force: bool,

    #[arg(
        long,
        conflicts_with = "force",
        help = "Never prompt; leave a non-empty table untouched"
    )]
    pub no_interaction: bool,

    #[arg(long, help = "Show what would be generated without writing")]
    pub dry_run: bool,

    #[arg(long, help = "Print the load summary as JSON")]
    pub json: bool,

    #[arg(long, help = "Emit log lines as JSON")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }

    /// 載入設定檔並套用命令列覆蓋；只有明確指定的設定檔不存在時才報錯
    pub fn load_calendar_config(&self) -> Result<CalendarConfig> {
        let mut config = match &self.config {
            Some(path) => CalendarConfig::from_file(path)?,
            None => CalendarConfig::from_file_or_default(DEFAULT_CONFIG_PATH)?,
        };

        if let Some(output_dir) = &self.output_dir {
            config.table.output_dir = output_dir.clone();
        }
        if let Some(table_name) = &self.table_name {
            config.table.name = table_name.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_args() {
        let cli = CliConfig::parse_from(["calendar-table", "--start", "2015"]);
        assert_eq!(cli.start, Some(2015));
        assert_eq!(cli.end, None);
        assert_eq!(cli.config, None);
        assert_eq!(cli.config_path(), DEFAULT_CONFIG_PATH);
        assert!(!cli.force);
    }

    #[test]
    fn test_force_conflicts_with_no_interaction() {
        let parsed = CliConfig::try_parse_from([
            "calendar-table",
            "--start",
            "2015",
            "--force",
            "--no-interaction",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_overrides_applied_to_file_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        std::fs::write(&config_path, "[table]\nname = \"from_file\"\n").unwrap();

        let cli = CliConfig::parse_from([
            "calendar-table",
            "--config",
            config_path.to_str().unwrap(),
            "--output-dir",
            "/tmp/override",
        ]);
        let config = cli.load_calendar_config().unwrap();
        assert_eq!(config.table_name(), "from_file");
        assert_eq!(config.output_dir(), "/tmp/override");
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let cli = CliConfig::parse_from([
            "calendar-table",
            "--config",
            "/definitely/not/here/calendar.toml",
        ]);
        assert!(cli.load_calendar_config().is_err());
    }

    #[test]
    fn test_explicit_default_name_is_still_required() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join(DEFAULT_CONFIG_PATH);
        let cli = CliConfig::parse_from(["calendar-table", "-c", missing.to_str().unwrap()]);
        assert_eq!(cli.config_path(), missing.to_str().unwrap());
        assert!(cli.load_calendar_config().is_err());

        // the same name given literally is not treated as the implicit default
        let cli = CliConfig::parse_from(["calendar-table", "--config", DEFAULT_CONFIG_PATH]);
        assert_eq!(cli.config.as_deref(), Some(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_invalid_table_override_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        std::fs::write(&config_path, "").unwrap();

        let cli = CliConfig::parse_from([
            "calendar-table",
            "--config",
            config_path.to_str().unwrap(),
            "--table-name",
            "bad name",
        ]);
        assert!(cli.load_calendar_config().is_err());
    }
}
