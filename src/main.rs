use anyhow::Context;
use calendar_table::adapters::prompt;
use calendar_table::utils::error::CalendarError;
use calendar_table::utils::{logger, validation};
use calendar_table::{
    CalendarConfig, CliConfig, CsvRowStore, DateRange, DayAttributeCalculator, LoadOrchestrator,
    LoadOutcome, LoadRequest, RowStore, TruncatePolicy,
};
use chrono::Datelike;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting calendar-table");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = cli.load_calendar_config().unwrap_or_else(|e| exit_with(&e));
    let conventions = config.conventions().unwrap_or_else(|e| exit_with(&e));

    let request = resolve_request(&cli)?;
    tracing::info!(
        "Requested years {} to {}",
        request.start_year,
        request.end_year
    );

    let store = CsvRowStore::new(config.output_dir(), config.table_name());

    if cli.dry_run {
        tracing::info!("DRY RUN MODE - nothing will be written");
        request.validate(&conventions).unwrap_or_else(|e| exit_with(&e));
        perform_dry_run(&config, &store, request)
            .await
            .unwrap_or_else(|e| exit_with(&e));
        return Ok(());
    }

    let calculator = DayAttributeCalculator::new(Arc::new(conventions), config.holiday_calendar());
    let policy = TruncatePolicy::from_flags(cli.force, cli.no_interaction);
    let mut orchestrator =
        LoadOrchestrator::new(store, calculator, policy).with_batch_size(config.batch_size());

    match orchestrator.run(request).await {
        Ok(LoadOutcome::Completed(summary)) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("✅ {}", summary);
                println!("📁 Output saved to: {}", summary.target);
            }
        }
        Ok(LoadOutcome::Declined { existing_rows }) => {
            eprintln!(
                "❌ Table already holds {} rows and was not truncated; nothing was loaded.",
                existing_rows
            );
            eprintln!("💡 Re-run with --force to replace the existing rows");
            std::process::exit(1);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

/// 起始年未指定時互動詢問，結束年預設為今年
fn resolve_request(cli: &CliConfig) -> anyhow::Result<LoadRequest> {
    let start_year = match cli.start {
        Some(year) => year,
        None if cli.no_interaction => validation::validate_required_field("--start", &cli.start)
            .map(|year| *year)
            .unwrap_or_else(|e| exit_with(&e)),
        None => {
            let answer = prompt::blocking_io(|| {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                prompt::ask(
                    "Please enter a starting year",
                    &mut stdin.lock(),
                    &mut stdout.lock(),
                )
            })
            .context("failed to read the starting year")?;
            answer
                .parse::<i32>()
                .with_context(|| format!("'{}' is not a valid year", answer))?
        }
    };

    let end_year = cli.end.unwrap_or_else(|| chrono::Local::now().year());
    Ok(LoadRequest::new(start_year, end_year))
}

async fn perform_dry_run(
    config: &CalendarConfig,
    store: &CsvRowStore,
    request: LoadRequest,
) -> calendar_table::Result<()> {
    let range = DateRange::for_years(request.start_year, request.end_year)?;
    let existing = store.count().await?;

    println!("🔍 Dry Run Analysis:");
    println!("  Years: {} to {}", request.start_year, request.end_year);
    println!("  Dates: {} to {} ({} rows)", range.first(), range.last(), range.len());
    println!("  Target: {}", store.describe());
    println!("  Existing rows: {}", existing);
    if existing > 0 {
        println!("  ⚠️ A real run would ask before truncating (or use --force)");
    }
    println!("  Batch size: {}", config.batch_size());
    println!("  Holidays: {:?}", config.holidays.calendar);
    Ok(())
}

fn exit_with(e: &CalendarError) -> ! {
    tracing::error!(
        "calendar-table failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}
