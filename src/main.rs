use clap::Parser;
use fintrack::args::{
    Args, Command, EntitySubcommand, InsertSubcommand, ListSubcommand, ReportSubcommand,
    UpdateSubcommand,
};
use fintrack::{commands, Config, ErrorType, IntoResult, Ledger, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// The user the in-memory store is seeded for when there is no config file to name one.
const DEMO_USER: &str = "demo";

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().fintrack_home().path();
    let user = args.common().user();
    let format = args.common().format();

    // When FINTRACK_IN_MEMORY is set and non-empty the mode is Mode::Memory, which runs every
    // command against seeded data and never touches the database file.
    let mode = Mode::from_env();

    let ledger = match args.command() {
        Command::Init => return commands::init(home, user).await.map(|out| out.print()),
        _ => open_ledger(home, mode, user).await?,
    };

    let _: () = match args.command() {
        // Handled above, before there is a ledger to open.
        Command::Init => {}

        Command::Mcp => commands::mcp(ledger).await?.print(),

        Command::Insert(insert_args) => match insert_args.entity() {
            InsertSubcommand::Category(args) => {
                commands::insert_category(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            InsertSubcommand::Transaction(args) => {
                commands::insert_transaction(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            InsertSubcommand::Budget(args) => commands::insert_budget(&ledger, args.clone())
                .await?
                .print_rows(format)?,
        },

        Command::Update(update_args) => match update_args.entity() {
            UpdateSubcommand::Category(args) => {
                commands::update_category(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            UpdateSubcommand::Transaction(args) => {
                commands::update_transaction(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            UpdateSubcommand::Budget(args) => commands::update_budget(&ledger, args.clone())
                .await?
                .print_rows(format)?,
        },

        Command::Delete(delete_args) => match delete_args.entity() {
            EntitySubcommand::Category(args) => {
                commands::delete_category(&ledger, args.clone())
                    .await?
                    .print()
            }
            EntitySubcommand::Transaction(args) => {
                commands::delete_transaction(&ledger, args.clone())
                    .await?
                    .print()
            }
            EntitySubcommand::Budget(args) => commands::delete_budget(&ledger, args.clone())
                .await?
                .print(),
        },

        Command::Get(get_args) => match get_args.entity() {
            EntitySubcommand::Category(args) => commands::get_category(&ledger, args.clone())
                .await?
                .print_rows(format)?,
            EntitySubcommand::Transaction(args) => {
                commands::get_transaction(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            EntitySubcommand::Budget(args) => commands::get_budget(&ledger, args.clone())
                .await?
                .print_rows(format)?,
        },

        Command::List(list_args) => match list_args.entity() {
            ListSubcommand::Categories(args) => {
                commands::list_categories(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            ListSubcommand::Transactions(args) => {
                commands::list_transactions(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            ListSubcommand::Budgets(args) => commands::list_budgets(&ledger, args.clone())
                .await?
                .print_rows(format)?,
        },

        Command::Report(report_args) => match report_args.kind() {
            ReportSubcommand::Stats(args) => commands::monthly_stats(&ledger, args.clone())
                .await?
                .print_rows(format)?,
            ReportSubcommand::Spending(args) => {
                commands::spending_report(&ledger, args.clone())
                    .await?
                    .print_rows(format)?
            }
            ReportSubcommand::Trend(args) => commands::trend_report(&ledger, args.clone())
                .await?
                .print_rows(format)?,
            ReportSubcommand::Budgets(args) => commands::budget_report(&ledger, args.clone())
                .await?
                .print_rows(format)?,
            ReportSubcommand::Dashboard => commands::dashboard(&ledger).await?.print_rows(format)?,
        },
    };
    Ok(())
}

/// Loads the config and opens the ledger. In memory mode a missing home directory is fine.
async fn open_ledger(home: &Path, mode: Mode, user: Option<&str>) -> Result<Ledger> {
    let config = match mode {
        Mode::Sqlite => Config::load(home).await.pub_result(ErrorType::Config)?,
        Mode::Memory => match Config::load(home).await {
            Ok(config) => config,
            Err(e) => {
                debug!("No usable config for the in-memory store, using defaults: {e}");
                Config::detached(home, DEMO_USER)
            }
        },
    };
    Ledger::open(&config, mode, user).await
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_home_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("never-initialized");
        let err = open_ledger(&home, Mode::Sqlite, None).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_broken_config_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("config.json"), "{ not json")
            .await
            .unwrap();
        let err = open_ledger(dir.path(), Mode::Sqlite, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_memory_mode_without_home_uses_demo_user() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("never-initialized");
        let ledger = open_ledger(&home, Mode::Memory, None).await.unwrap();
        assert_eq!(ledger.user(), DEMO_USER);
    }
}
