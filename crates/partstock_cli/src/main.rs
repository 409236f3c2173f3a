//! Command-line shell over `partstock_core`.
//!
//! # Responsibility
//! - Map one subcommand to one inventory operation and print its result.
//! - Own process bootstrap: config, logging, database, notifier workers.
//!
//! # Invariants
//! - The shell keeps no inventory state; every answer comes from the service.
//! - The result is printed before waiting on in-flight notifications.

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use log::warn;
use partstock_core::db::open_db;
use partstock_core::{
    init_logging, load_config, start_notifier, ChangeSink, DbSnapshotSource, InventoryConfig,
    InventoryError, InventoryService, NoopChangeSink, NotifierPipeline, Part, SmtpMailer,
    SqlitePartRepository, DEFAULT_LOW_STOCK_THRESHOLD,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const PASSWORD_ENV: &str = "PARTSTOCK_SMTP_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "partstock", version, about = "Track part quantities and email every change")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, default_value = "partstock.toml")]
    config: PathBuf,
    /// Overrides `database.path` from the config file.
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a new part with an initial quantity.
    Add { name: String, quantity: String },
    /// Consume parts; stock never goes below zero.
    Use { name: String, quantity: String },
    /// Add stock to an existing part.
    Restock { name: String, quantity: String },
    /// Delete a part.
    Delete { name: String },
    /// Show every part.
    List,
    /// Show parts below the low-stock threshold.
    Low {
        #[arg(long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
        threshold: i64,
    },
    /// Find parts whose name contains QUERY.
    Search { query: String },
    /// Show when the inventory last changed.
    Status,
}

impl Command {
    fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Use { .. } | Self::Restock { .. } | Self::Delete { .. }
        )
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli)?;
    check_notifier_settings(&config, &cli.command)?;

    if let Some(dir) = &config.logging.dir {
        if let Err(err) = init_logging(config.logging.level, dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let db_path = config.database.path.clone();
    let conn = open_db(&db_path).map_err(|err| format!("cannot open inventory: {err}"))?;
    let repo = SqlitePartRepository::new(&conn);

    if !cli.command.is_mutation() {
        let service = InventoryService::new(repo, NoopChangeSink);
        let output = execute(&service, &cli.command).map_err(|err| err.to_string())?;
        println!("{output}");
        return Ok(());
    }

    let pipeline = NotifierPipeline::new(
        Arc::new(DbSnapshotSource::new(db_path)),
        Arc::new(SmtpMailer::new(config.notifier.smtp_settings())),
        config.notifier.message_settings(),
    );
    let (notifier, workers) = start_notifier(pipeline, config.notifier.workers)
        .map_err(|err| format!("cannot start notifier: {err}"))?;

    let result = {
        let service = InventoryService::new(repo, notifier);
        execute(&service, &cli.command)
    };
    if let Ok(confirmation) = &result {
        println!("{confirmation}");
    }
    // The service held the last notifier handle; wait for queued deliveries.
    workers.join();

    result.map(|_| ()).map_err(|err| {
        warn!(
            "event=cli_command module=cli status=error error_code={}",
            err.code()
        );
        err.to_string()
    })
}

fn resolve_config(cli: &Cli) -> Result<InventoryConfig, String> {
    let mut config = load_config(&cli.config).map_err(|err| err.to_string())?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        config.notifier.password = Some(password);
    }
    Ok(config)
}

/// Mail settings only matter to commands that change the inventory.
fn check_notifier_settings(config: &InventoryConfig, command: &Command) -> Result<(), String> {
    if !command.is_mutation() {
        return Ok(());
    }
    config
        .notifier
        .validate()
        .map_err(|err| format!("cannot send change notifications: {err}"))
}

fn execute<S: ChangeSink>(
    service: &InventoryService<SqlitePartRepository<'_>, S>,
    command: &Command,
) -> Result<String, InventoryError> {
    match command {
        Command::Add { name, quantity } => Ok(service.add_part(name, quantity)?.to_string()),
        Command::Use { name, quantity } => Ok(service.use_part(name, quantity)?.to_string()),
        Command::Restock { name, quantity } => {
            Ok(service.restock_part(name, quantity)?.to_string())
        }
        Command::Delete { name } => Ok(service.delete_part(name)?.to_string()),
        Command::List => Ok(render_parts(
            &service.get_inventory()?,
            "Inventory is empty",
        )),
        Command::Low { threshold } => Ok(render_parts(
            &service.get_low_stock(*threshold)?,
            &format!("No parts with quantity less than {threshold}."),
        )),
        Command::Search { query } => Ok(render_parts(
            &service.find_parts(query)?,
            "No matching parts found",
        )),
        Command::Status => Ok(match service.last_updated_at()? {
            Some(epoch_ms) => format!("Last Updated: {}", format_epoch_ms(epoch_ms)),
            None => "Inventory has not been updated yet".to_string(),
        }),
    }
}

fn render_parts(parts: &[Part], empty_message: &str) -> String {
    if parts.is_empty() {
        return empty_message.to_string();
    }
    parts
        .iter()
        .map(Part::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_epoch_ms(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| epoch_ms.to_string())
}
