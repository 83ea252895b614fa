//! Tamagoyaki CLI: manage the local crypto candlestick store

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tamagoyaki::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::parse_date;

#[derive(Parser)]
#[command(name = "tamagoyaki", version)]
#[command(about = "A CLI tool for managing the crypto candlestick data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download and store 1-second candles for each day in the range
    Update {
        /// The symbol to download (e.g., BTCUSDT)
        symbol: String,
        /// The begin date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        begin: NaiveDate,
        /// The end date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Export a date range as CSV bars at the given interval
    Generate {
        /// The symbol to export
        symbol: String,
        /// The begin date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        begin: NaiveDate,
        /// The end date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
        /// The bar interval in seconds
        interval_secs: u32,
        /// The output directory
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Delete stored partitions in a date range
    Tidy {
        /// The symbol to prune
        symbol: String,
        /// The begin date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        begin: NaiveDate,
        /// The end date (YYYYMMDD)
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
    /// Delete all stored data for a symbol
    Remove {
        /// The symbol to delete
        symbol: String,
    },
    /// Show the stored symbols and their date ranges
    Inventory,
}

/// Log to `<data dir>/log/app.log`; console output stays for the user
fn init_logging(config: &Config) -> Result<()> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))
        .with_context(|| format!("cannot open log file in {}", log_dir.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("cannot create data directory {}", config.data_dir.display()))?;
    init_logging(&config)?;

    let result = match cli.command {
        Command::Update { symbol, begin, end } => {
            commands::update::run(&config, &symbol, begin, end).await
        }
        Command::Generate {
            symbol,
            begin,
            end,
            interval_secs,
            output_dir,
        } => commands::generate::run(&config, &symbol, begin, end, interval_secs, &output_dir),
        Command::Tidy { symbol, begin, end } => commands::tidy::run(&config, &symbol, begin, end),
        Command::Remove { symbol } => commands::remove::run(&config, &symbol),
        Command::Inventory => commands::inventory::run(&config),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    result
}
