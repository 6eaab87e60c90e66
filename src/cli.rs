//! CLI module for the listings ETL
//!
//! Pulls listing snapshots into the CSV log and prints the derived views.
//! Running without a subcommand performs the whole pass: a timed pull,
//! one more ad hoc fetch, then the report.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::{
    configuration::{get_configuration, set_configuration, Config},
    dao::AppendStore,
    error::Error,
    handler::poll,
    provider::HTTP,
    report::{render_report, to_csv},
    transform::transform,
};

pub const DEFAULT_COIN: &str = "Bitcoin";

/// Listings ETL
#[derive(Parser)]
#[command(name = "listings-etl")]
#[command(about = "Cryptocurrency listings snapshot ETL", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the listings endpoint and append every batch to the log
    Pull {
        /// Seconds to sleep after each run (POLL_INTERVAL when omitted)
        #[arg(long)]
        interval: Option<u64>,

        /// Number of runs (POLL_RUNS when omitted)
        #[arg(long)]
        runs: Option<u32>,
    },

    /// Fetch and store a single batch
    Fetch,

    /// Load the log and print the percent-change, market and price views
    Report {
        /// Coin name for the price-over-time view, matched exactly
        #[arg(long, default_value = DEFAULT_COIN)]
        coin: String,

        /// Also write the percent-change table to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub async fn run_pull(
    config: &Config,
    interval: Option<u64>,
    runs: Option<u32>,
) -> Result<(), Error> {
    let http = HTTP::new(config.clone())?;
    let mut store = AppendStore::from_config(config);

    let summary = poll::run(
        &http,
        &mut store,
        interval.unwrap_or(config.poll_interval),
        runs.unwrap_or(config.poll_runs),
    )
    .await?;

    info!(
        "Pull finished: {} attempts, {} stored, {} skipped",
        summary.attempts, summary.stored, summary.skipped
    );

    Ok(())
}

pub async fn run_fetch(config: &Config) -> Result<(), Error> {
    let http = HTTP::new(config.clone())?;
    let mut store = AppendStore::from_config(config);

    if !poll::fetch_store(&http, &mut store).await? {
        info!("No data returned, nothing stored");
    }

    Ok(())
}

pub fn run_report(
    config: &Config,
    coin: &str,
    export: Option<PathBuf>,
) -> Result<(), Error> {
    let store = AppendStore::from_config(config);

    let Some(table) = store.load()? else {
        return Ok(());
    };

    println!("{}", render_report(&table, &store.schema, coin)?);

    if let Some(path) = export {
        let tidy = transform(&table, &store.schema)?;
        to_csv(&tidy, &path)?;
    }

    Ok(())
}

pub async fn run_all(config: &Config) -> Result<(), Error> {
    run_pull(config, None, None).await?;
    run_fetch(config).await?;
    run_report(config, DEFAULT_COIN, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_defaults_to_bitcoin() {
        let cli = Cli::try_parse_from(["listings-etl", "report"]).unwrap();

        match cli.command {
            Some(Commands::Report { coin, export }) => {
                assert_eq!(coin, "Bitcoin");
                assert!(export.is_none());
            },
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_parse_pull_overrides() {
        let cli = Cli::try_parse_from([
            "listings-etl",
            "pull",
            "--interval",
            "5",
            "--runs",
            "2",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Some(Commands::Pull {
                interval: Some(5),
                runs: Some(2),
            })
        ));
    }

    #[test]
    fn test_no_subcommand_is_full_pass() {
        let cli = Cli::try_parse_from(["listings-etl"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_report_on_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("key", dir.path());

        run_report(&config, DEFAULT_COIN, None).unwrap();
    }

    #[test]
    fn test_report_exports_percent_change_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("key", dir.path());
        let mut store = AppendStore::from_config(&config);
        store
            .store(&[crate::fixtures::listing(
                "Bitcoin",
                [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            )])
            .unwrap();

        let export = dir.path().join("tidy.csv");
        run_report(&config, DEFAULT_COIN, Some(export.clone())).unwrap();

        let text = std::fs::read_to_string(export).unwrap();
        assert_eq!(text.lines().count(), 7);
        assert!(text.contains("Bitcoin,90d,6.0"));
    }
}
