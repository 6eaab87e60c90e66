use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use listings_etl::{
    cli::{self, Cli, Commands},
    error::Error,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = match cli::init_config() {
        Ok(config) => config,
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    match cli.command {
        None => cli::run_all(&config).await,
        Some(Commands::Pull { interval, runs }) => {
            cli::run_pull(&config, interval, runs).await
        },
        Some(Commands::Fetch) => cli::run_fetch(&config).await,
        Some(Commands::Report { coin, export }) => {
            cli::run_report(&config, &coin, export)
        },
    }
}
