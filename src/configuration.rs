use std::{
    env::{self, VarError},
    fs,
    path::{Path, PathBuf},
};

use url::Url;

use crate::error::Error;

pub const DEFAULT_LISTINGS_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
pub const DEFAULT_OUTPUT_FILE: &str = "API.csv";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub listings_url: String,
    pub start: u32,
    pub limit: u32,
    pub convert: String,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub poll_interval: u64,
    pub poll_runs: u32,
    /// Request timeout in seconds, `None` keeps the client default.
    pub timeout: Option<u64>,
}

impl Config {
    pub fn new(api_key: impl Into<String>, output_dir: impl AsRef<Path>) -> Self {
        Config {
            api_key: api_key.into(),
            listings_url: DEFAULT_LISTINGS_URL.to_owned(),
            start: 1,
            limit: 100,
            convert: String::from("USD"),
            output_dir: output_dir.as_ref().to_path_buf(),
            output_file: DEFAULT_OUTPUT_FILE.to_owned(),
            poll_interval: 60,
            poll_runs: 3,
            timeout: None,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    pub fn listings_query(&self) -> [(&'static str, String); 3] {
        [
            ("start", self.start.to_string()),
            ("limit", self.limit.to_string()),
            ("convert", self.convert.to_owned()),
        ]
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let api_key = env::var("CMC_API_KEY")?;
    let listings_url = var_or("LISTINGS_URL", DEFAULT_LISTINGS_URL)?;
    Url::parse(&listings_url)?;

    let start = var_or("LISTINGS_START", "1")?.parse()?;
    let limit = var_or("LISTINGS_LIMIT", "100")?.parse()?;
    let convert = var_or("LISTINGS_CONVERT", "USD")?;
    let output_dir = PathBuf::from(var_or("OUTPUT_DIR", ".")?);
    let output_file = var_or("OUTPUT_FILE", DEFAULT_OUTPUT_FILE)?;
    let poll_interval = var_or("POLL_INTERVAL", "60")?.parse()?;
    let poll_runs = var_or("POLL_RUNS", "3")?.parse()?;

    let timeout = match env::var("TIMEOUT") {
        Ok(value) => Some(value.parse()?),
        Err(VarError::NotPresent) => None,
        Err(e) => return Err(Error::VAR(e)),
    };

    if api_key.trim().is_empty() {
        return Err(Error::ConfigurationError(String::from(
            "CMC_API_KEY is empty",
        )));
    }

    if convert.is_empty() || convert.contains('.') {
        return Err(Error::ConfigurationError(format!(
            "invalid convert currency: {:?}",
            convert
        )));
    }

    let config = Config {
        api_key,
        listings_url,
        start,
        limit,
        convert,
        output_dir,
        output_file,
        poll_interval,
        poll_runs,
        timeout,
    };

    Ok(config)
}

/// Loads `KEY=VALUE` pairs from `.env` in the working directory, if present.
/// Variables already set in the environment win.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    match fs::read_to_string(config_file) {
        Ok(config_string) => parse_config_string(config_string),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

fn parse_config_string(config: String) -> Result<(), Error> {
    for (key, value) in parse_pairs(&config) {
        if env::var_os(key).is_none() {
            env::set_var(key, value);
        }
    }

    Ok(())
}

fn parse_pairs(config: &str) -> Vec<(&str, &str)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_at(line.find('=')?);
            Some((key.trim(), value[1..].trim()))
        })
        .collect()
}

fn var_or(key: &str, default: &str) -> Result<String, Error> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(VarError::NotPresent) => Ok(default.to_owned()),
        Err(e) => Err(Error::VAR(e)),
    }
}
