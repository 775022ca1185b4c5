use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://disease.sh/v3/covid-19";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("COVID_API_URL is not a valid url: {0}")]
    ApiUrl(#[from] url::ParseError),
    #[error("HTTP_TIMEOUT_SECS must be a number of seconds")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub http_timeout: Duration,
    pub users_file: PathBuf,
    /// Store users in SQLite instead of the JSON file when set.
    pub database_url: Option<String>,
    pub chart_path: PathBuf,
}

impl Config {
    /// Reads the configuration from the environment. The bot token itself is
    /// picked up by teloxide from `TELOXIDE_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = get("COVID_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_url = Url::parse(&api_url)?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(secs) => {
                let secs = secs.trim().parse().map_err(|_| ConfigError::Timeout)?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(10),
        };

        Ok(Self {
            api_url,
            http_timeout,
            users_file: get("USERS_FILE").unwrap_or_else(|| "users.json".into()).into(),
            database_url: get("DATABASE_URL").filter(|url| !url.is_empty()),
            chart_path: get("CHART_PATH").unwrap_or_else(|| "graph.png".into()).into(),
        })
    }
}
