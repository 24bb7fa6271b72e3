//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use currency_hex::outbound::{DEFAULT_FIXER_URL, DEFAULT_TIMEOUT};

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub fixer_url: String,
    pub fixer_api_key: String,
    pub fixer_timeout: Duration,
    /// Period of the scheduled refresh of every currency; `None` disables it.
    pub refresh_interval: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let fixer_url = lookup("FIXER_URL").unwrap_or_else(|| DEFAULT_FIXER_URL.to_string());

        let fixer_api_key = lookup("FIXER_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow::anyhow!("FIXER_API_KEY environment variable is required"))?;

        let fixer_timeout = match lookup("FIXER_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.parse()?),
            None => DEFAULT_TIMEOUT,
        };

        let refresh_interval = match lookup("REFRESH_INTERVAL_SECS") {
            Some(secs) => match secs.parse::<u64>()? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        Ok(Self {
            port,
            database_url,
            fixer_url,
            fixer_api_key,
            fixer_timeout,
            refresh_interval,
        })
    }
}
