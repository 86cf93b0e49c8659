//! Runtime configuration read from environment variables.

use crate::domain::LoanDays;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// None means the in-memory adapters are used
    pub database: Option<DatabaseConfig>,
    pub port: u16,
    /// None disables the background overdue sweep
    pub sweep_interval: Option<Duration>,
    pub default_loan_days: LoanDays,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            }),
            None => None,
        };

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let sweep_secs = parse_or(
            &lookup,
            "OVERDUE_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        let sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        let default_loan_days = match lookup("DEFAULT_LOAN_DAYS") {
            Some(raw) => {
                let days: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "DEFAULT_LOAN_DAYS",
                    value: raw.clone(),
                })?;
                LoanDays::from_requested(days)
            }
            None => LoanDays::DEFAULT,
        };

        Ok(Self {
            database,
            port,
            sweep_interval,
            default_loan_days,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
