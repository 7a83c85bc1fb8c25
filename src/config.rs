use std::{collections::HashMap, io, path::Path, str::FromStr, time::Duration};

use alloy::primitives::Address;
use thiserror::Error;

use crate::constants::DEFAULT_RETRY_INTERVAL_SECONDS;

pub const COOKIE_HEADER_KEY: &str = "COOKIE_HEADER";
pub const RETRY_INTERVAL_KEY: &str = "RETRY_INTERVAL_SECONDS";
pub const LOOP_FOREVER_KEY: &str = "LOOP_FOREVER";
pub const WALLET_ADDRESS_KEY: &str = "WALLET_ADDRESS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {0} not found")]
    NotFound(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub cookie_header: String,
    pub retry_interval: Duration,
    pub loop_forever: bool,
    pub wallet_address: Option<Address>,
}

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped, the first `=`
/// splits key from value and a repeated key keeps its last value.
pub fn parse_entries(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect()
}

impl Config {
    pub fn from_entries(entries: &HashMap<String, String>) -> Self {
        let value = |key: &str| entries.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let cookie_header = value(COOKIE_HEADER_KEY).unwrap_or_default().to_owned();

        let retry_secs = match value(RETRY_INTERVAL_KEY) {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                tracing::warn!(
                    "{RETRY_INTERVAL_KEY}={raw} is not a whole number of seconds, using {DEFAULT_RETRY_INTERVAL_SECONDS}"
                );
                DEFAULT_RETRY_INTERVAL_SECONDS
            }),
            None => DEFAULT_RETRY_INTERVAL_SECONDS,
        };

        // Present but empty counts as false.
        let loop_forever = entries
            .get(LOOP_FOREVER_KEY)
            .map_or(true, |raw| raw.eq_ignore_ascii_case("true"));

        let wallet_address = value(WALLET_ADDRESS_KEY).and_then(|raw| {
            Address::from_str(raw)
                .inspect_err(|e| tracing::warn!("Ignoring {WALLET_ADDRESS_KEY}={raw}: {e}"))
                .ok()
        });

        Self {
            cookie_header,
            retry_interval: Duration::from_secs(retry_secs),
            loop_forever,
            wallet_address,
        }
    }

    pub async fn read_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
            let path = path.display().to_string();
            match source.kind() {
                io::ErrorKind::NotFound => ConfigError::NotFound(path),
                _ => ConfigError::Io { path, source },
            }
        })?;

        Ok(Self::from_entries(&parse_entries(&contents)))
    }
}
