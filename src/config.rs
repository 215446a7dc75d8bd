// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the daemon. Configuration is loaded from the environment at
//! startup (after an optional `.env` file has been applied by `main`).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TRUST_SERVICE_URL` | Base URL of the trust service | Required |
//! | `KEY_STORE_DIR` | Directory holding the key document store | Required |
//! | `KEY_STORE_DATABASE` | Name of the key document store database | Required |
//! | `PROFILE_PATH` | Identity (OTK) profile file | `./.summit.profile` |
//! | `CREATE_PER_CYCLE` | Keys created per cycle for test networks (x2 for production) | `5` |
//! | `REPLENISH_INTERVAL_SECS` | Pause between replenishment cycles | `30` |
//! | `REPLENISH_STRATEGY` | `target` (create the full target) or `deficit` | `target` |
//! | `PRODUCTION_SYMBOLS` | Comma separated production network symbols | `eth,bnb,trx,btc` |
//! | `TEST_SYMBOLS` | Comma separated test network symbols | `tbtc,ropsten,tbnb,niles` |
//! | `LEDGER_TIMEOUT_SECS` | HTTP timeout for trust service calls | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::logging::LogFormat;
use crate::replenisher::ReplenishStrategy;
use crate::symbols::{SymbolSet, DEFAULT_PRODUCTION_SYMBOLS, DEFAULT_TEST_SYMBOLS};

pub const TRUST_SERVICE_URL_ENV: &str = "TRUST_SERVICE_URL";
pub const KEY_STORE_DIR_ENV: &str = "KEY_STORE_DIR";
pub const KEY_STORE_DATABASE_ENV: &str = "KEY_STORE_DATABASE";
pub const PROFILE_PATH_ENV: &str = "PROFILE_PATH";
pub const CREATE_PER_CYCLE_ENV: &str = "CREATE_PER_CYCLE";
pub const REPLENISH_INTERVAL_ENV: &str = "REPLENISH_INTERVAL_SECS";
pub const REPLENISH_STRATEGY_ENV: &str = "REPLENISH_STRATEGY";
pub const PRODUCTION_SYMBOLS_ENV: &str = "PRODUCTION_SYMBOLS";
pub const TEST_SYMBOLS_ENV: &str = "TEST_SYMBOLS";
pub const LEDGER_TIMEOUT_ENV: &str = "LEDGER_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Profile file name used when `PROFILE_PATH` is not set.
pub const DEFAULT_PROFILE_FILE: &str = ".summit.profile";

pub const DEFAULT_CREATE_PER_CYCLE: u32 = 5;
pub const DEFAULT_REPLENISH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required configuration `{0}` is missing")]
    Missing(&'static str),

    #[error("configuration `{name}` has invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Trust service connection settings.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

/// Key document store location.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub dir: PathBuf,
    pub database: String,
}

impl StoreConfig {
    /// Path of the database file backing the store.
    pub fn database_file(&self) -> PathBuf {
        self.dir.join(format!("{}.redb", self.database))
    }
}

/// Pool replenishment settings.
#[derive(Debug, Clone)]
pub struct ReplenishConfig {
    pub per_cycle: u32,
    pub interval: Duration,
    pub strategy: ReplenishStrategy,
    pub symbols: SymbolSet,
}

/// Complete daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub store: StoreConfig,
    pub profile_path: PathBuf,
    pub replenish: ReplenishConfig,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_url = get(TRUST_SERVICE_URL_ENV).ok_or(ConfigError::Missing(TRUST_SERVICE_URL_ENV))?;
        let base_url = parse_base_url(&raw_url)?;

        let store = StoreConfig {
            dir: get(KEY_STORE_DIR_ENV)
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing(KEY_STORE_DIR_ENV))?,
            database: get(KEY_STORE_DATABASE_ENV).ok_or(ConfigError::Missing(KEY_STORE_DATABASE_ENV))?,
        };

        let profile_path = get(PROFILE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_PROFILE_FILE));

        let per_cycle = match get(CREATE_PER_CYCLE_ENV) {
            Some(raw) => parse_positive(CREATE_PER_CYCLE_ENV, &raw)?,
            None => DEFAULT_CREATE_PER_CYCLE,
        };

        let interval = match get(REPLENISH_INTERVAL_ENV) {
            Some(raw) => Duration::from_secs(parse_positive(REPLENISH_INTERVAL_ENV, &raw)?.into()),
            None => DEFAULT_REPLENISH_INTERVAL,
        };

        let timeout = match get(LEDGER_TIMEOUT_ENV) {
            Some(raw) => Duration::from_secs(parse_positive(LEDGER_TIMEOUT_ENV, &raw)?.into()),
            None => DEFAULT_LEDGER_TIMEOUT,
        };

        let strategy = match get(REPLENISH_STRATEGY_ENV) {
            Some(raw) => parse_with(REPLENISH_STRATEGY_ENV, &raw)?,
            None => ReplenishStrategy::default(),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => parse_with(LOG_FORMAT_ENV, &raw)?,
            None => LogFormat::default(),
        };

        let production = get(PRODUCTION_SYMBOLS_ENV)
            .map(|raw| parse_symbol_list(PRODUCTION_SYMBOLS_ENV, &raw))
            .transpose()?
            .unwrap_or_else(|| to_owned_list(DEFAULT_PRODUCTION_SYMBOLS));
        let test = get(TEST_SYMBOLS_ENV)
            .map(|raw| parse_symbol_list(TEST_SYMBOLS_ENV, &raw))
            .transpose()?
            .unwrap_or_else(|| to_owned_list(DEFAULT_TEST_SYMBOLS));

        Ok(Self {
            ledger: LedgerConfig { base_url, timeout },
            store,
            profile_path,
            replenish: ReplenishConfig {
                per_cycle,
                interval,
                strategy,
                symbols: SymbolSet::new(production, test),
            },
            log_format,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name: TRUST_SERVICE_URL_ENV,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            name: TRUST_SERVICE_URL_ENV,
            value: raw.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let value: u32 = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn parse_with<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(|reason| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason,
    })
}

fn parse_symbol_list(name: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let symbols: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "no symbols listed".to_string(),
        });
    }
    Ok(symbols)
}

fn to_owned_list(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}
