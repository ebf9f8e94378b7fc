//! Run settings resolved from configuration.
//!
//! Every key is optional. Values present but out of range are rejected
//! before any store or network handle is opened.

use crate::domain::error::IngestError;
use crate::ports::config_port::ConfigPort;
use std::time::Duration;

/// Environment variable overriding `[sqlite] path`.
pub const DB_PATH_ENV: &str = "CRYPTOINGEST_DB_PATH";

pub const DEFAULT_DB_PATH: &str = "crypto_data.db";
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_TOP_N: i64 = 100;
pub const DEFAULT_DAYS: i64 = 30;
/// Fewest days of history that can yield an enriched row (20-bar windows on
/// bars derived from consecutive closes).
pub const MIN_DAYS: i64 = 21;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PACE_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub sqlite_path: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub vs_currency: String,
    pub top_n: usize,
    pub days: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pace: Duration,
}

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub store: StoreSettings,
    pub provider: ProviderSettings,
    pub pipeline: PipelineSettings,
}

impl IngestSettings {
    /// Resolve settings from `config`, letting `db_path_override` (normally
    /// the value of [`DB_PATH_ENV`]) win over `[sqlite] path`.
    pub fn resolve(
        config: &dyn ConfigPort,
        db_path_override: Option<String>,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            store: resolve_store(config, db_path_override)?,
            provider: resolve_provider(config)?,
            pipeline: PipelineSettings {
                pace: non_negative_secs(config, "pipeline", "pace_secs", DEFAULT_PACE_SECS)?,
            },
        })
    }

    /// Settings with [`DB_PATH_ENV`] read from the process environment.
    pub fn from_env(config: &dyn ConfigPort) -> Result<Self, IngestError> {
        let db_path = std::env::var(DB_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
        Self::resolve(config, db_path)
    }
}

fn resolve_store(
    config: &dyn ConfigPort,
    db_path_override: Option<String>,
) -> Result<StoreSettings, IngestError> {
    let backend = match config
        .get_string("database", "backend")
        .map(|b| b.trim().to_lowercase())
        .as_deref()
    {
        None | Some("sqlite") => StoreBackend::Sqlite,
        Some("postgres") => StoreBackend::Postgres,
        Some(other) => {
            return Err(IngestError::ConfigInvalid {
                section: "database".to_string(),
                key: "backend".to_string(),
                reason: format!("unknown backend '{}', expected sqlite or postgres", other),
            });
        }
    };

    let sqlite_path = db_path_override
        .or_else(|| config.get_string("sqlite", "path"))
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    let pool_size = config.get_int("sqlite", "pool_size", 1);
    if pool_size < 1 {
        return Err(IngestError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be at least 1".to_string(),
        });
    }

    Ok(StoreSettings {
        backend,
        sqlite_path,
        pool_size: pool_size as u32,
    })
}

fn resolve_provider(config: &dyn ConfigPort) -> Result<ProviderSettings, IngestError> {
    let base_url = config
        .get_string("provider", "base_url")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(IngestError::ConfigInvalid {
            section: "provider".to_string(),
            key: "base_url".to_string(),
            reason: "base_url must be an http(s) URL".to_string(),
        });
    }

    let vs_currency = config
        .get_string("provider", "vs_currency")
        .map(|c| c.trim().to_lowercase())
        .unwrap_or_else(|| "usd".to_string());
    if vs_currency.is_empty() {
        return Err(IngestError::ConfigInvalid {
            section: "provider".to_string(),
            key: "vs_currency".to_string(),
            reason: "vs_currency must not be empty".to_string(),
        });
    }

    let top_n = config.get_int("provider", "top_n", DEFAULT_TOP_N);
    if !(1..=250).contains(&top_n) {
        return Err(IngestError::ConfigInvalid {
            section: "provider".to_string(),
            key: "top_n".to_string(),
            reason: "top_n must be between 1 and 250".to_string(),
        });
    }

    let days = config.get_int("provider", "days", DEFAULT_DAYS);
    if !(MIN_DAYS..=DEFAULT_DAYS).contains(&days) {
        return Err(IngestError::ConfigInvalid {
            section: "provider".to_string(),
            key: "days".to_string(),
            reason: format!("days must be between {MIN_DAYS} and {DEFAULT_DAYS}"),
        });
    }

    Ok(ProviderSettings {
        base_url,
        vs_currency,
        top_n: top_n as usize,
        days: days as u32,
        timeout: non_negative_secs(config, "provider", "timeout_secs", DEFAULT_TIMEOUT_SECS)?,
    })
}

fn non_negative_secs(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u64,
) -> Result<Duration, IngestError> {
    if config.get_int(section, key, default as i64) < 0 {
        return Err(IngestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be non-negative", key),
        });
    }
    Ok(config.get_secs(section, key, default))
}
