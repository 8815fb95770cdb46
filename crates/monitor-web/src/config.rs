//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use chrono::FixedOffset;
use monitor_core::EngineSettings;
use transcript_store::ContextRegistry;

/// Monitor web server configuration.
///
/// Per-context endpoints (`DB_URL_*`) are not part of this struct: they are
/// re-read from the environment on every access so that a context can be
/// configured without a restart.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Aggregation settings.
    pub engine: EngineSettings,
    /// Maximum connections per context pool.
    pub pool_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `MONITOR_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `PENDING_THRESHOLD_MINUTES` | Pending-reply threshold, at least 1 | `2` |
    /// | `DEFAULT_DATE_RANGE_DAYS` | Length of the default date range | `7` |
    /// | `DISPLAY_UTC_OFFSET` | Display timezone offset | `+07:00` |
    /// | `CONTEXT_POOL_MAX_CONNECTIONS` | Connections per context pool | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = get("MONITOR_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let pending_minutes = get("PENDING_THRESHOLD_MINUTES")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(EngineSettings::DEFAULT_PENDING_MINUTES);

        let range_days = get("DEFAULT_DATE_RANGE_DAYS")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(EngineSettings::DEFAULT_RANGE_DAYS);

        let mut engine = EngineSettings::default()
            .with_pending_threshold_minutes(pending_minutes)
            .with_default_range_days(range_days);

        if let Some(raw) = get("DISPLAY_UTC_OFFSET") {
            let offset = raw
                .trim()
                .parse::<FixedOffset>()
                .map_err(|_| ConfigError::InvalidOffset(raw.clone()))?;
            engine = engine.with_display_offset(offset);
        }

        let pool_size = get("CONTEXT_POOL_MAX_CONNECTIONS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(ContextRegistry::DEFAULT_MAX_CONNECTIONS);

        Ok(Self {
            addr,
            engine,
            pool_size,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid MONITOR_ADDR format")]
    InvalidAddr,

    #[error("Invalid DISPLAY_UTC_OFFSET {0:?}, expected e.g. +07:00")]
    InvalidOffset(String),
}
