use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub tokens: TokenConfig,
    pub sessions: SessionConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

/// Signing key material and token lifetimes. The PEM paths point at the
/// currently configured RSA key pair; whichever pair is on disk at startup is
/// the one the codec signs and verifies with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenConfig {
    pub private_key_path: String,
    pub public_key_path: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_days: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            private_key_path: String::new(),
            public_key_path: String::new(),
            access_ttl_secs: defaults::DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_days: defaults::DEFAULT_REFRESH_TTL_DAYS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub max_per_principal: u32,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_per_principal: defaults::DEFAULT_MAX_SESSIONS_PER_PRINCIPAL as u32,
            cleanup_interval_secs: defaults::DEFAULT_CLEANUP_INTERVAL_SECS as u64,
        }
    }
}

/// When `redis_url` is set the networked cache adapter is used; otherwise a
/// bounded in-process cache. `max_entries` only applies to the latter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            max_entries: defaults::DEFAULT_CACHE_MAX_ENTRIES as u64,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}
