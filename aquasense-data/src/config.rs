//! Database configuration using Figment
//!
//! Configuration merges, lowest priority first: built-in defaults, an
//! optional `aquasense.toml` in the working directory, then environment
//! variables prefixed `AQUASENSE_DATABASE_` (e.g.
//! `AQUASENSE_DATABASE_URL`, `AQUASENSE_DATABASE_MAX_CONNECTIONS`).

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum retry attempts for establishing the pool
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts in seconds (doubled per attempt)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/aquasense".to_string(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from defaults, `aquasense.toml` and environment
    pub fn load() -> Result<Self, DataError> {
        Self::figment().extract().map_err(DataError::from)
    }

    /// Load configuration from an explicit TOML file path
    pub fn load_from(path: &str) -> Result<Self, DataError> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("AQUASENSE_DATABASE_"))
            .extract()
            .map_err(DataError::from)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file("aquasense.toml"))
            .merge(Env::prefixed("AQUASENSE_DATABASE_"))
    }
}
