//! Application configuration management.

use serde::Deserialize;

use crate::clock::BusinessClock;
use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Accounting engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Accounting engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// IANA timezone used to derive "today" for document numbering.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Document sequence allocation settings.
    #[serde(default)]
    pub sequence: SequenceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            sequence: SequenceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Builds the business clock for the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the timezone name is unknown.
    pub fn clock(&self) -> Result<BusinessClock, AppError> {
        BusinessClock::from_name(&self.timezone)
    }
}

fn default_timezone() -> String {
    "Asia/Jakarta".to_string()
}

/// Sequence allocator settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SequenceConfig {
    /// How many times an allocation is retried after lock contention.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Upper bound for waiting on a transcode row lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Base backoff between retries, in milliseconds (multiplied by attempt).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            lock_timeout_ms: default_lock_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_lock_timeout_ms() -> u64 {
    2_000
}

fn default_retry_backoff_ms() -> u64 {
    25
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default.toml`, `config/{RUN_MODE}.toml`, `ARUS__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ARUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
