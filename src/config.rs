//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with SCRUTIN_)
//! 2. Config file (scrutin.toml)
//! 3. Default values
//!
//! The database URL is a secret and should come from the environment, not
//! from the config file.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Address the HTTP server binds to.
    pub bind_address: String,
    pub port: u16,
    /// Maximum connections held by the pool.
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            max_connections: 16,
        }
    }
}

impl AppConfig {
    /// Load configuration from `scrutin.toml` (optional) and `SCRUTIN_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::var("SCRUTIN_CONFIG").as_deref().unwrap_or("scrutin.toml"))
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("SCRUTIN"))
            .build()?
            .try_deserialize()
    }
}
