//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Float engine configuration.
    #[serde(default)]
    pub float: FloatConfig,
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

/// Float engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatConfig {
    /// Default usage percentage for breakdown allocation when the caller
    /// does not supply one. Non-final stacks keep (100 - this)% of their
    /// units in reserve to preserve denomination diversity.
    #[serde(default = "default_usage_percentage")]
    pub default_usage_percentage: u8,
}

fn default_usage_percentage() -> u8 {
    60
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            default_usage_percentage: default_usage_percentage(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CAMBIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
