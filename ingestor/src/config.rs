//! Configuration management for the data ingestor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FFM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Remote store configuration
    pub store: StoreConfig,

    /// Source file configuration
    pub source: SourceConfig,

    /// Upload configuration
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Supabase project URL
    pub url: String,

    /// Supabase API key
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Path to the sensor readings CSV
    pub readings_path: String,

    /// Path to the farm coordinates CSV
    pub coordinates_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Rows per remote call
    pub batch_size: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FFM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("source.readings_path", "FishAppData.csv")?
            .set_default("source.coordinates_path", "farm_coordinates.csv")?
            .set_default("upload.batch_size", 100)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FFM_ prefix)
            .add_source(
                Environment::with_prefix("FFM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;

        if let Err(reason) = shared::validate_batch_size(config.upload.batch_size) {
            return Err(ConfigError::Message(reason.to_string()));
        }

        Ok(config)
    }
}
