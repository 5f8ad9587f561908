//! # Seeder Configuration
//!
//! Layered configuration built with the `config` crate, lowest precedence
//! first:
//!
//! 1. built-in defaults
//! 2. `config/seeder.toml` (or the file named by `SEEDER_CONFIG`), if present
//! 3. `SEEDER_*` environment variables, e.g. `SEEDER_BATCH_SIZE=1000`
//! 4. `DB_URL` / `DATABASE_URL`, which override `database_url`
//!
//! A `.env` file in the working directory is loaded first, so its variables
//! take part in layers 3 and 4.

use std::env;
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::persistence::MAX_ROWS_PER_INSERT;

pub const DEFAULT_CONFIG_FILE: &str = "config/seeder";
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/seeder_development";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigurationError {
    fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeederConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Number of records to plan
    pub total_count: i64,
    /// Maximum records per bulk insert
    pub batch_size: i64,
    /// Batches between progress log lines; 0 disables them
    pub progress_log_interval: usize,
    /// Load into the in-memory store instead of PostgreSQL
    pub dry_run: bool,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            total_count: 10_000_000,
            batch_size: 5_000,
            progress_log_interval: 100,
            dry_run: false,
        }
    }
}

impl SeederConfig {
    /// Load from `.env`, the default config file, and the environment.
    pub fn load() -> Result<Self, ConfigurationError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, "No .env file loaded");
        }

        let path = env::var("SEEDER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from_file(Path::new(&path))
    }

    /// Load with `path` as the file layer. A missing file is not an error.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("total_count", defaults.total_count)?
            .set_default("batch_size", defaults.batch_size)?
            .set_default("progress_log_interval", defaults.progress_log_interval as i64)?
            .set_default("dry_run", defaults.dry_run)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SEEDER").try_parsing(true))
            .build()?;

        let mut config: SeederConfig = settings.try_deserialize()?;

        if let Ok(url) = env::var("DB_URL").or_else(|_| env::var("DATABASE_URL")) {
            config.database_url = url;
        }

        config.validate()?;

        debug!(
            database_url = %config.redacted_database_url(),
            total_count = config.total_count,
            batch_size = config.batch_size,
            dry_run = config.dry_run,
            "Configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.batch_size <= 0 {
            return Err(ConfigurationError::invalid_value(
                "batch_size",
                format!("must be positive, got {}", self.batch_size),
            ));
        }
        if self.batch_size as u64 > MAX_ROWS_PER_INSERT as u64 {
            return Err(ConfigurationError::invalid_value(
                "batch_size",
                format!(
                    "{} exceeds the bulk insert limit of {MAX_ROWS_PER_INSERT} rows",
                    self.batch_size
                ),
            ));
        }
        if self.total_count < 0 {
            return Err(ConfigurationError::invalid_value(
                "total_count",
                format!("must not be negative, got {}", self.total_count),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_connections",
                "must be at least 1",
            ));
        }
        if !self.dry_run && self.database_url.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "database_url",
                "must be set unless dry_run is enabled",
            ));
        }
        Ok(())
    }

    /// `database_url` with any password replaced, for logging.
    pub fn redacted_database_url(&self) -> String {
        let url = &self.database_url;
        let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
            return url.clone();
        };
        let Some(at) = url[scheme_end..].find('@').map(|i| i + scheme_end) else {
            return url.clone();
        };
        match url[scheme_end..at].find(':') {
            Some(colon) => format!("{}:***{}", &url[..scheme_end + colon], &url[at..]),
            None => url.clone(),
        }
    }
}
