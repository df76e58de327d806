//! Configuration management for easyznab
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use easyznab::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `EASYZNAB__<section>__<key>`
//!
//! Examples:
//! - `EASYZNAB__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `EASYZNAB__SERVER__PUBLIC_URL=https://znab.example.com`
//! - `EASYZNAB__BACKEND__SEARCH_TIMEOUT_SECS=30`
//!
//! Secrets only ever come from the environment (or `.env`):
//! `EASYNEWS_USER`, `EASYNEWS_PASS` and `PROXY_API_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/easyznab.toml`.
//! This can be overridden using the `EASYZNAB_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{BackendConfig, Config, FeedConfig, ServerConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`EASYZNAB__*`, plus the secret variables)
    /// 2. TOML file (default: `config/easyznab.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Like [`Config::load`], with an explicit config file path taking
    /// precedence over `EASYZNAB_CONFIG`
    pub fn load_with(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without environment secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
