use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "EASYZNAB_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/easyznab.toml";
const ENV_PREFIX: &str = "EASYZNAB";
const ENV_SEPARATOR: &str = "__";

const USER_ENV_VAR: &str = "EASYNEWS_USER";
const PASS_ENV_VAR: &str = "EASYNEWS_PASS";
const API_KEY_ENV_VAR: &str = "PROXY_API_KEY";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path
        .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, |key| env::var(key).ok());

    Ok(config)
}

/// Fill secrets from the environment.
/// Credentials and the API key are never read from TOML files.
fn load_secrets(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(user) = lookup(USER_ENV_VAR) {
        config.backend.username = Some(user);
    }
    if let Some(pass) = lookup(PASS_ENV_VAR) {
        config.backend.password = Some(pass);
    }
    if let Some(api_key) = lookup(API_KEY_ENV_VAR) {
        config.server.api_key = api_key;
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // EASYZNAB__SERVER__BIND_ADDR -> server.bind_addr
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}
