use super::models::{Config, DEFAULT_API_KEY};
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("server.api_key must not be empty")]
    EmptyApiKey,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_url("backend.search_url", &config.backend.search_url)?;
    validate_url("backend.login_url", &config.backend.login_url)?;

    if let Some(public_url) = &config.server.public_url {
        validate_url("server.public_url", public_url)?;
    }

    if config.backend.search_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.search_timeout_secs",
        });
    }
    if config.backend.download_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.download_timeout_secs",
        });
    }

    if config.server.api_key.is_empty() {
        return Err(ValidationError::EmptyApiKey);
    }
    if config.server.api_key == DEFAULT_API_KEY {
        tracing::warn!("Using the default API key; set PROXY_API_KEY");
    }

    if config.backend.username.is_none() || config.backend.password.is_none() {
        tracing::warn!("Backend credentials not set; NZB downloads will fail");
    }

    Ok(())
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}
