//! reqwest-based Easynews client

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, redirect::Policy};
use tracing::{debug, info, warn};

use super::{Backend, BackendError, BackendSession, FetchedResponse};
use crate::config::BackendConfig;

/// Easynews global search mode
const GLOBAL_SEARCH: &str = "5";

const MAX_REDIRECTS: usize = 10;

/// Easynews backend
pub struct EasynewsClient {
    search_client: Client,
    config: BackendConfig,
}

impl EasynewsClient {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let search_client = Client::builder()
            .timeout(Duration::from_secs(config.search_timeout_secs))
            .user_agent(&config.user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            search_client,
            config,
        })
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.config.username.as_deref(), self.config.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

#[async_trait]
impl Backend for EasynewsClient {
    async fn search(&self, term: &str) -> Result<Bytes, BackendError> {
        let url = &self.config.search_url;
        debug!(term, "Searching backend");

        let mut request = self
            .search_client
            .get(url)
            .query(&[("sbj", term), ("sS", GLOBAL_SEARCH)]);

        if let Some((user, pass)) = self.credentials() {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Backend search failed");
            return Err(BackendError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;

        debug!(length = body.len(), "Backend search completed");
        Ok(body)
    }

    async fn open_session(&self) -> Result<Box<dyn BackendSession>, BackendError> {
        let (username, password) = self.credentials().ok_or(BackendError::MissingCredentials)?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(self.config.download_timeout_secs))
            .user_agent(&self.config.user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        let login_url = &self.config.login_url;
        let response = client
            .get(login_url)
            .basic_auth(username, Some(password))
            .send()
            .await
            .map_err(|e| transport_error(login_url, e))?;

        let status = response.status();
        info!(
            status = status.as_u16(),
            content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(""),
            "Backend login"
        );

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BackendError::CredentialsRejected {
                status: status.as_u16(),
            });
        }

        Ok(Box::new(EasynewsSession {
            client,
            username: username.to_string(),
            password: password.to_string(),
        }))
    }
}

/// Logged-in client holding whatever cookies the login set
struct EasynewsSession {
    client: Client,
    username: String,
    password: String,
}

#[async_trait]
impl BackendSession for EasynewsSession {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, BackendError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;

        Ok(FetchedResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout {
            url: url.to_string(),
        }
    } else {
        BackendError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
