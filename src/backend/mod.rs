//! Backend (Easynews) access
//!
//! [`Backend`] is the seam between the HTTP surface and the content provider.
//! Searches are single requests; downloads go through a [`BackendSession`],
//! a short-lived authenticated client created for one inbound request and
//! dropped with it.

mod easynews;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use thiserror::Error;

pub use easynews::EasynewsClient;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend credentials are not configured (set EASYNEWS_USER and EASYNEWS_PASS)")]
    MissingCredentials,

    #[error("backend rejected credentials: HTTP {status}")]
    CredentialsRejected { status: u16 },

    #[error("request to backend timed out: {url}")]
    Timeout { url: String },

    #[error("request to backend failed: {url}: {message}")]
    Transport { url: String, message: String },

    #[error("backend returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to build backend client: {0}")]
    Client(String),
}

impl BackendError {
    /// Upstream HTTP status, when the backend answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            BackendError::CredentialsRejected { status } | BackendError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// True for failures to authenticate, as opposed to reaching the backend
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            BackendError::MissingCredentials | BackendError::CredentialsRejected { .. }
        )
    }
}

/// A fully buffered backend response
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn content_disposition(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Authenticated client scoped to a single inbound request
#[async_trait]
pub trait BackendSession: Send + Sync {
    /// GET `url` with the session's credentials and cookies, following redirects
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, BackendError>;
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a subject search and return the raw RSS bytes
    async fn search(&self, term: &str) -> Result<Bytes, BackendError>;

    /// Log in and return a fresh session
    async fn open_session(&self) -> Result<Box<dyn BackendSession>, BackendError>;

    /// Open a session and fetch `url` with it
    async fn authenticated_fetch(&self, url: &str) -> Result<FetchedResponse, BackendError> {
        let session = self.open_session().await?;
        session.fetch(url).await
    }
}
