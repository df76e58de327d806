//! NZB download proxy
//!
//! Turns a caller-facing `src` token back into the backend URL, fetches it
//! with a fresh authenticated session and hands the bytes back under our own
//! content type and filename. The backend's session never reaches the caller.

mod filename;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{error, info};

use crate::backend::{Backend, BackendError, FetchedResponse};
use crate::codec::{self, CodecError};
use crate::feed::NZB_MEDIA_TYPE;

pub use filename::{DEFAULT_FILENAME, derive_filename};

/// Characters of body shown when debugging a download
pub const DEBUG_SAMPLE_CHARS: usize = 500;

/// Characters of body logged alongside upstream failures
const ERROR_SAMPLE_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid download request: {0}")]
    InvalidRequest(#[from] CodecError),

    #[error("backend authentication failed: {0}")]
    AuthFailure(#[source] BackendError),

    #[error("backend unavailable: {0}")]
    Unavailable(#[source] BackendError),

    #[error("backend returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error("backend did not return NZB data (content-type {content_type:?})")]
    UnexpectedContentType { content_type: String },
}

/// A validated download ready to hand to the caller
#[derive(Debug, Clone)]
pub struct ProxiedDownload {
    pub body: Bytes,
    pub content_type: &'static str,
    pub filename: String,
}

impl ProxiedDownload {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

pub struct DownloadProxy {
    backend: Arc<dyn Backend>,
}

impl DownloadProxy {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Fetch the backend URL behind `encoded_src` and validate the payload
    pub async fn proxy_download(
        &self,
        encoded_src: &str,
        debug: bool,
    ) -> Result<ProxiedDownload, ProxyError> {
        let url = codec::decode(encoded_src)?;
        info!(url = %url, "Proxying NZB download");

        let session = self.backend.open_session().await.map_err(|e| {
            error!(error = %e, "Failed to open backend session");
            if e.is_auth() {
                ProxyError::AuthFailure(e)
            } else {
                ProxyError::Unavailable(e)
            }
        })?;

        let response = session.fetch(&url).await.map_err(|e| {
            error!(error = %e, "Error fetching NZB from backend");
            ProxyError::Unavailable(e)
        })?;

        info!(
            status = response.status,
            content_type = response.content_type().unwrap_or(""),
            length = response.body.len(),
            "Backend NZB fetch"
        );

        if debug {
            info!(sample = ?debug_sample(&response.body), "Backend body sample");
        }

        if !response.is_success() {
            error!(
                status = response.status,
                sample = ?textual_sample(&response, ERROR_SAMPLE_CHARS).unwrap_or_default(),
                "Backend returned non-success status"
            );
            return Err(ProxyError::UpstreamStatus {
                status: response.status,
            });
        }

        let content_type = response.content_type().unwrap_or("").to_lowercase();
        if looks_like_error_page(&content_type) {
            error!(
                content_type = %content_type,
                sample = ?text_prefix(&response.body, ERROR_SAMPLE_CHARS),
                "Backend response looks like HTML/text, not NZB"
            );
            return Err(ProxyError::UnexpectedContentType { content_type });
        }

        let filename = derive_filename(response.content_disposition(), &url);

        Ok(ProxiedDownload {
            body: response.body,
            content_type: NZB_MEDIA_TYPE,
            filename,
        })
    }
}

/// Content-type heuristic for login/error pages.
///
/// Anything mentioning `nzb` or `xml` is accepted, and so is anything that is
/// not obviously HTML or text: backends omit or mislabel the type on real
/// payloads often enough.
pub fn looks_like_error_page(content_type: &str) -> bool {
    let content_type = content_type.to_lowercase();
    if content_type.contains("nzb") || content_type.contains("xml") {
        return false;
    }
    content_type.contains("html") || content_type.contains("text")
}

fn debug_sample(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.chars().take(DEBUG_SAMPLE_CHARS).collect(),
        Err(_) => "<binary>".to_string(),
    }
}

fn text_prefix(body: &[u8], chars: usize) -> String {
    String::from_utf8_lossy(body).chars().take(chars).collect()
}

/// Leading text of a `text/*` response, `None` for any other content type
pub fn textual_sample(response: &FetchedResponse, chars: usize) -> Option<String> {
    match response.content_type() {
        Some(ct) if ct.starts_with("text/") => Some(text_prefix(&response.body, chars)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_heuristic() {
        assert!(looks_like_error_page("text/html; charset=utf-8"));
        assert!(looks_like_error_page("text/plain"));
        assert!(looks_like_error_page("application/xhtml"));

        assert!(!looks_like_error_page("application/x-nzb"));
        assert!(!looks_like_error_page("text/xml"));
        assert!(!looks_like_error_page("application/xml"));
        assert!(!looks_like_error_page("application/octet-stream"));
        assert!(!looks_like_error_page(""));
    }

    #[test]
    fn test_debug_sample_is_bounded() {
        let body = "x".repeat(2000);
        assert_eq!(debug_sample(body.as_bytes()).len(), DEBUG_SAMPLE_CHARS);
        assert_eq!(debug_sample(&[0xff, 0xfe, 0x00]), "<binary>");
    }

    #[test]
    fn test_textual_sample_only_for_text_types() {
        let response = |content_type: Option<&'static str>| {
            let mut headers = reqwest::header::HeaderMap::new();
            if let Some(ct) = content_type {
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    reqwest::header::HeaderValue::from_static(ct),
                );
            }
            FetchedResponse {
                status: 200,
                headers,
                body: Bytes::from_static(b"<?xml version=\"1.0\"?><nzb/>"),
            }
        };

        assert_eq!(
            textual_sample(&response(Some("text/xml")), 5).as_deref(),
            Some("<?xml")
        );
        assert_eq!(textual_sample(&response(Some("application/x-nzb")), 5), None);
        assert_eq!(textual_sample(&response(None), 5), None);
    }

    #[test]
    fn test_content_disposition_header() {
        let download = ProxiedDownload {
            body: Bytes::new(),
            content_type: NZB_MEDIA_TYPE,
            filename: "a.nzb".into(),
        };
        assert_eq!(download.content_disposition(), "attachment; filename=\"a.nzb\"");
    }
}
