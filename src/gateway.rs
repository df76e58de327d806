//! Newznab search gateway
//!
//! Maps `/api` requests onto backend searches and feed translation. The API
//! key is checked before anything else, `caps` included.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::backend::{Backend, BackendError};
use crate::feed::{self, CAPS_XML, Category, FeedError, FeedOptions};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid API key")]
    Unauthorized,

    #[error("unsupported t={0}")]
    UnsupportedOperation(String),

    #[error("backend search failed: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Search flavour requested through `t`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    General,
    Tv,
    Movie,
    Audio,
}

impl Mode {
    pub fn category(&self) -> Category {
        match self {
            Mode::Tv => Category::Tv,
            Mode::Audio => Category::Audio,
            Mode::General | Mode::Movie => Category::Movies,
        }
    }
}

/// The Newznab function named by `t`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Caps,
    Search(Mode),
}

impl FromStr for Function {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "caps" => Ok(Function::Caps),
            "search" => Ok(Function::Search(Mode::General)),
            "tvsearch" => Ok(Function::Search(Mode::Tv)),
            "movie" => Ok(Function::Search(Mode::Movie)),
            "audio" => Ok(Function::Search(Mode::Audio)),
            other => Err(GatewayError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// One `/api` call
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub function: String,
    pub api_key: String,
    pub term: Option<String>,
    pub imdb_id: Option<String>,
}

impl SearchRequest {
    /// Backend search term: `q`, else the IMDb id, else nothing
    pub fn search_term(&self) -> Option<&str> {
        non_empty(self.term.as_deref()).or_else(|| non_empty(self.imdb_id.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub struct SearchGateway {
    backend: Arc<dyn Backend>,
    api_key: String,
    feed: FeedOptions,
}

impl SearchGateway {
    pub fn new(backend: Arc<dyn Backend>, api_key: String, feed: FeedOptions) -> Self {
        Self {
            backend,
            api_key,
            feed,
        }
    }

    /// Answer a Newznab request with an XML document
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<u8>, GatewayError> {
        if request.api_key != self.api_key {
            return Err(GatewayError::Unauthorized);
        }

        let mode = match request.function.parse::<Function>()? {
            Function::Caps => return Ok(CAPS_XML.as_bytes().to_vec()),
            Function::Search(mode) => mode,
        };

        let Some(term) = request.search_term() else {
            debug!(t = %request.function, "No search terms, answering indexer probe");
            return Ok(feed::probe_feed(&self.feed)?);
        };

        let category = mode.category();
        info!(t = %request.function, term, category = category.id(), "Newznab search");

        let backend_xml = self.backend.search(term).await.map_err(|e| {
            error!(error = %e, status = ?e.upstream_status(), "Backend search failed");
            e
        })?;

        feed::translate(&backend_xml, category, &self.feed).map_err(|e| {
            error!(error = %e, length = backend_xml.len(), "Failed to translate backend feed");
            GatewayError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_parsing() {
        assert_eq!("caps".parse::<Function>().unwrap(), Function::Caps);
        assert_eq!(
            "tvsearch".parse::<Function>().unwrap(),
            Function::Search(Mode::Tv)
        );
        assert_eq!(
            "audio".parse::<Function>().unwrap(),
            Function::Search(Mode::Audio)
        );
        assert!(matches!(
            "book".parse::<Function>(),
            Err(GatewayError::UnsupportedOperation(t)) if t == "book"
        ));
    }

    #[test]
    fn test_mode_categories() {
        assert_eq!(Mode::General.category(), Category::Movies);
        assert_eq!(Mode::Movie.category(), Category::Movies);
        assert_eq!(Mode::Tv.category(), Category::Tv);
        assert_eq!(Mode::Audio.category(), Category::Audio);
    }

    #[test]
    fn test_imdb_id_fallback() {
        let request = SearchRequest {
            term: Some(String::new()),
            imdb_id: Some("tt0111161".into()),
            ..Default::default()
        };
        assert_eq!(request.search_term(), Some("tt0111161"));

        let request = SearchRequest {
            term: Some("Show".into()),
            imdb_id: Some("tt0111161".into()),
            ..Default::default()
        };
        assert_eq!(request.search_term(), Some("Show"));

        assert_eq!(SearchRequest::default().search_term(), None);
    }
}
