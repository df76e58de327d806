//! Request and response shapes for the HTTP surface.
//!
//! `/api` answers in XML and is shaped by the Newznab protocol, so only its
//! query parameters live here. The JSON bodies belong to `/health`,
//! `/debug_nzb_plain` and the error responses of every non-Newznab endpoint.

use serde::{Deserialize, Serialize};

use crate::gateway::SearchRequest;

/// Query string of `GET /api`
///
/// `extended`, `season` and `ep` are accepted so indexer managers can send
/// them, but they do not influence the search.
#[derive(Debug, Default, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub t: String,
    #[serde(default)]
    pub apikey: String,
    pub q: Option<String>,
    pub extended: Option<String>,
    pub imdbid: Option<String>,
    pub season: Option<String>,
    pub ep: Option<String>,
}

impl ApiParams {
    pub fn into_search_request(self) -> SearchRequest {
        SearchRequest {
            function: self.t,
            api_key: self.apikey,
            term: self.q,
            imdb_id: self.imdbid,
        }
    }
}

/// Query string of `GET /proxy_nzb`, minus `src`
///
/// `src` is read from the raw query so it is decoded exactly once.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyParams {
    pub debug: Option<String>,
}

impl ProxyParams {
    pub fn debug_enabled(&self) -> bool {
        matches!(
            self.debug.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("1" | "true" | "yes" | "on")
        )
    }
}

/// Query string of `GET /debug_nzb_plain`
#[derive(Debug, Default, Deserialize)]
pub struct DebugParams {
    pub url: Option<String>,
    #[serde(default)]
    pub apikey: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebugResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub length: usize,
    pub body_sample: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
