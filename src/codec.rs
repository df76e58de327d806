//! Download URL codec
//!
//! Backend NZB URLs are embedded in caller-facing `/proxy_nzb?src=` links as a
//! single pass of percent-encoding. The token is not a secret, it only keeps
//! the raw URL (with its own `?` and `&`) out of our query string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("source token is empty")]
    Empty,
    #[error("source token is not valid percent-encoded UTF-8: {0}")]
    InvalidEncoding(String),
}

/// Encode a backend URL into a query-safe token
pub fn encode(url: &str) -> String {
    urlencoding::encode(url).into_owned()
}

/// Decode a token produced by [`encode`] back into the backend URL
pub fn decode(token: &str) -> Result<String, CodecError> {
    if token.is_empty() {
        return Err(CodecError::Empty);
    }

    urlencoding::decode(token)
        .map(|url| url.into_owned())
        .map_err(|e| CodecError::InvalidEncoding(e.to_string()))
}

/// Pull the still-encoded value of `name` out of a raw query string.
///
/// Axum's `Query` extractor would decode the token once already, so the proxy
/// reads the raw form and runs it through [`decode`] itself.
pub fn raw_query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}
