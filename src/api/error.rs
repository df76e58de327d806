use std::io::Cursor;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesStart, Event},
};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::backend::BackendError;
use crate::feed::FeedError;
use crate::gateway::GatewayError;
use crate::proxy::ProxyError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API key")]
    Unauthorized,
    #[error("unsupported operation: t={0}")]
    UnsupportedOperation(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("backend authentication failed: {0}")]
    UpstreamAuthFailure(String),
    #[error("backend unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("backend returned HTTP {0}")]
    UpstreamError(u16),
    #[error("backend did not return NZB data (HTML/text error page?): {0}")]
    UnexpectedContentType(String),
    #[error("backend feed could not be parsed: {0}")]
    MalformedUpstreamFeed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UnsupportedOperation(_) | ApiError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UpstreamAuthFailure(_)
            | ApiError::UpstreamUnavailable(_)
            | ApiError::UpstreamError(_)
            | ApiError::UnexpectedContentType(_)
            | ApiError::MalformedUpstreamFeed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::UpstreamAuthFailure(_) => "UPSTREAM_AUTH_FAILURE",
            ApiError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            ApiError::UpstreamError(_) => "UPSTREAM_ERROR",
            ApiError::UnexpectedContentType(_) => "UNEXPECTED_CONTENT_TYPE",
            ApiError::MalformedUpstreamFeed(_) => "MALFORMED_UPSTREAM_FEED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Newznab error code, as understood by indexer managers
    pub fn newznab_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized => 100,
            ApiError::InvalidRequest(_) => 200,
            ApiError::UnsupportedOperation(_) => 202,
            ApiError::Internal(_) => 900,
            _ => 300,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::Unauthorized => ApiError::Unauthorized,
            GatewayError::UnsupportedOperation(t) => ApiError::UnsupportedOperation(t),
            GatewayError::Backend(e) => e.into(),
            GatewayError::Feed(FeedError::Malformed(e)) => ApiError::MalformedUpstreamFeed(e),
            GatewayError::Feed(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(value: ProxyError) -> Self {
        match value {
            ProxyError::InvalidRequest(e) => ApiError::InvalidRequest(e.to_string()),
            ProxyError::AuthFailure(e) => ApiError::UpstreamAuthFailure(e.to_string()),
            ProxyError::Unavailable(e) => ApiError::UpstreamUnavailable(e.to_string()),
            ProxyError::UpstreamStatus { status } => ApiError::UpstreamError(status),
            ProxyError::UnexpectedContentType { content_type } => {
                ApiError::UnexpectedContentType(content_type)
            }
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(value: BackendError) -> Self {
        if value.is_auth() {
            ApiError::UpstreamAuthFailure(value.to_string())
        } else {
            ApiError::UpstreamUnavailable(value.to_string())
        }
    }
}

/// [`ApiError`] rendered as a Newznab `<error/>` document, for `/api`
#[derive(Debug)]
pub struct NewznabError(pub ApiError);

impl From<GatewayError> for NewznabError {
    fn from(value: GatewayError) -> Self {
        NewznabError(value.into())
    }
}

impl NewznabError {
    fn to_xml(&self) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .ok();

        let mut error = BytesStart::new("error");
        error.push_attribute(("code", self.0.newznab_code().to_string().as_str()));
        error.push_attribute(("description", self.0.to_string().as_str()));
        writer.write_event(Event::Empty(error)).ok();

        String::from_utf8(writer.into_inner().into_inner()).unwrap_or_default()
    }
}

impl IntoResponse for NewznabError {
    fn into_response(self) -> Response {
        (
            self.0.status_code(),
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            self.to_xml(),
        )
            .into_response()
    }
}
