use axum::{
    Json,
    extract::{Query, RawQuery, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{info, warn};

use super::{
    error::{ApiError, NewznabError},
    models::{ApiParams, DebugParams, DebugResponse, HealthResponse, ProxyParams},
    state::AppState,
};
use crate::codec;
use crate::proxy::{DEBUG_SAMPLE_CHARS, textual_sample};

const BINARY_SAMPLE: &str = "<binary>";

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Liveness probe (GET /health)
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Newznab endpoint (GET /api)
///
/// Handles `t=caps`, `search`, `tvsearch`, `movie` and `audio`. Every answer,
/// errors included, is an XML document.
pub async fn newznab_api(
    State(state): State<AppState>,
    Query(params): Query<ApiParams>,
) -> Result<impl IntoResponse, NewznabError> {
    let request = params.into_search_request();
    let body = state.gateway.search(&request).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
        body,
    ))
}

/// NZB download proxy (GET /proxy_nzb?src=...&debug=...)
///
/// `src` is taken from the raw query string and decoded once by the codec.
pub async fn proxy_nzb(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    Query(params): Query<ProxyParams>,
) -> Result<impl IntoResponse, ApiError> {
    let src = raw_query
        .as_deref()
        .and_then(|query| codec::raw_query_param(query, "src"))
        .filter(|src| !src.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("missing src parameter".to_string()))?;

    let download = state
        .proxy
        .proxy_download(src, params.debug_enabled())
        .await?;

    info!(filename = %download.filename, length = download.body.len(), "Serving NZB");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, download.content_disposition()),
        ],
        download.body,
    ))
}

/// Authenticated raw fetch for troubleshooting (GET /debug_nzb_plain?url=...)
///
/// Reports what the backend answered instead of relaying it.
pub async fn debug_nzb_plain(
    State(state): State<AppState>,
    Query(params): Query<DebugParams>,
) -> Result<Json<DebugResponse>, ApiError> {
    if params.apikey != state.config.server.api_key {
        warn!("Rejected debug fetch with invalid API key");
        return Err(ApiError::Unauthorized);
    }

    let url = params
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("missing url parameter".to_string()))?;

    let response = state.backend.authenticated_fetch(&url).await?;
    let content_type = response.content_type().map(str::to_string);

    info!(
        url = %url,
        status = response.status,
        content_type = content_type.as_deref().unwrap_or(""),
        length = response.body.len(),
        "Debug fetch"
    );

    Ok(Json(DebugResponse {
        status: response.status,
        length: response.body.len(),
        body_sample: textual_sample(&response, DEBUG_SAMPLE_CHARS)
            .unwrap_or_else(|| BINARY_SAMPLE.to_string()),
        content_type,
    }))
}
