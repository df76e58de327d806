//! End-to-end tests: the real reqwest backend client against a mock Easynews.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use easyznab::api::{AppState, router};
use easyznab::backend::{Backend, BackendError, EasynewsClient};
use easyznab::codec;
use easyznab::config::{BackendConfig, Config};

/// `alice:s3cret`
const BASIC_AUTH: &str = "Basic YWxpY2U6czNjcmV0";

const SEARCH_RSS: &str = r#"<rss version="2.0"><channel>
<item>
  <title>0123456789abcdef "Big.Buck.Bunny.2008.1080p.mkv" yEnc (1/20)</title>
  <link>LINK</link>
</item>
</channel></rss>"#;

fn backend_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        search_url: format!("{}/1.0/global5/index.html", server.uri()),
        login_url: format!("{}/", server.uri()),
        search_timeout_secs: 1,
        download_timeout_secs: 1,
        username: Some("alice".into()),
        password: Some("s3cret".into()),
        ..BackendConfig::default()
    }
}

fn build_app(server: &MockServer) -> Router {
    let mut config = Config::default();
    config.server.api_key = "e2e-key".into();
    config.backend = backend_config(server);

    let backend = EasynewsClient::new(config.backend.clone()).unwrap();
    router(AppState::new(config, Arc::new(backend)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_search_sends_global_query_with_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/global5/index.html"))
        .and(query_param("sbj", "Big Buck Bunny"))
        .and(query_param("sS", "5"))
        .and(header_eq("authorization", BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RSS))
        .expect(1)
        .mount(&server)
        .await;

    let client = EasynewsClient::new(backend_config(&server)).unwrap();
    let body = client.search("Big Buck Bunny").await.unwrap();

    assert_eq!(body.as_ref(), SEARCH_RSS.as_bytes());
}

#[tokio::test]
async fn test_search_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/global5/index.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = EasynewsClient::new(backend_config(&server)).unwrap();
    let result = client.search("anything").await;

    assert!(matches!(result, Err(BackendError::Status { status: 503, .. })));
}

#[tokio::test]
async fn test_search_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SEARCH_RSS)
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = EasynewsClient::new(backend_config(&server)).unwrap();
    let result = client.search("slow").await;

    assert!(matches!(result, Err(BackendError::Timeout { .. })));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let config = BackendConfig {
        search_url: "http://127.0.0.1:1/search".into(),
        ..BackendConfig::default()
    };

    let client = EasynewsClient::new(config).unwrap();
    let result = client.search("anything").await;

    assert!(matches!(result, Err(BackendError::Transport { .. })));
}

#[tokio::test]
async fn test_session_replays_login_cookies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_eq("authorization", BASIC_AUTH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/")
                .set_body_string("<html>welcome</html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/movie.nzb"))
        .and(header_eq("cookie", "session=abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<nzb/>", "application/x-nzb"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EasynewsClient::new(backend_config(&server)).unwrap();
    let response = client
        .authenticated_fetch(&format!("{}/dl/movie.nzb", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("application/x-nzb"));
    assert_eq!(response.body.as_ref(), b"<nzb/>");
}

#[tokio::test]
async fn test_rejected_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = EasynewsClient::new(backend_config(&server)).unwrap();
    let result = client.open_session().await;

    assert!(matches!(
        result,
        Err(BackendError::CredentialsRejected { status: 401 })
    ));
}

#[tokio::test]
async fn test_search_then_download_through_proxy() {
    let server = MockServer::start().await;
    let nzb_url = format!("{}/dl/Big.Buck.Bunny.nzb?sig=x&exp=1", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/global5/index.html"))
        .and(query_param("sbj", "bunny"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SEARCH_RSS.replace("LINK", &nzb_url.replace('&', "&amp;"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/Big.Buck.Bunny.nzb"))
        .and(query_param("sig", "x"))
        .and(query_param("exp", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<nzb>bunny</nzb>", "application/x-nzb"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, body) = get(build_app(&server), "/api?t=movie&apikey=e2e-key&q=bunny").await;
    let feed = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(feed.contains("<title>Big Buck Bunny 2008 1080p mkv</title>"));

    let proxy_link = format!("/proxy_nzb?src={}", codec::encode(&nzb_url));
    assert!(feed.contains(&format!("<link>{proxy_link}</link>")));

    let (status, headers, body) = get(build_app(&server), &proxy_link).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/x-nzb");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Big.Buck.Bunny.nzb\""
    );
    assert_eq!(body, b"<nzb>bunny</nzb>");
}

#[tokio::test]
async fn test_slow_download_times_out_through_proxy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/slow.nzb"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<nzb/>", "application/x-nzb")
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let uri = format!(
        "/proxy_nzb?src={}",
        codec::encode(&format!("{}/dl/slow.nzb", server.uri()))
    );
    let (status, headers, body) = get(build_app(&server), &uri).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(headers.get(header::CONTENT_DISPOSITION).is_none());

    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
    assert!(body["message"].as_str().unwrap().contains("timed out"));
}
