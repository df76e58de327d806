use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{debug_nzb_plain, health, newznab_api, proxy_nzb},
    state::AppState,
};
use crate::backend::EasynewsClient;
use crate::config::Config;
use crate::feed::PROXY_PATH;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All routes, bound to `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(newznab_api))
        .route(PROXY_PATH, get(proxy_nzb))
        .route("/debug_nzb_plain", get(debug_nzb_plain))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let address = config.server.bind_addr;

    info!(
        search_url = %config.backend.search_url,
        public_url = config.server.public_url.as_deref().unwrap_or("<relative>"),
        "Initializing Easynews backend"
    );
    let backend = EasynewsClient::new(config.backend.clone())
        .map_err(|e| format!("Failed to build backend client: {}", e))?;

    let state = AppState::new(config, Arc::new(backend));
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "easyznab listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
