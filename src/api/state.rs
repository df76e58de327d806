use std::sync::Arc;

use crate::backend::Backend;
use crate::config::Config;
use crate::gateway::SearchGateway;
use crate::proxy::DownloadProxy;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn Backend>,
    pub gateway: Arc<SearchGateway>,
    pub proxy: Arc<DownloadProxy>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        let gateway = SearchGateway::new(
            backend.clone(),
            config.server.api_key.clone(),
            config.feed_options(),
        );
        let proxy = DownloadProxy::new(backend.clone());

        Self {
            config: Arc::new(config),
            backend,
            gateway: Arc::new(gateway),
            proxy: Arc::new(proxy),
        }
    }
}
