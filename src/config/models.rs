use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

use crate::feed::FeedOptions;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Shared key indexer managers must send as `apikey`
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Absolute URL this proxy is reachable at, used to build download links.
    /// Links are relative (`/proxy_nzb?...`) when unset.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_key: default_api_key(),
            public_url: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

pub(crate) const DEFAULT_API_KEY: &str = "changeme";

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

/// Easynews backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Loaded from `EASYNEWS_USER`, never from the config file
    #[serde(skip)]
    pub username: Option<String>,
    /// Loaded from `EASYNEWS_PASS`, never from the config file
    #[serde(skip)]
    pub password: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            login_url: default_login_url(),
            search_timeout_secs: default_search_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            user_agent: default_user_agent(),
            username: None,
            password: None,
        }
    }
}

fn default_search_url() -> String {
    "https://members.easynews.com/1.0/global5/index.html".to_string()
}

fn default_login_url() -> String {
    "https://members.easynews.com/".to_string()
}

fn default_search_timeout_secs() -> u64 {
    20
}

fn default_download_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("easyznab/{}", env!("CARGO_PKG_VERSION"))
}

/// Channel metadata for emitted feeds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_title")]
    pub title: String,
    #[serde(default = "default_feed_description")]
    pub description: String,
    #[serde(default = "default_feed_link")]
    pub link: String,
    #[serde(default = "default_newznab_namespace")]
    pub newznab_namespace: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: default_feed_title(),
            description: default_feed_description(),
            link: default_feed_link(),
            newznab_namespace: default_newznab_namespace(),
        }
    }
}

fn default_feed_title() -> String {
    "Easynews via easyznab".to_string()
}

fn default_feed_description() -> String {
    "Easynews global search proxied as Newznab".to_string()
}

fn default_feed_link() -> String {
    "https://members.easynews.com".to_string()
}

fn default_newznab_namespace() -> String {
    "http://www.newznab.com/DTD/2010/feeds/attributes/".to_string()
}

impl Config {
    /// Feed settings derived from the `feed` and `server` sections
    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            title: self.feed.title.clone(),
            description: self.feed.description.clone(),
            link: self.feed.link.clone(),
            namespace: self.feed.newznab_namespace.clone(),
            public_url: self
                .server
                .public_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.server.api_key, "changeme");
        assert_eq!(config.backend.search_timeout_secs, 20);
        assert_eq!(config.backend.download_timeout_secs, 60);
        assert!(config.backend.username.is_none());
    }

    #[test]
    fn test_feed_options_trim_public_url() {
        let mut config = Config::default();
        config.server.public_url = Some("https://znab.example.com/".into());

        let options = config.feed_options();
        assert_eq!(options.public_url, "https://znab.example.com");
        assert_eq!(options.namespace, "http://www.newznab.com/DTD/2010/feeds/attributes/");
    }
}
