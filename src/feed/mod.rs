//! Backend RSS to Newznab RSS translation

mod parse;
pub mod title;
mod write;

use thiserror::Error;

pub use parse::{BackendItem, parse_backend_feed};
pub use write::{FeedItem, NewznabFeed};

/// Static capabilities document served for `t=caps`
pub const CAPS_XML: &str = include_str!("caps.xml");

/// Path of the download proxy endpoint, as embedded in feed links
pub const PROXY_PATH: &str = "/proxy_nzb";

/// Media type advertised for proxied downloads
pub const NZB_MEDIA_TYPE: &str = "application/x-nzb";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("backend feed is not well-formed XML: {0}")]
    Malformed(String),
    #[error("failed to write feed: {0}")]
    Write(String),
}

/// Newznab categories this proxy tags results with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Movies,
    Tv,
    Audio,
}

impl Category {
    pub fn id(&self) -> &'static str {
        match self {
            Category::Movies => "2000",
            Category::Tv => "5000",
            Category::Audio => "7000",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Movies => "Movies",
            Category::Tv => "TV",
            Category::Audio => "Audio",
        }
    }
}

/// Channel metadata and link settings shared by every emitted feed
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub title: String,
    pub description: String,
    pub link: String,
    pub namespace: String,
    /// Absolute prefix for proxy links; empty for relative links
    pub public_url: String,
}

impl FeedOptions {
    /// Caller-facing link that downloads `backend_url` through the proxy
    pub fn proxy_url(&self, backend_url: &str) -> String {
        format!(
            "{}{}?src={}",
            self.public_url,
            PROXY_PATH,
            crate::codec::encode(backend_url)
        )
    }
}

/// Translate a backend search feed into a Newznab feed tagged with `category`
pub fn translate(
    backend_xml: &[u8],
    category: Category,
    options: &FeedOptions,
) -> Result<Vec<u8>, FeedError> {
    let mut feed = NewznabFeed::new(options, &options.description)?;

    let Some(items) = parse_backend_feed(backend_xml)? else {
        tracing::debug!("Backend feed has no channel, returning empty feed");
        return feed.finish();
    };

    tracing::debug!(items = items.len(), category = category.id(), "Translating backend feed");

    for item in &items {
        let proxy_url = options.proxy_url(item.download_url());
        let title = title::normalize(item.raw_title.as_deref().unwrap_or(""));

        feed.write_item(&FeedItem {
            title: &title,
            proxy_url: &proxy_url,
            pub_date: item.pub_date.as_deref(),
            category,
            length: item.length(),
        })?;
    }

    feed.finish()
}

/// Fixed single-item feed answered to indexer "test" probes
pub fn probe_feed(options: &FeedOptions) -> Result<Vec<u8>, FeedError> {
    const PROBE_TITLE: &str = "Dummy Easynews test item";
    const PROBE_URL: &str = "https://members.easynews.com/dummy.nzb";
    const PROBE_DATE: &str = "Tue, 25 Mar 2025 12:00:00 GMT";
    const PROBE_LENGTH: &str = "1048576";

    let mut feed = NewznabFeed::new(options, "Dummy search response for indexer tests")?;
    let proxy_url = options.proxy_url(PROBE_URL);

    feed.write_item(&FeedItem {
        title: PROBE_TITLE,
        proxy_url: &proxy_url,
        pub_date: Some(PROBE_DATE),
        category: Category::Movies,
        length: PROBE_LENGTH,
    })?;

    feed.finish()
}
