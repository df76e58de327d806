//! Newznab RSS generation
//!
//! Produces RSS 2.0 with the `newznab:` attribute extension, written event by
//! event through quick-xml so escaping and nesting are handled by the writer.

use std::io::Cursor;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use super::{Category, FeedError, FeedOptions, NZB_MEDIA_TYPE};

/// One output item
#[derive(Debug, Clone)]
pub struct FeedItem<'a> {
    pub title: &'a str,
    pub proxy_url: &'a str,
    pub pub_date: Option<&'a str>,
    pub category: Category,
    pub length: &'a str,
}

/// Streaming writer for a Newznab feed document
pub struct NewznabFeed {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl NewznabFeed {
    /// Start a document and write the channel header
    pub fn new(options: &FeedOptions, description: &str) -> Result<Self, FeedError> {
        let mut feed = Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        };

        feed.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:newznab", options.namespace.as_str()));
        feed.emit(Event::Start(rss))?;
        feed.emit(Event::Start(BytesStart::new("channel")))?;

        feed.text_element("title", &options.title)?;
        feed.text_element("description", description)?;
        feed.text_element("link", &options.link)?;

        Ok(feed)
    }

    pub fn write_item(&mut self, item: &FeedItem<'_>) -> Result<(), FeedError> {
        self.emit(Event::Start(BytesStart::new("item")))?;

        self.text_element("title", item.title)?;
        self.text_element("guid", item.proxy_url)?;
        self.text_element("link", item.proxy_url)?;
        if let Some(pub_date) = item.pub_date {
            self.text_element("pubDate", pub_date)?;
        }
        self.text_element("category", item.category.name())?;

        let mut attr = BytesStart::new("newznab:attr");
        attr.push_attribute(("name", "category"));
        attr.push_attribute(("value", item.category.id()));
        self.emit(Event::Empty(attr))?;

        let mut enclosure = BytesStart::new("enclosure");
        enclosure.push_attribute(("url", item.proxy_url));
        enclosure.push_attribute(("length", item.length));
        enclosure.push_attribute(("type", NZB_MEDIA_TYPE));
        self.emit(Event::Empty(enclosure))?;

        self.emit(Event::End(BytesEnd::new("item")))?;
        Ok(())
    }

    /// Close the channel and return the document bytes
    pub fn finish(mut self) -> Result<Vec<u8>, FeedError> {
        self.emit(Event::End(BytesEnd::new("channel")))?;
        self.emit(Event::End(BytesEnd::new("rss")))?;
        Ok(self.writer.into_inner().into_inner())
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), FeedError> {
        self.writer
            .write_event(event)
            .map_err(|e| FeedError::Write(e.to_string()))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), FeedError> {
        self.emit(Event::Start(BytesStart::new(name)))?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.emit(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parse_backend_feed;

    #[test]
    fn test_escapes_text_and_stays_well_formed() {
        let options = FeedOptions {
            title: "T & <co>".into(),
            description: "d".into(),
            link: "https://example.com/?a=1&b=2".into(),
            namespace: "urn:test".into(),
            public_url: String::new(),
        };

        let mut feed = NewznabFeed::new(&options, "d").unwrap();
        feed.write_item(&FeedItem {
            title: "Tom & Jerry <1080p>",
            proxy_url: "/proxy_nzb?src=x",
            pub_date: None,
            category: Category::Tv,
            length: "0",
        })
        .unwrap();
        let out = feed.finish().unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("Tom &amp; Jerry &lt;1080p&gt;"));
        assert!(!text.contains("<pubDate>"));

        // Our own output must parse back with the same reader
        let items = parse_backend_feed(&out).unwrap().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].raw_title.as_deref(), Some("Tom & Jerry <1080p>"));
    }
}
