//! Backend RSS parsing
//!
//! Only direct `rss/channel/item` children are read, and within an item only
//! its direct `title`, `link`, `pubDate` and `enclosure` children. Anything
//! else in the document is skipped.

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use super::FeedError;

/// One item as served by the backend search feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendItem {
    pub raw_title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub enclosure_url: Option<String>,
    pub enclosure_length: Option<String>,
}

impl BackendItem {
    /// Download location: the enclosure when present, else the item link
    pub fn download_url(&self) -> &str {
        self.enclosure_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or(self.link.as_deref())
            .unwrap_or("")
    }

    pub fn length(&self) -> &str {
        self.enclosure_length
            .as_deref()
            .filter(|len| !len.is_empty())
            .unwrap_or("0")
    }
}

/// Element depths inside the document
const CHANNEL_DEPTH: usize = 2;
const ITEM_DEPTH: usize = 3;
const FIELD_DEPTH: usize = 4;

/// Parse a backend RSS document.
///
/// Returns `Ok(None)` when the root has no `channel` child (the backend had
/// nothing to say in a shape we know), `Ok(Some(items))` otherwise.
pub fn parse_backend_feed(xml: &[u8]) -> Result<Option<Vec<BackendItem>>, FeedError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut saw_channel = false;
    let mut items = Vec::new();
    let mut current: Option<BackendItem> = None;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| FeedError::Malformed(format!(
                "at byte {}: {}",
                reader.buffer_position(),
                e
            )))?;

        match event {
            Event::Start(ref e) => {
                let name = local_name(e);
                if stack.is_empty() {
                    if saw_root {
                        return Err(FeedError::Malformed("multiple root elements".into()));
                    }
                    saw_root = true;
                }
                stack.push(name);
                on_open(&stack, e, reader.decoder(), &mut saw_channel, &mut current)?;
                text.clear();
            }
            Event::Empty(ref e) => {
                let name = local_name(e);
                if stack.is_empty() {
                    if saw_root {
                        return Err(FeedError::Malformed("multiple root elements".into()));
                    }
                    saw_root = true;
                }
                stack.push(name);
                on_open(&stack, e, reader.decoder(), &mut saw_channel, &mut current)?;
                if stack.len() == ITEM_DEPTH && is_item(&stack) {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                stack.pop();
            }
            Event::Text(ref e) => {
                if stack.is_empty() && !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(outside_root(saw_root));
                }
                if stack.len() == FIELD_DEPTH && current.is_some() {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| FeedError::Malformed(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(ref e) => {
                if stack.is_empty() {
                    return Err(outside_root(saw_root));
                }
                if stack.len() == FIELD_DEPTH && current.is_some() {
                    let decoded = e
                        .decode()
                        .map_err(|e| FeedError::Malformed(e.to_string()))?;
                    text.push_str(&decoded);
                }
            }
            Event::End(_) => {
                if stack.len() == FIELD_DEPTH {
                    if let (Some(item), Some(field)) = (current.as_mut(), stack.last()) {
                        set_field(item, field, std::mem::take(&mut text));
                    }
                } else if stack.len() == ITEM_DEPTH && is_item(&stack) {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(FeedError::Malformed("document has no root element".into()));
    }
    if !stack.is_empty() {
        return Err(FeedError::Malformed(format!(
            "unexpected end of document inside <{}>",
            stack.join("/")
        )));
    }

    Ok(saw_channel.then_some(items))
}

fn outside_root(saw_root: bool) -> FeedError {
    let position = if saw_root { "after" } else { "before" };
    FeedError::Malformed(format!("content {position} the root element"))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_item(stack: &[String]) -> bool {
    stack.get(CHANNEL_DEPTH - 1).is_some_and(|n| n == "channel")
        && stack.get(ITEM_DEPTH - 1).is_some_and(|n| n == "item")
}

fn on_open(
    stack: &[String],
    e: &BytesStart<'_>,
    decoder: Decoder,
    saw_channel: &mut bool,
    current: &mut Option<BackendItem>,
) -> Result<(), FeedError> {
    match stack.len() {
        CHANNEL_DEPTH if stack[1] == "channel" => *saw_channel = true,
        ITEM_DEPTH if is_item(stack) => *current = Some(BackendItem::default()),
        FIELD_DEPTH if stack[3] == "enclosure" => {
            if let Some(item) = current.as_mut() {
                read_enclosure(item, e, decoder)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn read_enclosure(item: &mut BackendItem, e: &BytesStart<'_>, decoder: Decoder) -> Result<(), FeedError> {
    // Only the first enclosure of an item counts
    if item.enclosure_url.is_some() || item.enclosure_length.is_some() {
        return Ok(());
    }

    for attr in e.attributes() {
        let attr = attr.map_err(|e| FeedError::Malformed(e.to_string()))?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| FeedError::Malformed(e.to_string()))?
            .into_owned();

        match attr.key.local_name().as_ref() {
            b"url" => item.enclosure_url = Some(value),
            b"length" => item.enclosure_length = Some(value),
            _ => {}
        }
    }
    Ok(())
}

fn set_field(item: &mut BackendItem, field: &str, value: String) {
    let slot = match field {
        "title" => &mut item.raw_title,
        "link" => &mut item.link,
        "pubDate" => &mut item.pub_date,
        _ => return,
    };
    if slot.is_none() {
        *slot = Some(value);
    }
}
