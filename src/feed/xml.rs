//! Minimal XML element tree used by the feed parser.
//!
//! RSS feeds in the wild mix plain elements, prefixed elements
//! (`itunes:duration`, `media:content`, `content:encoded`) and CDATA
//! blocks. Rather than a full DOM, the parser needs exactly two query
//! capabilities: "first child matching a local name, optionally with a
//! namespace prefix" and "attribute value by name". This module builds a
//! small owned tree on top of `quick-xml` providing those.
//!
//! Namespace matching is prefix-based rather than URI-resolved; real-world
//! feeds use the conventional prefixes, and a wrong prefix degrades to an
//! absent optional field rather than a parse failure.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::util::clean_text;

/// Maximum allowed element nesting depth. Feeds are shallow (rss >
/// channel > item > fields); anything deeper is hostile or broken input.
const MAX_DEPTH: usize = 64;

/// Errors from building the element tree. Callers collapse these into a
/// single "not well-formed" failure; the message only feeds debug logs.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("unexpected content after the root element")]
    TrailingContent,

    #[error("element nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// One XML element: qualified name as written, attributes in document
/// order, child elements, and the concatenated direct text/CDATA content.
#[derive(Debug, Clone, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// The name without any namespace prefix (`itunes:duration` → `duration`).
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// The namespace prefix, if the name carries one.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// First direct child with this local name and no prefix.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.prefix().is_none() && c.local_name() == local)
    }

    /// First direct child with this local name, prefixed or not.
    pub fn child_any(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// First direct child with this local name carrying some prefix.
    pub fn child_prefixed(&self, local: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.prefix().is_some() && c.local_name() == local)
    }

    /// First direct child with this exact prefix and local name.
    pub fn child_ns(&self, prefix: &str, local: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|c| c.prefix() == Some(prefix) && c.local_name() == local)
    }

    /// All descendants with this local name, in document order.
    pub fn descendants(&self, local: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(local, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.local_name() == local {
                found.push(child);
            }
            child.collect_descendants(local, found);
        }
    }

    /// First descendant with this local name (depth-first document order).
    pub fn descendant(&self, local: &str) -> Option<&Element> {
        for child in &self.children {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Direct text content, trimmed; absent when blank.
    pub fn text(&self) -> Option<&str> {
        clean_text(&self.text)
    }

    /// Attribute value by name, trimmed; absent when blank or missing.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| clean_text(value))
    }
}

/// Parses an XML document into its root element.
///
/// Any well-formedness problem (bad tag nesting, unrecognized entity,
/// missing or duplicated root, truncated input) is an error; there is no
/// partial tree.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::TrailingContent);
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::MaxDepthExceeded(MAX_DEPTH));
                }
                stack.push(element_from_start(&start, &reader)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::TrailingContent);
                }
                let element = element_from_start(&start, &reader)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                // quick-xml has already verified the end tag matches
                match stack.pop() {
                    Some(element) => attach(&mut stack, &mut root, element),
                    None => return Err(XmlError::Parse("unmatched end tag".to_string())),
                }
            }
            Ok(Event::Text(text)) => {
                let unescaped = text
                    .unescape()
                    .map_err(|e| XmlError::Parse(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            // Declaration, comments, processing instructions, DOCTYPE
            Ok(_) => {}
            Err(e) => return Err(XmlError::Parse(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Parse("unclosed element at end of input".to_string()));
    }
    root.ok_or(XmlError::NoRoot)
}

fn element_from_start(
    start: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr_result in start.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(element = %name, error = %e, "Skipping malformed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| XmlError::Parse(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let root = parse("<rss><channel><title>Hi</title></channel></rss>").unwrap();
        assert_eq!(root.local_name(), "rss");
        let channel = root.child("channel").unwrap();
        assert_eq!(channel.child("title").unwrap().text(), Some("Hi"));
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(matches!(parse(""), Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_parse_bare_text_fails() {
        assert!(matches!(parse("invalid xml"), Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_parse_unclosed_element_fails() {
        assert!(parse("<rss><channel>").is_err());
    }

    #[test]
    fn test_parse_mismatched_tags_fail() {
        assert!(parse("<rss><channel></rss></channel>").is_err());
    }

    #[test]
    fn test_parse_two_roots_fail() {
        assert!(matches!(
            parse("<rss/><rss/>"),
            Err(XmlError::TrailingContent)
        ));
    }

    #[test]
    fn test_self_closing_and_attributes() {
        let root = parse(r#"<item><enclosure url="http://x/e.mp3" length="1"/></item>"#).unwrap();
        let enclosure = root.child("enclosure").unwrap();
        assert_eq!(enclosure.attr("url"), Some("http://x/e.mp3"));
        assert_eq!(enclosure.attr("type"), None);
    }

    #[test]
    fn test_blank_attribute_is_absent() {
        let root = parse(r#"<item><enclosure url="   "/></item>"#).unwrap();
        assert_eq!(root.child("enclosure").unwrap().attr("url"), None);
    }

    #[test]
    fn test_prefixed_lookup() {
        let root = parse(
            "<item><itunes:duration>42:00</itunes:duration><duration>10</duration></item>",
        )
        .unwrap();
        assert_eq!(
            root.child_ns("itunes", "duration").unwrap().text(),
            Some("42:00")
        );
        // Unprefixed lookup must not match the itunes element
        assert_eq!(root.child("duration").unwrap().text(), Some("10"));
        assert_eq!(root.child_any("duration").unwrap().text(), Some("42:00"));
    }

    #[test]
    fn test_child_prefixed_skips_plain_elements() {
        let root = parse(
            r#"<channel><image><url>a.png</url></image><itunes:image href="b.png"/></channel>"#,
        )
        .unwrap();
        let prefixed = root.child_prefixed("image").unwrap();
        assert_eq!(prefixed.attr("href"), Some("b.png"));
    }

    #[test]
    fn test_cdata_text() {
        let root = parse("<item><description><![CDATA[Tales of <b>bold</b> text]]></description></item>")
            .unwrap();
        assert_eq!(
            root.child("description").unwrap().text(),
            Some("Tales of <b>bold</b> text")
        );
    }

    #[test]
    fn test_entity_unescaping() {
        let root = parse("<item><title>Q &amp; A</title></item>").unwrap();
        assert_eq!(root.child("title").unwrap().text(), Some("Q & A"));
    }

    #[test]
    fn test_descendants_document_order() {
        let root = parse(
            "<rss><channel><item><title>1</title></item><item><title>2</title></item></channel></rss>",
        )
        .unwrap();
        let items = root.descendants("item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].child("title").unwrap().text(), Some("1"));
        assert_eq!(items[1].child("title").unwrap().text(), Some("2"));
    }

    #[test]
    fn test_depth_limit() {
        let mut doc = String::new();
        for _ in 0..70 {
            doc.push_str("<a>");
        }
        for _ in 0..70 {
            doc.push_str("</a>");
        }
        assert!(matches!(parse(&doc), Err(XmlError::MaxDepthExceeded(_))));
    }

    #[test]
    fn test_blank_text_is_absent() {
        let root = parse("<item><title>   </title></item>").unwrap();
        assert_eq!(root.child("title").unwrap().text(), None);
    }
}
