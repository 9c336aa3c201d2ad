//! RSS/Atom document parsing.
//!
//! The parser builds a small element tree with namespace-resolved tag names
//! in `{uri}local` form, then walks it the way the reader needs: derive a
//! namespace prefix from the root tag, collect every `item` then every
//! `entry` element under that prefix, and pull `title` and `link` out of
//! each one.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use thiserror::Error;

/// Errors raised while turning a fetched document into articles.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML
    #[error("Malformed XML: {0}")]
    Xml(String),
    /// The document has no root element
    #[error("Document has no root element")]
    Empty,
    /// An item or entry lacks a required child element
    #[error("<{parent}> element has no <{child}> child")]
    MissingChild { parent: String, child: String },
}

/// One article as extracted from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: String,
    /// Empty when the link element has neither an `href` nor text.
    pub link: String,
}

/// Result of parsing one feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    /// `{uri}` of the root element, or empty for un-namespaced documents.
    pub namespace: String,
    pub articles: Vec<ParsedArticle>,
}

/// Element tag names searched for, in this order.
const ARTICLE_TAGS: [&str; 2] = ["item", "entry"];

#[derive(Debug, Default)]
struct Element {
    tag: String,
    /// Un-namespaced attributes only; the reader never asks for others.
    attrs: Vec<(String, String)>,
    /// Text before the first child element.
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// First direct child with the given tag.
    fn find(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pre-order walk over this element and all descendants.
    fn iter(&self) -> impl Iterator<Item = &Element> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

// Deeply nested documents would otherwise overflow the stack on drop.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Parse a fetched RSS or Atom document.
///
/// Text is decoded with the encoding named in the XML declaration, or
/// UTF-8 when there is none.
///
/// # Errors
///
/// - [`ParseError::Xml`] if the bytes are not well-formed XML
/// - [`ParseError::Empty`] if there is no root element
/// - [`ParseError::MissingChild`] if an item or entry has no title or link
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, ParseError> {
    let root = parse_tree(bytes)?;

    let namespace = match root.tag.find('}') {
        Some(end) => root.tag[..=end].to_string(),
        None => String::new(),
    };

    let title_tag = format!("{}title", namespace);
    let link_tag = format!("{}link", namespace);

    let mut articles = Vec::new();
    for name in ARTICLE_TAGS {
        let tag = format!("{}{}", namespace, name);
        for element in root.iter().filter(|e| e.tag == tag) {
            articles.push(extract_article(element, &title_tag, &link_tag)?);
        }
    }

    Ok(ParsedFeed {
        namespace,
        articles,
    })
}

fn extract_article(
    element: &Element,
    title_tag: &str,
    link_tag: &str,
) -> Result<ParsedArticle, ParseError> {
    let missing = |child: &str| ParseError::MissingChild {
        parent: element.tag.clone(),
        child: child.to_string(),
    };

    let title = element.find(title_tag).ok_or_else(|| missing(title_tag))?;
    let link = element.find(link_tag).ok_or_else(|| missing(link_tag))?;

    let href = link.attr("href").filter(|h| !h.is_empty());
    let link = href.or(link.text.as_deref()).unwrap_or_default();

    Ok(ParsedArticle {
        title: title.text.as_deref().unwrap_or_default().trim().to_string(),
        link: link.trim().to_string(),
    })
}

fn decode(decoder: Decoder, bytes: &[u8]) -> Result<String, ParseError> {
    decoder
        .decode(bytes)
        .map(|s| s.into_owned())
        .map_err(|e| ParseError::Xml(e.to_string()))
}

/// Resolved tag name in `{uri}local` form.
fn qualified(
    decoder: Decoder,
    ns: ResolveResult<'_>,
    local: &[u8],
) -> Result<String, ParseError> {
    let local = decode(decoder, local)?;
    match ns {
        ResolveResult::Bound(uri) => Ok(format!("{{{}}}{}", decode(decoder, uri.as_ref())?, local)),
        ResolveResult::Unbound => Ok(local),
        ResolveResult::Unknown(prefix) => Err(ParseError::Xml(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    tag: String,
    start: &BytesStart<'_>,
) -> Result<Element, ParseError> {
    let decoder = reader.decoder();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        if !matches!(ns, ResolveResult::Unbound) {
            continue;
        }
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| ParseError::Xml(e.to_string()))?;
        attrs.push((decode(decoder, local.as_ref())?, value.into_owned()));
    }
    Ok(Element {
        tag,
        attrs,
        text: None,
        children: Vec::new(),
    })
}

/// Attach a finished element to its parent, or make it the root.
fn close_element(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Append character data to the innermost open element if it has no children yet.
fn push_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        if current.children.is_empty() {
            current.text.get_or_insert_with(String::new).push_str(text);
        }
    }
}

fn parse_tree(bytes: &[u8]) -> Result<Element, ParseError> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        // A declaration is the only event that changes the decoder
        let decoder = reader.decoder();
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| ParseError::Xml(e.to_string()))?;

        match event {
            Event::Start(e) => {
                let tag = qualified(decoder, ns, e.local_name().as_ref())?;
                let element = open_element(&reader, tag, &e)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let tag = qualified(decoder, ns, e.local_name().as_ref())?;
                let element = open_element(&reader, tag, &e)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    close_element(&mut stack, &mut root, element);
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                push_text(&mut stack, &text);
            }
            Event::CData(e) => {
                let text = e.decode().map_err(|e| ParseError::Xml(e.to_string()))?;
                push_text(&mut stack, &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Xml(format!(
            "unexpected end of document inside <{}>",
            open.tag
        )));
    }

    root.ok_or(ParseError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATOM_NS: &str = "{http://www.w3.org/2005/Atom}";

    fn titles(feed: &ParsedFeed) -> Vec<&str> {
        feed.articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn test_rss_items_in_document_order() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Channel</title>
    <item><title>A</title><link>http://a</link></item>
    <item><title>B</title><link>http://b</link></item>
    <item><title>C</title><link>http://c</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.namespace, "");
        assert_eq!(titles(&feed), vec!["A", "B", "C"]);
        assert_eq!(feed.articles[1].link, "http://b");
    }

    #[test]
    fn test_atom_entries_use_root_namespace() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Example</title>
    <entry><title>First</title><link href="http://example.com/1"/></entry>
    <entry><title>Second</title><link href="http://example.com/2"/></entry>
</feed>"#;

        let feed = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(feed.namespace, ATOM_NS);
        assert_eq!(titles(&feed), vec!["First", "Second"]);
        assert_eq!(feed.articles[0].link, "http://example.com/1");
    }

    #[test]
    fn test_entries_outside_namespace_dropped() {
        let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:o="urn:other">
    <entry><title>Kept</title><link href="http://k"/></entry>
    <o:entry><o:title>Foreign</o:title><o:link href="http://f"/></o:entry>
    <entry xmlns=""><title>Bare</title><link>http://b</link></entry>
</feed>"#;

        let feed = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(titles(&feed), vec!["Kept"]);
    }

    #[test]
    fn test_prefixed_root_namespace() {
        let atom = r#"<a:feed xmlns:a="http://www.w3.org/2005/Atom">
    <a:entry><a:title>T</a:title><a:link href="http://t"/></a:entry>
</a:feed>"#;

        let feed = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(feed.namespace, ATOM_NS);
        assert_eq!(titles(&feed), vec!["T"]);
    }

    #[test]
    fn test_href_takes_precedence_over_text() {
        let rss = r#"<rss><channel>
    <item><title>T</title><link href="http://x">ignored</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.articles[0].link, "http://x");
    }

    #[test]
    fn test_link_text_used_without_href() {
        let rss = r#"<rss><channel>
    <item><title>T</title><link>http://y</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.articles[0].link, "http://y");
    }

    #[test]
    fn test_empty_href_falls_back_to_text() {
        let rss = r#"<rss><channel>
    <item><title>T</title><link href="">http://z</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.articles[0].link, "http://z");
    }

    #[test]
    fn test_link_without_href_or_text_is_empty() {
        let rss = r#"<rss><channel><item><title>T</title><link/></item></channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.articles[0].link, "");
    }

    #[test]
    fn test_items_before_entries() {
        let mixed = r#"<root>
    <entry><title>E1</title><link>http://e1</link></entry>
    <item><title>I1</title><link>http://i1</link></item>
    <entry><title>E2</title><link>http://e2</link></entry>
    <item><title>I2</title><link>http://i2</link></item>
</root>"#;

        let feed = parse_feed(mixed.as_bytes()).unwrap();
        assert_eq!(titles(&feed), vec!["I1", "I2", "E1", "E2"]);
    }

    #[test]
    fn test_nested_items_found_at_any_depth() {
        let rdf = r#"<rdf><channel/><wrapper><item><title>Deep</title><link>http://d</link></item></wrapper></rdf>"#;

        let feed = parse_feed(rdf.as_bytes()).unwrap();
        assert_eq!(titles(&feed), vec!["Deep"]);
    }

    #[test]
    fn test_entities_and_cdata_decoded() {
        let rss = r#"<rss><channel>
    <item><title>Fish &amp; Chips</title><link>http://f?a=1&amp;b=2</link></item>
    <item><title><![CDATA[<b>Bold</b> move]]></title><link>http://c</link></item>
</channel></rss>"#;

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(titles(&feed), vec!["Fish & Chips", "<b>Bold</b> move"]);
        assert_eq!(feed.articles[0].link, "http://f?a=1&b=2");
    }

    #[test]
    fn test_title_whitespace_trimmed() {
        let rss = "<rss><channel><item><title>\n    Spaced\n  </title><link> http://s </link></item></channel></rss>";

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(feed.articles[0].title, "Spaced");
        assert_eq!(feed.articles[0].link, "http://s");
    }

    #[test]
    fn test_declared_latin1_encoding_decoded() {
        let mut rss = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<rss><channel>".to_vec();
        rss.extend_from_slice(b"<item><title>Caf\xE9</title><link href=\"http://x/\xE9t\xE9\"/></item>");
        rss.extend_from_slice(b"<item><title><![CDATA[Na\xEFve]]></title><link>http://n</link></item>");
        rss.extend_from_slice(b"</channel></rss>");

        let feed = parse_feed(&rss).unwrap();
        assert_eq!(titles(&feed), vec!["Caf\u{e9}", "Na\u{ef}ve"]);
        assert_eq!(feed.articles[0].link, "http://x/\u{e9}t\u{e9}");
    }

    #[test]
    fn test_undeclared_encoding_is_utf8() {
        let rss = "<rss><channel><item><title>Caf\u{e9}</title><link>http://c</link></item></channel></rss>";

        let feed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(titles(&feed), vec!["Caf\u{e9}"]);
    }

    #[test]
    fn test_deeply_nested_document_is_dropped_without_overflow() {
        const DEPTH: usize = 200_000;
        let mut doc = String::from("<rss>");
        doc.push_str(&"<a>".repeat(DEPTH));
        doc.push_str("<item><title>Buried</title><link>http://b</link></item>");
        doc.push_str(&"</a>".repeat(DEPTH));
        doc.push_str("</rss>");

        let feed = parse_feed(doc.as_bytes()).unwrap();
        assert_eq!(titles(&feed), vec!["Buried"]);
    }

    #[test]
    fn test_missing_title_is_error() {
        let rss = r#"<rss><channel><item><link>http://a</link></item></channel></rss>"#;

        let err = parse_feed(rss.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingChild { ref child, .. } if child == "title"));
    }

    #[test]
    fn test_missing_link_is_error() {
        let rss = r#"<rss><channel><item><title>A</title></item></channel></rss>"#;

        let err = parse_feed(rss.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingChild { ref child, .. } if child == "link"));
    }

    #[test]
    fn test_empty_channel_has_no_articles() {
        let feed = parse_feed(b"<rss version=\"2.0\"><channel></channel></rss>").unwrap();
        assert!(feed.articles.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let err = parse_feed(b"<rss><channel></rss>").unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn test_truncated_document_is_error() {
        let err = parse_feed(b"<rss><channel><item>").unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn test_no_root_is_error() {
        let err = parse_feed(b"<?xml version=\"1.0\"?>\n").unwrap_err();
        assert!(matches!(err, ParseError::Empty));
    }
}
