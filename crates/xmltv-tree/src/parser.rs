//! XML parser that builds [`Node`] trees.

use crate::error::ParseError;
use crate::node::{Attribute, Node};
use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};

/// A parsed document: everything before the root element, and the root itself.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Every line before the line holding the root start tag, verbatim.
    pub preamble: String,

    /// The root element.
    pub root: Node,
}

/// Parse XML from a string.
///
/// # Example
///
/// ```rust
/// use xmltv_tree::parse;
///
/// let doc = parse("<?xml version=\"1.0\"?>\n<tv><channel id=\"a\"/></tv>").unwrap();
/// assert_eq!(doc.preamble, "<?xml version=\"1.0\"?>\n");
/// assert_eq!(doc.root.name, "tv");
/// assert_eq!(doc.root.children[0].get_attribute("id"), Some("a"));
/// ```
///
/// # Errors
///
/// Returns a [`ParseError`] if the XML is malformed.
pub fn parse(content: &str) -> Result<ParsedDocument, ParseError> {
    XmlParser::new(content).parse()
}

/// Parse XML from raw bytes, which must be UTF-8.
pub fn parse_bytes(content: &[u8]) -> Result<ParsedDocument, ParseError> {
    match std::str::from_utf8(content) {
        Ok(text) => parse(text),
        Err(err) => Err(ParseError::Encoding {
            message: err.to_string(),
            position: err.valid_up_to() as u64,
            fragment: line_at(content, err.valid_up_to()),
        }),
    }
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The source content being parsed.
    source: &'a str,

    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    /// Stack of elements being built.
    stack: Vec<BuildNode>,

    /// Byte offset of the root element's `<`.
    root_start: Option<usize>,
}

/// A node being constructed during parsing.
struct BuildNode {
    node: Node,

    /// Raw text seen before the first child.
    text: String,

    /// Raw text seen after the most recent child, not yet assigned to it.
    pending_tail: String,

    /// Whether any text or child appeared between the start and end tags.
    has_content: bool,
}

impl BuildNode {
    fn new(node: Node) -> Self {
        Self {
            node,
            text: String::new(),
            pending_tail: String::new(),
            has_content: false,
        }
    }

    fn flush_tail(&mut self) {
        let tail = std::mem::take(&mut self.pending_tail);
        if let Some(last) = self.node.children.last_mut() {
            last.tail = stripped(&tail);
        }
    }

    fn push_child(&mut self, child: Node) {
        self.flush_tail();
        self.has_content = true;
        self.node.children.push(child);
    }

    fn push_text(&mut self, text: &str) {
        self.has_content = true;
        if self.node.children.is_empty() {
            self.text.push_str(text);
        } else {
            self.pending_tail.push_str(text);
        }
    }

    fn finish(mut self) -> Node {
        self.flush_tail();
        self.node.text = if self.has_content {
            Some(self.text.trim().to_string())
        } else {
            None
        };
        self.node
    }
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            source,
            reader,
            stack: Vec::new(),
            root_start: None,
        }
    }

    fn parse(&mut self) -> Result<ParsedDocument, ParseError> {
        let mut root: Option<Node> = None;

        loop {
            let event_start = self.reader.buffer_position() as usize;

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let node = self.start_node(&e, event_start)?;
                    self.stack.push(BuildNode::new(node));
                }
                Ok(Event::End(_)) => {
                    let build = self.stack.pop().ok_or_else(|| self.syntax_error(
                        "Unexpected closing tag".to_string(),
                        event_start,
                    ))?;
                    self.add_element(build.finish(), &mut root, event_start)?;
                }
                Ok(Event::Empty(e)) => {
                    let node = self.start_node(&e, event_start)?;
                    self.add_element(node, &mut root, event_start)?;
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(e, event_start)?;
                }
                Ok(Event::CData(e)) => {
                    self.handle_cdata(e);
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    let position = self.reader.error_position();
                    return Err(self.syntax_error(e.to_string(), position as usize));
                }
            }
        }

        if let Some(build) = self.stack.last() {
            return Err(ParseError::UnexpectedEof {
                expected: format!("closing tag </{}>", build.node.name),
                fragment: self.fragment(self.source.len()),
            });
        }

        let root = root.ok_or(ParseError::EmptyDocument)?;
        let preamble_end = self.root_start.map_or(0, |start| line_start(self.source, start));

        Ok(ParsedDocument {
            preamble: self.source[..preamble_end].to_string(),
            root,
        })
    }

    /// Build the element for a start or empty tag.
    fn start_node(&mut self, e: &BytesStart<'_>, event_start: usize) -> Result<Node, ParseError> {
        if self.stack.is_empty() && self.root_start.is_none() {
            self.root_start = Some(event_start);
        }

        let mut node = Node::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| {
                self.syntax_error(format!("Attribute error: {}", err), event_start)
            })?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|err| {
                self.syntax_error(format!("Invalid attribute value: {}", err), event_start)
            })?;
            node.attributes.push(Attribute {
                name,
                value: value.into_owned(),
            });
        }
        Ok(node)
    }

    /// Attach a finished element to its parent, or make it the root.
    fn add_element(
        &mut self,
        node: Node,
        root: &mut Option<Node>,
        event_start: usize,
    ) -> Result<(), ParseError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_child(node);
            return Ok(());
        }
        if root.is_some() {
            return Err(ParseError::MultipleRoots {
                fragment: self.fragment(event_start),
            });
        }
        *root = Some(node);
        Ok(())
    }

    fn handle_text(&mut self, e: BytesText<'_>, event_start: usize) -> Result<(), ParseError> {
        let text = e.unescape().map_err(|err| {
            self.syntax_error(format!("Invalid text content: {}", err), event_start)
        })?;

        // Text outside the root element is ignored
        if let Some(build) = self.stack.last_mut() {
            build.push_text(&text);
        }
        Ok(())
    }

    fn handle_cdata(&mut self, e: BytesCData<'_>) {
        let text = String::from_utf8_lossy(e.as_ref()).into_owned();
        if let Some(build) = self.stack.last_mut() {
            build.push_text(&text);
        }
    }

    fn syntax_error(&self, message: String, position: usize) -> ParseError {
        ParseError::XmlSyntax {
            message,
            position: Some(position as u64),
            fragment: self.fragment(position),
        }
    }

    fn fragment(&self, position: usize) -> String {
        line_at(self.source.as_bytes(), position)
    }
}

fn stripped(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Byte offset of the start of the line containing `position`.
fn line_start(source: &str, position: usize) -> usize {
    let position = position.min(source.len());
    source.as_bytes()[..position]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1)
}

/// The line containing `position`, trimmed.
fn line_at(source: &[u8], position: usize) -> String {
    let position = position.min(source.len());
    let start = source[..position]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let end = source[position..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(source.len(), |i| position + i);
    String::from_utf8_lossy(&source[start..end]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_element() {
        let doc = parse("<tv/>").unwrap();
        assert_eq!(doc.root.name, "tv");
        assert!(doc.root.is_self_closing());
        assert_eq!(doc.preamble, "");
    }

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse("<tv><channel id=\"a\"/></tv>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some(""));
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.root.children[0].name, "channel");
        assert!(doc.root.children[0].is_self_closing());
    }

    #[test]
    fn test_text_and_tail_are_stripped() {
        let doc = parse("<desc>\n  Some text\n  <b>bold</b>  after\n</desc>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("Some text"));
        assert_eq!(doc.root.children[0].text.as_deref(), Some("bold"));
        assert_eq!(doc.root.children[0].tail.as_deref(), Some("after"));
    }

    #[test]
    fn test_whitespace_tail_is_none() {
        let doc = parse("<tv>\n  <channel id=\"a\"/>\n</tv>").unwrap();
        assert_eq!(doc.root.children[0].tail, None);
    }

    #[test]
    fn test_empty_pair_is_self_closing_but_blank_content_is_not() {
        let doc = parse("<tv><a></a><b> </b></tv>").unwrap();
        assert_eq!(doc.root.children[0].text, None);
        assert_eq!(doc.root.children[1].text.as_deref(), Some(""));
    }

    #[test]
    fn test_attributes_keep_document_order_and_unescape() {
        let doc = parse(r#"<programme stop="2" start="1" channel="a&amp;b"/>"#).unwrap();
        let names: Vec<&str> = doc.root.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["stop", "start", "channel"]);
        assert_eq!(doc.root.get_attribute("channel"), Some("a&b"));
    }

    #[test]
    fn test_entities_and_cdata_in_text() {
        let doc = parse("<t><a>Tom &amp; Jerry</a><b><![CDATA[1 < 2]]></b></t>").unwrap();
        assert_eq!(doc.root.children[0].text.as_deref(), Some("Tom & Jerry"));
        assert_eq!(doc.root.children[1].text.as_deref(), Some("1 < 2"));
    }

    #[test]
    fn test_preamble_is_lines_before_root() {
        let content = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n<tv generator-info-name=\"test\">\n</tv>\n";
        let doc = parse(content).unwrap();
        assert_eq!(
            doc.preamble,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n"
        );
        assert_eq!(doc.root.get_attribute("generator-info-name"), Some("test"));
    }

    #[test]
    fn test_comments_are_skipped() {
        let doc = parse("<tv><!-- note --><channel id=\"a\"/></tv>").unwrap();
        assert_eq!(doc.root.children.len(), 1);
    }

    #[test]
    fn test_empty_document_error() {
        assert!(matches!(parse(""), Err(ParseError::EmptyDocument)));
    }

    #[test]
    fn test_unclosed_element_error() {
        let result = parse("<tv>\n<channel id=\"a\">");
        assert!(
            matches!(
                result,
                Err(ParseError::UnexpectedEof { .. } | ParseError::XmlSyntax { .. })
            ),
            "Expected UnexpectedEof or XmlSyntax error, got: {:?}",
            result
        );
    }

    #[test]
    fn test_multiple_roots_error() {
        let result = parse("<tv/>\n<other/>");
        match result {
            Err(ParseError::MultipleRoots { fragment }) => assert_eq!(fragment, "<other/>"),
            other => panic!("Expected MultipleRoots, got: {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_carries_fragment() {
        let result = parse("<tv>\n  <channel id=unquoted/>\n</tv>");
        match result {
            Err(ParseError::XmlSyntax { fragment, .. }) => {
                assert!(fragment.contains("channel"), "fragment was {:?}", fragment);
            }
            other => panic!("Expected XmlSyntax, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_an_encoding_error() {
        let result = parse_bytes(b"<tv>\n<title>\xff</title>\n</tv>");
        match result {
            Err(ParseError::Encoding { position, .. }) => assert_eq!(position, 12),
            other => panic!("Expected Encoding, got: {:?}", other),
        }
    }
}
