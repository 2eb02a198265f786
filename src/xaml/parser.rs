//! XAML text to [`ContentHandler`] events.
//!
//! A thin namespace-aware layer over quick-xml: `xmlns` declarations become
//! prefix mappings instead of attributes, element and attribute names are
//! resolved against the declarations in scope, and adjacent text and entity
//! references are delivered as a single `characters` call.

use super::sax::{Attribute, AttributeList, ContentHandler, XML_NAMESPACE};
use crate::common::xml::{resolve_reference, unescape_xml};
use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Prefix declarations of one open element.
type Scope = Vec<(String, String)>;

/// Parser state for one document.
struct Parser<'h> {
    handler: &'h mut dyn ContentHandler,
    /// Declarations per open element
    scopes: Vec<Scope>,
    /// Qualified names of open elements
    open: Vec<String>,
    /// Character data not yet delivered
    text: String,
    max_depth: usize,
}

/// Parse `xml` and push its content to `handler`.
///
/// Nesting deeper than `max_depth` elements is a structural error, as are
/// unclosed or mismatched elements and undeclared prefixes.
pub fn parse_xaml(xml: &str, handler: &mut dyn ContentHandler, max_depth: usize) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut parser = Parser {
        handler,
        scopes: Vec::with_capacity(32),
        open: Vec::with_capacity(32),
        text: String::new(),
        max_depth,
    };

    parser.handler.start_document()?;
    let mut buf = Vec::with_capacity(1024);
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => parser.start(e)?,
            Ok(Event::Empty(ref e)) => {
                parser.start(e)?;
                parser.end()?;
            },
            Ok(Event::End(_)) => parser.end()?,
            Ok(Event::Text(ref e)) => {
                if !parser.open.is_empty() {
                    parser.text.push_str(std::str::from_utf8(e)?);
                }
            },
            Ok(Event::CData(ref e)) => {
                if !parser.open.is_empty() {
                    parser.text.push_str(std::str::from_utf8(e)?);
                }
            },
            Ok(Event::GeneralRef(ref e)) => {
                let name = std::str::from_utf8(e)?;
                match resolve_reference(name) {
                    Some(ch) if !parser.open.is_empty() => parser.text.push(ch),
                    Some(_) => {},
                    None => {
                        parser.flush_text()?;
                        parser.handler.skipped_entity(name)?;
                    },
                }
            },
            Ok(Event::PI(ref e)) => {
                parser.flush_text()?;
                let target = std::str::from_utf8(e.target())?;
                let data = std::str::from_utf8(e.content())?.trim_start();
                parser.handler.processing_instruction(target, data)?;
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Structural(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            },
            // Declarations, comments and doctypes carry no content
            Ok(_) => {},
        }
        buf.clear();
    }

    if !parser.open.is_empty() {
        return Err(Error::Structural(format!(
            "Unclosed elements detected, final depth: {}",
            parser.open.len()
        )));
    }
    parser.handler.end_document()
}

impl Parser<'_> {
    fn flush_text(&mut self) -> Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        self.handler.characters(&text)
    }

    fn start(&mut self, e: &BytesStart) -> Result<()> {
        self.flush_text()?;
        if self.open.len() >= self.max_depth {
            return Err(Error::Structural(format!(
                "Maximum XML depth {} exceeded",
                self.max_depth
            )));
        }

        let qname = std::str::from_utf8(e.name().as_ref())?.to_string();

        let mut declared = Scope::new();
        let mut raw = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = unescape_xml(std::str::from_utf8(&attr.value)?);
            if key == "xmlns" {
                declared.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push((prefix.to_string(), value));
            } else {
                raw.push((key.to_string(), value));
            }
        }
        for (prefix, uri) in &declared {
            self.handler.start_prefix_mapping(prefix, uri)?;
        }
        self.scopes.push(declared);

        let mut attributes = AttributeList::new();
        for (key, value) in raw {
            let attribute = match key.split_once(':') {
                Some((prefix, local)) => {
                    let uri = self.resolve(prefix)?;
                    Attribute::qualified(uri, local, key.as_str(), value)
                },
                None => Attribute::new(key, value),
            };
            attributes.push(attribute);
        }

        let (prefix, local) = split_qname(&qname);
        let uri = self.resolve(prefix)?;
        self.handler.start_element(&uri, local, &qname, &attributes)?;
        self.open.push(qname);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.flush_text()?;
        let qname = self
            .open
            .pop()
            .ok_or_else(|| Error::Structural("Unexpected end tag".into()))?;
        let (prefix, local) = split_qname(&qname);
        let uri = self.resolve(prefix)?;
        self.handler.end_element(&uri, local, &qname)?;
        if let Some(scope) = self.scopes.pop() {
            for (prefix, _) in scope.iter().rev() {
                self.handler.end_prefix_mapping(prefix)?;
            }
        }
        Ok(())
    }

    /// Namespace URI bound to `prefix`; the empty prefix may be unbound.
    fn resolve(&self, prefix: &str) -> Result<String> {
        if prefix == "xml" {
            return Ok(XML_NAMESPACE.to_string());
        }
        let bound = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone());
        match bound {
            Some(uri) => Ok(uri),
            None if prefix.is_empty() => Ok(String::new()),
            None => Err(Error::Structural(format!("Undeclared prefix '{}'", prefix))),
        }
    }
}

#[inline]
fn split_qname(qname: &str) -> (&str, &str) {
    qname.split_once(':').unwrap_or(("", qname))
}
