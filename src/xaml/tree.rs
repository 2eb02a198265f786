//! In-memory element tree.
//!
//! The reader assembles its output as a tree and serializes it once the
//! document is complete; [`TreeBuilder`] rebuilds a tree from markup events
//! so documents can be compared structurally.

use super::parser::parse_xaml;
use super::sax::{AttributeList, ContentHandler};
use crate::common::xml::escape_xml;
use crate::common::{Error, Result};

/// Child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Markup element with attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set an attribute, replacing an earlier value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append text, merging with a preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(Node::Text(last)) => last.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Last child element, if the last child is an element.
    pub fn last_element_mut(&mut self) -> Option<&mut Element> {
        match self.children.last_mut() {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Concatenated text of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialize without indentation.
    pub fn write_to(&self, buf: &mut String) {
        // Explicit stack: trees mirror input nesting and may be deep
        enum Step<'a> {
            Open(&'a Element),
            Close(&'a str),
            Text(&'a str),
        }

        let mut steps = vec![Step::Open(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Open(element) => {
                    buf.push('<');
                    buf.push_str(&element.name);
                    for (name, value) in &element.attributes {
                        buf.push(' ');
                        buf.push_str(name);
                        buf.push_str("=\"");
                        buf.push_str(&escape_xml(value));
                        buf.push('"');
                    }
                    if element.children.is_empty() {
                        buf.push_str(" />");
                        continue;
                    }
                    buf.push('>');
                    steps.push(Step::Close(&element.name));
                    for child in element.children.iter().rev() {
                        steps.push(match child {
                            Node::Element(e) => Step::Open(e),
                            Node::Text(t) => Step::Text(t),
                        });
                    }
                },
                Step::Close(name) => {
                    buf.push_str("</");
                    buf.push_str(name);
                    buf.push('>');
                },
                Step::Text(text) => buf.push_str(&escape_xml(text)),
            }
        }
    }

    pub fn to_xaml(&self) -> String {
        let mut buf = String::with_capacity(256);
        self.write_to(&mut buf);
        buf
    }
}

/// Builds an [`Element`] tree from markup events.
///
/// Namespace declarations come back as `xmlns` attributes on the element
/// that declared them.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Element>,
    pending_declarations: Vec<(String, String)>,
    root: Option<Element>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed root element.
    pub fn finish(self) -> Option<Element> {
        self.root
    }
}

impl ContentHandler for TreeBuilder {
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        let name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        self.pending_declarations.push((name, uri.to_string()));
        Ok(())
    }

    fn start_element(
        &mut self,
        _namespace_uri: &str,
        _local_name: &str,
        qualified_name: &str,
        attributes: &AttributeList,
    ) -> Result<()> {
        let mut element = Element::new(qualified_name);
        element.attributes = std::mem::take(&mut self.pending_declarations);
        for attr in attributes.iter() {
            element.set_attr(&attr.qualified_name, attr.value.as_str());
        }
        self.stack.push(element);
        Ok(())
    }

    fn end_element(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| Error::Structural("Unexpected end tag".into()))?;
        match self.stack.last_mut() {
            Some(parent) => parent.push(element),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            top.push_text(text);
        }
        Ok(())
    }
}

/// Parse markup into a tree.
pub fn parse_tree(xml: &str, max_depth: usize) -> Result<Element> {
    let mut builder = TreeBuilder::new();
    parse_xaml(xml, &mut builder, max_depth)?;
    builder
        .finish()
        .ok_or_else(|| Error::Structural("Document has no root element".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let mut p = Element::new("Paragraph").with_attr("TextAlignment", "Center");
        let mut run = Element::new("Run").with_attr("Foreground", "#FFFF0000");
        run.push_text("a < b");
        run.push_text(" & c");
        p.push(run);
        p.push(Element::new("LineBreak"));

        assert_eq!(
            p.to_xaml(),
            "<Paragraph TextAlignment=\"Center\"><Run Foreground=\"#FFFF0000\">a &lt; b &amp; c</Run><LineBreak /></Paragraph>"
        );
        assert_eq!(p.text(), "a < b & c");
        assert_eq!(p.elements().count(), 2);
    }

    #[test]
    fn test_parse_tree_round_trip() {
        let xml = "<Section xmlns=\"urn:x\" xml:space=\"preserve\"><Paragraph><Run>x&amp;y</Run></Paragraph></Section>";
        let tree = parse_tree(xml, 64).unwrap();
        assert_eq!(tree.attr("xmlns"), Some("urn:x"));
        assert_eq!(tree.attr("xml:space"), Some("preserve"));
        assert_eq!(tree.to_xaml(), xml);
        assert_eq!(parse_tree(&tree.to_xaml(), 64).unwrap(), tree);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut e = Element::new("Run");
        e.set_attr("FontSize", "12");
        e.set_attr("FontSize", "14");
        assert_eq!(e.attributes.len(), 1);
        assert_eq!(e.attr("FontSize"), Some("14"));
    }
}
