//! Push-style markup events.
//!
//! The writer consumes markup as a stream of callbacks rather than a tree.
//! Any source that can produce these events (the bundled quick-xml parser,
//! a tree walker, a host document model) can drive it.

use crate::common::Result;

/// Namespace of the `xml:` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A single attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Resolved namespace URI; empty for unprefixed attributes
    pub namespace_uri: String,
    /// Name without prefix
    pub local_name: String,
    /// Name as written, including any prefix
    pub qualified_name: String,
    /// Declared type; always `CDATA` without a DTD
    pub attr_type: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Unprefixed `CDATA` attribute.
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        let local_name = local_name.into();
        Self {
            namespace_uri: String::new(),
            qualified_name: local_name.clone(),
            local_name,
            attr_type: "CDATA".to_string(),
            value: value.into(),
        }
    }

    /// Namespaced `CDATA` attribute.
    pub fn qualified(
        namespace_uri: impl Into<String>,
        local_name: impl Into<String>,
        qualified_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
            qualified_name: qualified_name.into(),
            attr_type: "CDATA".to_string(),
            value: value.into(),
        }
    }
}

/// Attributes of a start tag, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute at position `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Attribute by namespace URI and local name.
    pub fn get_by_name(&self, namespace_uri: &str, local_name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.namespace_uri == namespace_uri && a.local_name == local_name)
    }

    /// Attribute by qualified name.
    pub fn get_by_qname(&self, qualified_name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }

    /// Value of the unprefixed attribute `local_name`.
    #[inline]
    pub fn value(&self, local_name: &str) -> Option<&str> {
        self.get_by_name("", local_name).map(|a| a.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }
}

impl FromIterator<Attribute> for AttributeList {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// Receiver of markup events.
///
/// Every callback has a no-op default, so handlers implement only what they
/// care about. Returning an error aborts the producer.
pub trait ContentHandler {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) -> Result<()> {
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(
        &mut self,
        _namespace_uri: &str,
        _local_name: &str,
        _qualified_name: &str,
        _attributes: &AttributeList,
    ) -> Result<()> {
        Ok(())
    }

    fn end_element(
        &mut self,
        _namespace_uri: &str,
        _local_name: &str,
        _qualified_name: &str,
    ) -> Result<()> {
        Ok(())
    }

    fn characters(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn ignorable_whitespace(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn processing_instruction(&mut self, _target: &str, _data: &str) -> Result<()> {
        Ok(())
    }

    fn skipped_entity(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup() {
        let list: AttributeList = [
            Attribute::new("FontSize", "12"),
            Attribute::qualified(XML_NAMESPACE, "lang", "xml:lang", "de-DE"),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().local_name, "FontSize");
        assert_eq!(list.get(0).unwrap().attr_type, "CDATA");
        assert_eq!(list.value("FontSize"), Some("12"));
        assert_eq!(list.get_by_name(XML_NAMESPACE, "lang").unwrap().value, "de-DE");
        assert_eq!(list.get_by_qname("xml:lang").unwrap().value, "de-DE");
        assert!(list.value("lang").is_none());
        assert!(list.get(2).is_none());
    }
}
