//! Flow-document markup (XAML) support.
//!
//! - [`sax`]: the push-style event contract the RTF writer consumes
//! - [`parser`]: markup text to events, via quick-xml
//! - [`tree`]: the element tree the RTF reader builds
//! - [`properties`]: property value syntax (brushes, lengths, thickness)

pub mod parser;
pub mod properties;
pub mod sax;
pub mod tree;

pub use parser::parse_xaml;
pub use sax::{Attribute, AttributeList, ContentHandler, XML_NAMESPACE};
pub use tree::{Element, Node, TreeBuilder, parse_tree};

/// Default namespace of flow documents.
pub const PRESENTATION_NAMESPACE: &str =
    "http://schemas.microsoft.com/winfx/2006/xaml/presentation";
