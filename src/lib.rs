//! flowrtf - bidirectional conversion between RTF and flow-document markup
//!
//! This library converts Rich Text Format documents to the XAML flow-document
//! dialect (`Section`, `Paragraph`, `Run`, `Table`, `List`, ...) and back,
//! preserving character runs, paragraph properties, tables, lists, colors,
//! fonts, hyperlinks and embedded pictures.
//!
//! # Features
//!
//! - **RTF reader**: tokenizer, scoped formatting state and resource tables
//!   (fonts, colors, lists) driving a flow-document tree builder
//! - **RTF writer**: consumes markup events and writes RTF with the font,
//!   color and list tables assembled after the body
//! - **Payloads**: pictures are exchanged through a [`payload::PayloadProvider`]
//!   instead of being inlined into markup
//! - **Diagnostics**: recoverable problems go to a
//!   [`common::DiagnosticSink`]; only structural failures abort a conversion
//!
//! # Example - RTF to markup
//!
//! ```
//! let xaml = flowrtf::convert_rtf_to_xaml(r"{\rtf1\ansi Hello {\i world}\par}")?;
//! assert!(xaml.contains(r#"<Run FontStyle="Italic">world</Run>"#));
//! # Ok::<(), flowrtf::Error>(())
//! ```
//!
//! # Example - Markup to RTF with a payload store
//!
//! ```
//! use flowrtf::common::Diagnostic;
//! use flowrtf::payload::MemoryPayloadStore;
//! use flowrtf::{Converter, ConverterOptions};
//!
//! let converter = Converter::new(ConverterOptions::new().with_code_page(1251));
//! let mut payloads = MemoryPayloadStore::new();
//! let mut diagnostics: Vec<Diagnostic> = Vec::new();
//!
//! let xaml = r#"<Section xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation">
//!     <Paragraph><Bold>Привет</Bold></Paragraph>
//! </Section>"#;
//! let rtf = converter.convert_xaml_to_rtf_with(xaml, &mut payloads, &mut diagnostics)?;
//! assert!(rtf.contains(r"\ansicpg1251"));
//! assert!(diagnostics.is_empty());
//! # Ok::<(), flowrtf::Error>(())
//! ```

/// Shared error, diagnostic, encoding and unit helpers
pub mod common;

/// Conversion options and numeric limits
pub mod config;

/// Conversion entry points
pub mod convert;

/// Embedded binary object storage
pub mod payload;

/// RTF tokenizer, resource tables, reader and writer
pub mod rtf;

/// Flow-document markup parsing, tree and property values
pub mod xaml;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use config::{ConverterOptions, Limits};
pub use convert::{
    Converter, convert_optional_rtf_to_xaml, convert_optional_xaml_to_rtf, convert_rtf_to_xaml,
    convert_xaml_to_rtf,
};
