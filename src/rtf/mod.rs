//! RTF (Rich Text Format) support.
//!
//! Both conversion directions share the tokenizer, the resource tables and
//! the formatting model defined here.
//!
//! # Architecture
//!
//! - **Lexer**: tokenizes RTF bytes into control words, symbols, hex escapes
//!   and text
//! - **Control table**: static lookup of recognized control words
//! - **Scope stack**: formatting state per group, with the destination that
//!   the group's tokens feed
//! - **Reader**: RTF to flow-document element tree
//! - **Writer**: flow-document markup events to RTF
//!
//! # Example
//!
//! ```rust
//! use flowrtf::ConverterOptions;
//! use flowrtf::common::NullSink;
//! use flowrtf::payload::MemoryPayloadStore;
//! use flowrtf::rtf::read_rtf;
//!
//! let options = ConverterOptions::default();
//! let mut payloads = MemoryPayloadStore::new();
//! let root = read_rtf(br"{\rtf1\ansi{\b Hello}\par}", false, &options, &mut payloads, &mut NullSink)?;
//! assert_eq!(root.name, "Section");
//! # Ok::<(), flowrtf::common::Error>(())
//! ```

pub mod border;
pub mod control;
pub mod destination;
pub mod field;
pub mod format;
pub mod lexer;
pub mod list;
pub mod picture;
pub mod reader;
pub mod scope;
pub mod table;
pub mod types;
pub mod writer;

// Re-exports
pub use border::{Border, BorderSide, BorderStyle, Borders, Shading};
pub use control::{Control, ControlFlags, ControlWordInfo};
pub use destination::Destination;
pub use field::{Field, FieldType};
pub use format::{Alignment, CharFormat, FormatState, ParaFormat, UnderlineStyle, VerticalAlign};
pub use lexer::{Lexer, Token, TokenKind};
pub use list::{
    List, ListLevel, ListLevelTable, ListOverride, ListOverrideTable, ListTable, MarkerStyle,
};
pub use picture::{ImageType, Picture, detect_image_type};
pub use reader::{RtfReader, read_rtf};
pub use scope::ScopeStack;
pub use table::{CellDef, CellWidth, MergeFlags, RowFormat, WidthType};
pub use types::{Color, ColorEntry, ColorRef, ColorTable, Font, FontFamily, FontRef, FontTable};
pub use writer::{RtfWriter, write_rtf};
