//! RTF to flow-document reader.
//!
//! The reader pulls tokens from the [`Lexer`] one at a time and routes each
//! to the handler of the top scope's [`Destination`]. Resource tables are
//! filled as their destinations are read; content destinations feed the
//! [`DocumentBuilder`]. Group nesting is tracked on an explicit
//! [`ScopeStack`], so deeply nested input cannot exhaust the call stack.
//!
//! Structural problems abort the conversion: they are reported to the
//! diagnostic sink as fatal and returned as errors. Everything else is
//! reported as a warning and skipped.

mod builder;
mod content;
mod tables;

pub use builder::{
    BoxProps, CellGeometry, DocumentBuilder, ListPlacement, ParagraphProps, RowDef, RunProps,
};

use super::control::Control;
use super::destination::{Destination, Handler};
use super::field::Field;
use super::format::{CharFormat, FormatState};
use super::lexer::{Lexer, Token, TokenKind};
use super::list::{List, ListLevel, ListOverride, ListOverrideTable, ListTable};
use super::picture::Picture;
use super::scope::ScopeStack;
use super::types::{ColorTable, Font, FontRef, FontTable};
use crate::common::encoding::{
    DEFAULT_CODE_PAGE, charset_to_codepage, codepage_to_encoding, decode_bytes,
};
use crate::common::{Diagnostic, DiagnosticSink, Error, ErrorKind, Result};
use crate::config::ConverterOptions;
use crate::payload::PayloadProvider;
use crate::xaml::Element;
use smallvec::SmallVec;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Font table entry being read.
#[derive(Debug, Default)]
struct FontEntry {
    number: FontRef,
    font: Font,
}

/// An open `\field` group.
#[derive(Debug, Default)]
struct FieldContext {
    instruction: String,
    /// Target of a HYPERLINK instruction
    uri: Option<String>,
    /// A hyperlink was started for the field result
    linked: bool,
}

/// An open `\shp` group.
#[derive(Debug, Default)]
struct ShapeContext {
    has_picture: bool,
}

/// Reader state for one conversion.
pub struct RtfReader<'a> {
    lexer: Lexer<'a>,
    options: &'a ConverterOptions,
    payloads: &'a mut dyn PayloadProvider,
    sink: &'a mut dyn DiagnosticSink,
    scopes: ScopeStack,
    /// Non-ASCII text bytes are UTF-8 rather than code page bytes
    literal_utf8: bool,

    code_page: u16,
    default_font: Option<FontRef>,
    default_language: u16,

    colors: ColorTable,
    fonts: FontTable,
    lists: ListTable,
    overrides: ListOverrideTable,

    font_entry: Option<FontEntry>,
    level_text: String,
    picture: Option<Picture>,
    fields: Vec<FieldContext>,
    shapes: Vec<ShapeContext>,

    /// `\'hh` bytes awaiting decoding as one sequence
    pending_bytes: SmallVec<[u8; 16]>,
    /// Fallback characters still to skip after `\uN`
    fallback_skip: usize,
    high_surrogate: Option<u16>,
    /// The previous token was `\*`
    ignorable: bool,
    /// The document group has been closed
    closed: bool,
    warned_fonts: SmallVec<[FontRef; 4]>,

    builder: DocumentBuilder,
    run_cache: Option<(CharFormat, RunProps)>,
}

impl<'a> RtfReader<'a> {
    /// Create a reader over `input`.
    ///
    /// With `literal_utf8`, non-ASCII text is taken as UTF-8, which is what
    /// RTF held in a Rust string contains.
    pub fn new(
        input: &'a [u8],
        literal_utf8: bool,
        options: &'a ConverterOptions,
        payloads: &'a mut dyn PayloadProvider,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            lexer: Lexer::new(input),
            options,
            payloads,
            sink,
            scopes: ScopeStack::new(FormatState::root(), options.limits.max_group_depth),
            literal_utf8,
            code_page: options.code_page,
            default_font: None,
            default_language: options.default_language,
            colors: ColorTable::new(),
            fonts: FontTable::new(),
            lists: ListTable::new(),
            overrides: ListOverrideTable::new(),
            font_entry: None,
            level_text: String::new(),
            picture: None,
            fields: Vec::new(),
            shapes: Vec::new(),
            pending_bytes: SmallVec::new(),
            fallback_skip: 0,
            high_surrogate: None,
            ignorable: false,
            closed: false,
            warned_fonts: SmallVec::new(),
            builder: DocumentBuilder::new(options.default_column_width),
            run_cache: None,
        }
    }

    /// Read the whole document and return the root element.
    pub fn read(mut self) -> Result<Element> {
        match self.run() {
            Ok(()) => Ok(self.builder.finish()),
            Err(e) => {
                self.sink.report(Diagnostic::fatal(&e));
                Err(e)
            },
        }
    }

    fn run(&mut self) -> Result<()> {
        if self.lexer.next_token().kind != TokenKind::GroupStart {
            return Err(Error::Structural("Document does not start with '{'".into()));
        }
        self.scopes.push()?;

        loop {
            self.lexer
                .set_picture_mode(self.scopes.top().destination == Destination::Picture);
            let token = self.lexer.next_token();
            if token.kind != TokenKind::Hex {
                self.flush_bytes()?;
            }
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::GroupStart => {
                    self.fallback_skip = 0;
                    self.scopes.push()?;
                },
                TokenKind::GroupEnd => self.end_group()?,
                _ if self.closed => {},
                _ => self.dispatch(token)?,
            }
        }

        if self.scopes.depth() > 1 {
            return Err(Error::Structural(format!(
                "{} group(s) not closed at end of input",
                self.scopes.depth() - 1
            )));
        }
        Ok(())
    }

    fn end_group(&mut self) -> Result<()> {
        self.fallback_skip = 0;
        self.ignorable = false;
        let closing_document = self.scopes.depth() == 2 && !self.closed;
        if closing_document {
            self.finish_content()?;
        }

        let closed = self.scopes.pop()?;
        let parent = self.scopes.top().destination;
        if closed.destination != parent {
            self.finish_destination(closed.destination)?;
        }
        if closing_document {
            self.closed = true;
        }
        Ok(())
    }

    fn dispatch(&mut self, token: Token<'_>) -> Result<()> {
        if self.scopes.top().destination == Destination::Skip {
            return Ok(());
        }

        if std::mem::take(&mut self.ignorable) && token.kind == TokenKind::Control {
            match token.control {
                Some(info) => trace!(word = info.word, "Skipping ignorable group"),
                None => self.sink.warn(
                    ErrorKind::Semantic,
                    &format!("Unknown destination \\{} skipped", token.word()),
                ),
            }
            self.scopes.top_mut().destination = Destination::Skip;
            return Ok(());
        }

        match token.kind {
            TokenKind::Destination => {
                if let Some(info) = token.control {
                    self.enter_destination(info.control);
                }
            },
            TokenKind::Control => self.control(&token)?,
            TokenKind::Text => self.text_bytes(&token.text)?,
            TokenKind::TextSymbol => {
                if self.fallback_skip > 0 {
                    self.fallback_skip -= 1;
                } else {
                    self.route_text(token.word())?;
                }
            },
            TokenKind::Hex => {
                if self.fallback_skip > 0 {
                    self.fallback_skip -= 1;
                } else if let Some(byte) = token.parameter {
                    self.pending_bytes.push(byte as u8);
                }
            },
            TokenKind::PictureData => {
                if let Some(picture) = self.picture.as_mut()
                    && self.scopes.top().destination == Destination::Picture
                {
                    picture.data.extend_from_slice(&token.text);
                }
            },
            TokenKind::Invalid => {
                let text = String::from_utf8_lossy(&token.text);
                self.sink.warn(
                    ErrorKind::Lexical,
                    &format!(
                        "Malformed control syntax '{}' at byte {}",
                        text,
                        self.lexer.position()
                    ),
                );
            },
            TokenKind::Newline
            | TokenKind::NullChar
            | TokenKind::GroupStart
            | TokenKind::GroupEnd
            | TokenKind::Eof => {},
        }
        Ok(())
    }

    fn enter_destination(&mut self, control: Control) {
        let top = self.scopes.top_mut();
        let mut next = top.destination.enter(control);
        if next == Destination::ShapeResult && self.shapes.last().is_some_and(|s| s.has_picture) {
            next = Destination::Skip;
        }
        top.destination = next;
        debug!(?control, destination = ?next, "Destination switch");

        match next {
            Destination::Picture => self.picture = Some(Picture::default()),
            Destination::Field => self.fields.push(FieldContext::default()),
            Destination::FieldResult => {
                if let Some(ctx) = self.fields.last_mut()
                    && let Some(uri) = ctx.uri.as_deref()
                {
                    self.builder.start_hyperlink(uri);
                    ctx.linked = true;
                }
            },
            Destination::Shape => self.shapes.push(ShapeContext::default()),
            Destination::List => self.lists.add(List::new(0)),
            Destination::ListLevel => {
                if let Some(list) = self.lists.current_entry() {
                    list.levels.add(ListLevel::default());
                }
            },
            Destination::LevelText => self.level_text.clear(),
            Destination::ListOverride => self.overrides.add(ListOverride::new(0, 0)),
            Destination::ListOverrideLevel => {
                if let Some(entry) = self.overrides.current_entry() {
                    entry.level_starts.push(None);
                }
            },
            _ => {},
        }
    }

    /// Finish a destination whose group just closed.
    fn finish_destination(&mut self, destination: Destination) -> Result<()> {
        match destination {
            Destination::Picture => self.finish_picture(),
            Destination::FieldInstruction => {
                if let Some(ctx) = self.fields.last_mut() {
                    let field = Field::parse_instruction(&ctx.instruction);
                    debug!(field_type = ?field.field_type, "Field instruction");
                    ctx.uri = field.extract_url();
                }
            },
            Destination::FieldResult => {
                if let Some(ctx) = self.fields.last_mut()
                    && ctx.linked
                {
                    ctx.linked = false;
                    self.builder.end_hyperlink();
                }
            },
            Destination::Field => {
                if let Some(ctx) = self.fields.pop()
                    && ctx.linked
                {
                    self.builder.end_hyperlink();
                }
            },
            Destination::Shape => {
                self.shapes.pop();
            },
            Destination::FontName => self.finish_font(),
            Destination::FontTable => {
                self.finish_font();
                debug!(fonts = self.fonts.len(), "Font table complete");
            },
            Destination::ColorTable => {
                if self.colors.has_pending() {
                    self.colors.finish_color();
                }
                debug!(colors = self.colors.len(), "Color table complete");
            },
            Destination::LevelText => {
                let text = std::mem::take(&mut self.level_text);
                if let Some(level) = self
                    .lists
                    .current_entry()
                    .and_then(|list| list.levels.current_entry())
                {
                    level.set_raw_level_text(&text);
                }
            },
            Destination::ListTable => debug!(lists = self.lists.len(), "List table complete"),
            Destination::ListOverrideTable => {
                debug!(overrides = self.overrides.len(), "List override table complete")
            },
            _ => {},
        }
        Ok(())
    }

    fn control(&mut self, token: &Token<'_>) -> Result<()> {
        let Some(info) = token.control else {
            trace!(word = token.word(), "Ignoring unknown control word");
            return Ok(());
        };
        let param = token.parameter;

        match info.control {
            Control::Ignorable => {
                self.ignorable = true;
                return Ok(());
            },
            Control::Rtf => return Ok(()),
            Control::Ansi => self.code_page = DEFAULT_CODE_PAGE,
            Control::Mac => self.code_page = 10000,
            Control::Pc => self.code_page = 437,
            Control::Pca => self.code_page = 850,
            Control::AnsiCodePage => match param.filter(|p| *p > 0 && *p <= u16::MAX as i32) {
                Some(cp) if codepage_to_encoding(cp as u32).is_some() => {
                    self.code_page = cp as u16;
                },
                _ => self.sink.warn(
                    ErrorKind::Semantic,
                    &format!("Unsupported code page {}", param.unwrap_or(0)),
                ),
            },
            Control::DefaultFont => self.default_font = param,
            Control::DefaultLanguage => {
                if let Some(lcid) = param.filter(|p| (0..=u16::MAX as i32).contains(p)) {
                    self.default_language = lcid as u16;
                }
            },
            Control::UnicodeSkip => {
                self.scopes.top_mut().unicode_skip = param.unwrap_or(1).max(0) as usize;
            },
            Control::Unicode => {
                if let Some(ch) = self.unicode_char(param.unwrap_or(0)) {
                    let mut buf = [0u8; 4];
                    self.route_text(ch.encode_utf8(&mut buf))?;
                }
                self.fallback_skip = self.scopes.top().unicode_skip;
            },
            _ => match self.scopes.top().destination.handler() {
                Handler::Content => self.content_control(info, token)?,
                Handler::ColorTable => self.color_table_control(info, param),
                Handler::FontTable => self.font_table_control(info, token),
                Handler::ListTable => self.list_table_control(info, param),
                Handler::ListOverrideTable => self.list_override_control(info, param),
                Handler::Picture => self.picture_control(info, param),
                Handler::FieldInstruction | Handler::Container | Handler::Skip => {},
            },
        }
        Ok(())
    }

    /// Combine `\uN` values into characters, pairing surrogates.
    fn unicode_char(&mut self, value: i32) -> Option<char> {
        let code = if value < 0 { value + 65536 } else { value } as u32;
        match code {
            0xD800..=0xDBFF => {
                self.high_surrogate = Some(code as u16);
                None
            },
            0xDC00..=0xDFFF => {
                let high = self.high_surrogate.take()? as u32;
                char::from_u32(0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00))
            },
            _ => {
                self.high_surrogate = None;
                char::from_u32(code)
            },
        }
    }

    /// Code page of 8-bit text at the current position.
    fn active_code_page(&self) -> u16 {
        let top = self.scopes.top();
        let charset = match top.destination.handler() {
            Handler::FontTable => self.font_entry.as_ref().and_then(|e| e.font.charset),
            _ => top
                .chars
                .font
                .or(self.default_font)
                .and_then(|f| self.fonts.get(f))
                .and_then(|font| font.charset),
        };
        charset
            .and_then(charset_to_codepage)
            .unwrap_or(self.code_page)
    }

    fn text_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.literal_utf8 && !bytes.is_ascii() {
            // `\u` fallbacks count characters of literal text
            let text = String::from_utf8_lossy(bytes);
            let start = text
                .char_indices()
                .nth(self.fallback_skip)
                .map_or(text.len(), |(i, _)| i);
            self.fallback_skip -= text[..start].chars().count();
            if start == text.len() {
                return Ok(());
            }
            return self.route_text(&text[start..]);
        }

        let skip = self.fallback_skip.min(bytes.len());
        self.fallback_skip -= skip;
        let bytes = &bytes[skip..];
        if bytes.is_empty() {
            return Ok(());
        }
        let text: Cow<'_, str> = if bytes.is_ascii() {
            String::from_utf8_lossy(bytes)
        } else {
            Cow::Owned(decode_bytes(bytes, self.active_code_page()))
        };
        self.route_text(&text)
    }

    /// Decode buffered `\'hh` bytes as one sequence.
    fn flush_bytes(&mut self) -> Result<()> {
        if self.pending_bytes.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.pending_bytes);
        let text = decode_bytes(&bytes, self.active_code_page());
        self.route_text(&text)
    }

    /// Deliver decoded text to the current destination.
    fn route_text(&mut self, text: &str) -> Result<()> {
        match self.scopes.top().destination {
            destination if destination.is_content() => self.content_text(text)?,
            Destination::FontTable | Destination::FontName => self.font_name_text(text),
            Destination::ColorTable => {
                for _ in text.matches(';') {
                    self.colors.finish_color();
                }
            },
            Destination::LevelText => self.level_text.push_str(text),
            Destination::FieldInstruction => {
                if let Some(ctx) = self.fields.last_mut() {
                    ctx.instruction.push_str(text);
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn warn(&mut self, message: &str) {
        self.sink.warn(ErrorKind::Semantic, message);
    }
}

/// Convert RTF bytes to a flow-document tree.
pub fn read_rtf(
    input: &[u8],
    literal_utf8: bool,
    options: &ConverterOptions,
    payloads: &mut dyn PayloadProvider,
    sink: &mut dyn DiagnosticSink,
) -> Result<Element> {
    RtfReader::new(input, literal_utf8, options, payloads, sink).read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Severity;
    use crate::payload::MemoryPayloadStore;

    fn read_with(input: &str) -> (Result<Element>, Vec<Diagnostic>, MemoryPayloadStore) {
        let options = ConverterOptions::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let result = read_rtf(input.as_bytes(), true, &options, &mut payloads, &mut sink);
        (result, sink, payloads)
    }

    fn read(input: &str) -> Element {
        read_with(input).0.unwrap()
    }

    fn first_run(root: &Element) -> &Element {
        root.elements().next().unwrap().elements().next().unwrap()
    }

    #[test]
    fn test_color_run() {
        let root = read(r"{\rtf1{\colortbl;\red255\green0\blue0;}\cf1 Hello}");
        let run = first_run(&root);
        assert_eq!(run.name, "Run");
        assert_eq!(run.attr("Foreground"), Some("#FFFF0000"));
        assert_eq!(run.text(), "Hello");
    }

    #[test]
    fn test_character_formatting_scopes() {
        let root = read(r"{\rtf1 a{\b\i b}\ul c\ulnone\par}");
        let runs: Vec<&Element> = root.elements().next().unwrap().elements().collect();
        assert_eq!(runs.len(), 3);
        assert!(runs[0].attributes.is_empty());
        assert_eq!(runs[1].attr("FontWeight"), Some("Bold"));
        assert_eq!(runs[1].attr("FontStyle"), Some("Italic"));
        assert_eq!(runs[2].attr("TextDecorations"), Some("Underline"));
        assert_eq!(root.elements().count(), 1);
    }

    #[test]
    fn test_fonts_sizes_and_languages() {
        let root = read(
            r"{\rtf1\deff0\deflang1033{\fonttbl{\f0\froman Times New Roman;}{\f1\fswiss\fcharset0 Arial;}}\f1\fs24\lang1031 x\f0\lang1033 y}",
        );
        let runs: Vec<&Element> = root.elements().next().unwrap().elements().collect();
        assert_eq!(runs[0].attr("FontFamily"), Some("Arial"));
        assert_eq!(runs[0].attr("FontSize"), Some("16"));
        assert_eq!(runs[0].attr("xml:lang"), Some("de-DE"));
        assert_eq!(runs[1].attr("FontFamily"), None);
        assert_eq!(runs[1].attr("xml:lang"), None);
    }

    #[test]
    fn test_unicode_and_fallback() {
        let root = read(r"{\rtf1\uc1 \u8364?\u-10179?\u-8704? \'e9}");
        assert_eq!(root.text(), "\u{20AC}\u{1F600} é");
    }

    #[test]
    fn test_code_page_bytes() {
        let options = ConverterOptions::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let input = b"{\\rtf1\\ansi\\ansicpg1251 \xcf\xf0\xe8\\'e2\\'e5\\'f2}";
        let root = read_rtf(input, false, &options, &mut payloads, &mut sink).unwrap();
        assert_eq!(root.text(), "Привет");
    }

    #[test]
    fn test_unbalanced_groups_are_fatal() {
        let (result, diagnostics, _) = read_with(r"{\rtf1{\b bold");
        assert!(matches!(result, Err(Error::Structural(_))));
        assert_eq!(diagnostics.last().unwrap().severity, Severity::Fatal);

        let (result, _, _) = read_with(r"{\rtf1 a}}");
        assert!(matches!(result, Err(Error::Structural(_))));

        let (result, _, _) = read_with(r"\rtf1 a");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_color_is_fatal() {
        let (result, diagnostics, _) = read_with(r"{\rtf1{\colortbl;\red1\green2\blue3;}\cf5 x}");
        assert!(matches!(result, Err(Error::Structural(_))));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_auto_color_and_default() {
        let root = read(r"{\rtf1{\colortbl;\red1\green2\blue3;}\cf0 a\cf1 b}");
        let runs: Vec<&Element> = root.elements().next().unwrap().elements().collect();
        assert_eq!(runs[0].attr("Foreground"), None);
        assert_eq!(runs[1].attr("Foreground"), Some("#FF010203"));
    }

    #[test]
    fn test_unknown_destination_skipped_with_warning() {
        let (result, diagnostics, _) =
            read_with(r"{\rtf1{\*\unknowndest secret}{\info{\title t}}visible}");
        let root = result.unwrap();
        assert_eq!(root.text(), "visible");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].code, ErrorKind::Semantic);
    }

    #[test]
    fn test_hyperlink_field() {
        let root = read(
            r#"{\rtf1{\field{\*\fldinst HYPERLINK "http://example.com"}{\fldrslt link}} tail}"#,
        );
        let paragraph = root.elements().next().unwrap();
        let link = paragraph.elements().next().unwrap();
        assert_eq!(link.name, "Hyperlink");
        assert_eq!(link.attr("NavigateUri"), Some("http://example.com"));
        assert_eq!(link.text(), "link");
        assert_eq!(paragraph.text(), "link tail");
    }

    #[test]
    fn test_other_fields_keep_result_only() {
        let root = read(r"{\rtf1{\field{\*\fldinst PAGE}{\fldrslt 3}}}");
        let paragraph = root.elements().next().unwrap();
        assert_eq!(paragraph.elements().next().unwrap().name, "Run");
        assert_eq!(paragraph.text(), "3");
    }

    #[test]
    fn test_picture_stored_as_payload() {
        let (result, _, payloads) =
            read_with(r"{\rtf1{\pict\pngblip\picwgoal1440\pichgoal720 89504e47}}");
        let root = result.unwrap();
        assert_eq!(payloads.len(), 1);
        let (uri, payload) = payloads.iter().next().unwrap();
        assert_eq!(payload.data, vec![0x89, 0x50, 0x4E, 0x47]);

        let container = first_run(&root);
        assert_eq!(container.name, "InlineUIContainer");
        let image = container.elements().next().unwrap();
        assert_eq!(image.attr("Source"), Some(uri));
        assert_eq!(image.attr("Width"), Some("96"));
        assert_eq!(image.attr("Height"), Some("48"));
    }

    #[test]
    fn test_shape_picture_wins_over_result() {
        let (result, _, payloads) = read_with(
            r"{\rtf1{\shp{\*\shpinst{\pict\pngblip 89504e47}}{\shprslt fallback}}}",
        );
        assert_eq!(payloads.len(), 1);
        assert_eq!(result.unwrap().text(), "");
    }

    #[test]
    fn test_lists() {
        let root = read(concat!(
            r"{\rtf1{\*\listtable{\list\listid5{\listlevel\levelnfc0\levelstartat3{\leveltext\'02\'00.;}}}}",
            r"{\*\listoverridetable{\listoverride\listid5\ls1}}",
            r"\pard\ls1\ilvl0 one\par\pard\ls1\ilvl0 two\par\pard plain\par}"
        ));
        let blocks: Vec<&Element> = root.elements().collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "List");
        assert_eq!(blocks[0].attr("MarkerStyle"), Some("Decimal"));
        assert_eq!(blocks[0].attr("StartIndex"), Some("3"));
        assert_eq!(blocks[0].elements().count(), 2);
        assert_eq!(blocks[1].name, "Paragraph");
    }

    #[test]
    fn test_missing_list_override_falls_back_to_disc() {
        let (result, diagnostics, _) = read_with(r"{\rtf1\pard\ls9 item\par}");
        let root = result.unwrap();
        let list = root.elements().next().unwrap();
        assert_eq!(list.attr("MarkerStyle"), Some("Disc"));
        assert!(list.attr("StartIndex").is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_table() {
        let root = read(concat!(
            r"{\rtf1\trowd\cellx1440\cellx4320",
            r"\pard\intbl a\cell b\cell\row",
            r"\trowd\clmgf\cellx1440\clmrg\cellx4320",
            r"\pard\intbl merged\cell\cell\row",
            r"\pard after\par}"
        ));
        let blocks: Vec<&Element> = root.elements().collect();
        assert_eq!(blocks.len(), 2);
        let table = blocks[0];
        assert_eq!(table.name, "Table");
        let widths: Vec<&str> = table
            .elements()
            .next()
            .unwrap()
            .elements()
            .filter_map(|c| c.attr("Width"))
            .collect();
        assert_eq!(widths, vec!["96", "192"]);
        let rows: Vec<&Element> = table.elements().nth(1).unwrap().elements().collect();
        assert_eq!(rows[0].elements().count(), 2);
        assert_eq!(rows[1].elements().count(), 1);
        assert_eq!(rows[1].elements().next().unwrap().attr("ColumnSpan"), Some("2"));
        assert_eq!(blocks[1].text(), "after");
    }

    #[test]
    fn test_paragraph_properties() {
        let root = read(
            r"{\rtf1{\colortbl;\red0\green0\blue255;}\pard\qc\li1440\sb150\fi-300\sl360\slmult0\box\brdrs\brdrw30\brdrcf1\cbpat1 x\par}",
        );
        let p = root.elements().next().unwrap();
        assert_eq!(p.attr("TextAlignment"), Some("Center"));
        assert_eq!(p.attr("Margin"), Some("96,10,0,0"));
        assert_eq!(p.attr("TextIndent"), Some("-20"));
        assert_eq!(p.attr("LineHeight"), Some("24"));
        assert_eq!(p.attr("BorderThickness"), Some("2"));
        assert_eq!(p.attr("BorderBrush"), Some("#FF0000FF"));
        assert_eq!(p.attr("Background"), Some("#FF0000FF"));
    }

    #[test]
    fn test_special_characters() {
        let root = read(r"{\rtf1 a\tab b\line c\emdash\ldblquote q\rdblquote\~\{\}}");
        let p = root.elements().next().unwrap();
        assert_eq!(p.elements().nth(1).unwrap().name, "LineBreak");
        assert_eq!(p.text(), "a\tbc\u{2014}\u{201C}q\u{201D}\u{00A0}{}");
    }

    #[test]
    fn test_invalid_tokens_are_warnings() {
        let (result, diagnostics, _) = read_with(r"{\rtf1 a\'zz b}");
        assert!(result.is_ok());
        assert_eq!(diagnostics[0].code, ErrorKind::Lexical);
    }

    #[test]
    fn test_depth_limit() {
        let options = ConverterOptions::default().with_limits(crate::config::Limits {
            max_group_depth: 8,
            ..Default::default()
        });
        let input = format!("{{\\rtf1{}{}}}", "{".repeat(20), "}".repeat(20));
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let result = read_rtf(input.as_bytes(), true, &options, &mut payloads, &mut sink);
        assert!(matches!(result, Err(Error::Structural(_))));
    }

    #[test]
    fn test_extreme_parameters() {
        for input in [
            r"{\rtf1\sl-2147483648 x\par}",
            r"{\rtf1\trowd\trgaph2000000000\cellx100\pard\intbl a\cell\row}",
            r"{\rtf1\trowd\trleft-2147483648\cellx2147483647\pard\intbl a\cell b\cell\row}",
            r"{\rtf1\trowd\cellx2147483647\cellx2147483647\pard\intbl a\cell b\cell\row}",
            r"{\rtf1{\pict\pngblip\picwgoal2147483647\picscalex2147483647 89504e47}}",
        ] {
            let (result, _, _) = read_with(input);
            assert!(result.is_ok(), "{}", input);
        }

        let root = read(r"{\rtf1\sl-2147483648 x\par}");
        assert!(root.elements().next().unwrap().attr("LineHeight").is_some());
    }

    #[test]
    fn test_unicode_fallback_skips_characters() {
        let root = read(r"{\rtf1\uc1\u8364éx}");
        assert_eq!(first_run(&root).text(), "\u{20AC}x");

        let root = read(r"{\rtf1\uc2\u8364é}");
        assert_eq!(first_run(&root).text(), "\u{20AC}");

        // Code page text counts bytes
        let options = ConverterOptions::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let root = read_rtf(b"{\\rtf1\\uc1\\u8364\xe9x}", false, &options, &mut payloads, &mut sink)
            .unwrap();
        assert_eq!(first_run(&root).text(), "\u{20AC}x");
    }

    #[test]
    fn test_row_preferred_width_without_edges() {
        let root = read(r"{\rtf1\trowd\clftsWidth3\clwWidth720\pard\intbl a\cell b\cell\row}");
        let table = root.elements().next().unwrap();
        let columns = table.elements().next().unwrap();
        let widths: Vec<&str> = columns.elements().filter_map(|c| c.attr("Width")).collect();
        assert_eq!(widths, ["48", "48"]);
    }
}
