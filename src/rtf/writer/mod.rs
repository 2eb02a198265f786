//! Flow-document to RTF writer.
//!
//! [`RtfWriter`] is a [`ContentHandler`]: markup events arrive in document
//! order and RTF is written as they come. Every element opens a group and
//! writes only the character formatting that differs from its parent, so the
//! group structure of the output follows the element structure of the input.
//!
//! Fonts, colors and lists are collected while the body is written; the
//! header with their tables is assembled when the document ends.

mod list;
mod output;
mod table;

pub use output::RtfOutput;

use list::ListRegistry;
use table::{CellSpec, TableState, write_border};

use super::border::{Border, BorderSide, BorderStyle, Borders, Shading};
use super::field::hyperlink_instruction;
use super::format::{Alignment, CharFormat, UnderlineStyle, VerticalAlign};
use super::list::MarkerStyle;
use super::types::{ColorRef, ColorTable, Font, FontFamily, FontRef, FontTable};
use crate::common::encoding::codepage_to_encoding;
use crate::common::unit::{px_to_half_points, px_to_twips};
use crate::common::{DiagnosticSink, Error, ErrorKind, Result};
use crate::config::ConverterOptions;
use crate::payload::PayloadProvider;
use crate::xaml::properties::{
    Decorations, Thickness, language_to_lcid, parse_color, parse_count, parse_font_style,
    parse_font_weight, parse_length,
};
use crate::xaml::{Attribute, AttributeList, ContentHandler, XML_NAMESPACE, parse_xaml};
use encoding_rs::Encoding;
use tracing::{debug, trace};

/// `\fs` value RTF readers assume when none is given.
const DEFAULT_FONT_SIZE: i32 = 24;

/// Highest list level (`\ilvl`).
const MAX_LIST_LEVEL: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Section,
    Paragraph,
    List,
    ListItem,
    Table,
    TableColumns,
    TableColumn,
    TableRowGroup,
    TableRow,
    TableCell,
    Run,
    Span,
    Bold,
    Italic,
    Underline,
    Hyperlink,
    LineBreak,
    InlineContainer,
    BlockContainer,
    Image,
    ImageSource,
    BitmapImage,
}

impl ElementKind {
    fn from_name(name: &str) -> Option<ElementKind> {
        Some(match name {
            "Section" | "FlowDocument" => ElementKind::Section,
            "Paragraph" => ElementKind::Paragraph,
            "List" => ElementKind::List,
            "ListItem" => ElementKind::ListItem,
            "Table" => ElementKind::Table,
            "Table.Columns" => ElementKind::TableColumns,
            "TableColumn" => ElementKind::TableColumn,
            "TableRowGroup" => ElementKind::TableRowGroup,
            "TableRow" => ElementKind::TableRow,
            "TableCell" => ElementKind::TableCell,
            "Run" => ElementKind::Run,
            "Span" => ElementKind::Span,
            "Bold" => ElementKind::Bold,
            "Italic" => ElementKind::Italic,
            "Underline" => ElementKind::Underline,
            "Hyperlink" => ElementKind::Hyperlink,
            "LineBreak" => ElementKind::LineBreak,
            "InlineUIContainer" => ElementKind::InlineContainer,
            "BlockUIContainer" => ElementKind::BlockContainer,
            "Image" => ElementKind::Image,
            "Image.Source" => ElementKind::ImageSource,
            "BitmapImage" => ElementKind::BitmapImage,
            _ => return None,
        })
    }

    /// Whether character data directly inside is document text.
    fn holds_text(self) -> bool {
        matches!(
            self,
            ElementKind::Paragraph
                | ElementKind::Run
                | ElementKind::Span
                | ElementKind::Bold
                | ElementKind::Italic
                | ElementKind::Underline
                | ElementKind::Hyperlink
        )
    }

    fn is_inline(self) -> bool {
        (self.holds_text() && self != ElementKind::Paragraph)
            || self == ElementKind::InlineContainer
    }

    /// Whether character formatting attributes apply.
    fn takes_character_format(self) -> bool {
        !matches!(
            self,
            ElementKind::TableColumns
                | ElementKind::TableColumn
                | ElementKind::LineBreak
                | ElementKind::Image
                | ElementKind::ImageSource
                | ElementKind::BitmapImage
        )
    }
}

/// What an element writes when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    Nothing,
    Group,
    /// `\par}`
    Paragraph,
    /// Closes `\fldrslt` and `\field`
    Field,
    /// `\cell}`; the offset detects cells without content
    Cell(usize),
    Row,
    Table,
    Image,
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    ls: i32,
    level: i32,
    marker: MarkerStyle,
    next: i32,
}

#[derive(Debug, Default)]
struct ImageFrame {
    uri: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug)]
enum FrameState {
    Plain,
    List(ListFrame),
    Item { number: i32, marked: bool },
    Image(ImageFrame),
    /// Table written as plain content of the enclosing cell
    FlatTable,
}

#[derive(Debug)]
struct Frame {
    kind: ElementKind,
    chars: CharFormat,
    preserve_space: bool,
    closing: Closing,
    state: FrameState,
}

/// Border and background attributes of a paragraph or cell.
#[derive(Debug, Default)]
struct BoxAttrs {
    thickness: Option<Thickness>,
    brush: Option<ColorRef>,
    background: Option<ColorRef>,
}

/// Attribute values of one start tag.
#[derive(Debug, Default)]
struct Attrs {
    chars: CharFormat,
    preserve_space: bool,
    alignment: Option<Alignment>,
    margin: Option<Thickness>,
    text_indent: Option<f64>,
    line_height: Option<f64>,
    frame: BoxAttrs,
    marker: Option<MarkerStyle>,
    start_index: Option<i32>,
    column_span: Option<i32>,
    row_span: Option<i32>,
    cell_spacing: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    uri: Option<String>,
    text: Option<String>,
}

/// Writes RTF from markup events.
pub struct RtfWriter<'a> {
    options: &'a ConverterOptions,
    payloads: &'a dyn PayloadProvider,
    sink: &'a mut dyn DiagnosticSink,
    encoding: &'static Encoding,
    body: RtfOutput,
    fonts: FontTable,
    colors: ColorTable,
    lists: ListRegistry,
    /// Open elements; index 0 stands for the document itself
    frames: Vec<Frame>,
    tables: Vec<TableState>,
    /// Depth inside a skipped element
    skipping: usize,
    output: Option<String>,
}

impl<'a> RtfWriter<'a> {
    pub fn new(
        options: &'a ConverterOptions,
        payloads: &'a dyn PayloadProvider,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let encoding =
            codepage_to_encoding(options.code_page as u32).unwrap_or(encoding_rs::WINDOWS_1252);
        let mut fonts = FontTable::new();
        fonts.insert(0, Font::new(options.default_font.as_str(), FontFamily::Nil, None));
        Self {
            options,
            payloads,
            sink,
            encoding,
            body: RtfOutput::new(encoding),
            fonts,
            colors: ColorTable::with_auto(),
            lists: ListRegistry::new(),
            frames: vec![Frame {
                kind: ElementKind::Section,
                chars: CharFormat::default(),
                preserve_space: false,
                closing: Closing::Nothing,
                state: FrameState::Plain,
            }],
            tables: Vec::new(),
            skipping: 0,
            output: None,
        }
    }

    /// The finished document.
    pub fn finish(self) -> Result<String> {
        self.output.ok_or_else(|| {
            Error::Structural("Markup ended before the document was complete".to_string())
        })
    }

    #[inline]
    fn top(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn warn(&mut self, message: &str) {
        self.sink.warn(ErrorKind::Semantic, message);
    }

    fn invalid(&mut self, name: &str, value: &str) {
        self.warn(&format!("Invalid value '{}' for {} ignored", value, name));
    }

    fn font_ref(&mut self, value: &str) -> Option<FontRef> {
        let name = value
            .split(',')
            .next()
            .map(|n| n.trim().trim_matches('\''))
            .filter(|n| !n.is_empty())?;
        Some(self.fonts.add_font(name))
    }

    /// Color table index of a brush; `None` for transparent or invalid
    /// brushes.
    fn brush(&mut self, name: &str, value: &str) -> Option<ColorRef> {
        match parse_color(value) {
            Some(color) => Some(self.colors.add_color(color)),
            None => {
                let value = value.trim();
                let transparent = value.eq_ignore_ascii_case("transparent")
                    || (value.len() == 9 && value.starts_with("#00"));
                if !transparent {
                    self.invalid(name, value);
                }
                None
            },
        }
    }

    fn length(&mut self, name: &str, value: &str) -> Option<f64> {
        let length = parse_length(value);
        if length.is_none() {
            self.invalid(name, value);
        }
        length
    }

    fn thickness(&mut self, name: &str, value: &str) -> Option<Thickness> {
        let thickness = Thickness::parse(value);
        if thickness.is_none() {
            self.invalid(name, value);
        }
        thickness
    }

    fn count(&mut self, name: &str, value: &str) -> Option<i32> {
        let count = parse_count(value).filter(|n| *n > 0);
        if count.is_none() {
            self.invalid(name, value);
        }
        count
    }

    /// Like [`count`](Self::count), clamping values above `max`.
    fn bounded_count(&mut self, name: &str, value: &str, max: i32) -> Option<i32> {
        let count = self.count(name, value)?;
        if count > max {
            self.warn(&format!("{} {} clamped to {}", name, count, max));
        }
        Some(count.min(max))
    }

    fn read_attribute(
        &mut self,
        kind: ElementKind,
        element: &str,
        attribute: &Attribute,
        attrs: &mut Attrs,
    ) {
        let value = attribute.value.as_str();
        if attribute.namespace_uri == XML_NAMESPACE {
            match attribute.local_name.as_str() {
                "space" => attrs.preserve_space = value == "preserve",
                "lang" => match language_to_lcid(value) {
                    Some(lcid) => attrs.chars.language = Some(lcid),
                    None => self.invalid("xml:lang", value),
                },
                _ => {},
            }
            return;
        }
        if !attribute.namespace_uri.is_empty() {
            trace!(attribute = %attribute.qualified_name, "Skipping namespaced attribute");
            return;
        }

        let name = attribute.local_name.as_str();
        if kind.takes_character_format() && self.character_attribute(kind, name, value, attrs) {
            return;
        }
        use ElementKind as K;
        match (kind, name) {
            (K::Paragraph, "TextAlignment") => match Alignment::parse(value) {
                Some(alignment) => attrs.alignment = Some(alignment),
                None => self.invalid(name, value),
            },
            (K::Paragraph, "Margin") => attrs.margin = self.thickness(name, value),
            (K::Paragraph, "TextIndent") => attrs.text_indent = self.length(name, value),
            (K::Paragraph, "LineHeight") => {
                if !value.trim().eq_ignore_ascii_case("auto") {
                    attrs.line_height = self.length(name, value);
                }
            },
            (K::Paragraph | K::TableCell, "BorderThickness") => {
                attrs.frame.thickness = self.thickness(name, value)
            },
            (K::Paragraph | K::TableCell, "BorderBrush") => {
                attrs.frame.brush = self.brush(name, value)
            },
            (K::Paragraph | K::TableCell, "Background") => {
                attrs.frame.background = self.brush(name, value)
            },
            (K::List, "MarkerStyle") => match MarkerStyle::parse(value) {
                Some(marker) => attrs.marker = Some(marker),
                None => self.invalid(name, value),
            },
            (K::List, "StartIndex") => {
                let max = self.options.limits.max_list_start;
                attrs.start_index = self.bounded_count(name, value, max);
            },
            (K::TableCell, "ColumnSpan") => {
                let max = self.options.limits.max_column_span;
                attrs.column_span = self.bounded_count(name, value, max);
            },
            (K::TableCell, "RowSpan") => {
                let max = self.options.limits.max_row_span;
                attrs.row_span = self.bounded_count(name, value, max);
            },
            (K::Table, "CellSpacing") => attrs.cell_spacing = self.length(name, value),
            (K::TableColumn, "Width") => {
                let value = value.trim();
                if !value.eq_ignore_ascii_case("auto") && !value.ends_with('*') {
                    attrs.width = self.length(name, value);
                }
            },
            (K::Image, "Width") => attrs.width = self.length(name, value),
            (K::Image, "Height") => attrs.height = self.length(name, value),
            (K::Image, "Source")
            | (K::BitmapImage, "UriSource")
            | (K::Hyperlink, "NavigateUri") => {
                attrs.uri = Some(value.to_string())
            },
            (K::Run, "Text") => attrs.text = Some(value.to_string()),
            _ => self.warn(&format!(
                "Unsupported attribute '{}' on <{}> ignored",
                attribute.qualified_name, element
            )),
        }
    }

    /// Apply a character formatting attribute; `false` if `name` is not one.
    fn character_attribute(
        &mut self,
        kind: ElementKind,
        name: &str,
        value: &str,
        attrs: &mut Attrs,
    ) -> bool {
        let chars = &mut attrs.chars;
        match name {
            "FontFamily" => match self.font_ref(value) {
                Some(font) => chars.font = Some(font),
                None => self.invalid(name, value),
            },
            "FontSize" => match parse_length(value).filter(|px| *px > 0.0) {
                Some(px) => {
                    chars.font_size =
                        Some(self.options.limits.clamp_font_size(px_to_half_points(px)))
                },
                None => self.invalid(name, value),
            },
            "FontWeight" => match parse_font_weight(value) {
                Some(bold) => chars.bold = bold,
                None => self.invalid(name, value),
            },
            "FontStyle" => match parse_font_style(value) {
                Some(italic) => chars.italic = italic,
                None => self.invalid(name, value),
            },
            "TextDecorations" => match Decorations::parse(value) {
                Some(decorations) => {
                    chars.underline = if decorations.underline {
                        UnderlineStyle::Single
                    } else {
                        UnderlineStyle::None
                    };
                    chars.strike = decorations.strikethrough;
                },
                None => self.invalid(name, value),
            },
            "BaselineAlignment" => match VerticalAlign::parse(value) {
                Some(vertical) => chars.vertical = vertical,
                None => self.invalid(name, value),
            },
            "Foreground" => chars.fore_color = self.brush(name, value),
            "Background" if kind.is_inline() => chars.back_color = self.brush(name, value),
            _ => return false,
        }
        true
    }

    /// Write the character formatting that differs between `from` and `to`.
    fn write_char_delta(&mut self, from: &CharFormat, to: &CharFormat) {
        let out = &mut self.body;
        if from.bold != to.bold {
            out.control_word("b", (!to.bold).then_some(0));
        }
        if from.italic != to.italic {
            out.control_word("i", (!to.italic).then_some(0));
        }
        if from.underline != to.underline {
            match to.underline {
                UnderlineStyle::None => out.control_word("ulnone", None),
                _ => out.control_word("ul", None),
            }
        }
        if from.strike != to.strike {
            out.control_word("strike", (!to.strike).then_some(0));
        }
        if from.vertical != to.vertical {
            out.control_word(
                match to.vertical {
                    VerticalAlign::Superscript => "super",
                    VerticalAlign::Subscript => "sub",
                    VerticalAlign::Baseline => "nosupersub",
                },
                None,
            );
        }
        if from.font != to.font {
            out.control_word("f", Some(to.font.unwrap_or(0)));
        }
        if from.font_size != to.font_size {
            out.control_word("fs", Some(to.font_size.unwrap_or(DEFAULT_FONT_SIZE)));
        }
        if from.fore_color != to.fore_color {
            out.control_word("cf", Some(to.fore_color.unwrap_or(0) as i32));
        }
        if from.back_color != to.back_color {
            out.control_word("chcbpat", Some(to.back_color.unwrap_or(0) as i32));
        }
        if from.language != to.language {
            let lcid = to.language.unwrap_or(self.options.default_language);
            out.control_word("lang", Some(lcid as i32));
        }
    }

    fn borders(&self, frame: &BoxAttrs) -> Borders {
        let mut borders = Borders::new();
        let Some(thickness) = frame.thickness else {
            return borders;
        };
        for (side, px) in [
            (BorderSide::Left, thickness.left),
            (BorderSide::Top, thickness.top),
            (BorderSide::Right, thickness.right),
            (BorderSide::Bottom, thickness.bottom),
        ] {
            let width = self.options.limits.clamp_border_width(px_to_twips(px));
            if width > 0 {
                *borders.side_mut(side) = Border {
                    style: BorderStyle::Single,
                    width,
                    color_ref: frame.brush,
                };
            }
        }
        borders
    }

    fn in_cell(&self) -> bool {
        self.frames.iter().any(|f| f.kind == ElementKind::TableCell)
    }

    /// Whether rows and cells of the innermost table are written as plain
    /// content.
    fn table_is_flat(&self) -> bool {
        self.frames
            .iter()
            .rev()
            .find(|f| f.kind == ElementKind::Table)
            .is_none_or(|f| matches!(f.state, FrameState::FlatTable))
    }

    /// `\ls`, `\ilvl` and the marker text for a paragraph of a list item.
    /// The marker is only given for the item's first paragraph.
    fn list_context(&mut self) -> Option<(i32, i32, Option<String>)> {
        let position = self
            .frames
            .iter()
            .rposition(|f| matches!(f.kind, ElementKind::ListItem | ElementKind::TableCell))?;
        let list = self.frames[..position].iter().rev().find_map(|f| match f.state {
            FrameState::List(list) => Some(list),
            _ => None,
        })?;
        let FrameState::Item { number, marked } = &mut self.frames[position].state else {
            return None;
        };
        let marker = (!*marked).then(|| list.marker.marker_text(*number));
        *marked = true;
        Some((list.ls, list.level, marker))
    }

    fn open_paragraph(&mut self, attrs: &Attrs) {
        self.body.open();
        self.body.control_word("pard", None);
        if self.in_cell() {
            self.body.control_word("intbl", None);
        }
        if let Some((ls, level, marker)) = self.list_context() {
            self.body.control_word("ls", Some(ls));
            self.body.control_word("ilvl", Some(level));
            if let Some(marker) = marker.filter(|_| self.options.emit_list_text) {
                self.body.open();
                self.body.control_word("listtext", None);
                self.body.text(&marker);
                self.body.control_word("tab", None);
                self.body.close();
            }
        }

        let out = &mut self.body;
        if let Some(alignment) = attrs.alignment.filter(|a| *a != Alignment::Left) {
            out.control_word(alignment.control_word(), None);
        }
        if let Some(margin) = attrs.margin {
            for (word, px) in [
                ("li", margin.left),
                ("ri", margin.right),
                ("sb", margin.top),
                ("sa", margin.bottom),
            ] {
                let twips = px_to_twips(px);
                if twips != 0 {
                    out.control_word(word, Some(twips));
                }
            }
        }
        if let Some(indent) = attrs.text_indent.map(px_to_twips).filter(|t| *t != 0) {
            out.control_word("fi", Some(indent));
        }
        if let Some(height) = attrs.line_height.map(px_to_twips).filter(|t| *t > 0) {
            out.control_word("sl", Some(height));
            out.control_word("slmult", Some(0));
        }

        let borders = self.borders(&attrs.frame);
        let out = &mut self.body;
        if borders.has_any_border() {
            let uniform = borders.top == borders.bottom
                && borders.top == borders.left
                && borders.top == borders.right;
            if uniform {
                out.control_word("box", None);
                write_border(out, &borders.top);
            } else {
                for (side, word) in [
                    (BorderSide::Top, "brdrt"),
                    (BorderSide::Left, "brdrl"),
                    (BorderSide::Bottom, "brdrb"),
                    (BorderSide::Right, "brdrr"),
                ] {
                    let border = borders.side(side);
                    if border.is_visible() {
                        out.control_word(word, None);
                        write_border(out, border);
                    }
                }
            }
        }
        if let Some(background) = attrs.frame.background {
            out.control_word("cbpat", Some(background as i32));
        }
    }

    /// Write the start of an element and return its frame.
    fn open_element(&mut self, kind: ElementKind, attrs: Attrs) -> Frame {
        let parent_chars = self.top().chars;
        let mut closing = Closing::Group;
        let mut state = FrameState::Plain;
        let mut delta = true;

        match kind {
            ElementKind::Paragraph => {
                self.open_paragraph(&attrs);
                closing = Closing::Paragraph;
            },
            ElementKind::BlockContainer => {
                self.body.open();
                self.body.control_word("pard", None);
                if self.in_cell() {
                    self.body.control_word("intbl", None);
                }
                closing = Closing::Paragraph;
            },
            ElementKind::List => {
                let marker = attrs.marker.unwrap_or_default();
                let start = attrs.start_index.unwrap_or(1);
                let level = self
                    .frames
                    .iter()
                    .filter(|f| f.kind == ElementKind::List)
                    .count()
                    .min(MAX_LIST_LEVEL as usize) as i32;
                let ls = self.lists.define(marker, start);
                state = FrameState::List(ListFrame {
                    ls,
                    level,
                    marker,
                    next: start,
                });
                self.body.open();
            },
            ElementKind::ListItem => {
                let number = self
                    .frames
                    .iter_mut()
                    .rev()
                    .find_map(|f| match &mut f.state {
                        FrameState::List(list) => {
                            let number = list.next;
                            list.next = number.saturating_add(1);
                            Some(number)
                        },
                        _ => None,
                    })
                    .unwrap_or(1);
                state = FrameState::Item {
                    number,
                    marked: false,
                };
                self.body.open();
            },
            ElementKind::Table => {
                if self.in_cell() {
                    state = FrameState::FlatTable;
                } else {
                    let gap = attrs.cell_spacing.map_or(0, |px| px_to_twips(px) / 2);
                    self.tables
                        .push(TableState::new(gap, self.options.default_column_width));
                    closing = Closing::Table;
                }
                self.body.open();
            },
            ElementKind::TableColumn => {
                if !self.table_is_flat()
                    && let Some(table) = self.tables.last_mut()
                {
                    table.add_column(attrs.width.map(px_to_twips).filter(|w| *w > 0));
                }
                closing = Closing::Nothing;
                delta = false;
            },
            ElementKind::TableRow if !self.table_is_flat() => {
                self.body.open();
                let offset = self.body.len();
                if let Some(table) = self.tables.last_mut() {
                    table.start_row(offset);
                }
                closing = Closing::Row;
            },
            ElementKind::TableCell if !self.table_is_flat() => {
                self.write_covered_cells(false);
                let spec = CellSpec {
                    column_span: attrs.column_span.unwrap_or(1) as usize,
                    row_span: attrs.row_span.unwrap_or(1) as usize,
                    borders: self.borders(&attrs.frame),
                    shading: Shading {
                        back: attrs.frame.background,
                        ..Default::default()
                    },
                };
                if let Some(table) = self.tables.last_mut() {
                    table.start_cell(&spec);
                }
                self.body.open();
                self.write_char_delta(&parent_chars, &attrs.chars);
                delta = false;
                closing = Closing::Cell(self.body.len());
            },
            ElementKind::Hyperlink if attrs.uri.is_some() => {
                let uri = attrs.uri.as_deref().unwrap_or_default();
                self.body.open();
                self.body.control_word("field", None);
                self.body.ignorable_destination("fldinst");
                self.body.text(&hyperlink_instruction(uri));
                self.body.close();
                self.body.open();
                self.body.control_word("fldrslt", None);
                closing = Closing::Field;
            },
            ElementKind::LineBreak => {
                self.body.control_word("line", None);
                closing = Closing::Nothing;
                delta = false;
            },
            ElementKind::Image => {
                state = FrameState::Image(ImageFrame {
                    uri: attrs.uri.clone(),
                    width: attrs.width,
                    height: attrs.height,
                });
                closing = Closing::Image;
                delta = false;
            },
            ElementKind::BitmapImage => {
                if let Some(uri) = attrs.uri.clone()
                    && let Some(FrameState::Image(image)) =
                        self.frames.iter_mut().rev().map(|f| &mut f.state).find(|s| {
                            matches!(s, FrameState::Image(_))
                        })
                {
                    image.uri = Some(uri);
                }
                closing = Closing::Nothing;
                delta = false;
            },
            ElementKind::TableColumns | ElementKind::ImageSource => {
                closing = Closing::Nothing;
                delta = false;
            },
            _ => self.body.open(),
        }

        if delta {
            self.write_char_delta(&parent_chars, &attrs.chars);
        }
        if let Some(text) = &attrs.text {
            self.write_text(text, attrs.preserve_space);
        }
        Frame {
            kind,
            chars: if kind.takes_character_format() { attrs.chars } else { parent_chars },
            preserve_space: attrs.preserve_space,
            closing,
            state,
        }
    }

    /// Write empty cells for columns a vertical merge from an earlier row
    /// still covers: those before the next cell, or all remaining ones at
    /// the end of a row.
    fn write_covered_cells(&mut self, trailing: bool) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        loop {
            if table.take_covered() {
                self.body.open();
                self.body.control_word("pard", None);
                self.body.control_word("intbl", None);
                self.body.control_word("cell", None);
                self.body.close();
            } else if trailing && table.has_trailing_covered() {
                table.skip_column();
            } else {
                break;
            }
        }
    }

    fn close_element(&mut self, frame: Frame) {
        match frame.closing {
            Closing::Nothing => {},
            Closing::Group => self.body.close(),
            Closing::Paragraph => {
                self.body.control_word("par", None);
                self.body.close();
            },
            Closing::Field => {
                self.body.close();
                self.body.close();
            },
            Closing::Cell(offset) => {
                if self.body.len() == offset {
                    self.body.control_word("pard", None);
                    self.body.control_word("intbl", None);
                }
                self.body.control_word("cell", None);
                self.body.close();
            },
            Closing::Row => {
                self.write_covered_cells(true);
                if let Some(table) = self.tables.last_mut() {
                    table.end_row(&mut self.body);
                }
                self.body.control_word("row", None);
                self.body.close();
            },
            Closing::Table => {
                self.tables.pop();
                self.body.close();
            },
            Closing::Image => {
                if let FrameState::Image(image) = frame.state {
                    self.write_image(image);
                }
            },
        }
    }

    fn write_image(&mut self, image: ImageFrame) {
        let Some(uri) = image.uri else {
            self.warn("Image without a source skipped");
            return;
        };
        let payloads = self.payloads;
        let Some(payload) = payloads.fetch(&uri) else {
            self.warn(&format!("No payload for image '{}'; image skipped", uri));
            return;
        };
        let metafile = payload.image_type.is_metafile();
        let out = &mut self.body;
        out.open();
        out.control_word("pict", None);
        out.control_word(payload.image_type.blip_control(), None);
        for (size, natural, goal) in [
            (image.width, "picw", "picwgoal"),
            (image.height, "pich", "pichgoal"),
        ] {
            if let Some(px) = size {
                // Metafile extents are in hundredths of a millimeter
                let extent = if metafile { px * 2540.0 / 96.0 } else { px };
                out.control_word(natural, Some(extent.round() as i32));
                out.control_word(goal, Some(px_to_twips(px)));
            }
        }
        out.hex_data(&payload.data);
        out.close();
    }

    fn write_text(&mut self, text: &str, preserve_space: bool) {
        if preserve_space {
            self.body.text(text);
            return;
        }
        let mut collapsed = String::with_capacity(text.len());
        let mut in_space = false;
        for ch in text.chars() {
            if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                if !in_space {
                    collapsed.push(' ');
                }
                in_space = true;
            } else {
                collapsed.push(ch);
                in_space = false;
            }
        }
        self.body.text(&collapsed);
    }

    fn write_header(&self, head: &mut RtfOutput) {
        head.open();
        head.control_word("rtf", Some(1));
        head.control_word("ansi", None);
        head.control_word("ansicpg", Some(self.options.code_page as i32));
        head.control_word("uc", Some(1));
        head.control_word("deff", Some(0));
        head.control_word("deflang", Some(self.options.default_language as i32));

        head.open();
        head.control_word("fonttbl", None);
        for (number, font) in self.fonts.fonts() {
            head.open();
            head.control_word("f", Some(number));
            head.control_word(font.family.control_word(), None);
            head.text(&font.name);
            head.raw(";");
            head.close();
        }
        head.close();

        head.open();
        head.control_word("colortbl", None);
        for entry in self.colors.entries() {
            if !entry.is_auto {
                head.control_word("red", Some(entry.color.red as i32));
                head.control_word("green", Some(entry.color.green as i32));
                head.control_word("blue", Some(entry.color.blue as i32));
            }
            head.raw(";");
        }
        head.close();

        self.lists.write(head);
    }
}

impl ContentHandler for RtfWriter<'_> {
    fn end_document(&mut self) -> Result<()> {
        let mut head = RtfOutput::new(self.encoding);
        self.write_header(&mut head);
        let mut rtf = head.into_string();
        rtf.push_str(self.body.as_str());
        rtf.push('}');
        debug!(
            fonts = self.fonts.len(),
            colors = self.colors.len(),
            bytes = rtf.len(),
            "RTF document written"
        );
        self.output = Some(rtf);
        Ok(())
    }

    fn start_element(
        &mut self,
        _namespace_uri: &str,
        local_name: &str,
        qualified_name: &str,
        attributes: &AttributeList,
    ) -> Result<()> {
        if self.skipping > 0 {
            self.skipping += 1;
            return Ok(());
        }
        let Some(kind) = ElementKind::from_name(local_name) else {
            self.warn(&format!("Unsupported element <{}> skipped", qualified_name));
            self.skipping = 1;
            return Ok(());
        };

        let parent = self.top();
        let mut attrs = Attrs {
            chars: parent.chars,
            preserve_space: parent.preserve_space,
            ..Default::default()
        };
        match kind {
            ElementKind::Bold => attrs.chars.bold = true,
            ElementKind::Italic => attrs.chars.italic = true,
            ElementKind::Underline => attrs.chars.underline = UnderlineStyle::Single,
            _ => {},
        }
        for attribute in attributes.iter() {
            self.read_attribute(kind, qualified_name, attribute, &mut attrs);
        }
        let frame = self.open_element(kind, attrs);
        self.frames.push(frame);
        Ok(())
    }

    fn end_element(
        &mut self,
        _namespace_uri: &str,
        _local_name: &str,
        qualified_name: &str,
    ) -> Result<()> {
        if self.skipping > 0 {
            self.skipping -= 1;
            return Ok(());
        }
        if self.frames.len() < 2 {
            return Err(Error::Structural(format!("Unexpected end of <{}>", qualified_name)));
        }
        if let Some(frame) = self.frames.pop() {
            self.close_element(frame);
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if self.skipping > 0 {
            return Ok(());
        }
        let top = self.top();
        if !top.kind.holds_text() {
            if !text.trim().is_empty() {
                self.warn("Text outside a paragraph ignored");
            }
            return Ok(());
        }
        let preserve_space = top.preserve_space;
        self.write_text(text, preserve_space);
        Ok(())
    }
}

/// Convert flow-document markup to RTF.
pub fn write_rtf(
    xaml: &str,
    options: &ConverterOptions,
    payloads: &dyn PayloadProvider,
    sink: &mut dyn DiagnosticSink,
) -> Result<String> {
    let mut writer = RtfWriter::new(options, payloads, sink);
    parse_xaml(xaml, &mut writer, options.limits.max_group_depth)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Diagnostic;
    use crate::payload::{MemoryPayloadStore, Payload};
    use crate::rtf::picture::ImageType;

    const NS: &str = "xmlns=\"http://schemas.microsoft.com/winfx/2006/xaml/presentation\"";

    fn write_with(
        xaml: &str,
        options: &ConverterOptions,
        payloads: &MemoryPayloadStore,
    ) -> (String, Vec<Diagnostic>) {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let rtf = write_rtf(xaml, options, payloads, &mut sink).unwrap();
        (rtf, sink)
    }

    fn write(body: &str) -> (String, Vec<Diagnostic>) {
        let xaml = format!("<Section {} xml:space=\"preserve\">{}</Section>", NS, body);
        write_with(&xaml, &ConverterOptions::default(), &MemoryPayloadStore::new())
    }

    fn body(rtf: &str) -> &str {
        let start = rtf.rfind("{\\colortbl").unwrap();
        let end = start + rtf[start..].find('}').unwrap() + 1;
        &rtf[end..]
    }

    #[test]
    fn test_header_and_simple_paragraph() {
        let (rtf, diagnostics) = write("<Paragraph><Run>Hello</Run></Paragraph>");
        assert!(diagnostics.is_empty());
        assert_eq!(
            rtf,
            "{\\rtf1\\ansi\\ansicpg1252\\uc1\\deff0\\deflang1033\
             {\\fonttbl{\\f0\\fnil Times New Roman;}}{\\colortbl;}\
             {{\\pard{Hello}\\par}}}"
        );
    }

    #[test]
    fn test_character_delta() {
        let (rtf, _) = write(
            "<Paragraph FontSize=\"16\"><Bold>a<Italic FontFamily=\"Arial\">b</Italic></Bold>\
             <Run Foreground=\"#FFFF0000\" BaselineAlignment=\"Superscript\" xml:lang=\"de-DE\">c</Run></Paragraph>",
        );
        assert!(rtf.contains("{\\f0\\fnil Times New Roman;}{\\f1\\fnil Arial;}"));
        assert!(rtf.contains("{\\colortbl;\\red255\\green0\\blue0;}"));
        assert_eq!(
            body(&rtf),
            "{{\\pard\\fs24{\\b a{\\i\\f1 b}}{\\super\\cf1\\lang1031 c}\\par}}}"
        );
    }

    #[test]
    fn test_paragraph_properties() {
        let (rtf, _) = write(
            "<Paragraph TextAlignment=\"Center\" Margin=\"96,10,0,0\" TextIndent=\"-20\" \
             LineHeight=\"24\" BorderThickness=\"2\" BorderBrush=\"#FF0000FF\" Background=\"#FF00FF00\">x</Paragraph>",
        );
        assert!(body(&rtf).starts_with(
            "{{\\pard\\qc\\li1440\\sb150\\fi-300\\sl360\\slmult0\\box\\brdrs\\brdrw30\\brdrcf1\\cbpat2 x\\par}"
        ));
    }

    #[test]
    fn test_side_borders() {
        let (rtf, _) = write("<Paragraph BorderThickness=\"0,1,0,0\">x</Paragraph>");
        assert!(body(&rtf).contains("\\pard\\brdrt\\brdrs\\brdrw15 x"));
    }

    #[test]
    fn test_whitespace_handling() {
        let xaml = format!(
            "<Section {}>\n  <Paragraph>  a \n\t b  </Paragraph>\n</Section>",
            NS
        );
        let (rtf, diagnostics) =
            write_with(&xaml, &ConverterOptions::default(), &MemoryPayloadStore::new());
        assert!(diagnostics.is_empty());
        assert_eq!(body(&rtf), "{{\\pard  a b \\par}}}");

        let (rtf, _) = write("<Paragraph>a\tb</Paragraph>");
        assert!(body(&rtf).contains("a\\tab b"));
    }

    #[test]
    fn test_text_outside_paragraph_warns() {
        let (_, diagnostics) = write("stray");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorKind::Semantic);
    }

    #[test]
    fn test_unknown_element_and_attribute() {
        let (rtf, diagnostics) = write(
            "<Paragraph Padding=\"3\">a<Figure><Paragraph>hidden</Paragraph></Figure>b</Paragraph>",
        );
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].message.contains("Padding"));
        assert!(diagnostics[1].message.contains("Figure"));
        assert!(!rtf.contains("hidden"));
        assert!(body(&rtf).contains(" ab\\par"));
    }

    #[test]
    fn test_hyperlink_and_line_break() {
        let (rtf, _) = write(
            "<Paragraph><Hyperlink NavigateUri=\"http://example.com/\">link</Hyperlink><LineBreak/>next</Paragraph>",
        );
        assert!(body(&rtf).contains(
            "{\\field{\\*\\fldinst HYPERLINK \"http://example.com/\"}{\\fldrslt link}}\\line next"
        ));
    }

    #[test]
    fn test_lists() {
        let (rtf, _) = write(
            "<List MarkerStyle=\"Decimal\" StartIndex=\"3\">\
             <ListItem><Paragraph>one</Paragraph></ListItem>\
             <ListItem><Paragraph>two</Paragraph><List><ListItem><Paragraph>inner</Paragraph></ListItem></List></ListItem>\
             </List>",
        );
        assert!(rtf.contains("\\levelstartat3{\\leveltext\\'02\\'00.;}"));
        assert!(rtf.contains("\\listoverride\\listid2\\listoverridecount0\\ls2}"));
        let body = body(&rtf);
        assert!(body.contains("{\\pard\\ls1\\ilvl0{\\listtext 3.\\tab}one\\par}"));
        assert!(body.contains("{\\listtext 4.\\tab}two"));
        assert!(body.contains("{\\pard\\ls2\\ilvl1{\\listtext\\'95\\tab}inner\\par}"));
    }

    #[test]
    fn test_list_text_can_be_disabled() {
        let xaml = format!(
            "<Section {}><List><ListItem><Paragraph>a</Paragraph></ListItem></List></Section>",
            NS
        );
        let options = ConverterOptions::default().with_list_text(false);
        let (rtf, _) = write_with(&xaml, &options, &MemoryPayloadStore::new());
        assert!(!rtf.contains("\\listtext"));
        assert!(rtf.contains("\\ls1\\ilvl0 a"));
    }

    #[test]
    fn test_table() {
        let (rtf, _) = write(
            "<Table CellSpacing=\"4\"><Table.Columns><TableColumn Width=\"96\"/><TableColumn Width=\"192\"/></Table.Columns>\
             <TableRowGroup><TableRow><TableCell Background=\"#FFFF0000\"><Paragraph>a</Paragraph></TableCell><TableCell/></TableRow>\
             <TableRow><TableCell ColumnSpan=\"2\"><Paragraph>b</Paragraph></TableCell></TableRow></TableRowGroup></Table>",
        );
        let body = body(&rtf);
        assert!(body.contains(
            "{\\trowd\\trgaph30\\trleft0\\clcbpat1\\clftsWidth3\\clwWidth1440\\cellx1440\
             \\clftsWidth3\\clwWidth2880\\cellx4320{{\\pard\\intbl a\\par}\\cell}{\\pard\\intbl\\cell}\\row}"
        ));
        assert!(body.contains(
            "{\\trowd\\trgaph30\\trleft0\\clftsWidth3\\clwWidth4320\\cellx4320{{\\pard\\intbl b\\par}\\cell}\\row}"
        ));
    }

    #[test]
    fn test_table_row_span() {
        let (rtf, _) = write(
            "<Table><TableRowGroup>\
             <TableRow><TableCell RowSpan=\"2\"><Paragraph>a</Paragraph></TableCell><TableCell><Paragraph>b</Paragraph></TableCell></TableRow>\
             <TableRow><TableCell><Paragraph>c</Paragraph></TableCell></TableRow>\
             </TableRowGroup></Table>",
        );
        let body = body(&rtf);
        assert!(body.contains("\\trleft0\\clvmgf\\clftsWidth3\\clwWidth2880\\cellx2880"));
        assert!(body.contains(
            "{\\trowd\\trleft0\\clvmrg\\clftsWidth3\\clwWidth2880\\cellx2880\\clftsWidth3\\clwWidth2880\\cellx5760\
             {\\pard\\intbl\\cell}{{\\pard\\intbl c\\par}\\cell}\\row}"
        ));
    }

    #[test]
    fn test_nested_table_is_flattened() {
        let (rtf, _) = write(
            "<Table><TableRowGroup><TableRow><TableCell>\
             <Table><TableRowGroup><TableRow><TableCell><Paragraph>inner</Paragraph></TableCell></TableRow></TableRowGroup></Table>\
             </TableCell></TableRow></TableRowGroup></Table>",
        );
        assert_eq!(rtf.matches("\\trowd").count(), 1);
        assert_eq!(rtf.matches("\\cell}").count(), 1);
        assert!(rtf.contains("{\\pard\\intbl inner\\par}"));
    }

    #[test]
    fn test_image() {
        let mut payloads = MemoryPayloadStore::new();
        payloads.insert(
            "./Image1.png",
            Payload {
                image_type: ImageType::Png,
                data: vec![0x89, 0x50, 0x4E, 0x47],
            },
        );
        let xaml = format!(
            "<Section {}><Paragraph><InlineUIContainer><Image Width=\"96\" Height=\"48\">\
             <Image.Source><BitmapImage UriSource=\"./Image1.png\"/></Image.Source></Image>\
             </InlineUIContainer><InlineUIContainer><Image Source=\"./Missing.png\"/></InlineUIContainer></Paragraph></Section>",
            NS
        );
        let (rtf, diagnostics) = write_with(&xaml, &ConverterOptions::default(), &payloads);
        assert!(rtf.contains("{{\\pict\\pngblip\\picw96\\picwgoal1440\\pich48\\pichgoal720 89504e47}}"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("./Missing.png"));
    }

    #[test]
    fn test_code_page_escapes() {
        let xaml = format!("<Section {}><Paragraph>Привет €</Paragraph></Section>", NS);
        let options = ConverterOptions::default().with_code_page(1251);
        let (rtf, _) = write_with(&xaml, &options, &MemoryPayloadStore::new());
        assert!(rtf.starts_with("{\\rtf1\\ansi\\ansicpg1251"));
        assert!(rtf.contains("\\'cf\\'f0\\'e8\\'e2\\'e5\\'f2 \\'88"));
    }

    #[test]
    fn test_unbalanced_events_fail() {
        let options = ConverterOptions::default();
        let payloads = MemoryPayloadStore::new();
        let mut sink = crate::common::NullSink;
        let mut writer = RtfWriter::new(&options, &payloads, &mut sink);
        assert!(writer.end_element("", "Paragraph", "Paragraph").is_err());
        let mut sink2 = crate::common::NullSink;
        let writer = RtfWriter::new(&options, &payloads, &mut sink2);
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_oversized_counts_are_clamped() {
        let (rtf, diagnostics) = write(
            "<List MarkerStyle=\"UpperLatin\" StartIndex=\"2147483647\">\
             <ListItem><Paragraph>a</Paragraph></ListItem>\
             <ListItem><Paragraph>b</Paragraph></ListItem></List>\
             <Table><TableRowGroup><TableRow><TableCell ColumnSpan=\"1000000\">\
             <Paragraph>c</Paragraph></TableCell></TableRow></TableRowGroup></Table>",
        );
        assert!(rtf.contains("\\levelstartat32767"));
        assert!(body(&rtf).contains("{\\listtext 32768.\\tab}b"));
        assert!(body(&rtf).contains("\\clwWidth181440\\cellx181440"));
        assert!(diagnostics[0].message.contains("StartIndex 2147483647 clamped to 32767"));
        assert!(diagnostics[1].message.contains("ColumnSpan 1000000 clamped to 63"));
    }
}
