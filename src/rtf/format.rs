//! Formatting state carried by each RTF group.

use super::border::{BorderSide, Borders, Shading};
use super::destination::Destination;
use super::table::{CellDef, RowFormat};
use super::types::{ColorRef, FontRef};

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Left-aligned
    #[default]
    Left,
    /// Right-aligned
    Right,
    /// Centered
    Center,
    /// Justified
    Justify,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "Left",
            Alignment::Right => "Right",
            Alignment::Center => "Center",
            Alignment::Justify => "Justify",
        }
    }

    pub fn parse(value: &str) -> Option<Alignment> {
        Some(match value.trim() {
            "Left" => Alignment::Left,
            "Right" => Alignment::Right,
            "Center" => Alignment::Center,
            "Justify" => Alignment::Justify,
            _ => return None,
        })
    }

    pub fn control_word(self) -> &'static str {
        match self {
            Alignment::Left => "ql",
            Alignment::Right => "qr",
            Alignment::Center => "qc",
            Alignment::Justify => "qj",
        }
    }
}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderlineStyle {
    /// No underline
    #[default]
    None,
    /// Single underline
    Single,
    /// Double underline
    Double,
    /// Dotted underline
    Dotted,
    /// Dashed underline
    Dashed,
    /// Word-only underline
    Words,
    /// Thick underline
    Thick,
    /// Wave underline
    Wave,
}

/// Vertical position of text relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

impl VerticalAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            VerticalAlign::Baseline => "Baseline",
            VerticalAlign::Superscript => "Superscript",
            VerticalAlign::Subscript => "Subscript",
        }
    }

    pub fn parse(value: &str) -> Option<VerticalAlign> {
        Some(match value.trim() {
            "Baseline" => VerticalAlign::Baseline,
            "Superscript" | "Top" | "TextTop" => VerticalAlign::Superscript,
            "Subscript" | "Bottom" | "TextBottom" => VerticalAlign::Subscript,
            "Center" => VerticalAlign::Baseline,
            _ => return None,
        })
    }
}

/// Character formatting.
///
/// Optional fields are `None` until a control word sets them; only set
/// values are carried into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: UnderlineStyle,
    pub strike: bool,
    pub vertical: VerticalAlign,
    /// Font number (`\fN`)
    pub font: Option<FontRef>,
    /// Size in half-points (`\fsN`)
    pub font_size: Option<i32>,
    /// Foreground color (`\cfN`)
    pub fore_color: Option<ColorRef>,
    /// Background color (`\cbN`, `\highlightN`, `\chcbpatN`)
    pub back_color: Option<ColorRef>,
    /// Language id (`\langN`)
    pub language: Option<u16>,
}

impl CharFormat {
    /// `\plain`: back to default character formatting.
    #[inline]
    pub fn plain(&mut self) {
        *self = CharFormat::default();
    }
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRef {
    /// Override index (`\lsN`)
    pub ls: i32,
    /// Level (`\ilvlN`)
    pub level: u8,
}

/// Paragraph formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParaFormat {
    pub alignment: Alignment,
    /// Left indent in twips
    pub left_indent: i32,
    /// Right indent in twips
    pub right_indent: i32,
    /// First line indent in twips
    pub first_indent: i32,
    /// Space before in twips
    pub space_before: i32,
    /// Space after in twips
    pub space_after: i32,
    /// Line spacing in twips (`\slN`); negative means exact
    pub line_spacing: i32,
    pub line_multiple: bool,
    pub borders: Borders,
    pub shading: Shading,
    /// Paragraph is part of a table (`\intbl`)
    pub in_table: bool,
    /// Table nesting level (`\itapN`)
    pub nesting: i32,
    pub list: Option<ListRef>,
}

impl ParaFormat {
    /// `\pard`: back to defaults.
    #[inline]
    pub fn reset(&mut self) {
        *self = ParaFormat::default();
    }
}

/// Box the border control words currently apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderTarget {
    Paragraph(BorderSide),
    /// All four paragraph sides (`\box`)
    ParagraphBox,
    Cell(BorderSide),
}

/// A scope frame: everything an RTF group inherits from its parent.
#[derive(Debug, Clone, Default)]
pub struct FormatState {
    pub destination: Destination,
    pub chars: CharFormat,
    pub para: ParaFormat,
    /// Current row definition
    pub row: RowFormat,
    /// Cell definition being accumulated until the next `\cellx`
    pub cell: CellDef,
    pub border_target: Option<BorderTarget>,
    /// Fallback characters to skip after `\uN` (`\ucN`)
    pub unicode_skip: usize,
}

impl FormatState {
    /// Root frame of a document.
    pub fn root() -> Self {
        Self {
            unicode_skip: 1,
            ..Default::default()
        }
    }

    /// Frame for a child group: a copy of this one.
    #[inline]
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// `\trowd`: start a new row definition.
    #[inline]
    pub fn reset_row(&mut self) {
        self.row = RowFormat::default();
        self.cell = CellDef::default();
        self.border_target = None;
    }

    /// Borders and sides the border control words currently target.
    pub fn target_borders(&mut self) -> Option<(&mut Borders, &'static [BorderSide])> {
        match self.border_target? {
            BorderTarget::Paragraph(side) => Some((&mut self.para.borders, side.as_slice())),
            BorderTarget::ParagraphBox => Some((&mut self.para.borders, &BorderSide::ALL)),
            BorderTarget::Cell(side) => Some((&mut self.cell.borders, side.as_slice())),
        }
    }
}
