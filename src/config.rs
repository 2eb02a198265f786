//! Configuration for RTF ↔ XAML conversion.

use crate::common::encoding::{DEFAULT_CODE_PAGE, codepage_to_encoding};
use crate::common::{Error, Result};

/// Numeric bounds applied to values read from either side.
///
/// These are historical limits of RTF producers. Values outside them are
/// clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum shading in hundredths of a percent (`\shadingN`)
    pub max_shading: i32,
    /// Maximum border width in twips (`\brdrwN`)
    pub max_border_width: i32,
    /// Minimum font size in half-points
    pub min_font_size: i32,
    /// Maximum font size in half-points
    pub max_font_size: i32,
    /// Maximum RTF group nesting depth; deeper input is a structural error
    pub max_group_depth: usize,
    /// Maximum `ColumnSpan` of a markup table cell
    pub max_column_span: i32,
    /// Maximum `RowSpan` of a markup table cell
    pub max_row_span: i32,
    /// Maximum `StartIndex` of a markup list
    pub max_list_start: i32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_shading: 10_000,
            max_border_width: 75,
            min_font_size: 2,
            max_font_size: 3276,
            max_group_depth: 4096,
            max_column_span: 63,
            max_row_span: 32_767,
            max_list_start: 32_767,
        }
    }
}

impl Limits {
    #[inline]
    pub fn clamp_shading(&self, value: i32) -> i32 {
        value.clamp(0, self.max_shading)
    }

    #[inline]
    pub fn clamp_border_width(&self, value: i32) -> i32 {
        value.clamp(0, self.max_border_width)
    }

    #[inline]
    pub fn clamp_font_size(&self, value: i32) -> i32 {
        value.clamp(self.min_font_size, self.max_font_size)
    }
}

/// Options controlling conversion in both directions.
///
/// # Examples
///
/// ```rust
/// use flowrtf::ConverterOptions;
///
/// let options = ConverterOptions::new()
///     .with_code_page(1251)
///     .with_default_font("Arial")
///     .with_list_text(false);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// ANSI code page written as `\ansicpgN` and used for `\'hh` escapes
    pub code_page: u16,
    /// Font 0 of the generated font table
    pub default_font: String,
    /// `\deflangN` of generated documents; also the language the reader
    /// assumes when a document declares none
    pub default_language: u16,
    /// Width in twips of table columns without an explicit width
    pub default_column_width: i32,
    /// Whether list paragraphs get a `{\listtext ...}` marker fallback
    pub emit_list_text: bool,
    /// Numeric clamps
    pub limits: Limits,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            code_page: DEFAULT_CODE_PAGE,
            default_font: "Times New Roman".to_string(),
            default_language: 1033,
            default_column_width: 2880,
            emit_list_text: true,
            limits: Limits::default(),
        }
    }
}

impl ConverterOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_code_page(mut self, code_page: u16) -> Self {
        self.code_page = code_page;
        self
    }

    #[inline]
    pub fn with_default_font(mut self, font: impl Into<String>) -> Self {
        self.default_font = font.into();
        self
    }

    #[inline]
    pub fn with_default_language(mut self, lcid: u16) -> Self {
        self.default_language = lcid;
        self
    }

    #[inline]
    pub fn with_default_column_width(mut self, twips: i32) -> Self {
        self.default_column_width = twips;
        self
    }

    /// Set whether list paragraphs carry a `\listtext` marker fallback.
    ///
    /// Readers that do not understand `\ls` show the fallback text instead.
    #[inline]
    pub fn with_list_text(mut self, emit: bool) -> Self {
        self.emit_list_text = emit;
        self
    }

    #[inline]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Check the options before any input is touched.
    pub fn validate(&self) -> Result<()> {
        if self.default_font.trim().is_empty() {
            return Err(Error::InvalidArgument("default font must not be empty".into()));
        }
        if codepage_to_encoding(self.code_page as u32).is_none() {
            return Err(Error::InvalidArgument(format!(
                "unsupported code page {}",
                self.code_page
            )));
        }
        if self.default_column_width <= 0 {
            return Err(Error::InvalidArgument(
                "default column width must be positive".into(),
            ));
        }
        let limits = &self.limits;
        if limits.max_group_depth == 0
            || limits.min_font_size > limits.max_font_size
            || limits.max_column_span < 1
            || limits.max_row_span < 1
            || limits.max_list_start < 1
        {
            return Err(Error::InvalidArgument("inconsistent limits".into()));
        }
        Ok(())
    }
}
