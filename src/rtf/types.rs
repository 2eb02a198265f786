//! Color and font tables.
//!
//! Both tables are append-only for the lifetime of a conversion: content
//! refers to entries by index, so an entry is never removed or reordered.

use std::fmt::Write;

/// Font reference (`\fN`).
pub type FontRef = i32;

/// Color reference (index into color table).
pub type ColorRef = usize;

/// RTF color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red component (0-255)
    pub red: u8,
    /// Green component (0-255)
    pub green: u8,
    /// Blue component (0-255)
    pub blue: u8,
}

impl Color {
    /// Create a new color.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Black color.
    #[inline]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// White color.
    #[inline]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Write the color as an opaque `#FFRRGGBB` brush value.
    pub fn write_argb(&self, buf: &mut String) {
        let _ = write!(buf, "#FF{:02X}{:02X}{:02X}", self.red, self.green, self.blue);
    }

    /// Format the color as an opaque `#FFRRGGBB` brush value.
    pub fn to_argb(&self) -> String {
        let mut s = String::with_capacity(9);
        self.write_argb(&mut s);
        s
    }
}

/// Entry of a [`ColorTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorEntry {
    pub color: Color,
    /// "auto" color: the consumer's default, not a concrete value
    pub is_auto: bool,
}

impl ColorEntry {
    /// The auto entry (black, flagged auto).
    pub const AUTO: ColorEntry = ColorEntry {
        color: Color::black(),
        is_auto: true,
    };

    #[inline]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            is_auto: false,
        }
    }
}

/// Channels of a color being built one control word at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PendingColor {
    red: Option<u8>,
    green: Option<u8>,
    blue: Option<u8>,
}

impl PendingColor {
    #[inline]
    fn is_empty(&self) -> bool {
        self.red.is_none() && self.green.is_none() && self.blue.is_none()
    }
}

/// Color table containing document colors.
///
/// Two modes of filling exist. The reader streams `\red`, `\green` and
/// `\blue` channels followed by [`finish_color`](Self::finish_color) for each
/// `;`-terminated entry. The writer calls [`add_color`](Self::add_color),
/// which deduplicates by exact RGB match.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: Vec<ColorEntry>,
    pending: Option<PendingColor>,
}

impl ColorTable {
    /// Create a new, empty color table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table whose index 0 is the auto entry, as written by
    /// `{\colortbl;...}`.
    #[inline]
    pub fn with_auto() -> Self {
        Self {
            colors: vec![ColorEntry::AUTO],
            pending: None,
        }
    }

    /// Add a color, returning the index of an existing identical entry if
    /// there is one.
    pub fn add_color(&mut self, color: Color) -> ColorRef {
        if let Some(index) = self
            .colors
            .iter()
            .position(|entry| !entry.is_auto && entry.color == color)
        {
            return index;
        }
        self.colors.push(ColorEntry::new(color));
        self.colors.len() - 1
    }

    /// Set the red channel of the entry being built.
    #[inline]
    pub fn set_red(&mut self, value: u8) {
        self.pending.get_or_insert_with(PendingColor::default).red = Some(value);
    }

    /// Set the green channel of the entry being built.
    #[inline]
    pub fn set_green(&mut self, value: u8) {
        self.pending.get_or_insert_with(PendingColor::default).green = Some(value);
    }

    /// Set the blue channel of the entry being built.
    #[inline]
    pub fn set_blue(&mut self, value: u8) {
        self.pending.get_or_insert_with(PendingColor::default).blue = Some(value);
    }

    /// Whether an entry is currently being built.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Append the entry being built and return its index.
    ///
    /// Unset channels are 0. If no channel was set, the auto entry is
    /// appended instead.
    pub fn finish_color(&mut self) -> ColorRef {
        let entry = match self.pending.take() {
            Some(pending) if !pending.is_empty() => ColorEntry::new(Color::new(
                pending.red.unwrap_or(0),
                pending.green.unwrap_or(0),
                pending.blue.unwrap_or(0),
            )),
            _ => ColorEntry::AUTO,
        };
        self.colors.push(entry);
        self.colors.len() - 1
    }

    /// Get an entry by reference.
    #[inline]
    pub fn get(&self, color_ref: ColorRef) -> Option<&ColorEntry> {
        self.colors.get(color_ref)
    }

    /// Get all entries in the table.
    #[inline]
    pub fn entries(&self) -> &[ColorEntry] {
        &self.colors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Font family categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    /// Nil (unknown or default)
    #[default]
    Nil,
    /// Roman (serif) fonts
    Roman,
    /// Swiss (sans-serif) fonts
    Swiss,
    /// Modern (monospace) fonts
    Modern,
    /// Script fonts
    Script,
    /// Decorative fonts
    Decor,
    /// Technical, symbol, and mathematical fonts
    Tech,
    /// Bidirectional fonts
    Bidi,
}

impl FontFamily {
    /// Family from its control word (`\froman`, `\fswiss`, ...).
    pub fn from_control(word: &str) -> FontFamily {
        match word {
            "froman" => FontFamily::Roman,
            "fswiss" => FontFamily::Swiss,
            "fmodern" => FontFamily::Modern,
            "fscript" => FontFamily::Script,
            "fdecor" => FontFamily::Decor,
            "ftech" => FontFamily::Tech,
            "fbidi" => FontFamily::Bidi,
            _ => FontFamily::Nil,
        }
    }

    /// Control word of this family.
    pub fn control_word(self) -> &'static str {
        match self {
            FontFamily::Nil => "fnil",
            FontFamily::Roman => "froman",
            FontFamily::Swiss => "fswiss",
            FontFamily::Modern => "fmodern",
            FontFamily::Script => "fscript",
            FontFamily::Decor => "fdecor",
            FontFamily::Tech => "ftech",
            FontFamily::Bidi => "fbidi",
        }
    }
}

/// Font definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Font {
    /// Font name
    pub name: String,
    /// Font family category
    pub family: FontFamily,
    /// Character set (`\fcharsetN`)
    pub charset: Option<u8>,
}

impl Font {
    /// Create a new font.
    #[inline]
    pub fn new(name: impl Into<String>, family: FontFamily, charset: Option<u8>) -> Self {
        Self {
            name: name.into(),
            family,
            charset,
        }
    }
}

/// Font table containing document fonts.
///
/// Font numbers are arbitrary (`\f31507` is common), so entries are keyed by
/// number rather than position.
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: Vec<(FontRef, Font)>,
}

impl FontTable {
    /// Create a new font table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define font `number`, replacing an earlier definition.
    pub fn insert(&mut self, number: FontRef, font: Font) {
        match self.fonts.iter_mut().find(|(n, _)| *n == number) {
            Some(entry) => entry.1 = font,
            None => self.fonts.push((number, font)),
        }
    }

    /// Get a font by number.
    #[inline]
    pub fn get(&self, number: FontRef) -> Option<&Font> {
        self.fonts
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, font)| font)
    }

    /// Get a mutable font by number.
    #[inline]
    pub fn get_mut(&mut self, number: FontRef) -> Option<&mut Font> {
        self.fonts
            .iter_mut()
            .find(|(n, _)| *n == number)
            .map(|(_, font)| font)
    }

    /// Return the number of the font named `name` (case-insensitive),
    /// appending a new entry with the next free number if there is none.
    pub fn add_font(&mut self, name: &str) -> FontRef {
        if let Some((number, _)) = self
            .fonts
            .iter()
            .find(|(_, font)| font.name.eq_ignore_ascii_case(name))
        {
            return *number;
        }
        let number = self.fonts.iter().map(|(n, _)| n.saturating_add(1)).max().unwrap_or(0);
        self.fonts.push((number, Font::new(name, FontFamily::Nil, None)));
        number
    }

    /// Get all fonts in definition order.
    #[inline]
    pub fn fonts(&self) -> impl Iterator<Item = (FontRef, &Font)> {
        self.fonts.iter().map(|(n, font)| (*n, font))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
