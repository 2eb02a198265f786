//! RTF border and shading support.
//!
//! Paragraphs and table cells share the same border and shading model.

use super::types::{Color, ColorRef, ColorTable};
use crate::config::Limits;

/// Border style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// No border
    #[default]
    None,
    /// Single line border
    Single,
    /// Single thick line border
    Thick,
    /// Double line border
    Double,
    /// Dotted border
    Dotted,
    /// Dashed border
    Dashed,
}

impl BorderStyle {
    /// Control word of this style.
    pub fn control_word(self) -> &'static str {
        match self {
            BorderStyle::None => "brdrnone",
            BorderStyle::Single => "brdrs",
            BorderStyle::Thick => "brdrth",
            BorderStyle::Double => "brdrdb",
            BorderStyle::Dotted => "brdrdot",
            BorderStyle::Dashed => "brdrdash",
        }
    }
}

/// Border definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    /// Border style
    pub style: BorderStyle,
    /// Border width (in twips)
    pub width: i32,
    /// Border color reference
    pub color_ref: Option<ColorRef>,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            style: BorderStyle::default(),
            width: 15, // 1px
            color_ref: None,
        }
    }
}

impl Border {
    /// Create a new border
    #[inline]
    pub fn new(style: BorderStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Check if border is visible
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width > 0
    }

    /// Width in twips as it takes effect: zero when invisible.
    #[inline]
    pub fn effective_width(&self) -> i32 {
        if self.is_visible() { self.width } else { 0 }
    }
}

/// Side of a bordered box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl BorderSide {
    pub const ALL: [BorderSide; 4] = [
        BorderSide::Left,
        BorderSide::Top,
        BorderSide::Right,
        BorderSide::Bottom,
    ];

    /// This side alone, as a static slice.
    pub fn as_slice(self) -> &'static [BorderSide] {
        match self {
            BorderSide::Left => &[BorderSide::Left],
            BorderSide::Top => &[BorderSide::Top],
            BorderSide::Right => &[BorderSide::Right],
            BorderSide::Bottom => &[BorderSide::Bottom],
        }
    }
}

/// Borders for a paragraph or table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    /// Top border
    pub top: Border,
    /// Bottom border
    pub bottom: Border,
    /// Left border
    pub left: Border,
    /// Right border
    pub right: Border,
}

impl Borders {
    /// Create new empty borders
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all borders to the same style
    #[inline]
    pub fn all(border: Border) -> Self {
        Self {
            top: border,
            bottom: border,
            left: border,
            right: border,
        }
    }

    #[inline]
    pub fn side(&self, side: BorderSide) -> &Border {
        match side {
            BorderSide::Top => &self.top,
            BorderSide::Bottom => &self.bottom,
            BorderSide::Left => &self.left,
            BorderSide::Right => &self.right,
        }
    }

    #[inline]
    pub fn side_mut(&mut self, side: BorderSide) -> &mut Border {
        match side {
            BorderSide::Top => &mut self.top,
            BorderSide::Bottom => &mut self.bottom,
            BorderSide::Left => &mut self.left,
            BorderSide::Right => &mut self.right,
        }
    }

    /// Check if any border is visible
    #[inline]
    pub fn has_any_border(&self) -> bool {
        self.top.is_visible()
            || self.bottom.is_visible()
            || self.left.is_visible()
            || self.right.is_visible()
    }

    /// Color of the first visible border that has one.
    pub fn color_ref(&self) -> Option<ColorRef> {
        BorderSide::ALL
            .iter()
            .map(|side| self.side(*side))
            .filter(|border| border.is_visible())
            .find_map(|border| border.color_ref)
    }
}

/// Background shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shading {
    /// Shading intensity in hundredths of a percent (`\shadingN`)
    pub percent: i32,
    /// Pattern color (`\cfpatN`)
    pub fore: Option<ColorRef>,
    /// Background fill color (`\cbpatN`)
    pub back: Option<ColorRef>,
}

impl Shading {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.percent == 0 && self.fore.is_none() && self.back.is_none()
    }

    /// Resolve to a single fill color.
    ///
    /// A shading percentage blends the pattern color over the background
    /// (white when absent). Auto and unresolvable entries are ignored.
    pub fn resolve(&self, colors: &ColorTable, limits: &Limits) -> Option<Color> {
        let lookup = |r: Option<ColorRef>| {
            r.and_then(|r| colors.get(r))
                .filter(|e| !e.is_auto)
                .map(|e| e.color)
        };
        let back = lookup(self.back);
        let percent = limits.clamp_shading(self.percent);
        match lookup(self.fore) {
            Some(fore) if percent > 0 => {
                let base = back.unwrap_or(Color::white());
                let max = limits.max_shading.max(1) as u32;
                let mix = |f: u8, b: u8| {
                    ((f as u32 * percent as u32 + b as u32 * (max - percent as u32)) / max) as u8
                };
                Some(Color::new(
                    mix(fore.red, base.red),
                    mix(fore.green, base.green),
                    mix(fore.blue, base.blue),
                ))
            },
            _ => back,
        }
    }
}
