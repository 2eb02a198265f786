//! Parsing and formatting of XAML property values.
//!
//! Lengths are device-independent pixels unless a unit suffix says
//! otherwise. Brushes are `#AARRGGBB`, `#RRGGBB`, `#ARGB`, `#RGB` or one of
//! a handful of named colors.

use crate::common::unit::{parse_f64, write_num};
use crate::rtf::types::Color;
use phf::phf_map;

/// Parse a solid color brush. Fully transparent colors parse as `None`.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .bytes()
            .map(|b| (b as char).to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        let pair = |i: usize| digits[i] << 4 | digits[i + 1];
        let twice = |d: u8| d << 4 | d;
        let (alpha, color) = match digits.len() {
            3 => (0xFF, Color::new(twice(digits[0]), twice(digits[1]), twice(digits[2]))),
            4 => (
                twice(digits[0]),
                Color::new(twice(digits[1]), twice(digits[2]), twice(digits[3])),
            ),
            6 => (0xFF, Color::new(pair(0), pair(2), pair(4))),
            8 => (pair(0), Color::new(pair(2), pair(4), pair(6))),
            _ => return None,
        };
        return (alpha != 0).then_some(color);
    }
    NAMED_COLORS.get(value.to_ascii_lowercase().as_str()).copied()
}

static NAMED_COLORS: phf::Map<&'static str, Color> = phf_map! {
    "black" => Color::new(0x00, 0x00, 0x00),
    "white" => Color::new(0xFF, 0xFF, 0xFF),
    "red" => Color::new(0xFF, 0x00, 0x00),
    "green" => Color::new(0x00, 0x80, 0x00),
    "lime" => Color::new(0x00, 0xFF, 0x00),
    "blue" => Color::new(0x00, 0x00, 0xFF),
    "yellow" => Color::new(0xFF, 0xFF, 0x00),
    "cyan" => Color::new(0x00, 0xFF, 0xFF),
    "aqua" => Color::new(0x00, 0xFF, 0xFF),
    "magenta" => Color::new(0xFF, 0x00, 0xFF),
    "fuchsia" => Color::new(0xFF, 0x00, 0xFF),
    "gray" => Color::new(0x80, 0x80, 0x80),
    "silver" => Color::new(0xC0, 0xC0, 0xC0),
    "maroon" => Color::new(0x80, 0x00, 0x00),
    "navy" => Color::new(0x00, 0x00, 0x80),
    "olive" => Color::new(0x80, 0x80, 0x00),
    "purple" => Color::new(0x80, 0x00, 0x80),
    "teal" => Color::new(0x00, 0x80, 0x80),
    "orange" => Color::new(0xFF, 0xA5, 0x00),
    "darkblue" => Color::new(0x00, 0x00, 0x8B),
    "darkred" => Color::new(0x8B, 0x00, 0x00),
    "darkgreen" => Color::new(0x00, 0x64, 0x00),
};

/// Parse a length in pixels. Accepts `px`, `in`, `cm` and `pt` suffixes.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, scale) = if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("in") {
        (n, 96.0)
    } else if let Some(n) = value.strip_suffix("cm") {
        (n, 96.0 / 2.54)
    } else if let Some(n) = value.strip_suffix("pt") {
        (n, 96.0 / 72.0)
    } else {
        (value, 1.0)
    };
    parse_f64(number).map(|n| n * scale)
}

/// Four-sided length (`Margin`, `BorderThickness`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    #[inline]
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }

    /// Parse one, two (`horizontal,vertical`) or four (`l,t,r,b`) lengths.
    pub fn parse(value: &str) -> Option<Thickness> {
        let parts: Vec<f64> = value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(parse_length)
            .collect::<Option<_>>()?;
        match parts.as_slice() {
            [all] => Some(Thickness::uniform(*all)),
            [h, v] => Some(Thickness {
                left: *h,
                top: *v,
                right: *h,
                bottom: *v,
            }),
            [l, t, r, b] => Some(Thickness {
                left: *l,
                top: *t,
                right: *r,
                bottom: *b,
            }),
            _ => None,
        }
    }

    /// Write as `l,t,r,b`, or a single value when all sides agree.
    pub fn write(&self, buf: &mut String) {
        if self.left == self.top && self.top == self.right && self.right == self.bottom {
            write_num(buf, self.left);
            return;
        }
        for (i, side) in [self.left, self.top, self.right, self.bottom].iter().enumerate() {
            if i > 0 {
                buf.push(',');
            }
            write_num(buf, *side);
        }
    }

    pub fn to_xaml(&self) -> String {
        let mut s = String::new();
        self.write(&mut s);
        s
    }
}

/// Whether a `FontWeight` value is bold.
pub fn parse_font_weight(value: &str) -> Option<bool> {
    let value = value.trim();
    if let Ok(numeric) = atoi_simd::parse::<u16, false, false>(value.as_bytes()) {
        return Some(numeric >= 600);
    }
    match value.to_ascii_lowercase().as_str() {
        "bold" | "semibold" | "demibold" | "extrabold" | "ultrabold" | "black" | "heavy"
        | "extrablack" | "ultrablack" => Some(true),
        "normal" | "regular" | "thin" | "light" | "extralight" | "ultralight" | "medium" => {
            Some(false)
        },
        _ => None,
    }
}

/// Whether a `FontStyle` value is italic.
pub fn parse_font_style(value: &str) -> Option<bool> {
    match value.trim() {
        "Italic" | "Oblique" => Some(true),
        "Normal" => Some(false),
        _ => None,
    }
}

/// Text decorations set on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decorations {
    pub underline: bool,
    pub strikethrough: bool,
}

impl Decorations {
    /// Parse a comma-separated `TextDecorations` value.
    pub fn parse(value: &str) -> Option<Decorations> {
        let mut decorations = Decorations::default();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "Underline" => decorations.underline = true,
                "Strikethrough" => decorations.strikethrough = true,
                "None" | "Baseline" | "OverLine" => {},
                _ => return None,
            }
        }
        Some(decorations)
    }

    /// `TextDecorations` value, `None` if nothing is set.
    pub fn to_xaml(self) -> Option<&'static str> {
        match (self.underline, self.strikethrough) {
            (true, true) => Some("Underline, Strikethrough"),
            (true, false) => Some("Underline"),
            (false, true) => Some("Strikethrough"),
            (false, false) => None,
        }
    }
}

static LANGUAGES: phf::Map<&'static str, u16> = phf_map! {
    "ar-sa" => 1025,
    "zh-tw" => 1028,
    "cs-cz" => 1029,
    "da-dk" => 1030,
    "de-de" => 1031,
    "el-gr" => 1032,
    "en-us" => 1033,
    "fi-fi" => 1035,
    "fr-fr" => 1036,
    "he-il" => 1037,
    "hu-hu" => 1038,
    "it-it" => 1040,
    "ja-jp" => 1041,
    "ko-kr" => 1042,
    "nl-nl" => 1043,
    "nb-no" => 1044,
    "pl-pl" => 1045,
    "pt-br" => 1046,
    "ru-ru" => 1049,
    "sv-se" => 1053,
    "th-th" => 1054,
    "tr-tr" => 1055,
    "uk-ua" => 1058,
    "vi-vn" => 1066,
    "zh-cn" => 2052,
    "en-gb" => 2057,
    "pt-pt" => 2070,
    "es-es" => 3082,
};

/// LCID of an `xml:lang` tag.
pub fn language_to_lcid(tag: &str) -> Option<u16> {
    LANGUAGES.get(tag.trim().to_ascii_lowercase().as_str()).copied()
}

/// `xml:lang` tag of an LCID.
pub fn lcid_to_language(lcid: u16) -> Option<String> {
    let (tag, _) = LANGUAGES.entries().find(|(_, id)| **id == lcid)?;
    let (lang, region) = tag.split_once('-')?;
    Some(format!("{}-{}", lang, region.to_ascii_uppercase()))
}

/// Parse a positive integer attribute (`ColumnSpan`, `StartIndex`).
pub fn parse_count(value: &str) -> Option<i32> {
    atoi_simd::parse::<i32, false, false>(value.trim().as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FFFF0000"), Some(Color::new(255, 0, 0)));
        assert_eq!(parse_color("#00FF00"), Some(Color::new(0, 255, 0)));
        assert_eq!(parse_color("#F00"), Some(Color::new(255, 0, 0)));
        assert_eq!(parse_color("Navy"), Some(Color::new(0, 0, 128)));
        assert_eq!(parse_color("#00FFFFFF"), None);
        assert_eq!(parse_color("#GG0000"), None);
        assert_eq!(parse_color("Transparentish"), None);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("12"), Some(12.0));
        assert_eq!(parse_length("1in"), Some(96.0));
        assert_eq!(parse_length("12pt"), Some(16.0));
        assert_eq!(parse_length("Auto"), None);
    }

    #[test]
    fn test_thickness() {
        let t = Thickness::parse("1,2,3,4").unwrap();
        assert_eq!(t.to_xaml(), "1,2,3,4");
        assert_eq!(Thickness::parse("2").unwrap().to_xaml(), "2");
        assert_eq!(Thickness::parse("1 2").unwrap().top, 2.0);
        assert!(Thickness::parse("1,2,3").is_none());
    }

    #[test]
    fn test_font_properties() {
        assert_eq!(parse_font_weight("Bold"), Some(true));
        assert_eq!(parse_font_weight("700"), Some(true));
        assert_eq!(parse_font_weight("Normal"), Some(false));
        assert_eq!(parse_font_style("Italic"), Some(true));
        let d = Decorations::parse("Underline, Strikethrough").unwrap();
        assert!(d.underline && d.strikethrough);
        assert_eq!(d.to_xaml(), Some("Underline, Strikethrough"));
        assert!(Decorations::parse("Blink").is_none());
    }

    #[test]
    fn test_languages() {
        assert_eq!(language_to_lcid("de-DE"), Some(1031));
        assert_eq!(lcid_to_language(1036).as_deref(), Some("fr-FR"));
        assert_eq!(lcid_to_language(1), None);
    }
}
