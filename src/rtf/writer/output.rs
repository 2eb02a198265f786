//! RTF output buffer.
//!
//! Tracks whether the last thing written was a control word, so that text
//! following it gets the single delimiting space RTF requires and nothing
//! else does.

use crate::common::encoding::encode_single_byte;
use encoding_rs::Encoding;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Hex-encoded picture data is wrapped after this many bytes.
const HEX_LINE_BYTES: usize = 64;

pub struct RtfOutput {
    buf: String,
    /// The last token was a control word that may absorb a following
    /// letter, digit or space.
    delimit: bool,
    encoding: &'static Encoding,
}

impl RtfOutput {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            buf: String::with_capacity(4096),
            delimit: false,
            encoding,
        }
    }

    #[inline]
    pub fn open(&mut self) {
        self.buf.push('{');
        self.delimit = false;
    }

    #[inline]
    pub fn close(&mut self) {
        self.buf.push('}');
        self.delimit = false;
    }

    /// Write `\word` followed by an optional numeric parameter.
    pub fn control_word(&mut self, word: &str, param: Option<i32>) {
        self.buf.push('\\');
        self.buf.push_str(word);
        if let Some(value) = param {
            let mut digits = itoa::Buffer::new();
            self.buf.push_str(digits.format(value));
        }
        self.delimit = true;
    }

    /// `{\*\word` opening an ignorable destination.
    pub fn ignorable_destination(&mut self, word: &str) {
        self.open();
        self.buf.push_str("\\*");
        self.control_word(word, None);
    }

    /// Write punctuation such as `;` that never merges with a control word.
    #[inline]
    pub fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
        self.delimit = false;
    }

    /// Write `\'hh`.
    pub fn hex_byte(&mut self, byte: u8) {
        self.buf.push_str("\\'");
        self.buf.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        self.buf.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
        self.delimit = false;
    }

    /// Write binary data as hex digits, wrapped into lines.
    pub fn hex_data(&mut self, data: &[u8]) {
        self.separate();
        self.buf.reserve(data.len() * 2 + data.len() / HEX_LINE_BYTES + 1);
        for (i, chunk) in data.chunks(HEX_LINE_BYTES).enumerate() {
            if i > 0 {
                self.buf.push('\n');
            }
            for byte in chunk {
                self.buf.push(HEX_DIGITS[(byte >> 4) as usize] as char);
                self.buf.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
            }
        }
    }

    /// Write document text, escaping what RTF treats specially.
    ///
    /// Characters of the output code page become `\'hh`; everything else
    /// outside ASCII becomes `\uN?` with one fallback character.
    pub fn text(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\\' | '{' | '}' => {
                    self.buf.push('\\');
                    self.buf.push(ch);
                    self.delimit = false;
                },
                '\t' => self.control_word("tab", None),
                '\n' => self.control_word("line", None),
                '\u{00A0}' => self.raw("\\~"),
                '\u{00AD}' => self.raw("\\-"),
                '\u{2011}' => self.raw("\\_"),
                c if c.is_ascii_control() => {},
                c if c.is_ascii() => {
                    self.separate();
                    self.buf.push(c);
                },
                c => match encode_single_byte(c, self.encoding) {
                    Some(byte) => self.hex_byte(byte),
                    None => self.unicode(c),
                },
            }
        }
    }

    fn unicode(&mut self, ch: char) {
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            // Parameters are signed 16-bit
            self.control_word("u", Some(*unit as i16 as i32));
            self.raw("?");
        }
    }

    #[inline]
    fn separate(&mut self) {
        if self.delimit {
            self.buf.push(' ');
            self.delimit = false;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Insert already formatted RTF at a byte offset taken from [`len`].
    ///
    /// [`len`]: RtfOutput::len
    pub fn insert(&mut self, offset: usize, rtf: &str) {
        self.buf.insert_str(offset, rtf);
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> RtfOutput {
        RtfOutput::new(encoding_rs::WINDOWS_1252)
    }

    #[test]
    fn test_control_word_delimiting() {
        let mut out = output();
        out.control_word("b", None);
        out.text("bold");
        out.control_word("b", Some(0));
        out.raw(";");
        out.control_word("fs", Some(24));
        out.text(" x");
        assert_eq!(out.as_str(), "\\b bold\\b0;\\fs24  x");
    }

    #[test]
    fn test_text_escaping() {
        let mut out = output();
        out.text("a\\b{c}\td\ne");
        assert_eq!(out.as_str(), "a\\\\b\\{c\\}\\tab d\\line e");
    }

    #[test]
    fn test_code_page_and_unicode() {
        let mut out = output();
        out.text("é€");
        assert_eq!(out.as_str(), "\\'e9\\'80");

        let mut out = output();
        out.text("Ж😀");
        assert_eq!(out.as_str(), "\\u1046?\\u-10179?\\u-8704?");

        let mut out = RtfOutput::new(encoding_rs::WINDOWS_1251);
        out.text("Ж");
        assert_eq!(out.as_str(), "\\'c6");
    }

    #[test]
    fn test_special_characters() {
        let mut out = output();
        out.text("a\u{00A0}b\u{00AD}c\u{2011}d\r\u{1}");
        assert_eq!(out.as_str(), "a\\~b\\-c\\_d");
    }

    #[test]
    fn test_hex_data() {
        let mut out = output();
        out.control_word("pngblip", None);
        out.hex_data(&[0x89, 0x50, 0x0A]);
        assert_eq!(out.as_str(), "\\pngblip 89500a");

        let mut out = output();
        out.hex_data(&[0xAB; HEX_LINE_BYTES + 1]);
        assert_eq!(out.len(), HEX_LINE_BYTES * 2 + 1 + 2);
        assert!(out.as_str().ends_with("\nab"));
    }

    #[test]
    fn test_insert() {
        let mut out = output();
        out.open();
        let offset = out.len();
        out.control_word("row", None);
        out.close();
        out.insert(offset, "\\trowd\\cellx100");
        assert_eq!(out.as_str(), "{\\trowd\\cellx100\\row}");
        assert!(!out.is_empty());
    }
}
