//! RTF lexer/tokenizer.
//!
//! The lexer is a forward-only cursor over raw RTF bytes. It never fails:
//! malformed syntax comes back as a [`TokenKind::Invalid`] token and the
//! reader decides what to do with it. Once the input is exhausted every
//! further call yields [`TokenKind::Eof`].

use super::control::{self, ControlWordInfo};
use std::borrow::Cow;

/// Longest control word the lexer accepts.
const MAX_WORD_LEN: usize = 32;
/// Longest numeric parameter (digits, without sign) the lexer accepts.
const MAX_PARAM_DIGITS: usize = 10;

/// Token types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text run (raw bytes in the document code page)
    Text,
    /// Escaped literal character (`\\`, `\{`, `\}`, `\~`, `\-`, `\_`)
    TextSymbol,
    /// Control word or control symbol
    Control,
    /// Control word that switches the destination of its group
    Destination,
    /// `\'hh`; the byte is the token parameter
    Hex,
    /// `{`
    GroupStart,
    /// `}`
    GroupEnd,
    /// Raw CR or LF in the source
    Newline,
    /// Raw NUL byte
    NullChar,
    /// Decoded picture bytes (picture mode hex or `\bin`)
    PictureData,
    /// End of input
    Eof,
    /// Malformed syntax; `text` holds the offending input
    Invalid,
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Table entry for recognized control words
    pub control: Option<&'static ControlWordInfo>,
    /// Numeric parameter; `None` when the control word had none
    pub parameter: Option<i32>,
    /// Text bytes, control word name, symbol UTF-8 or picture bytes
    pub text: Cow<'a, [u8]>,
}

impl<'a> Token<'a> {
    #[inline]
    fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            control: None,
            parameter: None,
            text: Cow::Borrowed(&[]),
        }
    }

    #[inline]
    fn with_text(kind: TokenKind, text: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(kind)
        }
    }

    /// Control word spelling (or symbol) for control tokens.
    #[inline]
    pub fn word(&self) -> &str {
        std::str::from_utf8(&self.text).unwrap_or_default()
    }

    /// Parameter interpreted as a toggle: absent or non-zero means on.
    #[inline]
    pub fn toggle(&self) -> bool {
        self.parameter.is_none_or(|p| p != 0)
    }
}

/// RTF lexer.
pub struct Lexer<'a> {
    /// Source input
    input: &'a [u8],
    /// Current position in bytes
    pos: usize,
    /// Read text as hex picture data
    picture_mode: bool,
    /// High nibble left over from the previous picture data chunk
    pending_nibble: Option<u8>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            picture_mode: false,
            pending_nibble: None,
        }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Switch picture mode on or off.
    ///
    /// In picture mode text is decoded as pairs of hex digits. A dangling
    /// nibble is dropped when the mode is switched off.
    #[inline]
    pub fn set_picture_mode(&mut self, enabled: bool) {
        if self.picture_mode != enabled {
            self.picture_mode = enabled;
            self.pending_nibble = None;
        }
    }

    /// Tokenize the entire input, excluding the final `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.kind == TokenKind::Eof {
                return tokens;
            }
            tokens.push(token);
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            let Some(&byte) = self.input.get(self.pos) else {
                return Token::new(TokenKind::Eof);
            };
            match byte {
                b'{' => {
                    self.pos += 1;
                    return Token::new(TokenKind::GroupStart);
                },
                b'}' => {
                    self.pos += 1;
                    return Token::new(TokenKind::GroupEnd);
                },
                b'\\' => return self.parse_control(),
                b'\r' | b'\n' => {
                    self.skip_newline();
                    return Token::new(TokenKind::Newline);
                },
                0 => {
                    self.pos += 1;
                    return Token::new(TokenKind::NullChar);
                },
                _ if self.picture_mode => {
                    if let Some(token) = self.parse_picture_hex() {
                        return token;
                    }
                },
                _ => return self.parse_text(),
            }
        }
    }

    /// Parse a control word or control symbol.
    fn parse_control(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1; // Skip '\'

        let Some(&ch) = self.input.get(self.pos) else {
            return Token::with_text(TokenKind::Invalid, &self.input[start..]);
        };

        match ch {
            b'\\' | b'{' | b'}' => {
                self.pos += 1;
                Token::with_text(TokenKind::TextSymbol, &self.input[self.pos - 1..self.pos])
            },
            b'~' => self.symbol("\u{00A0}"),  // Non-breaking space
            b'-' => self.symbol("\u{00AD}"),  // Optional hyphen
            b'_' => self.symbol("\u{2011}"),  // Non-breaking hyphen
            b'\'' => self.parse_hex(start),
            b'\r' | b'\n' => {
                self.skip_newline();
                Token {
                    control: control::lookup("par"),
                    ..Token::with_text(TokenKind::Control, b"par".as_slice())
                }
            },
            b'0'..=b'9' => {
                self.pos += 1;
                Token::with_text(TokenKind::Invalid, &self.input[start..self.pos])
            },
            ch if ch.is_ascii_alphabetic() => self.parse_word(start),
            _ => {
                // Control symbol: `\*` and anything unrecognized
                self.pos += 1;
                let symbol = &self.input[self.pos - 1..self.pos];
                Token {
                    control: std::str::from_utf8(symbol).ok().and_then(control::lookup),
                    ..Token::with_text(TokenKind::Control, symbol)
                }
            },
        }
    }

    #[inline]
    fn symbol(&mut self, text: &'static str) -> Token<'a> {
        self.pos += 1;
        Token::with_text(TokenKind::TextSymbol, text.as_bytes())
    }

    /// Parse a control word with optional parameter, starting at the `\`.
    fn parse_word(&mut self, start: usize) -> Token<'a> {
        let word_start = self.pos;
        while self.input.get(self.pos).is_some_and(u8::is_ascii_alphabetic) {
            self.pos += 1;
        }
        let word = &self.input[word_start..self.pos];
        if word.len() > MAX_WORD_LEN {
            return Token::with_text(TokenKind::Invalid, &self.input[start..self.pos]);
        }

        let parameter = match self.parse_parameter() {
            Ok(parameter) => parameter,
            Err(()) => return Token::with_text(TokenKind::Invalid, &self.input[start..self.pos]),
        };

        // Skip optional space delimiter after control word
        if self.input.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }

        // Only ASCII letters were consumed
        let info = std::str::from_utf8(word).ok().and_then(control::lookup);

        if word == b"bin" {
            return self.read_binary(info, parameter);
        }

        let kind = match info {
            Some(info) if info.is_destination() => TokenKind::Destination,
            _ => TokenKind::Control,
        };
        Token {
            kind,
            control: info,
            parameter,
            text: Cow::Borrowed(word),
        }
    }

    /// Parse numeric parameter after control word.
    fn parse_parameter(&mut self) -> Result<Option<i32>, ()> {
        let negative = self.input.get(self.pos) == Some(&b'-')
            && self.input.get(self.pos + 1).is_some_and(u8::is_ascii_digit);
        let digits_start = self.pos + usize::from(negative);
        if !self.input.get(digits_start).is_some_and(u8::is_ascii_digit) {
            return Ok(None);
        }

        let mut end = digits_start;
        while self.input.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        self.pos = end;

        let digits = &self.input[digits_start..end];
        if digits.len() > MAX_PARAM_DIGITS {
            return Err(());
        }
        let value = atoi_simd::parse::<i64, false, false>(digits).map_err(|_| ())?;
        let value = if negative { -value } else { value };
        Ok(Some(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32))
    }

    /// Handle binary data immediately after `\binN`.
    fn read_binary(
        &mut self,
        info: Option<&'static ControlWordInfo>,
        length: Option<i32>,
    ) -> Token<'a> {
        let length = length.unwrap_or(0).max(0) as usize;
        let end = self.pos.saturating_add(length).min(self.input.len());
        let data = &self.input[self.pos..end];
        self.pos = end;
        Token {
            kind: TokenKind::PictureData,
            control: info,
            parameter: Some(data.len() as i32),
            text: Cow::Borrowed(data),
        }
    }

    /// Parse hexadecimal character escape (`\'hh`).
    fn parse_hex(&mut self, start: usize) -> Token<'a> {
        self.pos += 1; // Skip '\''
        let high = self.input.get(self.pos).copied().and_then(hex_value);
        let low = self.input.get(self.pos + 1).copied().and_then(hex_value);
        match (high, low) {
            (Some(high), Some(low)) => {
                self.pos += 2;
                let byte = (high << 4) | low;
                Token {
                    parameter: Some(byte as i32),
                    ..Token::with_text(TokenKind::Hex, &self.input[self.pos - 2..self.pos])
                }
            },
            (Some(_), None) => {
                self.pos += 1;
                Token::with_text(TokenKind::Invalid, &self.input[start..self.pos])
            },
            _ => Token::with_text(TokenKind::Invalid, &self.input[start..self.pos]),
        }
    }

    /// Decode hex picture data up to the next delimiter.
    ///
    /// Returns `None` when only whitespace was consumed.
    fn parse_picture_hex(&mut self) -> Option<Token<'a>> {
        let mut data = Vec::new();
        while let Some(&byte) = self.input.get(self.pos) {
            match byte {
                b'\\' | b'{' | b'}' | b'\r' | b'\n' | 0 => break,
                b' ' | b'\t' => self.pos += 1,
                _ => {
                    let Some(nibble) = hex_value(byte) else {
                        if !data.is_empty() {
                            break;
                        }
                        self.pos += 1;
                        return Some(Token::with_text(
                            TokenKind::Invalid,
                            &self.input[self.pos - 1..self.pos],
                        ));
                    };
                    self.pos += 1;
                    match self.pending_nibble.take() {
                        Some(high) => data.push((high << 4) | nibble),
                        None => self.pending_nibble = Some(nibble),
                    }
                },
            }
        }

        if data.is_empty() {
            None
        } else {
            Some(Token::with_text(TokenKind::PictureData, data))
        }
    }

    /// Parse plain text until special character.
    fn parse_text(&mut self) -> Token<'a> {
        let rest = &self.input[self.pos..];
        let special = memchr::memchr3(b'\\', b'{', b'}', rest).unwrap_or(rest.len());
        let line = memchr::memchr3(b'\r', b'\n', 0, &rest[..special]).unwrap_or(special);
        let text = &rest[..line];
        self.pos += line;
        Token::with_text(TokenKind::Text, text)
    }

    /// Consume CR, LF or CRLF.
    #[inline]
    fn skip_newline(&mut self) {
        if self.input.get(self.pos) == Some(&b'\r') {
            self.pos += 1;
            if self.input.get(self.pos) == Some(&b'\n') {
                self.pos += 1;
            }
        } else {
            self.pos += 1;
        }
    }
}

#[inline]
fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::control::Control;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input.as_bytes())
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokenization() {
        let mut lexer = Lexer::new(br"{\rtf1\ansi Hello}");
        let tokens = lexer.tokenize();

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].kind, TokenKind::GroupStart);
        assert_eq!(tokens[1].control.unwrap().control, Control::Rtf);
        assert_eq!(tokens[1].parameter, Some(1));
        assert_eq!(tokens[2].word(), "ansi");
        assert_eq!(tokens[2].parameter, None);
        assert_eq!(tokens[3].text.as_ref(), b"Hello");
        assert_eq!(tokens[4].kind, TokenKind::GroupEnd);
    }

    #[test]
    fn test_parameter_zero_is_not_absent() {
        let tokens = Lexer::new(br"\b0\b\b-12").tokenize();
        assert_eq!(tokens[0].parameter, Some(0));
        assert!(!tokens[0].toggle());
        assert_eq!(tokens[1].parameter, None);
        assert!(tokens[1].toggle());
        assert_eq!(tokens[2].parameter, Some(-12));
    }

    #[test]
    fn test_destination_and_symbols() {
        let tokens = Lexer::new(br"{\*\colortbl;}\{\~\'e9").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Control);
        assert_eq!(tokens[1].control.unwrap().control, Control::Ignorable);
        assert_eq!(tokens[2].kind, TokenKind::Destination);
        assert_eq!(tokens[3].kind, TokenKind::Text);
        assert_eq!(tokens[5].kind, TokenKind::TextSymbol);
        assert_eq!(tokens[5].text.as_ref(), b"{");
        assert_eq!(tokens[6].text.as_ref(), "\u{00A0}".as_bytes());
        assert_eq!(tokens[7].kind, TokenKind::Hex);
        assert_eq!(tokens[7].parameter, Some(0xE9));
    }

    #[test]
    fn test_newlines_and_escaped_newline() {
        assert_eq!(
            kinds("a\r\nb\\\n"),
            vec![
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::Text,
                TokenKind::Control
            ]
        );
        let tokens = Lexer::new(b"\\\r\n").tokenize();
        assert_eq!(tokens[0].control.unwrap().control, Control::Paragraph);
    }

    #[test]
    fn test_invalid_syntax() {
        assert_eq!(kinds(r"\'zz"), vec![TokenKind::Invalid, TokenKind::Text]);
        assert_eq!(kinds(r"\5"), vec![TokenKind::Invalid]);
        assert_eq!(kinds("\\"), vec![TokenKind::Invalid]);
        assert_eq!(kinds(r"\fs12345678901"), vec![TokenKind::Invalid]);
        let long = format!("\\{}", "a".repeat(40));
        assert_eq!(kinds(&long), vec![TokenKind::Invalid]);
    }

    #[test]
    fn test_unknown_control_has_no_info() {
        let tokens = Lexer::new(br"\foobar7\:").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Control);
        assert!(tokens[0].control.is_none());
        assert_eq!(tokens[0].parameter, Some(7));
        assert_eq!(tokens[1].word(), ":");
    }

    #[test]
    fn test_binary_data() {
        let tokens = Lexer::new(b"\\bin3 {}\\x}").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::PictureData);
        assert_eq!(tokens[0].text.as_ref(), b"{}\\");
        assert_eq!(tokens[1].word(), "x");
        assert_eq!(tokens[2].kind, TokenKind::GroupEnd);
    }

    #[test]
    fn test_picture_mode() {
        let mut lexer = Lexer::new(b"89 50\r\n4e4\r\n7}");
        lexer.set_picture_mode(true);
        let tokens = lexer.tokenize();
        let data: Vec<u8> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::PictureData)
            .flat_map(|t| t.text.iter().copied())
            .collect();
        assert_eq!(data, vec![0x89, 0x50, 0x4E, 0x47]);

        let mut lexer = Lexer::new(b"8g");
        lexer.set_picture_mode(true);
        assert_eq!(lexer.next_token().kind, TokenKind::Invalid);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new(b"{");
        assert_eq!(lexer.next_token().kind, TokenKind::GroupStart);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_never_panics_and_terminates(
                input in proptest::collection::vec(any::<u8>(), 0..512),
                picture in any::<bool>(),
            ) {
                let mut lexer = Lexer::new(&input);
                lexer.set_picture_mode(picture);
                let mut count = 0usize;
                while lexer.next_token().kind != TokenKind::Eof {
                    count += 1;
                    prop_assert!(count <= input.len());
                }
                prop_assert_eq!(lexer.next_token().kind, TokenKind::Eof);
            }
        }
    }
}
