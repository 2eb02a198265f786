//! Character encoding utilities for RTF text.
//!
//! RTF carries 8-bit text in the document code page (`\ansicpgN`) unless a
//! font declares its own character set (`\fcharsetN`). This module maps both
//! to `encoding_rs` encodings and converts in either direction.

use encoding_rs::Encoding;

/// The code page RTF assumes when a document does not declare one.
pub const DEFAULT_CODE_PAGE: u16 = 1252;

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// Returns `None` for code pages that have no usable `encoding_rs`
/// counterpart.
///
/// # Examples
/// ```
/// use flowrtf::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        437 => Some(encoding_rs::IBM866), // IBM866 (close approximation to CP437)
        850 => Some(encoding_rs::IBM866), // DOS Latin 1 (approximation)
        866 => Some(encoding_rs::IBM866),

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),   // Thai
        1250 => Some(encoding_rs::WINDOWS_1250), // Central European
        1251 => Some(encoding_rs::WINDOWS_1251), // Cyrillic
        1252 => Some(encoding_rs::WINDOWS_1252), // Western European (default ANSI)
        1253 => Some(encoding_rs::WINDOWS_1253), // Greek
        1254 => Some(encoding_rs::WINDOWS_1254), // Turkish
        1255 => Some(encoding_rs::WINDOWS_1255), // Hebrew
        1256 => Some(encoding_rs::WINDOWS_1256), // Arabic
        1257 => Some(encoding_rs::WINDOWS_1257), // Baltic
        1258 => Some(encoding_rs::WINDOWS_1258), // Vietnamese

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS), // Japanese Shift-JIS
        936 => Some(encoding_rs::GBK),       // Simplified Chinese (GB2312/GBK)
        949 => Some(encoding_rs::EUC_KR),    // Korean
        950 => Some(encoding_rs::BIG5),      // Traditional Chinese (Big5)
        20936 => Some(encoding_rs::GBK),     // GB2312
        54936 => Some(encoding_rs::GB18030), // Chinese GB18030
        20932 => Some(encoding_rs::EUC_JP),  // Japanese EUC-JP

        // ISO 8859 series
        28591 => Some(encoding_rs::WINDOWS_1252), // ISO-8859-1 approximation
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        // Unicode
        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

/// Map an RTF font character set (`\fcharsetN`) to a Windows code page.
///
/// Symbol (2) and OEM (255) character sets have no meaningful code page;
/// `None` tells the caller to keep the document code page.
#[inline]
pub fn charset_to_codepage(charset: u8) -> Option<u16> {
    match charset {
        0 => Some(1252),   // ANSI
        77 => Some(10000), // Mac Roman
        128 => Some(932),  // Shift JIS
        129 => Some(949),  // Hangul
        134 => Some(936),  // GB2312
        136 => Some(950),  // Big5
        161 => Some(1253), // Greek
        162 => Some(1254), // Turkish
        163 => Some(1258), // Vietnamese
        177 => Some(1255), // Hebrew
        178 => Some(1256), // Arabic
        186 => Some(1257), // Baltic
        204 => Some(1251), // Russian
        222 => Some(874),  // Thai
        238 => Some(1250), // Eastern European
        _ => None,
    }
}

/// Decode 8-bit text in the given code page, falling back to Windows-1252.
#[inline]
pub fn decode_bytes(bytes: &[u8], codepage: u16) -> String {
    let encoding = codepage_to_encoding(codepage as u32).unwrap_or(encoding_rs::WINDOWS_1252);
    let (decoded, _) = encoding.decode_without_bom_handling(bytes);
    decoded.into_owned()
}

/// Encode a single character as one byte of the given code page.
///
/// Returns `None` when the character is not representable as exactly one
/// byte, in which case RTF output falls back to a `\uN` escape.
#[inline]
pub fn encode_single_byte(ch: char, encoding: &'static Encoding) -> Option<u8> {
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = encoding.encode(ch.encode_utf8(&mut buf));
    if had_errors || bytes.len() != 1 {
        return None;
    }
    Some(bytes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_windows_1252() {
        assert_eq!(decode_bytes(&[0x93, b'a', 0x94], 1252), "\u{201C}a\u{201D}");
        assert_eq!(decode_bytes(&[0xE9], 1252), "é");
    }

    #[test]
    fn test_decode_double_byte() {
        // "日本" in Shift JIS
        assert_eq!(decode_bytes(&[0x93, 0xFA, 0x96, 0x7B], 932), "日本");
    }

    #[test]
    fn test_charset_mapping() {
        assert_eq!(charset_to_codepage(0), Some(1252));
        assert_eq!(charset_to_codepage(204), Some(1251));
        assert_eq!(charset_to_codepage(2), None);
    }

    #[test]
    fn test_encode_single_byte() {
        assert_eq!(encode_single_byte('é', encoding_rs::WINDOWS_1252), Some(0xE9));
        assert_eq!(encode_single_byte('€', encoding_rs::WINDOWS_1252), Some(0x80));
        assert_eq!(encode_single_byte('日', encoding_rs::WINDOWS_1252), None);
    }
}
