//! RTF field support.
//!
//! RTF fields are structured as:
//! `{\field{\*\fldinst FIELD_INSTRUCTION}{\fldrslt FIELD_RESULT}}`
//!
//! Only HYPERLINK fields change the produced markup; every other field
//! contributes just its result content.

/// Field type in RTF documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Hyperlink field
    Hyperlink,
    /// Cross-reference
    Reference,
    /// Page number
    Page,
    /// Date/time
    Date,
    /// Table of contents
    Toc,
    /// Unknown or custom field
    Unknown,
}

/// Parsed field instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field type
    pub field_type: FieldType,
    /// Positional arguments, unquoted
    pub arguments: Vec<String>,
    /// Switches with their argument, e.g. `("l", Some("anchor"))`
    pub switches: Vec<(String, Option<String>)>,
}

impl Field {
    /// Parse a field instruction to extract the type and parameters.
    pub fn parse_instruction(instruction: &str) -> Self {
        let mut words = split_arguments(instruction).into_iter();
        let field_type = match words.next() {
            Some(word) => match word.to_ascii_uppercase().as_str() {
                "HYPERLINK" => FieldType::Hyperlink,
                "REF" | "PAGEREF" => FieldType::Reference,
                "PAGE" | "NUMPAGES" => FieldType::Page,
                "DATE" | "TIME" | "CREATEDATE" | "SAVEDATE" => FieldType::Date,
                "TOC" => FieldType::Toc,
                _ => FieldType::Unknown,
            },
            None => FieldType::Unknown,
        };

        let mut arguments = Vec::new();
        let mut switches: Vec<(String, Option<String>)> = Vec::new();
        let mut words = words.peekable();
        while let Some(word) = words.next() {
            if let Some(name) = word.strip_prefix('\\').filter(|n| !n.is_empty()) {
                let value = words.next_if(|next| !next.starts_with('\\'));
                switches.push((name.to_string(), value));
            } else {
                arguments.push(word);
            }
        }

        Self {
            field_type,
            arguments,
            switches,
        }
    }

    fn switch(&self, name: &str) -> Option<&str> {
        self.switches
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Navigation target of a HYPERLINK field.
    ///
    /// The `\l` switch names a location in the document and becomes a
    /// `#fragment`.
    pub fn extract_url(&self) -> Option<String> {
        if self.field_type != FieldType::Hyperlink {
            return None;
        }
        let base = self.arguments.first().map(String::as_str).unwrap_or_default();
        let url = match self.switch("l") {
            Some(anchor) => format!("{}#{}", base, anchor),
            None => base.to_string(),
        };
        (!url.is_empty()).then_some(url)
    }
}

/// Split an instruction into words, honoring double quotes and the
/// backslash escapes used inside them.
fn split_arguments(instruction: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = instruction.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        let mut word = String::new();
        if ch == '"' {
            chars.next();
            while let Some(ch) = chars.next() {
                match ch {
                    '"' => break,
                    '\\' if matches!(chars.peek(), Some('"' | '\\')) => {
                        if let Some(escaped) = chars.next() {
                            word.push(escaped);
                        }
                    },
                    _ => word.push(ch),
                }
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || (ch == '"' && !word.is_empty()) {
                    break;
                }
                word.push(ch);
                chars.next();
            }
        }
        words.push(word);
    }
    words
}

/// Build a HYPERLINK instruction for `uri`.
///
/// A `#fragment` becomes the `\l` switch.
pub fn hyperlink_instruction(uri: &str) -> String {
    let quote = |s: &str| s.replace('\\', "\\\\").replace('"', "\\\"");
    match uri.split_once('#') {
        Some((base, anchor)) if base.is_empty() => {
            format!("HYPERLINK \\l \"{}\"", quote(anchor))
        },
        Some((base, anchor)) => {
            format!("HYPERLINK \"{}\" \\l \"{}\"", quote(base), quote(anchor))
        },
        None => format!("HYPERLINK \"{}\"", quote(uri)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hyperlink() {
        let field = Field::parse_instruction(r#" HYPERLINK "https://example.com" "#);
        assert_eq!(field.field_type, FieldType::Hyperlink);
        assert_eq!(field.extract_url(), Some("https://example.com".to_string()));
    }

    #[test]
    fn test_parse_hyperlink_with_tooltip() {
        let field = Field::parse_instruction(r#"HYPERLINK "https://example.com" \o "Click here""#);
        assert_eq!(field.extract_url(), Some("https://example.com".to_string()));
    }

    #[test]
    fn test_parse_local_anchor() {
        let field = Field::parse_instruction(r#"HYPERLINK \l "_Toc1""#);
        assert_eq!(field.extract_url(), Some("#_Toc1".to_string()));
        let field = Field::parse_instruction(r#"HYPERLINK "doc.rtf" \l "top""#);
        assert_eq!(field.extract_url(), Some("doc.rtf#top".to_string()));
    }

    #[test]
    fn test_parse_unquoted_and_other_fields() {
        let field = Field::parse_instruction("HYPERLINK http://a.b/c");
        assert_eq!(field.extract_url(), Some("http://a.b/c".to_string()));
        let page = Field::parse_instruction("PAGE \\* MERGEFORMAT");
        assert_eq!(page.field_type, FieldType::Page);
        assert_eq!(page.extract_url(), None);
    }

    #[test]
    fn test_instruction_round_trip() {
        for uri in ["https://example.com/a?b=1", "#anchor", "file.rtf#x", r#"C:\dir\"q".txt"#] {
            let field = Field::parse_instruction(&hyperlink_instruction(uri));
            assert_eq!(field.extract_url().as_deref(), Some(uri));
        }
    }
}
