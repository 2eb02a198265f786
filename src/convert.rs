//! Conversion entry points.
//!
//! [`Converter`] holds the options of a conversion and runs either direction
//! against a caller-supplied payload store and diagnostic sink. The free
//! functions use default options, an in-memory payload store and a sink
//! that forwards to `tracing`.

use crate::common::{Diagnostic, DiagnosticSink, Error, Result, TracingSink};
use crate::config::ConverterOptions;
use crate::payload::{MemoryPayloadStore, PayloadProvider};
use crate::rtf::{read_rtf, write_rtf};
use tracing::debug;

/// Bidirectional RTF / flow-document converter.
///
/// # Examples
///
/// ```
/// use flowrtf::{Converter, ConverterOptions};
///
/// let converter = Converter::new(ConverterOptions::new().with_default_font("Arial"));
/// let xaml = converter.convert_rtf_to_xaml(r"{\rtf1\ansi{\b Hello}\par}")?;
/// assert!(xaml.contains(r#"<Run FontWeight="Bold">Hello</Run>"#));
///
/// let rtf = converter.convert_xaml_to_rtf(&xaml)?;
/// assert!(rtf.starts_with(r"{\rtf1\ansi\ansicpg1252"));
/// assert!(rtf.contains(r"{\f0\fnil Arial;}"));
/// # Ok::<(), flowrtf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConverterOptions,
}

impl Converter {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert RTF text to flow-document markup.
    ///
    /// Non-ASCII characters in `rtf` are taken as they are; `\'hh` escapes
    /// are decoded with the document's code page.
    pub fn convert_rtf_to_xaml_with(
        &self,
        rtf: &str,
        payloads: &mut dyn PayloadProvider,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<String> {
        self.options.validate()?;
        if rtf.trim().is_empty() {
            return Ok(String::new());
        }
        debug!(bytes = rtf.len(), "Converting RTF to XAML");
        let root = read_rtf(rtf.as_bytes(), true, &self.options, payloads, sink)?;
        Ok(root.to_xaml())
    }

    /// Convert raw RTF bytes to flow-document markup.
    ///
    /// Bytes outside ASCII are decoded with the document's code page.
    pub fn convert_rtf_bytes_to_xaml_with(
        &self,
        rtf: &[u8],
        payloads: &mut dyn PayloadProvider,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<String> {
        self.options.validate()?;
        if rtf.iter().all(u8::is_ascii_whitespace) {
            return Ok(String::new());
        }
        debug!(bytes = rtf.len(), "Converting RTF bytes to XAML");
        let root = read_rtf(rtf, false, &self.options, payloads, sink)?;
        Ok(root.to_xaml())
    }

    /// Convert flow-document markup to RTF.
    ///
    /// Image sources are resolved through `payloads`.
    pub fn convert_xaml_to_rtf_with(
        &self,
        xaml: &str,
        payloads: &mut dyn PayloadProvider,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<String> {
        self.options.validate()?;
        if xaml.trim().is_empty() {
            return Ok(String::new());
        }
        debug!(bytes = xaml.len(), "Converting XAML to RTF");
        match write_rtf(xaml, &self.options, &*payloads, sink) {
            Ok(rtf) => Ok(rtf),
            Err(e) => {
                sink.report(Diagnostic::fatal(&e));
                Err(e)
            },
        }
    }

    /// Convert RTF text to markup, discarding embedded pictures.
    pub fn convert_rtf_to_xaml(&self, rtf: &str) -> Result<String> {
        let mut payloads = MemoryPayloadStore::new();
        self.convert_rtf_to_xaml_with(rtf, &mut payloads, &mut TracingSink)
    }

    /// Convert markup to RTF. Images cannot be resolved and are skipped.
    pub fn convert_xaml_to_rtf(&self, xaml: &str) -> Result<String> {
        let mut payloads = MemoryPayloadStore::new();
        self.convert_xaml_to_rtf_with(xaml, &mut payloads, &mut TracingSink)
    }
}

/// Convert RTF to flow-document markup with default options.
///
/// ```
/// let xaml = flowrtf::convert_rtf_to_xaml(r"{\rtf1{\colortbl;\red255\green0\blue0;}\cf1 Hello}")?;
/// assert!(xaml.contains(r##"<Run Foreground="#FFFF0000">Hello</Run>"##));
/// assert_eq!(flowrtf::convert_rtf_to_xaml("")?, "");
/// # Ok::<(), flowrtf::Error>(())
/// ```
pub fn convert_rtf_to_xaml(rtf: &str) -> Result<String> {
    Converter::default().convert_rtf_to_xaml(rtf)
}

/// Convert flow-document markup to RTF with default options.
pub fn convert_xaml_to_rtf(xaml: &str) -> Result<String> {
    Converter::default().convert_xaml_to_rtf(xaml)
}

/// Like [`convert_rtf_to_xaml`], for callers whose input may be absent.
pub fn convert_optional_rtf_to_xaml(rtf: Option<&str>) -> Result<String> {
    let rtf = rtf.ok_or_else(|| Error::InvalidArgument("RTF input is absent".into()))?;
    convert_rtf_to_xaml(rtf)
}

/// Like [`convert_xaml_to_rtf`], for callers whose input may be absent.
pub fn convert_optional_xaml_to_rtf(xaml: Option<&str>) -> Result<String> {
    let xaml = xaml.ok_or_else(|| Error::InvalidArgument("markup input is absent".into()))?;
    convert_xaml_to_rtf(xaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ErrorKind, Severity};
    use crate::xaml::parse_tree;

    const SECTION: &str = "<Section xmlns=\"http://schemas.microsoft.com/winfx/2006/xaml/presentation\" xml:space=\"preserve\">";

    fn round_trip(xaml: &str) -> String {
        convert_rtf_to_xaml(&convert_xaml_to_rtf(xaml).unwrap()).unwrap()
    }

    fn same_tree(a: &str, b: &str) -> bool {
        parse_tree(a, 64).unwrap() == parse_tree(b, 64).unwrap()
    }

    #[test]
    fn test_color_reference_survives_both_directions() {
        let xaml = convert_rtf_to_xaml(r"{\rtf1{\colortbl;\red255\green0\blue0;}\cf1 Hello}").unwrap();
        assert!(xaml.starts_with(SECTION));
        assert!(xaml.contains(r##"<Run Foreground="#FFFF0000">Hello</Run>"##));

        let rtf = convert_xaml_to_rtf(&xaml).unwrap();
        assert!(rtf.contains(r"{\colortbl;\red255\green0\blue0;}"));
        assert!(rtf.contains(r"\cf1 Hello"));
    }

    #[test]
    fn test_markup_round_trip() {
        let xaml = format!(
            "{}<Paragraph TextAlignment=\"Center\"><Run FontWeight=\"Bold\">Title</Run></Paragraph>\
             <Paragraph><Run>Plain </Run><Run FontStyle=\"Italic\" Foreground=\"#FFFF0000\">red</Run></Paragraph>\
             <List MarkerStyle=\"Decimal\"><ListItem><Paragraph><Run>one</Run></Paragraph></ListItem>\
             <ListItem><Paragraph><Run>two</Run></Paragraph></ListItem></List>\
             <Table><Table.Columns><TableColumn Width=\"96\" /><TableColumn Width=\"192\" /></Table.Columns>\
             <TableRowGroup><TableRow><TableCell><Paragraph><Run>a</Run></Paragraph></TableCell>\
             <TableCell><Paragraph><Run>b</Run></Paragraph></TableCell></TableRow></TableRowGroup></Table>\
             <Paragraph><Run>end</Run></Paragraph></Section>",
            SECTION
        );
        let back = round_trip(&xaml);
        assert!(same_tree(&back, &xaml), "{}", back);
    }

    #[test]
    fn test_repeated_conversion_is_stable() {
        let rtf = r#"{\rtf1\ansi{\fonttbl{\f0 Times New Roman;}{\f1 Arial;}}{\colortbl;\red0\green0\blue255;}
\f1\fs28\cf1 Hello \b world\b0\par
{\field{\*\fldinst HYPERLINK "http://example.com"}{\fldrslt link}}\par}"#;
        let once = convert_rtf_to_xaml(rtf).unwrap();
        assert!(once.contains(r#"FontFamily="Arial""#));
        assert!(once.contains(r#"<Hyperlink NavigateUri="http://example.com">"#));

        let twice = round_trip(&once);
        assert!(same_tree(&once, &twice), "{}\n{}", once, twice);
        assert!(same_tree(&twice, &round_trip(&twice)));
    }

    #[test]
    fn test_unbalanced_groups_abort() {
        let converter = Converter::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let result = converter.convert_rtf_to_xaml_with(r"{\rtf1 {\b x}", &mut payloads, &mut sink);
        assert!(matches!(result, Err(Error::Structural(_))));
        assert_eq!(sink.last().unwrap().severity, Severity::Fatal);
    }

    #[test]
    fn test_unbalanced_markup_aborts() {
        let converter = Converter::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let xaml = format!("{}<Paragraph><Run>x</Paragraph></Section>", SECTION);
        let result = converter.convert_xaml_to_rtf_with(&xaml, &mut payloads, &mut sink);
        assert!(matches!(result, Err(Error::Structural(_))));
        assert_eq!(sink.last().unwrap().severity, Severity::Fatal);
    }

    #[test]
    fn test_missing_list_falls_back_to_disc() {
        let converter = Converter::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let xaml = converter
            .convert_rtf_to_xaml_with(r"{\rtf1\pard\ls5\ilvl0 item\par}", &mut payloads, &mut sink)
            .unwrap();
        assert!(xaml.contains(r#"<List MarkerStyle="Disc"><ListItem><Paragraph><Run>item</Run>"#));
        assert!(!sink.is_empty());
        assert!(sink.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert_rtf_to_xaml("").unwrap(), "");
        assert_eq!(convert_rtf_to_xaml(" \r\n").unwrap(), "");
        assert_eq!(convert_xaml_to_rtf("").unwrap(), "");
        assert_eq!(convert_optional_xaml_to_rtf(Some("\n")).unwrap(), "");
    }

    #[test]
    fn test_absent_input() {
        let err = convert_optional_rtf_to_xaml(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        let err = convert_optional_xaml_to_rtf(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
    }

    #[test]
    fn test_invalid_options_fail_before_input() {
        let converter = Converter::new(ConverterOptions::new().with_default_font(" "));
        // Not even empty input gets past validation
        assert!(matches!(converter.convert_rtf_to_xaml(""), Err(Error::InvalidArgument(_))));
        let converter = Converter::new(ConverterOptions::new().with_code_page(1));
        assert!(matches!(
            converter.convert_xaml_to_rtf("<Section />"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_code_page_bytes() {
        let converter = Converter::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let xaml = converter
            .convert_rtf_bytes_to_xaml_with(
                b"{\\rtf1\\ansi\\ansicpg1251 \xcf\xf0\xe8\xe2\xe5\xf2\\par}",
                &mut payloads,
                &mut sink,
            )
            .unwrap();
        assert!(xaml.contains("<Run>\u{41f}\u{440}\u{438}\u{432}\u{435}\u{442}</Run>"), "{}", xaml);

        let cyrillic = Converter::new(ConverterOptions::new().with_code_page(1251));
        let rtf = cyrillic.convert_xaml_to_rtf(&xaml).unwrap();
        assert!(rtf.contains(r"\ansicpg1251"));
        assert!(rtf.contains(r"\'cf\'f0\'e8\'e2\'e5\'f2"));
    }

    #[test]
    fn test_picture_round_trip_through_payload_store() {
        let converter = Converter::default();
        let mut payloads = MemoryPayloadStore::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let rtf = r"{\rtf1{\pict\pngblip\picw10\pich10\picwgoal150\pichgoal150 89504e470d0a1a0a}\par}";
        let xaml = converter
            .convert_rtf_to_xaml_with(rtf, &mut payloads, &mut sink)
            .unwrap();
        assert_eq!(payloads.len(), 1);
        assert!(xaml.contains("./Image1.png"));

        let back = converter
            .convert_xaml_to_rtf_with(&xaml, &mut payloads, &mut sink)
            .unwrap();
        assert!(back.contains(r"\pngblip"));
        assert!(back.contains("89504e470d0a1a0a"));
        assert!(sink.is_empty(), "{:?}", sink);
    }
}
