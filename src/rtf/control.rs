//! Static table of recognized RTF control words.
//!
//! Every control word the converter understands maps to a [`ControlWordInfo`]
//! carrying its canonical [`Control`] and semantic [`ControlFlags`]. Words
//! missing from the table are still tokenized; they simply carry no info and
//! are ignored by the reader.

use bitflags::bitflags;
use phf::phf_map;

bitflags! {
    /// Semantic flags of a control word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlFlags: u16 {
        /// Switches the active destination of its group
        const DESTINATION = 0x0001;
        /// On/off switch; a parameter of 0 turns it off
        const TOGGLE = 0x0002;
        /// Affects character formatting
        const CHARACTER = 0x0004;
        /// Affects paragraph formatting
        const PARAGRAPH = 0x0008;
        /// Table structure or cell formatting
        const TABLE = 0x0010;
        /// List definitions and references
        const LIST = 0x0020;
        /// Color table or color reference
        const COLOR = 0x0040;
        /// Font table or font reference
        const FONT = 0x0080;
        /// Picture properties
        const PICTURE = 0x0100;
        /// Emits a character or structural break
        const SPECIAL = 0x0200;
        /// Document header property
        const HEADER = 0x0400;
    }
}

/// Canonical meaning of a recognized control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    // Document header
    Rtf,
    Ansi,
    Mac,
    Pc,
    Pca,
    AnsiCodePage,
    DefaultFont,
    DefaultLanguage,
    UnicodeSkip,
    Unicode,
    Binary,
    /// `\*`
    Ignorable,

    // Destinations
    FontTable,
    ColorTable,
    ListTable,
    List,
    ListLevel,
    LevelText,
    ListOverrideTable,
    ListOverride,
    ListOverrideLevel,
    Field,
    FieldInstruction,
    FieldResult,
    Shape,
    ShapeInstruction,
    ShapeResult,
    ShapePicture,
    NonShapePicture,
    Picture,
    Object,
    ObjectResult,
    /// A known destination whose content is discarded
    SkipDestination,

    // Character formatting
    Plain,
    Bold,
    Italic,
    Underline,
    UnderlineDouble,
    UnderlineDotted,
    UnderlineDash,
    UnderlineWord,
    UnderlineThick,
    UnderlineWave,
    UnderlineNone,
    Strike,
    StrikeDouble,
    Superscript,
    Subscript,
    NoSuperSub,
    Font,
    FontSize,
    ForeColor,
    BackColor,
    Highlight,
    CharShadingBackColor,
    Language,

    // Font table
    FontCharset,
    FontFamilyKind,

    // Color table
    Red,
    Green,
    Blue,

    // Paragraph formatting
    ParagraphDefault,
    Paragraph,
    AlignLeft,
    AlignRight,
    AlignCenter,
    AlignJustify,
    LeftIndent,
    RightIndent,
    FirstLineIndent,
    SpaceBefore,
    SpaceAfter,
    LineSpacing,
    LineMultiple,
    InTable,
    ListIndex,
    ListLevelIndex,

    // Borders and shading
    BorderTop,
    BorderBottom,
    BorderLeft,
    BorderRight,
    BorderBox,
    BorderSingle,
    BorderThick,
    BorderDouble,
    BorderDotted,
    BorderDashed,
    BorderNone,
    BorderWidth,
    BorderColor,
    Shading,
    PatternForeColor,
    PatternBackColor,

    // Special characters
    Tab,
    Line,
    Page,
    Section,
    Bullet,
    EnDash,
    EmDash,
    LeftQuote,
    RightQuote,
    LeftDoubleQuote,
    RightDoubleQuote,
    EmSpace,
    EnSpace,
    QmSpace,
    ZeroWidthJoiner,
    ZeroWidthNonJoiner,
    LtrMark,
    RtlMark,

    // Tables
    RowDefaults,
    RowLeft,
    RowGap,
    CellBoundary,
    Cell,
    Row,
    NestCell,
    NestRow,
    NestingLevel,
    MergeFirst,
    Merge,
    VerticalMergeFirst,
    VerticalMerge,
    CellBorderTop,
    CellBorderBottom,
    CellBorderLeft,
    CellBorderRight,
    CellBackColor,
    CellPatternColor,
    CellShading,
    CellWidth,
    CellWidthType,

    // Lists
    ListId,
    LevelNumberFormat,
    LevelNumberFormatN,
    LevelStartAt,
    ListOverrideStartAt,

    // Pictures
    PictureWidth,
    PictureHeight,
    PictureGoalWidth,
    PictureGoalHeight,
    PictureScaleX,
    PictureScaleY,
    PngBlip,
    JpegBlip,
    EmfBlip,
    WindowsMetafile,
    PmMetafile,
    DeviceIndependentBitmap,
    WindowsBitmap,
    MacPicture,
}

/// Static lookup record for a recognized control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWordInfo {
    /// Spelling in RTF source
    pub word: &'static str,
    /// Canonical meaning
    pub control: Control,
    /// Semantic flags
    pub flags: ControlFlags,
}

impl ControlWordInfo {
    #[inline]
    pub const fn is_destination(&self) -> bool {
        self.flags.contains(ControlFlags::DESTINATION)
    }

    #[inline]
    pub const fn is_toggle(&self) -> bool {
        self.flags.contains(ControlFlags::TOGGLE)
    }
}

const fn cw(word: &'static str, control: Control, flags: ControlFlags) -> ControlWordInfo {
    ControlWordInfo {
        word,
        control,
        flags,
    }
}

const DST: ControlFlags = ControlFlags::DESTINATION;
const CHR: ControlFlags = ControlFlags::CHARACTER;
const TGL: ControlFlags = ControlFlags::CHARACTER.union(ControlFlags::TOGGLE);
const PAR: ControlFlags = ControlFlags::PARAGRAPH;
const TBL: ControlFlags = ControlFlags::TABLE;
const LST: ControlFlags = ControlFlags::LIST;
const CLR: ControlFlags = ControlFlags::COLOR;
const FNT: ControlFlags = ControlFlags::FONT;
const PIC: ControlFlags = ControlFlags::PICTURE;
const SPC: ControlFlags = ControlFlags::SPECIAL;
const HDR: ControlFlags = ControlFlags::HEADER;
const BRD: ControlFlags = ControlFlags::PARAGRAPH.union(ControlFlags::TABLE);

static CONTROL_WORDS: phf::Map<&'static str, ControlWordInfo> = phf_map! {
    // Header
    "rtf" => cw("rtf", Control::Rtf, HDR),
    "ansi" => cw("ansi", Control::Ansi, HDR),
    "mac" => cw("mac", Control::Mac, HDR),
    "pc" => cw("pc", Control::Pc, HDR),
    "pca" => cw("pca", Control::Pca, HDR),
    "ansicpg" => cw("ansicpg", Control::AnsiCodePage, HDR),
    "deff" => cw("deff", Control::DefaultFont, HDR.union(FNT)),
    "deflang" => cw("deflang", Control::DefaultLanguage, HDR),
    "uc" => cw("uc", Control::UnicodeSkip, HDR),
    "u" => cw("u", Control::Unicode, SPC),
    "bin" => cw("bin", Control::Binary, PIC),
    "*" => cw("*", Control::Ignorable, ControlFlags::empty()),

    // Resource table destinations
    "fonttbl" => cw("fonttbl", Control::FontTable, DST.union(FNT)),
    "colortbl" => cw("colortbl", Control::ColorTable, DST.union(CLR)),
    "listtable" => cw("listtable", Control::ListTable, DST.union(LST)),
    "list" => cw("list", Control::List, DST.union(LST)),
    "listlevel" => cw("listlevel", Control::ListLevel, DST.union(LST)),
    "leveltext" => cw("leveltext", Control::LevelText, DST.union(LST)),
    "listoverridetable" => cw("listoverridetable", Control::ListOverrideTable, DST.union(LST)),
    "listoverride" => cw("listoverride", Control::ListOverride, DST.union(LST)),
    "lfolevel" => cw("lfolevel", Control::ListOverrideLevel, DST.union(LST)),

    // Content destinations
    "field" => cw("field", Control::Field, DST),
    "fldinst" => cw("fldinst", Control::FieldInstruction, DST),
    "fldrslt" => cw("fldrslt", Control::FieldResult, DST),
    "shp" => cw("shp", Control::Shape, DST),
    "shpinst" => cw("shpinst", Control::ShapeInstruction, DST),
    "shprslt" => cw("shprslt", Control::ShapeResult, DST),
    "shppict" => cw("shppict", Control::ShapePicture, DST),
    "nonshppict" => cw("nonshppict", Control::NonShapePicture, DST),
    "pict" => cw("pict", Control::Picture, DST.union(PIC)),
    "object" => cw("object", Control::Object, DST),
    "result" => cw("result", Control::ObjectResult, DST),

    // Destinations skipped wholesale
    "objdata" => cw("objdata", Control::SkipDestination, DST),
    "stylesheet" => cw("stylesheet", Control::SkipDestination, DST),
    "info" => cw("info", Control::SkipDestination, DST),
    "header" => cw("header", Control::SkipDestination, DST),
    "headerl" => cw("headerl", Control::SkipDestination, DST),
    "headerr" => cw("headerr", Control::SkipDestination, DST),
    "headerf" => cw("headerf", Control::SkipDestination, DST),
    "footer" => cw("footer", Control::SkipDestination, DST),
    "footerl" => cw("footerl", Control::SkipDestination, DST),
    "footerr" => cw("footerr", Control::SkipDestination, DST),
    "footerf" => cw("footerf", Control::SkipDestination, DST),
    "footnote" => cw("footnote", Control::SkipDestination, DST),
    "annotation" => cw("annotation", Control::SkipDestination, DST),
    "atnid" => cw("atnid", Control::SkipDestination, DST),
    "atnauthor" => cw("atnauthor", Control::SkipDestination, DST),
    "pntext" => cw("pntext", Control::SkipDestination, DST),
    "pn" => cw("pn", Control::SkipDestination, DST),
    "listtext" => cw("listtext", Control::SkipDestination, DST),
    "levelnumbers" => cw("levelnumbers", Control::SkipDestination, DST),
    "listname" => cw("listname", Control::SkipDestination, DST),
    "falt" => cw("falt", Control::SkipDestination, DST),
    "panose" => cw("panose", Control::SkipDestination, DST),
    "bkmkstart" => cw("bkmkstart", Control::SkipDestination, DST),
    "bkmkend" => cw("bkmkend", Control::SkipDestination, DST),
    "generator" => cw("generator", Control::SkipDestination, DST),
    "themedata" => cw("themedata", Control::SkipDestination, DST),
    "colorschememapping" => cw("colorschememapping", Control::SkipDestination, DST),
    "datastore" => cw("datastore", Control::SkipDestination, DST),
    "latentstyles" => cw("latentstyles", Control::SkipDestination, DST),
    "rsidtbl" => cw("rsidtbl", Control::SkipDestination, DST),
    "xmlnstbl" => cw("xmlnstbl", Control::SkipDestination, DST),
    "nesttableprops" => cw("nesttableprops", Control::SkipDestination, DST),
    "nonesttables" => cw("nonesttables", Control::SkipDestination, DST),
    "blipuid" => cw("blipuid", Control::SkipDestination, DST),
    "picprop" => cw("picprop", Control::SkipDestination, DST),
    "sp" => cw("sp", Control::SkipDestination, DST),
    "revtbl" => cw("revtbl", Control::SkipDestination, DST),
    "pgdsctbl" => cw("pgdsctbl", Control::SkipDestination, DST),
    "mmathPr" => cw("mmathPr", Control::SkipDestination, DST),
    "wgrffmtfilter" => cw("wgrffmtfilter", Control::SkipDestination, DST),
    "docvar" => cw("docvar", Control::SkipDestination, DST),
    "userprops" => cw("userprops", Control::SkipDestination, DST),
    "listpicture" => cw("listpicture", Control::SkipDestination, DST),
    "ftnsep" => cw("ftnsep", Control::SkipDestination, DST),
    "ftnsepc" => cw("ftnsepc", Control::SkipDestination, DST),
    "aftnsep" => cw("aftnsep", Control::SkipDestination, DST),
    "aftnsepc" => cw("aftnsepc", Control::SkipDestination, DST),
    "template" => cw("template", Control::SkipDestination, DST),
    "xe" => cw("xe", Control::SkipDestination, DST),
    "tc" => cw("tc", Control::SkipDestination, DST),

    // Character formatting
    "plain" => cw("plain", Control::Plain, CHR),
    "b" => cw("b", Control::Bold, TGL),
    "i" => cw("i", Control::Italic, TGL),
    "ul" => cw("ul", Control::Underline, TGL),
    "uldb" => cw("uldb", Control::UnderlineDouble, TGL),
    "uld" => cw("uld", Control::UnderlineDotted, TGL),
    "uldash" => cw("uldash", Control::UnderlineDash, TGL),
    "ulw" => cw("ulw", Control::UnderlineWord, TGL),
    "ulth" => cw("ulth", Control::UnderlineThick, TGL),
    "ulwave" => cw("ulwave", Control::UnderlineWave, TGL),
    "ulnone" => cw("ulnone", Control::UnderlineNone, CHR),
    "strike" => cw("strike", Control::Strike, TGL),
    "striked" => cw("striked", Control::StrikeDouble, TGL),
    "super" => cw("super", Control::Superscript, TGL),
    "sub" => cw("sub", Control::Subscript, TGL),
    "nosupersub" => cw("nosupersub", Control::NoSuperSub, CHR),
    "f" => cw("f", Control::Font, CHR.union(FNT)),
    "fs" => cw("fs", Control::FontSize, CHR),
    "cf" => cw("cf", Control::ForeColor, CHR.union(CLR)),
    "cb" => cw("cb", Control::BackColor, CHR.union(CLR)),
    "highlight" => cw("highlight", Control::Highlight, CHR.union(CLR)),
    "chcbpat" => cw("chcbpat", Control::CharShadingBackColor, CHR.union(CLR)),
    "lang" => cw("lang", Control::Language, CHR),

    // Font table
    "fcharset" => cw("fcharset", Control::FontCharset, FNT),
    "fnil" => cw("fnil", Control::FontFamilyKind, FNT),
    "froman" => cw("froman", Control::FontFamilyKind, FNT),
    "fswiss" => cw("fswiss", Control::FontFamilyKind, FNT),
    "fmodern" => cw("fmodern", Control::FontFamilyKind, FNT),
    "fscript" => cw("fscript", Control::FontFamilyKind, FNT),
    "fdecor" => cw("fdecor", Control::FontFamilyKind, FNT),
    "ftech" => cw("ftech", Control::FontFamilyKind, FNT),
    "fbidi" => cw("fbidi", Control::FontFamilyKind, FNT),

    // Color table
    "red" => cw("red", Control::Red, CLR),
    "green" => cw("green", Control::Green, CLR),
    "blue" => cw("blue", Control::Blue, CLR),

    // Paragraph formatting
    "pard" => cw("pard", Control::ParagraphDefault, PAR),
    "par" => cw("par", Control::Paragraph, PAR.union(SPC)),
    "ql" => cw("ql", Control::AlignLeft, PAR),
    "qr" => cw("qr", Control::AlignRight, PAR),
    "qc" => cw("qc", Control::AlignCenter, PAR),
    "qj" => cw("qj", Control::AlignJustify, PAR),
    "li" => cw("li", Control::LeftIndent, PAR),
    "lin" => cw("lin", Control::LeftIndent, PAR),
    "ri" => cw("ri", Control::RightIndent, PAR),
    "rin" => cw("rin", Control::RightIndent, PAR),
    "fi" => cw("fi", Control::FirstLineIndent, PAR),
    "sb" => cw("sb", Control::SpaceBefore, PAR),
    "sa" => cw("sa", Control::SpaceAfter, PAR),
    "sl" => cw("sl", Control::LineSpacing, PAR),
    "slmult" => cw("slmult", Control::LineMultiple, PAR),
    "intbl" => cw("intbl", Control::InTable, PAR.union(TBL)),
    "ls" => cw("ls", Control::ListIndex, PAR.union(LST)),
    "ilvl" => cw("ilvl", Control::ListLevelIndex, PAR.union(LST)),

    // Borders and shading
    "brdrt" => cw("brdrt", Control::BorderTop, PAR),
    "brdrb" => cw("brdrb", Control::BorderBottom, PAR),
    "brdrl" => cw("brdrl", Control::BorderLeft, PAR),
    "brdrr" => cw("brdrr", Control::BorderRight, PAR),
    "box" => cw("box", Control::BorderBox, PAR),
    "brdrs" => cw("brdrs", Control::BorderSingle, BRD),
    "brdrth" => cw("brdrth", Control::BorderThick, BRD),
    "brdrdb" => cw("brdrdb", Control::BorderDouble, BRD),
    "brdrdot" => cw("brdrdot", Control::BorderDotted, BRD),
    "brdrdash" => cw("brdrdash", Control::BorderDashed, BRD),
    "brdrnone" => cw("brdrnone", Control::BorderNone, BRD),
    "brdrw" => cw("brdrw", Control::BorderWidth, BRD),
    "brdrcf" => cw("brdrcf", Control::BorderColor, BRD.union(CLR)),
    "shading" => cw("shading", Control::Shading, PAR),
    "cfpat" => cw("cfpat", Control::PatternForeColor, PAR.union(CLR)),
    "cbpat" => cw("cbpat", Control::PatternBackColor, PAR.union(CLR)),

    // Special characters
    "tab" => cw("tab", Control::Tab, SPC),
    "line" => cw("line", Control::Line, SPC),
    "page" => cw("page", Control::Page, SPC),
    "sect" => cw("sect", Control::Section, SPC),
    "bullet" => cw("bullet", Control::Bullet, SPC),
    "endash" => cw("endash", Control::EnDash, SPC),
    "emdash" => cw("emdash", Control::EmDash, SPC),
    "lquote" => cw("lquote", Control::LeftQuote, SPC),
    "rquote" => cw("rquote", Control::RightQuote, SPC),
    "ldblquote" => cw("ldblquote", Control::LeftDoubleQuote, SPC),
    "rdblquote" => cw("rdblquote", Control::RightDoubleQuote, SPC),
    "emspace" => cw("emspace", Control::EmSpace, SPC),
    "enspace" => cw("enspace", Control::EnSpace, SPC),
    "qmspace" => cw("qmspace", Control::QmSpace, SPC),
    "zwj" => cw("zwj", Control::ZeroWidthJoiner, SPC),
    "zwnj" => cw("zwnj", Control::ZeroWidthNonJoiner, SPC),
    "ltrmark" => cw("ltrmark", Control::LtrMark, SPC),
    "rtlmark" => cw("rtlmark", Control::RtlMark, SPC),

    // Tables
    "trowd" => cw("trowd", Control::RowDefaults, TBL),
    "trleft" => cw("trleft", Control::RowLeft, TBL),
    "trgaph" => cw("trgaph", Control::RowGap, TBL),
    "cellx" => cw("cellx", Control::CellBoundary, TBL),
    "cell" => cw("cell", Control::Cell, TBL.union(SPC)),
    "row" => cw("row", Control::Row, TBL.union(SPC)),
    "nestcell" => cw("nestcell", Control::NestCell, TBL.union(SPC)),
    "nestrow" => cw("nestrow", Control::NestRow, TBL.union(SPC)),
    "itap" => cw("itap", Control::NestingLevel, TBL.union(PAR)),
    "clmgf" => cw("clmgf", Control::MergeFirst, TBL),
    "clmrg" => cw("clmrg", Control::Merge, TBL),
    "clvmgf" => cw("clvmgf", Control::VerticalMergeFirst, TBL),
    "clvmrg" => cw("clvmrg", Control::VerticalMerge, TBL),
    "clbrdrt" => cw("clbrdrt", Control::CellBorderTop, TBL),
    "clbrdrb" => cw("clbrdrb", Control::CellBorderBottom, TBL),
    "clbrdrl" => cw("clbrdrl", Control::CellBorderLeft, TBL),
    "clbrdrr" => cw("clbrdrr", Control::CellBorderRight, TBL),
    "clcbpat" => cw("clcbpat", Control::CellBackColor, TBL.union(CLR)),
    "clcfpat" => cw("clcfpat", Control::CellPatternColor, TBL.union(CLR)),
    "clshdng" => cw("clshdng", Control::CellShading, TBL),
    "clwWidth" => cw("clwWidth", Control::CellWidth, TBL),
    "clftsWidth" => cw("clftsWidth", Control::CellWidthType, TBL),

    // Lists
    "listid" => cw("listid", Control::ListId, LST),
    "levelnfc" => cw("levelnfc", Control::LevelNumberFormat, LST),
    "levelnfcn" => cw("levelnfcn", Control::LevelNumberFormatN, LST),
    "levelstartat" => cw("levelstartat", Control::LevelStartAt, LST),
    "listoverridestartat" => cw("listoverridestartat", Control::ListOverrideStartAt, LST),

    // Pictures
    "picw" => cw("picw", Control::PictureWidth, PIC),
    "pich" => cw("pich", Control::PictureHeight, PIC),
    "picwgoal" => cw("picwgoal", Control::PictureGoalWidth, PIC),
    "pichgoal" => cw("pichgoal", Control::PictureGoalHeight, PIC),
    "picscalex" => cw("picscalex", Control::PictureScaleX, PIC),
    "picscaley" => cw("picscaley", Control::PictureScaleY, PIC),
    "pngblip" => cw("pngblip", Control::PngBlip, PIC),
    "jpegblip" => cw("jpegblip", Control::JpegBlip, PIC),
    "emfblip" => cw("emfblip", Control::EmfBlip, PIC),
    "wmetafile" => cw("wmetafile", Control::WindowsMetafile, PIC),
    "pmmetafile" => cw("pmmetafile", Control::PmMetafile, PIC),
    "dibitmap" => cw("dibitmap", Control::DeviceIndependentBitmap, PIC),
    "wbitmap" => cw("wbitmap", Control::WindowsBitmap, PIC),
    "macpict" => cw("macpict", Control::MacPicture, PIC),
};

/// Look up a control word by its spelling.
#[inline]
pub fn lookup(word: &str) -> Option<&'static ControlWordInfo> {
    CONTROL_WORDS.get(word)
}

/// Number of recognized control words.
#[inline]
pub fn table_len() -> usize {
    CONTROL_WORDS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_flags() {
        let bold = lookup("b").unwrap();
        assert_eq!(bold.control, Control::Bold);
        assert!(bold.is_toggle());
        assert!(!bold.is_destination());

        let colortbl = lookup("colortbl").unwrap();
        assert!(colortbl.is_destination());
        assert!(colortbl.flags.contains(ControlFlags::COLOR));

        assert!(lookup("notaword").is_none());
    }

    #[test]
    fn test_table_keys_match_words() {
        for (key, info) in CONTROL_WORDS.entries() {
            assert_eq!(*key, info.word);
        }
        assert!(table_len() > 150);
    }

    #[test]
    fn test_aliases_share_control() {
        assert_eq!(lookup("li").unwrap().control, lookup("lin").unwrap().control);
        assert_eq!(lookup("info").unwrap().control, Control::SkipDestination);
    }
}
