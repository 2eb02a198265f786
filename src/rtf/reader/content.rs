//! Content destinations: character, paragraph and table control words, and
//! resolution of RTF state into markup properties.

use super::{BoxProps, CellGeometry, ListPlacement, ParagraphProps, RowDef, RtfReader, RunProps};
use crate::common::unit::{half_points_to_px, twips_to_px};
use crate::common::{Error, Result};
use crate::rtf::border::{Border, BorderSide, BorderStyle, Borders, Shading};
use crate::rtf::control::{Control, ControlWordInfo};
use crate::rtf::format::{Alignment, BorderTarget, ParaFormat, UnderlineStyle, VerticalAlign};
use crate::rtf::lexer::Token;
use crate::rtf::list::{MarkerStyle, resolve_marker};
use crate::rtf::table::{MergeFlags, WidthType};
use crate::rtf::types::{Color, ColorRef};
use crate::xaml::properties::{Decorations, Thickness, lcid_to_language};
use tracing::trace;

/// Color reference from a parameter; index 0 means the default color.
#[inline]
fn color_ref(param: Option<i32>) -> Option<ColorRef> {
    param.filter(|p| *p > 0).map(|p| p as ColorRef)
}

impl RtfReader<'_> {
    pub(super) fn content_control(
        &mut self,
        info: &ControlWordInfo,
        token: &Token<'_>,
    ) -> Result<()> {
        let param = token.parameter;
        let value = param.unwrap_or(0);
        let on = token.toggle();
        let limits = self.options.limits;

        match info.control {
            // Character formatting
            Control::Plain => self.scopes.top_mut().chars.plain(),
            Control::Bold => self.scopes.top_mut().chars.bold = on,
            Control::Italic => self.scopes.top_mut().chars.italic = on,
            Control::Underline
            | Control::UnderlineDouble
            | Control::UnderlineDotted
            | Control::UnderlineDash
            | Control::UnderlineWord
            | Control::UnderlineThick
            | Control::UnderlineWave => {
                let style = match info.control {
                    Control::UnderlineDouble => UnderlineStyle::Double,
                    Control::UnderlineDotted => UnderlineStyle::Dotted,
                    Control::UnderlineDash => UnderlineStyle::Dashed,
                    Control::UnderlineWord => UnderlineStyle::Words,
                    Control::UnderlineThick => UnderlineStyle::Thick,
                    Control::UnderlineWave => UnderlineStyle::Wave,
                    _ => UnderlineStyle::Single,
                };
                self.scopes.top_mut().chars.underline =
                    if on { style } else { UnderlineStyle::None };
            },
            Control::UnderlineNone => self.scopes.top_mut().chars.underline = UnderlineStyle::None,
            Control::Strike | Control::StrikeDouble => self.scopes.top_mut().chars.strike = on,
            Control::Superscript | Control::Subscript => {
                let vertical = match (on, info.control) {
                    (false, _) => VerticalAlign::Baseline,
                    (true, Control::Superscript) => VerticalAlign::Superscript,
                    (true, _) => VerticalAlign::Subscript,
                };
                self.scopes.top_mut().chars.vertical = vertical;
            },
            Control::NoSuperSub => self.scopes.top_mut().chars.vertical = VerticalAlign::Baseline,
            Control::Font => self.select_font(value),
            Control::FontSize => {
                let size = match param {
                    Some(p) => limits.clamp_font_size(p),
                    None => 24,
                };
                self.scopes.top_mut().chars.font_size = Some(size);
            },
            Control::ForeColor => self.scopes.top_mut().chars.fore_color = color_ref(param),
            Control::BackColor | Control::Highlight | Control::CharShadingBackColor => {
                self.scopes.top_mut().chars.back_color = color_ref(param);
            },
            Control::Language => {
                self.scopes.top_mut().chars.language =
                    param.filter(|p| (0..=u16::MAX as i32).contains(p)).map(|p| p as u16);
            },

            // Paragraph formatting
            Control::ParagraphDefault => {
                let top = self.scopes.top_mut();
                top.para.reset();
                top.border_target = None;
            },
            Control::Paragraph => self.end_paragraph()?,
            Control::AlignLeft => self.scopes.top_mut().para.alignment = Alignment::Left,
            Control::AlignRight => self.scopes.top_mut().para.alignment = Alignment::Right,
            Control::AlignCenter => self.scopes.top_mut().para.alignment = Alignment::Center,
            Control::AlignJustify => self.scopes.top_mut().para.alignment = Alignment::Justify,
            Control::LeftIndent => self.scopes.top_mut().para.left_indent = value,
            Control::RightIndent => self.scopes.top_mut().para.right_indent = value,
            Control::FirstLineIndent => self.scopes.top_mut().para.first_indent = value,
            Control::SpaceBefore => self.scopes.top_mut().para.space_before = value,
            Control::SpaceAfter => self.scopes.top_mut().para.space_after = value,
            Control::LineSpacing => self.scopes.top_mut().para.line_spacing = value,
            Control::LineMultiple => self.scopes.top_mut().para.line_multiple = value != 0,
            Control::InTable => self.scopes.top_mut().para.in_table = true,
            Control::NestingLevel => {
                let para = &mut self.scopes.top_mut().para;
                para.nesting = value.max(0);
                para.in_table = value > 0;
            },
            Control::ListIndex => {
                let para = &mut self.scopes.top_mut().para;
                para.list.get_or_insert_default().ls = value;
            },
            Control::ListLevelIndex => {
                let para = &mut self.scopes.top_mut().para;
                para.list.get_or_insert_default().level = value.clamp(0, 8) as u8;
            },

            // Borders and shading
            Control::BorderTop => self.target_border(BorderTarget::Paragraph(BorderSide::Top)),
            Control::BorderBottom => {
                self.target_border(BorderTarget::Paragraph(BorderSide::Bottom))
            },
            Control::BorderLeft => self.target_border(BorderTarget::Paragraph(BorderSide::Left)),
            Control::BorderRight => {
                self.target_border(BorderTarget::Paragraph(BorderSide::Right))
            },
            Control::BorderBox => self.target_border(BorderTarget::ParagraphBox),
            Control::BorderSingle => self.set_border_style(BorderStyle::Single),
            Control::BorderThick => self.set_border_style(BorderStyle::Thick),
            Control::BorderDouble => self.set_border_style(BorderStyle::Double),
            Control::BorderDotted => self.set_border_style(BorderStyle::Dotted),
            Control::BorderDashed => self.set_border_style(BorderStyle::Dashed),
            Control::BorderNone => self.set_border_style(BorderStyle::None),
            Control::BorderWidth => {
                let width = limits.clamp_border_width(value);
                self.update_borders(|border| border.width = width);
            },
            Control::BorderColor => {
                let color = color_ref(param);
                self.update_borders(|border| border.color_ref = color);
            },
            Control::Shading => {
                self.scopes.top_mut().para.shading.percent = limits.clamp_shading(value)
            },
            Control::PatternForeColor => self.scopes.top_mut().para.shading.fore = color_ref(param),
            Control::PatternBackColor => self.scopes.top_mut().para.shading.back = color_ref(param),

            // Special characters
            Control::Tab => self.content_text("\t")?,
            Control::Line => self.builder.line_break(),
            Control::Page | Control::Section => {
                if self.builder.has_inline_content() {
                    self.end_paragraph()?;
                }
            },
            Control::Bullet => self.content_text("\u{2022}")?,
            Control::EnDash => self.content_text("\u{2013}")?,
            Control::EmDash => self.content_text("\u{2014}")?,
            Control::LeftQuote => self.content_text("\u{2018}")?,
            Control::RightQuote => self.content_text("\u{2019}")?,
            Control::LeftDoubleQuote => self.content_text("\u{201C}")?,
            Control::RightDoubleQuote => self.content_text("\u{201D}")?,
            Control::EmSpace => self.content_text("\u{2003}")?,
            Control::EnSpace => self.content_text("\u{2002}")?,
            Control::QmSpace => self.content_text("\u{2005}")?,
            Control::ZeroWidthJoiner => self.content_text("\u{200D}")?,
            Control::ZeroWidthNonJoiner => self.content_text("\u{200C}")?,
            Control::LtrMark => self.content_text("\u{200E}")?,
            Control::RtlMark => self.content_text("\u{200F}")?,

            // Tables
            Control::RowDefaults => self.scopes.top_mut().reset_row(),
            Control::RowLeft => self.scopes.top_mut().row.left = value,
            Control::RowGap => self.scopes.top_mut().row.gap = value.max(0),
            Control::CellBoundary => {
                let top = self.scopes.top_mut();
                let cell = std::mem::take(&mut top.cell);
                top.row.push_cell(cell, value);
                top.border_target = None;
            },
            Control::MergeFirst => self.merge_cell(MergeFlags::HORIZONTAL_FIRST),
            Control::Merge => self.merge_cell(MergeFlags::HORIZONTAL),
            Control::VerticalMergeFirst => self.merge_cell(MergeFlags::VERTICAL_FIRST),
            Control::VerticalMerge => self.merge_cell(MergeFlags::VERTICAL),
            Control::CellBorderTop => self.target_border(BorderTarget::Cell(BorderSide::Top)),
            Control::CellBorderBottom => {
                self.target_border(BorderTarget::Cell(BorderSide::Bottom))
            },
            Control::CellBorderLeft => self.target_border(BorderTarget::Cell(BorderSide::Left)),
            Control::CellBorderRight => self.target_border(BorderTarget::Cell(BorderSide::Right)),
            Control::CellBackColor => self.scopes.top_mut().cell.shading.back = color_ref(param),
            Control::CellPatternColor => self.scopes.top_mut().cell.shading.fore = color_ref(param),
            Control::CellShading => {
                self.scopes.top_mut().cell.shading.percent = limits.clamp_shading(value)
            },
            Control::CellWidth => self.scopes.top_mut().cell.width.value = value,
            Control::CellWidthType => {
                self.scopes.top_mut().cell.width.width_type = WidthType::from_parameter(value)
            },
            Control::Cell => self.end_cell()?,
            Control::NestCell => {
                if self.builder.has_inline_content() {
                    self.end_paragraph()?;
                }
            },
            Control::Row => self.end_row()?,

            _ => trace!(word = info.word, "Control word has no effect on content"),
        }
        Ok(())
    }

    fn select_font(&mut self, number: i32) {
        if self.fonts.get(number).is_some() {
            self.scopes.top_mut().chars.font = Some(number);
            return;
        }
        if !self.warned_fonts.contains(&number) {
            self.warned_fonts.push(number);
            self.warn(&format!("Font {} is not in the font table; using the default font", number));
        }
        self.scopes.top_mut().chars.font = None;
    }

    fn target_border(&mut self, target: BorderTarget) {
        self.scopes.top_mut().border_target = Some(target);
    }

    fn update_borders(&mut self, mut update: impl FnMut(&mut Border)) {
        if let Some((borders, sides)) = self.scopes.top_mut().target_borders() {
            for side in sides {
                update(borders.side_mut(*side));
            }
        }
    }

    fn set_border_style(&mut self, style: BorderStyle) {
        self.update_borders(|border| border.style = style);
    }

    fn merge_cell(&mut self, flag: MergeFlags) {
        self.scopes.top_mut().cell.merge |= flag;
    }

    /// Text in a content destination.
    pub(super) fn content_text(&mut self, text: &str) -> Result<()> {
        let props = self.run_props()?;
        self.builder.text(&props, text);
        Ok(())
    }

    /// Markup properties of the current character formatting.
    fn run_props(&mut self) -> Result<RunProps> {
        let chars = self.scopes.top().chars;
        if let Some((cached, props)) = &self.run_cache
            && *cached == chars
        {
            return Ok(props.clone());
        }

        let font_family = chars
            .font
            .filter(|f| Some(*f) != self.default_font)
            .and_then(|f| self.fonts.get(f))
            .map(|font| font.name.clone())
            .filter(|name| !name.is_empty());
        let props = RunProps {
            font_family,
            font_size: chars.font_size.map(half_points_to_px),
            bold: chars.bold,
            italic: chars.italic,
            decorations: Decorations {
                underline: chars.underline != UnderlineStyle::None,
                strikethrough: chars.strike,
            },
            baseline: chars.vertical,
            foreground: self.resolve_color(chars.fore_color)?,
            background: self.resolve_color(chars.back_color)?,
            language: chars
                .language
                .filter(|lang| *lang != self.default_language)
                .and_then(lcid_to_language),
        };
        self.run_cache = Some((chars, props.clone()));
        Ok(props)
    }

    /// Concrete color of a character color reference.
    ///
    /// A reference past the end of the color table is a structural error;
    /// the auto entry resolves to no color.
    fn resolve_color(&self, color: Option<ColorRef>) -> Result<Option<Color>> {
        let Some(index) = color else {
            return Ok(None);
        };
        match self.colors.get(index) {
            Some(entry) if entry.is_auto => Ok(None),
            Some(entry) => Ok(Some(entry.color)),
            None => Err(Error::Structural(format!(
                "Color index {} is not in the color table ({} entries)",
                index,
                self.colors.len()
            ))),
        }
    }

    /// Border color; unresolvable references fall back to the default.
    fn lenient_color(&self, color: Option<ColorRef>) -> Option<Color> {
        color
            .and_then(|index| self.colors.get(index))
            .filter(|entry| !entry.is_auto)
            .map(|entry| entry.color)
    }

    fn box_props(&self, borders: &Borders, shading: &Shading) -> BoxProps {
        let border_thickness = borders.has_any_border().then(|| Thickness {
            left: twips_to_px(borders.left.effective_width()),
            top: twips_to_px(borders.top.effective_width()),
            right: twips_to_px(borders.right.effective_width()),
            bottom: twips_to_px(borders.bottom.effective_width()),
        });
        BoxProps {
            border_thickness,
            border_brush: self.lenient_color(borders.color_ref()),
            background: shading.resolve(&self.colors, &self.options.limits),
        }
    }

    fn paragraph_props(&self, para: &ParaFormat) -> ParagraphProps {
        let line_height = (para.line_spacing != 0 && !para.line_multiple)
            .then(|| twips_to_px(para.line_spacing.saturating_abs()));
        ParagraphProps {
            alignment: para.alignment,
            margin: Thickness {
                left: twips_to_px(para.left_indent),
                top: twips_to_px(para.space_before),
                right: twips_to_px(para.right_indent),
                bottom: twips_to_px(para.space_after),
            },
            text_indent: twips_to_px(para.first_indent),
            line_height,
            frame: self.box_props(&para.borders, &para.shading),
        }
    }

    fn list_placement(&mut self, para: &ParaFormat) -> Option<ListPlacement> {
        let list = para.list.filter(|l| l.ls > 0)?;
        let (marker, start) =
            match resolve_marker(&self.lists, &self.overrides, list.ls, list.level as usize) {
                Some(resolved) => resolved,
                None => {
                    self.warn(&format!(
                        "List override {} is not defined; using default list formatting",
                        list.ls
                    ));
                    (MarkerStyle::Disc, 1)
                },
            };
        Some(ListPlacement {
            ls: list.ls,
            level: list.level,
            marker,
            start,
        })
    }

    /// `\par`: close the paragraph in progress.
    pub(super) fn end_paragraph(&mut self) -> Result<()> {
        let para = self.scopes.top().para;
        let props = self.paragraph_props(&para);
        let list = self.list_placement(&para);
        self.builder.end_paragraph(&props, list, para.in_table);
        Ok(())
    }

    fn end_cell(&mut self) -> Result<()> {
        if self.builder.has_inline_content() {
            let mut para = self.scopes.top().para;
            para.in_table = true;
            let props = self.paragraph_props(&para);
            let list = self.list_placement(&para);
            self.builder.end_paragraph(&props, list, true);
        }
        self.builder.end_cell();
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        let top = self.scopes.top();
        let row = &top.row;
        let def = RowDef {
            left: row.left,
            gap: row.gap,
            cells: row
                .cells
                .iter()
                .map(|cell| CellGeometry {
                    right_edge: cell.right_edge,
                    merge: cell.merge,
                    frame: self.box_props(&cell.borders, &cell.shading),
                })
                .collect(),
            fallback_width: top.cell.width.clamped().twips(),
        };
        self.builder.end_row(def);
        Ok(())
    }

    /// Flush the last paragraph when the document group closes.
    pub(super) fn finish_content(&mut self) -> Result<()> {
        if self.builder.has_inline_content() {
            self.end_paragraph()?;
        }
        Ok(())
    }
}
