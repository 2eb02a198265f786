//! Resource destinations: color, font and list tables, and pictures.

use super::{FontEntry, RtfReader};
use crate::common::{Diagnostic, Severity};
use crate::rtf::control::{Control, ControlWordInfo};
use crate::rtf::destination::Destination;
use crate::rtf::lexer::Token;
use crate::rtf::picture::ImageType;
use crate::rtf::types::{Font, FontFamily};
use tracing::trace;

#[inline]
fn channel(param: Option<i32>) -> u8 {
    param.unwrap_or(0).clamp(0, 255) as u8
}

impl RtfReader<'_> {
    pub(super) fn color_table_control(&mut self, info: &ControlWordInfo, param: Option<i32>) {
        match info.control {
            Control::Red => self.colors.set_red(channel(param)),
            Control::Green => self.colors.set_green(channel(param)),
            Control::Blue => self.colors.set_blue(channel(param)),
            _ => {},
        }
    }

    pub(super) fn font_table_control(&mut self, info: &ControlWordInfo, token: &Token<'_>) {
        match info.control {
            Control::Font => {
                self.finish_font();
                self.font_entry = Some(FontEntry {
                    number: token.parameter.unwrap_or(0),
                    font: Font::default(),
                });
            },
            Control::FontFamilyKind => {
                if let Some(entry) = self.font_entry.as_mut() {
                    entry.font.family = FontFamily::from_control(token.word());
                }
            },
            Control::FontCharset => {
                if let Some(entry) = self.font_entry.as_mut() {
                    entry.font.charset = token.parameter.map(|c| c.clamp(0, 255) as u8);
                }
            },
            _ => {},
        }
    }

    /// Text of a font table entry; `;` terminates the entry.
    pub(super) fn font_name_text(&mut self, text: &str) {
        let mut segments = text.split(';');
        if let Some(first) = segments.next()
            && let Some(entry) = self.font_entry.as_mut()
        {
            entry.font.name.push_str(first);
        }
        for _ in segments {
            self.finish_font();
        }
    }

    pub(super) fn finish_font(&mut self) {
        let Some(mut entry) = self.font_entry.take() else {
            return;
        };
        entry.font.name = entry.font.name.trim().to_string();
        trace!(number = entry.number, name = %entry.font.name, "Font table entry");
        self.fonts.insert(entry.number, entry.font);
    }

    pub(super) fn list_table_control(&mut self, info: &ControlWordInfo, param: Option<i32>) {
        let value = param.unwrap_or(0);
        match info.control {
            Control::ListId => {
                if self.scopes.top().destination == Destination::List
                    && let Some(list) = self.lists.current_entry()
                {
                    list.id = value;
                }
            },
            Control::LevelNumberFormat | Control::LevelNumberFormatN => {
                if let Some(level) = self
                    .lists
                    .current_entry()
                    .and_then(|list| list.levels.current_entry())
                {
                    level.number_format = value;
                }
            },
            Control::LevelStartAt => {
                if let Some(level) = self
                    .lists
                    .current_entry()
                    .and_then(|list| list.levels.current_entry())
                {
                    level.start_at = value;
                }
            },
            _ => {},
        }
    }

    pub(super) fn list_override_control(&mut self, info: &ControlWordInfo, param: Option<i32>) {
        let destination = self.scopes.top().destination;
        let Some(entry) = self.overrides.current_entry() else {
            return;
        };
        let value = param.unwrap_or(0);
        match info.control {
            Control::ListId => entry.list_id = value,
            Control::ListIndex => entry.index = value,
            Control::LevelStartAt if destination == Destination::ListOverrideLevel => {
                if let Some(start) = entry.level_starts.last_mut() {
                    *start = Some(value);
                }
            },
            _ => {},
        }
    }

    pub(super) fn picture_control(&mut self, info: &ControlWordInfo, param: Option<i32>) {
        let Some(picture) = self.picture.as_mut() else {
            return;
        };
        match info.control {
            Control::PictureWidth => picture.width = param,
            Control::PictureHeight => picture.height = param,
            Control::PictureGoalWidth => picture.goal_width = param,
            Control::PictureGoalHeight => picture.goal_height = param,
            Control::PictureScaleX => picture.scale_x = param,
            Control::PictureScaleY => picture.scale_y = param,
            Control::PngBlip => picture.image_type = Some(ImageType::Png),
            Control::JpegBlip => picture.image_type = Some(ImageType::Jpeg),
            Control::EmfBlip => picture.image_type = Some(ImageType::Emf),
            Control::WindowsMetafile | Control::PmMetafile => {
                picture.image_type = Some(ImageType::Wmf)
            },
            Control::DeviceIndependentBitmap | Control::WindowsBitmap => {
                picture.image_type = Some(ImageType::Dib)
            },
            Control::MacPicture => picture.image_type = Some(ImageType::Pict),
            _ => {},
        }
    }

    /// Store the completed picture and place it in the content.
    pub(super) fn finish_picture(&mut self) {
        let Some(picture) = self.picture.take() else {
            return;
        };
        if picture.data.is_empty() {
            self.warn("Picture without data skipped");
            return;
        }
        let image_type = picture.resolved_type();
        let (width, height) = (picture.width_px(), picture.height_px());
        match self.payloads.store(image_type, picture.data) {
            Ok(uri) => {
                if let Some(shape) = self.shapes.last_mut() {
                    shape.has_picture = true;
                }
                self.builder.image(&uri, width, height);
            },
            Err(e) => self
                .sink
                .report(Diagnostic::new(Severity::Error, e.kind(), e.detail())),
        }
    }
}
