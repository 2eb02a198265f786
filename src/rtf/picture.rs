//! RTF picture properties and image type detection.
//!
//! A `{\pict ...}` group carries a blip type control word, size information
//! and the image bytes as hex (or `\bin`). The reader accumulates all of it
//! in a [`Picture`] and hands the bytes to the payload provider when the
//! group closes.

use crate::common::unit::{TWIPS_PER_PX, twips_to_px};

/// Image type in RTF documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// Enhanced Metafile
    Emf,
    /// Windows Metafile
    Wmf,
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// DIB (Device Independent Bitmap)
    Dib,
    /// Mac PICT format
    Pict,
    /// Unknown or unsupported format
    Unknown,
}

impl ImageType {
    /// File extension used for payload URIs.
    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Emf => "emf",
            ImageType::Wmf => "wmf",
            ImageType::Png => "png",
            ImageType::Jpeg => "jpg",
            ImageType::Dib => "bmp",
            ImageType::Pict => "pict",
            ImageType::Unknown => "bin",
        }
    }

    /// Blip control word written for this type.
    pub fn blip_control(self) -> &'static str {
        match self {
            ImageType::Emf => "emfblip",
            ImageType::Wmf => "wmetafile8",
            ImageType::Jpeg => "jpegblip",
            ImageType::Dib => "dibitmap0",
            ImageType::Pict => "macpict",
            ImageType::Png | ImageType::Unknown => "pngblip",
        }
    }

    /// Guess the type from a URI's extension.
    pub fn from_uri(uri: &str) -> ImageType {
        let ext = uri.rsplit('.').next().unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "png" => ImageType::Png,
            "jpg" | "jpeg" => ImageType::Jpeg,
            "emf" => ImageType::Emf,
            "wmf" => ImageType::Wmf,
            "bmp" | "dib" => ImageType::Dib,
            "pict" | "pct" => ImageType::Pict,
            _ => ImageType::Unknown,
        }
    }

    /// Metafile sizes (`\picw`) are in hundredths of a millimeter; bitmap
    /// sizes are in pixels.
    #[inline]
    pub fn is_metafile(self) -> bool {
        matches!(self, ImageType::Emf | ImageType::Wmf | ImageType::Pict)
    }
}

/// Picture collected from a `\pict` group.
#[derive(Debug, Clone, Default)]
pub struct Picture {
    /// Image type from the blip control word, if any
    pub image_type: Option<ImageType>,
    /// Decoded image bytes
    pub data: Vec<u8>,
    /// Picture width (`\picw`)
    pub width: Option<i32>,
    /// Picture height (`\pich`)
    pub height: Option<i32>,
    /// Goal width in twips
    pub goal_width: Option<i32>,
    /// Goal height in twips
    pub goal_height: Option<i32>,
    /// Horizontal scaling percentage
    pub scale_x: Option<i32>,
    /// Vertical scaling percentage
    pub scale_y: Option<i32>,
}

impl Picture {
    /// Final image type: the declared one, else sniffed from the bytes.
    pub fn resolved_type(&self) -> ImageType {
        match self.image_type {
            Some(t) if t != ImageType::Unknown => t,
            _ => detect_image_type(&self.data),
        }
    }

    /// Get the computed width in twips, considering scaling.
    #[inline]
    pub fn computed_width(&self) -> Option<i32> {
        let base = self.goal_width.or_else(|| self.natural_twips(self.width))?;
        Some(scale(base, self.scale_x))
    }

    /// Get the computed height in twips, considering scaling.
    #[inline]
    pub fn computed_height(&self) -> Option<i32> {
        let base = self.goal_height.or_else(|| self.natural_twips(self.height))?;
        Some(scale(base, self.scale_y))
    }

    /// Displayed width in device-independent pixels.
    #[inline]
    pub fn width_px(&self) -> Option<f64> {
        self.computed_width().filter(|w| *w > 0).map(twips_to_px)
    }

    /// Displayed height in device-independent pixels.
    #[inline]
    pub fn height_px(&self) -> Option<f64> {
        self.computed_height().filter(|h| *h > 0).map(twips_to_px)
    }

    fn natural_twips(&self, value: Option<i32>) -> Option<i32> {
        let value = value?;
        if self.resolved_type().is_metafile() {
            // 0.01 mm -> twips
            Some(saturate(value as i64 * 1440 / 2540))
        } else {
            Some((value as f64 * TWIPS_PER_PX) as i32)
        }
    }
}

#[inline]
fn scale(value: i32, percent: Option<i32>) -> i32 {
    match percent {
        Some(scale) if scale > 0 => saturate(value as i64 * scale as i64 / 100),
        _ => value,
    }
}

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Detect image type from binary signature.
pub fn detect_image_type(data: &[u8]) -> ImageType {
    if data.is_empty() {
        return ImageType::Unknown;
    }

    // Check JPEG signature (starts with FFD8)
    if data.starts_with(&[0xFF, 0xD8]) {
        return ImageType::Jpeg;
    }

    // Check PNG signature
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return ImageType::Png;
    }

    // EMF: record type 1 with " EMF" at offset 40
    if data.len() >= 44 && data[0..4] == [0x01, 0x00, 0x00, 0x00] && data[40..44] == *b" EMF" {
        return ImageType::Emf;
    }

    // Check WMF signature (0xD7, 0xCD, 0xC6, 0x9A) - Aldus Placeable Metafile
    if data.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) {
        return ImageType::Wmf;
    }

    if data.starts_with(b"BM") {
        return ImageType::Dib;
    }

    ImageType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        let png_sig = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_image_type(&png_sig), ImageType::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg_sig = vec![0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect_image_type(&jpeg_sig), ImageType::Jpeg);
    }

    #[test]
    fn test_picture_dimensions() {
        let pic = Picture {
            image_type: Some(ImageType::Png),
            goal_width: Some(1440), // 1 inch
            goal_height: Some(720),
            scale_x: Some(200),
            ..Default::default()
        };

        assert_eq!(pic.computed_width(), Some(2880));
        assert_eq!(pic.width_px(), Some(192.0));
        assert_eq!(pic.height_px(), Some(48.0));
    }

    #[test]
    fn test_natural_size_fallback() {
        let bitmap = Picture {
            image_type: Some(ImageType::Png),
            width: Some(10),
            ..Default::default()
        };
        assert_eq!(bitmap.width_px(), Some(10.0));

        let metafile = Picture {
            image_type: Some(ImageType::Wmf),
            width: Some(2540), // 1 inch in 0.01 mm
            ..Default::default()
        };
        assert_eq!(metafile.width_px(), Some(96.0));
    }

    #[test]
    fn test_scaling_saturates() {
        let pic = Picture {
            image_type: Some(ImageType::Png),
            goal_width: Some(i32::MAX),
            goal_height: Some(i32::MIN),
            scale_x: Some(i32::MAX),
            scale_y: Some(200),
            ..Default::default()
        };
        assert_eq!(pic.computed_width(), Some(i32::MAX));
        assert_eq!(pic.computed_height(), Some(i32::MIN));
        assert_eq!(pic.height_px(), None);
    }

    #[test]
    fn test_type_from_uri() {
        assert_eq!(ImageType::from_uri("./Image1.png"), ImageType::Png);
        assert_eq!(ImageType::from_uri("photo.JPEG"), ImageType::Jpeg);
        assert_eq!(ImageType::from_uri("noext"), ImageType::Unknown);
    }
}
