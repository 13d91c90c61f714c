//! Image container encoding: RGBA canvas → PNG / JPEG / BMP / GIF bytes.
//!
//! Encoding always happens in memory so a failing encoder never leaves a
//! half-written destination behind.

use crate::config::ConversionConfig;
use crate::error::Text2ImgError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Image formats the tool can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl OutputFormat {
    /// Format for a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Format implied by a destination path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
        })
    }
}

/// Composite `img` onto opaque white; JPEG cannot store alpha.
pub fn flatten_onto_white(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let a = u32::from(p[3]);
        let mix = |c: u8| ((u32::from(c) * a + 255 * (255 - a)) / 255) as u8;
        image::Rgb([mix(p[0]), mix(p[1]), mix(p[2])])
    })
}

/// Encode `img` as `format`. Only `config.jpeg_quality` is consulted.
pub fn encode_image(
    img: &RgbaImage,
    format: OutputFormat,
    config: &ConversionConfig,
) -> Result<Vec<u8>, Text2ImgError> {
    let fail = |e: image::ImageError| Text2ImgError::EncodeFailed {
        format: format.to_string(),
        detail: e.to_string(),
    };

    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let flat = flatten_onto_white(img);
            JpegEncoder::new_with_quality(&mut buf, config.jpeg_quality)
                .encode_image(&flat)
                .map_err(fail)?;
        }
        _ => {
            DynamicImage::ImageRgba8(img.clone())
                .write_to(&mut Cursor::new(&mut buf), format.image_format())
                .map_err(fail)?;
        }
    }
    debug!("Encoded {} → {} bytes", format, buf.len());
    Ok(buf)
}
