//! Configuration types for text-to-image conversion.
//!
//! All rendering behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce the classic
//! look: opaque black text on a transparent canvas, decoded as codepage 437.

use crate::error::Text2ImgError;
use crate::pipeline::encoding::Codepage;
use image::Rgba;
use std::path::PathBuf;

/// Documents wider or taller than this many character cells are sized by
/// extrapolating the average glyph cell instead of measuring the text.
pub const DEFAULT_APPROXIMATE_THRESHOLD: usize = 2000;

/// Side length (rows and columns) of the synthetic block used to measure
/// the average glyph cell.
pub const DEFAULT_PROBE_BLOCK: usize = 1000;

/// Largest magnification of the built-in bitmap face.
pub const MAX_BUILTIN_SCALE: u32 = 16;

/// Opaque black.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Opaque white.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Fully transparent.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Which monospace face renders the text.
#[derive(Debug, Clone, PartialEq)]
pub enum FontChoice {
    /// The built-in 8x8 bitmap glyph set, magnified by an integer `scale`.
    Builtin { scale: u32 },
    /// A fixed-pitch TrueType/OpenType font file rendered at `size_px`.
    TrueType { path: PathBuf, size_px: f32 },
}

impl Default for FontChoice {
    fn default() -> Self {
        FontChoice::Builtin { scale: 2 }
    }
}

/// Configuration for a text-to-image conversion.
///
/// # Example
/// ```rust
/// use text2img::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .foreground(text2img::config::WHITE)
///     .background(text2img::config::BLACK)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Font used for both measuring and drawing. Default: built-in, scale 2.
    pub font: FontChoice,

    /// Text colour. Default: opaque black.
    pub foreground: Rgba<u8>,

    /// Canvas fill. A zero alpha leaves the canvas transparent. Default: transparent.
    pub background: Rgba<u8>,

    /// Encoding assumed when the caller does not force one. Default: 437.
    pub default_codepage: Codepage,

    /// Cell count on either axis above which sizing switches to the
    /// approximate path. Default: 2000.
    pub approximate_threshold: usize,

    /// Rows and columns of the synthetic measurement block. Default: 1000.
    pub probe_block: usize,

    /// JPEG quality (1–100). Default: 90.
    pub jpeg_quality: u8,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            font: FontChoice::default(),
            foreground: BLACK,
            background: TRANSPARENT,
            default_codepage: Codepage::oem_default(),
            approximate_threshold: DEFAULT_APPROXIMATE_THRESHOLD,
            probe_block: DEFAULT_PROBE_BLOCK,
            jpeg_quality: 90,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the ranges [`ConversionConfigBuilder::build`] enforces. Fields
    /// are public, so entry points re-check configs built by hand.
    pub fn validate(&self) -> Result<(), Text2ImgError> {
        match &self.font {
            FontChoice::Builtin { scale } if !(1..=MAX_BUILTIN_SCALE).contains(scale) => {
                return Err(Text2ImgError::InvalidConfig(format!(
                    "Bitmap scale must be 1–{MAX_BUILTIN_SCALE}, got {scale}"
                )));
            }
            FontChoice::TrueType { size_px, .. } if !(4.0..=512.0).contains(size_px) => {
                return Err(Text2ImgError::InvalidConfig(format!(
                    "Font size must be 4–512 px, got {size_px}"
                )));
            }
            _ => {}
        }
        if self.approximate_threshold == 0 {
            return Err(Text2ImgError::InvalidConfig(
                "Approximation threshold must be ≥ 1".into(),
            ));
        }
        if self.probe_block == 0 {
            return Err(Text2ImgError::InvalidConfig(
                "Probe block must be ≥ 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Text2ImgError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn font(mut self, font: FontChoice) -> Self {
        self.config.font = font;
        self
    }

    /// Use the built-in bitmap face at the given magnification.
    pub fn builtin_font(self, scale: u32) -> Self {
        self.font(FontChoice::Builtin { scale })
    }

    /// Use a TrueType/OpenType file at the given pixel size.
    pub fn truetype_font(self, path: impl Into<PathBuf>, size_px: f32) -> Self {
        self.font(FontChoice::TrueType {
            path: path.into(),
            size_px,
        })
    }

    pub fn foreground(mut self, color: Rgba<u8>) -> Self {
        self.config.foreground = color;
        self
    }

    pub fn background(mut self, color: Rgba<u8>) -> Self {
        self.config.background = color;
        self
    }

    pub fn default_codepage(mut self, codepage: Codepage) -> Self {
        self.config.default_codepage = codepage;
        self
    }

    pub fn approximate_threshold(mut self, cells: usize) -> Self {
        self.config.approximate_threshold = cells;
        self
    }

    pub fn probe_block(mut self, cells: usize) -> Self {
        self.config.probe_block = cells;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Text2ImgError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parse a colour given as `#RRGGBB`, `#RRGGBBAA` or one of the names
/// `black`, `white`, `transparent`.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, Text2ImgError> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "black" => return Ok(BLACK),
        "white" => return Ok(WHITE),
        "transparent" | "none" => return Ok(TRANSPARENT),
        _ => {}
    }

    let invalid = || Text2ImgError::InvalidArguments {
        reason: format!("'{s}' is not a colour (use #RRGGBB, #RRGGBBAA or a name)"),
    };
    let hex = s.strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let mut channels = [0u8, 0, 0, 255];
    for (i, slot) in channels.iter_mut().take(hex.len() / 2).enumerate() {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(Rgba(channels))
}
