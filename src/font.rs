//! Monospace faces used to measure and draw text.
//!
//! Two faces implement [`MonoFace`]:
//!
//! * [`BitmapFace`]: the built-in 8x8 glyph set from `font8x8`, magnified by
//!   an integer factor. Always available and pixel-exact.
//! * [`TrueTypeFace`]: any fixed-pitch TTF/OTF file, rasterised by
//!   `fontdue` at a pixel size.
//!
//! Measurement goes through a [`MetricsProbe`], a scratch object that lives
//! only for the duration of one measurement call.

use crate::config::{FontChoice, MAX_BUILTIN_SCALE};
use crate::error::Text2ImgError;
use crate::pipeline::normalize::split_lines;
use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, LATIN_FONTS, MISC_FONTS,
};
use fontdue::{Font, FontSettings};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Coverage mask of one rasterised glyph.
///
/// `left`/`top` position the mask relative to the top-left corner of the
/// glyph's cell.
#[derive(Debug, Clone, Default)]
pub struct GlyphMask {
    pub width: usize,
    pub height: usize,
    pub left: i32,
    pub top: i32,
    /// Row-major, 0–255 per pixel.
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A fixed-pitch face.
pub trait MonoFace {
    /// Horizontal advance of `ch`, in fractional pixels.
    fn advance(&self, ch: char) -> f32;

    /// Distance between consecutive baselines, in fractional pixels.
    fn line_height(&self) -> f32;

    /// Rasterise `ch` into a coverage mask.
    fn rasterize(&self, ch: char) -> GlyphMask;

    /// Whether every glyph shares one advance.
    fn is_fixed_pitch(&self) -> bool {
        true
    }

    /// Human-readable description for logs and reports.
    fn describe(&self) -> String;
}

/// Load the face selected by `choice`.
pub fn load_face(choice: &FontChoice) -> Result<Box<dyn MonoFace>, Text2ImgError> {
    match choice {
        FontChoice::Builtin { scale } => Ok(Box::new(BitmapFace::new(*scale))),
        FontChoice::TrueType { path, size_px } => {
            Ok(Box::new(TrueTypeFace::load(path, *size_px)?))
        }
    }
}

// ── Built-in bitmap face ─────────────────────────────────────────────────

/// Edge length of a glyph in the built-in set.
const BITMAP_CELL: u32 = 8;

/// The built-in 8x8 glyph set, magnified `scale` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFace {
    scale: u32,
}

impl BitmapFace {
    /// `scale` is clamped to `1..=MAX_BUILTIN_SCALE`.
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.clamp(1, MAX_BUILTIN_SCALE),
        }
    }

    /// Cell edge in pixels.
    pub fn cell(&self) -> u32 {
        BITMAP_CELL * self.scale
    }

    /// The 8 row bytes for `ch`; bit `x` of a row is column `x`.
    fn rows(ch: char) -> [u8; 8] {
        if ch.is_control() {
            return [0; 8];
        }
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BOX_FONTS.get(ch))
            .or_else(|| BLOCK_FONTS.get(ch))
            .or_else(|| GREEK_FONTS.get(ch))
            .or_else(|| MISC_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl MonoFace for BitmapFace {
    fn advance(&self, _ch: char) -> f32 {
        self.cell() as f32
    }

    fn line_height(&self) -> f32 {
        self.cell() as f32
    }

    fn rasterize(&self, ch: char) -> GlyphMask {
        let rows = Self::rows(ch);
        if rows.iter().all(|&r| r == 0) {
            return GlyphMask::default();
        }

        let scale = self.scale as usize;
        let edge = self.cell() as usize;
        let mut coverage = vec![0u8; edge * edge];
        for (y, row) in rows.iter().enumerate() {
            for x in 0..BITMAP_CELL as usize {
                if row & (1 << x) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    let start = (y * scale + dy) * edge + x * scale;
                    coverage[start..start + scale].fill(255);
                }
            }
        }

        GlyphMask {
            width: edge,
            height: edge,
            left: 0,
            top: 0,
            coverage,
        }
    }

    fn describe(&self) -> String {
        format!("builtin 8x8 (x{})", self.scale)
    }
}

// ── TrueType face ────────────────────────────────────────────────────────

/// A TTF/OTF font rendered at a fixed pixel size.
pub struct TrueTypeFace {
    font: Font,
    path: PathBuf,
    size_px: f32,
    ascent: f32,
    line_height: f32,
    cell_advance: f32,
    fixed_pitch: bool,
}

impl TrueTypeFace {
    /// Read and parse a font file.
    pub fn load(path: &Path, size_px: f32) -> Result<Self, Text2ImgError> {
        let data = std::fs::read(path).map_err(|e| Text2ImgError::FontLoad {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_bytes(data, path, size_px)
    }

    /// Parse font data already in memory; `path` is only used in messages.
    pub fn from_bytes(data: Vec<u8>, path: &Path, size_px: f32) -> Result<Self, Text2ImgError> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            Text2ImgError::FontLoad {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;

        let (ascent, line_height) = match font.horizontal_line_metrics(size_px) {
            Some(m) => (m.ascent, m.new_line_size),
            None => (size_px * 0.8, size_px),
        };
        let cell_advance = font.metrics('#', size_px).advance_width;

        let narrow = font.metrics('i', size_px).advance_width;
        let wide = font.metrics('W', size_px).advance_width;
        let fixed_pitch = (narrow - wide).abs() <= 0.01;
        if !fixed_pitch {
            warn!(
                "Font '{}' does not look fixed-pitch ('i' = {:.2}px, 'W' = {:.2}px); \
                 layout assumes uniform cells",
                path.display(),
                narrow,
                wide
            );
        }
        debug!(
            "Loaded font '{}' at {}px: cell {:.2}x{:.2}",
            path.display(),
            size_px,
            cell_advance,
            line_height
        );

        Ok(Self {
            font,
            path: path.to_path_buf(),
            size_px,
            ascent,
            line_height,
            cell_advance,
            fixed_pitch,
        })
    }
}

impl MonoFace for TrueTypeFace {
    fn advance(&self, ch: char) -> f32 {
        if ch.is_control() {
            return self.cell_advance;
        }
        self.font.metrics(ch, self.size_px).advance_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn rasterize(&self, ch: char) -> GlyphMask {
        if ch.is_control() {
            return GlyphMask::default();
        }
        let (metrics, coverage) = self.font.rasterize(ch, self.size_px);
        GlyphMask {
            width: metrics.width,
            height: metrics.height,
            left: metrics.xmin,
            top: self.ascent.round() as i32 - metrics.ymin - metrics.height as i32,
            coverage,
        }
    }

    fn is_fixed_pitch(&self) -> bool {
        self.fixed_pitch
    }

    fn describe(&self) -> String {
        format!("{} @ {}px", self.path.display(), self.size_px)
    }
}

// ── Measurement ──────────────────────────────────────────────────────────

/// Scratch state for measuring strings in one face.
///
/// Holds a per-character advance cache; it is created inside a measurement
/// call and dropped when that call returns, on success or error alike.
pub struct MetricsProbe<'f> {
    face: &'f dyn MonoFace,
    advances: HashMap<char, f32>,
}

impl<'f> MetricsProbe<'f> {
    pub fn new(face: &'f dyn MonoFace) -> Self {
        Self {
            face,
            advances: HashMap::new(),
        }
    }

    fn advance(&mut self, ch: char) -> f32 {
        let face = self.face;
        *self.advances.entry(ch).or_insert_with(|| face.advance(ch))
    }

    /// Fractional pixel size of CRLF-delimited `text`: the widest line's
    /// summed advances by the line count times the line height.
    pub fn measure_str(&mut self, text: &str) -> (f32, f32) {
        let mut width = 0.0f32;
        let mut lines = 0usize;
        for line in split_lines(text) {
            let w: f32 = line.chars().map(|c| self.advance(c)).sum();
            width = width.max(w);
            lines += 1;
        }
        (width, lines as f32 * self.face.line_height())
    }
}
