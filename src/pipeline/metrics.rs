//! Text metrics: how many pixels the rendered document needs.
//!
//! Two strategies produce a [`CanvasSize`]:
//!
//! * **Exact**: measure the whole text in the face and round up.
//! * **Approximate**: measure the average glyph cell once, from a large
//!   synthetic block of `#` glyphs divided by its row and column count, then
//!   multiply by the document's [`TextDimensions`] and round up.
//!
//! The approximate path is taken when the document is wider or taller than
//! the configured threshold (2000 cells by default).

use crate::font::{MetricsProbe, MonoFace};
use crate::pipeline::normalize::NormalizedText;
use serde::Serialize;
use tracing::debug;

/// Filler glyph of the synthetic measurement block.
const PROBE_GLYPH: char = '#';

/// Size of the document in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextDimensions {
    /// Longest line after trimming trailing whitespace.
    pub width: usize,
    /// Number of lines.
    pub height: usize,
}

/// Size of the canvas in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which sizing path produced a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStrategy {
    Exact,
    Approximate,
}

/// The outcome of [`measure`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub dimensions: TextDimensions,
    pub strategy: MeasureStrategy,
    pub canvas: CanvasSize,
}

/// Cell dimensions of `text`.
///
/// The whole document is trimmed once, then each line is measured without
/// its trailing whitespace.
pub fn text_dimensions(text: &NormalizedText) -> TextDimensions {
    let lines: Vec<&str> = text.as_str().trim().split("\r\n").collect();
    let width = lines
        .iter()
        .map(|l| l.trim_end().chars().count())
        .max()
        .unwrap_or(0);
    TextDimensions {
        width,
        height: lines.len(),
    }
}

/// Pick the sizing path for a document of `dimensions`.
pub fn select_strategy(dimensions: TextDimensions, threshold: usize) -> MeasureStrategy {
    if dimensions.width > threshold || dimensions.height > threshold {
        MeasureStrategy::Approximate
    } else {
        MeasureStrategy::Exact
    }
}

/// Average glyph cell of `face` in fractional pixels, measured on a
/// `block` x `block` square of filler glyphs.
pub fn average_cell(face: &dyn MonoFace, block: usize) -> (f32, f32) {
    let block = block.max(1);
    let line: String = std::iter::repeat(PROBE_GLYPH).take(block).collect();
    let mut template = String::with_capacity((block + 2) * block);
    for row in 0..block {
        if row > 0 {
            template.push_str("\r\n");
        }
        template.push_str(&line);
    }

    let mut probe = MetricsProbe::new(face);
    let (width, height) = probe.measure_str(&template);
    (width / block as f32, height / block as f32)
}

/// Measure the exact pixel size of `text`, rounding up.
pub fn exact_size(text: &NormalizedText, face: &dyn MonoFace) -> CanvasSize {
    let mut probe = MetricsProbe::new(face);
    let (width, height) = probe.measure_str(text.as_str());
    CanvasSize {
        width: width.ceil() as u32,
        height: height.ceil() as u32,
    }
}

/// Extrapolate the pixel size of a `dimensions` document from the average cell.
pub fn approximate_size(dimensions: TextDimensions, face: &dyn MonoFace, block: usize) -> CanvasSize {
    let (cell_w, cell_h) = average_cell(face, block);
    debug!("Average cell {:.4}x{:.4} px", cell_w, cell_h);
    CanvasSize {
        width: (dimensions.width as f32 * cell_w).ceil() as u32,
        height: (dimensions.height as f32 * cell_h).ceil() as u32,
    }
}

/// Compute the canvas for `text`, choosing the strategy by `threshold`.
pub fn measure(
    text: &NormalizedText,
    face: &dyn MonoFace,
    threshold: usize,
    block: usize,
) -> Measurement {
    let dimensions = text_dimensions(text);
    let strategy = select_strategy(dimensions, threshold);
    let canvas = match strategy {
        MeasureStrategy::Exact => exact_size(text, face),
        MeasureStrategy::Approximate => approximate_size(dimensions, face, block),
    };
    debug!(
        "Text {}x{} cells, {:?} sizing → {}x{} px",
        dimensions.width, dimensions.height, strategy, canvas.width, canvas.height
    );
    Measurement {
        dimensions,
        strategy,
        canvas,
    }
}
