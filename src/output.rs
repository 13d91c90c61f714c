//! Result types returned by the conversion entry points.

use crate::pipeline::encode::OutputFormat;
use crate::pipeline::encoding::EncodingSpec;
use crate::pipeline::metrics::{CanvasSize, MeasureStrategy, Measurement, TextDimensions};
use image::RgbaImage;
use serde::Serialize;

/// A rendered canvas plus everything learned while producing it.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The final canvas; owned, never shared with measurement scratch state.
    pub image: RgbaImage,
    pub encoding: EncodingSpec,
    pub measurement: Measurement,
    /// Description of the face that drew the text.
    pub font: String,
    pub fixed_pitch: bool,
}

/// Summary of one completed conversion, printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// `"-"` for standard input.
    pub source: String,
    /// `"-"` for standard output.
    pub destination: String,
    pub format: OutputFormat,
    pub encoding: EncodingSpec,
    pub dimensions: TextDimensions,
    pub strategy: MeasureStrategy,
    pub canvas: CanvasSize,
    pub font: String,
    pub fixed_pitch: bool,
    /// Size of the encoded image.
    pub bytes: usize,
}
