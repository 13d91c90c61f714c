//! Conversion entry points.
//!
//! [`render_text`] is the pure core: bytes in, canvas out, no I/O.
//! [`convert`] wraps it with reading, encoding and writing for a validated
//! [`Job`]; [`convert_to_file`] is the shortcut for two file paths.

use crate::args::Job;
use crate::config::ConversionConfig;
use crate::error::Text2ImgError;
use crate::font::load_face;
use crate::output::{ConversionReport, Rendered};
use crate::pipeline::encoding::{self, Codepage};
use crate::pipeline::input::{self, Source};
use crate::pipeline::sink::{self, Destination};
use crate::pipeline::{encode, metrics, normalize, render};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Decode, normalise, measure and rasterise `bytes`.
///
/// `codepage` forces the encoding; `None` applies BOM detection on top of
/// `config.default_codepage`.
///
/// # Errors
/// - [`Text2ImgError::InvalidConfig`] when `config` fails validation
/// - [`Text2ImgError::FontLoad`] when a TrueType face cannot be loaded
/// - [`Text2ImgError::EmptyCanvas`] when the text measures to zero area
/// - [`Text2ImgError::CanvasTooLarge`] when the canvas cannot be allocated
pub fn render_text(
    bytes: &[u8],
    codepage: Option<Codepage>,
    config: &ConversionConfig,
) -> Result<Rendered, Text2ImgError> {
    config.validate()?;
    let (spec, decoded) = encoding::resolve(bytes, codepage, config.default_codepage);
    let text = normalize::normalize(decoded.as_str());

    let face = load_face(&config.font)?;
    let measurement = metrics::measure(
        &text,
        face.as_ref(),
        config.approximate_threshold,
        config.probe_block,
    );
    let image = render::render(
        &text,
        measurement.canvas,
        face.as_ref(),
        config.foreground,
        config.background,
    )?;

    Ok(Rendered {
        image,
        encoding: spec,
        measurement,
        font: face.describe(),
        fixed_pitch: face.is_fixed_pitch(),
    })
}

/// Run a full conversion: read, render, encode, write.
///
/// Nothing is written unless every earlier stage succeeded.
pub fn convert(job: &Job, config: &ConversionConfig) -> Result<ConversionReport, Text2ImgError> {
    let start = Instant::now();
    info!("Converting {} → {} ({})", job.source, job.destination, job.format);

    let bytes = input::read_source(&job.source)?;
    let rendered = render_text(&bytes, job.codepage, config)?;
    let encoded = encode::encode_image(&rendered.image, job.format, config)?;
    sink::write_output(&job.destination, &encoded)?;

    let canvas = rendered.measurement.canvas;
    info!(
        "Wrote {}x{} {} ({} bytes) in {:.0?}",
        canvas.width,
        canvas.height,
        job.format,
        encoded.len(),
        start.elapsed()
    );

    Ok(ConversionReport {
        source: match &job.source {
            Source::File(p) => p.display().to_string(),
            Source::Stdin => "-".into(),
        },
        destination: job.destination.to_string(),
        format: job.format,
        encoding: rendered.encoding,
        dimensions: rendered.measurement.dimensions,
        strategy: rendered.measurement.strategy,
        canvas,
        font: rendered.font,
        fixed_pitch: rendered.fixed_pitch,
        bytes: encoded.len(),
    })
}

/// Convert the text file at `input` into the image at `output`, with the
/// format taken from `output`'s extension.
///
/// The extension is checked before `input` is opened.
pub fn convert_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Text2ImgError> {
    let job = Job::new(
        Source::File(input.as_ref().to_path_buf()),
        Destination::File(output.as_ref().to_path_buf()),
    )?;
    debug!("Resolved output format {}", job.format);
    convert(&job, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::metrics::MeasureStrategy;

    #[test]
    fn render_text_reports_encoding_and_size() {
        let config = ConversionConfig::default();
        let r = render_text(b"Hi\nthere", None, &config).unwrap();
        assert_eq!(r.encoding.codepage.id(), 437);
        assert_eq!(r.measurement.strategy, MeasureStrategy::Exact);
        assert_eq!(r.image.dimensions(), (80, 32));
        assert!(r.fixed_pitch);
    }

    #[test]
    fn oversized_scale_is_invalid_config() {
        let config = ConversionConfig {
            font: crate::config::FontChoice::Builtin { scale: u32::MAX / 4 },
            ..Default::default()
        };
        let err = render_text(b"x", None, &config).unwrap_err();
        assert!(matches!(err, Text2ImgError::InvalidConfig(_)));
        assert_eq!(err.exit_status(), crate::error::ExitStatus::InvalidArgs);
    }

    #[test]
    fn empty_input_is_render_error() {
        let err = render_text(b"", None, &ConversionConfig::default()).unwrap_err();
        assert_eq!(err.exit_status(), crate::error::ExitStatus::RenderError);
    }

    #[test]
    fn missing_font_fails_before_drawing() {
        let config = ConversionConfig::builder()
            .truetype_font("/no/such/font.ttf", 16.0)
            .build()
            .unwrap();
        let err = render_text(b"x", None, &config).unwrap_err();
        assert!(matches!(err, Text2ImgError::FontLoad { .. }));
    }

    #[test]
    fn bad_extension_fails_before_reading() {
        let err = convert_to_file("/no/such/input.txt", "out.txt", &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, Text2ImgError::UnsupportedOutputFormat { .. }));
    }
}
