//! End-to-end tests for text2img.
//!
//! Every test writes its input into a scratch directory, runs a full
//! conversion through the public API, and decodes the produced image back
//! with the `image` crate.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use text2img::args::{interpret, tokenize, Command};
use text2img::pipeline::metrics::MeasureStrategy;
use text2img::{convert, convert_to_file, ConversionConfig, ExitStatus, Job, Text2ImgError};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn write_input(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write input");
    path
}

fn job_for(words: &[&str]) -> Result<Job, Text2ImgError> {
    match interpret(&tokenize(words), None)? {
        Command::Convert(job) => Ok(job),
        other => panic!("expected a conversion, got {other:?}"),
    }
}

fn load(path: &Path) -> RgbaImage {
    image::open(path).expect("decode output").to_rgba8()
}

/// Rows in `range` hold at least one pixel that is not fully transparent.
fn band_has_ink(img: &RgbaImage, range: std::ops::Range<u32>) -> bool {
    range
        .flat_map(|y| (0..img.width()).map(move |x| (x, y)))
        .any(|(x, y)| img.get_pixel(x, y)[3] != 0)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn hello_world_renders_two_lines() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "hello.txt", b"Hello\r\nWorld");
    let output = dir.path().join("hello.png");

    let report = convert_to_file(&input, &output, &ConversionConfig::default()).unwrap();
    let img = load(&output);

    assert!(img.width() > 0 && img.height() > 0);
    assert_eq!((img.width(), img.height()), (report.canvas.width, report.canvas.height));
    assert_eq!(report.strategy, MeasureStrategy::Exact);

    let line = img.height() / 2;
    assert!(band_has_ink(&img, 0..line), "first line is blank");
    assert!(band_has_ink(&img, line..img.height()), "second line is blank");
}

#[test]
fn unsupported_extension_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "in.txt", b"abc");
    let output = dir.path().join("out.txt");

    let err = convert_to_file(&input, &output, &ConversionConfig::default()).unwrap_err();
    assert!(matches!(err, Text2ImgError::UnsupportedOutputFormat { .. }));
    assert_eq!(err.exit_status(), ExitStatus::InvalidArgs);
    assert!(!output.exists());
}

#[test]
fn unknown_codepage_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "in.txt", b"abc");
    let output = dir.path().join("out.png");

    let err = job_for(&[
        "/C:klingon",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ])
    .unwrap_err();
    assert!(matches!(err, Text2ImgError::InvalidEncoding { .. }));
    assert_eq!(err.exit_status(), ExitStatus::CodepageError);
    assert!(!output.exists());
}

#[test]
fn bom_selects_utf8_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "bom.txt", b"\xEF\xBB\xBF\xC3\xA9");
    let output = dir.path().join("bom.png");
    let config = ConversionConfig::default();

    let in_str = input.to_str().unwrap();
    let out_str = output.to_str().unwrap();

    let detected = convert(&job_for(&[in_str, out_str]).unwrap(), &config).unwrap();
    assert!(detected.encoding.codepage.is_utf8());
    assert!(detected.encoding.bom_detected);
    assert_eq!(detected.dimensions.width, 1);

    // Forced 437 keeps the BOM bytes as three glyphs plus two for "é".
    let forced = convert(&job_for(&["/C:437", in_str, out_str]).unwrap(), &config).unwrap();
    assert_eq!(forced.encoding.codepage.id(), 437);
    assert!(forced.encoding.forced);
    assert!(!forced.encoding.bom_detected);
    assert_eq!(forced.dimensions.width, 5);
}

#[test]
fn output_defaults_to_png_beside_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "notes.txt", b"auto\nnamed");

    let job = job_for(&[input.to_str().unwrap()]).unwrap();
    convert(&job, &ConversionConfig::default()).unwrap();

    let expected = dir.path().join("notes.png");
    assert!(expected.exists());
    assert!(load(&expected).width() > 0);
}

#[test]
fn every_output_format_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "box.txt", b"\xC9\xCD\xBB\r\n\xC8\xCD\xBC");
    let config = ConversionConfig::builder()
        .foreground(text2img::config::WHITE)
        .background(text2img::config::BLACK)
        .build()
        .unwrap();

    for name in ["box.jpg", "box.bmp", "box.gif", "box.PNG"] {
        let output = dir.path().join(name);
        let report = convert_to_file(&input, &output, &config).unwrap();
        let img = load(&output);
        assert_eq!(
            (img.width(), img.height()),
            (report.canvas.width, report.canvas.height),
            "{name}"
        );
        assert_eq!(report.bytes as u64, std::fs::metadata(&output).unwrap().len());
    }
}

#[test]
fn tall_documents_use_approximate_sizing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "tall.txt", "x\n".repeat(2001).as_bytes());
    let output = dir.path().join("tall.png");
    let config = ConversionConfig::builder().builtin_font(1).build().unwrap();

    let report = convert_to_file(&input, &output, &config).unwrap();
    assert_eq!(report.strategy, MeasureStrategy::Approximate);
    assert_eq!(report.dimensions.height, 2001);
    assert_eq!((report.canvas.width, report.canvas.height), (8, 2001 * 8));
}

#[test]
fn missing_input_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");
    let err = convert_to_file(dir.path().join("absent.txt"), &output, &ConversionConfig::default())
        .unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::ReadError);
    assert!(!output.exists());
}

#[test]
fn empty_input_is_render_error_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "empty.txt", b"");
    let output = dir.path().join("empty.png");

    let err = convert_to_file(&input, &output, &ConversionConfig::default()).unwrap_err();
    assert_eq!(err.exit_status(), ExitStatus::RenderError);
    assert!(!output.exists());
}

#[test]
fn report_serialises_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "r.txt", b"report");
    let output = dir.path().join("r.gif");

    let report = convert_to_file(&input, &output, &ConversionConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["format"], "gif");
    assert_eq!(json["strategy"], "exact");
    assert_eq!(json["encoding"]["codepage"], 437);
    assert_eq!(json["dimensions"]["width"], 6);
    assert_eq!(json["canvas"]["width"], 96);
}

#[test]
fn truetype_font_converts_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "mono.txt", b"fn main() {}\nok");
    let output = dir.path().join("mono.png");
    let font = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf");
    let config = ConversionConfig::builder().truetype_font(font, 18.0).build().unwrap();

    let report = convert_to_file(&input, &output, &config).unwrap();
    assert!(report.fixed_pitch);
    assert!(report.font.contains("DejaVuSansMono.ttf"));

    let img = load(&output);
    assert_eq!((img.width(), img.height()), (report.canvas.width, report.canvas.height));
    assert!(band_has_ink(&img, 0..img.height() / 2));
    assert!(band_has_ink(&img, img.height() / 2..img.height()));
}
