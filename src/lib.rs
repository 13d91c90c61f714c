//! # text2img
//!
//! Render plain-text files (ASCII art, NFO files, logs, source listings)
//! into raster images in a fixed-pitch font.
//!
//! Every character occupies one glyph cell, lines never wrap, and the canvas
//! is sized to fit the text exactly. Unmarked input is read as IBM PC
//! codepage 437, so DOS box-drawing art comes out the way it was drawn; a
//! UTF-8 byte-order mark or an explicit codepage overrides that.
//!
//! ## Pipeline Overview
//!
//! ```text
//! bytes
//!  │
//!  ├─ 1. Input      file or standard input
//!  ├─ 2. Encoding   forced codepage, UTF-8 BOM, or the 437 default
//!  ├─ 3. Normalize  CR / LF / CRLF → CRLF
//!  ├─ 4. Metrics    exact measurement, or average-cell extrapolation above
//!  │                2000 cells on either axis
//!  ├─ 5. Render     glyphs onto an RGBA canvas
//!  ├─ 6. Encode     PNG, JPEG, BMP or GIF
//!  └─ 7. Output     atomic file write or standard output
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use text2img::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert_to_file("art.nfo", "art.png", &config)?;
//!     eprintln!("{}x{} px", report.canvas.width, report.canvas.height);
//!     Ok(())
//! }
//! ```
//!
//! Rendering without touching the filesystem:
//!
//! ```rust
//! use text2img::{render_text, ConversionConfig};
//!
//! let rendered = render_text(b"Hello\r\nWorld", None, &ConversionConfig::default()).unwrap();
//! assert!(rendered.image.width() > 0 && rendered.image.height() > 0);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `text2img` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! text2img = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod args;
pub mod config;
pub mod convert;
pub mod error;
pub mod font;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use args::{Command, Job, Token};
pub use config::{ConversionConfig, ConversionConfigBuilder, FontChoice};
pub use convert::{convert, convert_to_file, render_text};
pub use error::{ExitStatus, Text2ImgError};
pub use output::{ConversionReport, Rendered};
pub use pipeline::encode::{encode_image, OutputFormat};
pub use pipeline::encoding::{Codepage, EncodingSpec};
pub use pipeline::input::Source;
pub use pipeline::sink::Destination;
