//! Error types for the text2img library.
//!
//! Every failure is fatal: the tool converts exactly one input into exactly
//! one image, so there is nothing to retry and no partial result to keep.
//! [`Text2ImgError`] carries enough structure for a one-line diagnostic and
//! maps onto the stable [`ExitStatus`] codes scripts rely on.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit statuses. The numeric values are a public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u8)]
pub enum ExitStatus {
    /// Conversion finished.
    Success = 0,
    /// No arguments were given at all.
    NoArgs = 1,
    /// Invalid, unsupported or too many arguments.
    InvalidArgs = 2,
    /// The source could not be read.
    ReadError = 3,
    /// The destination could not be written.
    WriteError = 4,
    /// Unknown codepage id or name.
    CodepageError = 5,
    /// Help text was requested.
    HelpRequest = 6,
    /// The codepage list was requested.
    ListRequest = 7,
    /// Rasterisation produced no image.
    RenderError = 8,
}

impl ExitStatus {
    /// The raw process exit code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// All errors returned by the text2img library.
#[derive(Debug, Error)]
pub enum Text2ImgError {
    // ── Argument errors ───────────────────────────────────────────────────
    /// Nothing to do.
    #[error("No arguments given. Use --help for usage.")]
    NoArguments,

    /// A flag or value could not be understood.
    #[error("Invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    /// The destination extension is not an image format we can write.
    #[error("Unsupported output format for '{path}': only PNG, JPG, BMP and GIF are supported")]
    UnsupportedOutputFormat { path: PathBuf },

    /// More than two positional arguments.
    #[error("Too many arguments (unexpected '{extra}'). Put paths containing spaces inside quotes.")]
    TooManyArguments { extra: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Any other read failure, including standard input.
    #[error("Failed to read {source_name}: {source}")]
    ReadFailed {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Encoding errors ───────────────────────────────────────────────────
    /// The codepage id or name is not known.
    #[error("Unknown codepage '{name}'. Use --list to see supported codepages.")]
    InvalidEncoding { name: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// A TrueType/OpenType font could not be loaded.
    #[error("Failed to load font '{path}': {detail}")]
    FontLoad { path: PathBuf, detail: String },

    /// The measured canvas has no area (empty or whitespace-free empty text).
    #[error("Nothing to render: canvas would be {width}x{height} px")]
    EmptyCanvas { width: u32, height: u32 },

    /// The canvas cannot be allocated.
    #[error("Canvas of {width}x{height} px is too large to allocate")]
    CanvasTooLarge { width: u64, height: u64 },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The image container encoder rejected the canvas.
    #[error("Failed to encode {format} image: {detail}")]
    EncodeFailed { format: String, detail: String },

    /// Could not create or write the destination.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Text2ImgError {
    /// The exit status the CLI reports for this error.
    pub fn exit_status(&self) -> ExitStatus {
        use Text2ImgError::*;
        match self {
            NoArguments => ExitStatus::NoArgs,
            InvalidArguments { .. }
            | UnsupportedOutputFormat { .. }
            | TooManyArguments { .. }
            | InvalidConfig(_) => ExitStatus::InvalidArgs,
            InputNotFound { .. } | PermissionDenied { .. } | ReadFailed { .. } => {
                ExitStatus::ReadError
            }
            InvalidEncoding { .. } => ExitStatus::CodepageError,
            FontLoad { .. } | EmptyCanvas { .. } | CanvasTooLarge { .. } => {
                ExitStatus::RenderError
            }
            EncodeFailed { .. } | OutputWriteFailed { .. } => ExitStatus::WriteError,
        }
    }
}
