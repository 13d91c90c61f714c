//! Pipeline stages for text-to-image conversion.
//!
//! Each submodule implements exactly one transformation step, and every
//! stage hands an immutable value to the next.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encoding ──▶ normalize ──▶ metrics ──▶ render ──▶ encode ──▶ sink
//! (bytes)   (decode)     (CRLF)        (canvas)   (RGBA)     (PNG/…)    (file)
//! ```
//!
//! 1. [`input`]:     read the file or standard input
//! 2. [`encoding`]:  pick the codepage (forced, BOM, or default) and decode;
//!    [`cp437`] holds the OEM table
//! 3. [`normalize`]: rewrite every line break to CRLF
//! 4. [`metrics`]:   size the canvas, exactly or by average-cell extrapolation
//! 5. [`render`]:    draw the glyphs onto an RGBA canvas
//! 6. [`encode`]:    serialise the canvas in the requested container
//! 7. [`sink`]:      atomically write the bytes to a file or standard output

pub mod cp437;
pub mod encode;
pub mod encoding;
pub mod input;
pub mod metrics;
pub mod normalize;
pub mod render;
pub mod sink;
