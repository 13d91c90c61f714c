//! Output: deliver encoded image bytes to a file or standard output.
//!
//! File writes go through a temporary sibling that is renamed into place,
//! so the destination either holds the complete image or is left untouched.

use crate::error::Text2ImgError;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Where the image goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl Destination {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Destination::File(p) => Some(p),
            Destination::Stdout => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(p) => write!(f, "{}", p.display()),
            Destination::Stdout => f.write_str("-"),
        }
    }
}

/// Write `bytes` to `destination`.
pub fn write_output(destination: &Destination, bytes: &[u8]) -> Result<(), Text2ImgError> {
    match destination {
        Destination::File(path) => write_atomic(path, bytes),
        Destination::Stdout => {
            let mut out = std::io::stdout().lock();
            out.write_all(bytes)
                .and_then(|_| out.flush())
                .map_err(|e| Text2ImgError::OutputWriteFailed {
                    path: PathBuf::from("-"),
                    source: e,
                })
        }
    }
}

/// Write `bytes` to a temp file next to `path`, then rename it over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Text2ImgError> {
    let fail = |e: std::io::Error| Text2ImgError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
