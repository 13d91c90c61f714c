//! Input resolution: read the source document into memory.
//!
//! The source is either a file path or `-` for standard input. The whole
//! document is read up front; encoding detection needs the first bytes and
//! sizing needs every line anyway.

use crate::error::Text2ImgError;
use std::fmt;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    /// `-` selects standard input; anything else is a path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::File(p) => Some(p),
            Source::Stdin => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(p) => write!(f, "'{}'", p.display()),
            Source::Stdin => f.write_str("standard input"),
        }
    }
}

/// Read all bytes of `source`.
pub fn read_source(source: &Source) -> Result<Vec<u8>, Text2ImgError> {
    let bytes = match source {
        Source::File(path) => read_file(path)?,
        Source::Stdin => read_from(std::io::stdin().lock(), source)?,
    };
    debug!("Read {} bytes from {}", bytes.len(), source);
    Ok(bytes)
}

/// Read everything from `reader`, attributing failures to `source`.
pub fn read_from<R: Read>(mut reader: R, source: &Source) -> Result<Vec<u8>, Text2ImgError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Text2ImgError::ReadFailed {
            source_name: source.to_string(),
            source: e,
        })?;
    Ok(bytes)
}

fn read_file(path: &Path) -> Result<Vec<u8>, Text2ImgError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Text2ImgError::InputNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => Text2ImgError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Text2ImgError::ReadFailed {
            source_name: format!("'{}'", path.display()),
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn dash_means_stdin() {
        assert_eq!(Source::parse("-"), Source::Stdin);
        assert_eq!(Source::parse("a.txt"), Source::File("a.txt".into()));
        assert_eq!(Source::Stdin.to_string(), "standard input");
    }

    #[test]
    fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"abc\r\n").unwrap();
        assert_eq!(read_source(&Source::File(path)).unwrap(), b"abc\r\n");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_source(&Source::parse("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, Text2ImgError::InputNotFound { .. }));
    }

    #[test]
    fn directory_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&Source::File(dir.path().to_path_buf())).unwrap_err();
        assert_eq!(err.exit_status(), crate::error::ExitStatus::ReadError);
    }

    #[test]
    fn reader_contents_pass_through() {
        let bytes = read_from(Cursor::new(b"\xEF\xBB\xBFhi".to_vec()), &Source::Stdin).unwrap();
        assert_eq!(bytes, b"\xEF\xBB\xBFhi");
    }
}
