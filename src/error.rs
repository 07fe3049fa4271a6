//! Centralized error types for pul-migrate.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pul-migrate library.
#[derive(Error, Debug)]
pub enum PulError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One or more required input files do not exist.
    #[error("Required file(s) missing: {}", display_paths(.0))]
    MissingInputFile(Vec<PathBuf>),

    /// The `TROP` magic sequence was not found in the save file.
    #[error("Corrupted or invalid file: trophy magic not found")]
    MagicNotFound,

    /// A fixed-offset access would run past the end of the buffer.
    #[error("Truncated trophy data: {needed} byte(s) at offset {offset} exceed buffer length {len}")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// A track-name list could not be read or is not valid text.
    #[error("Track name list '{path}' is unreadable: {reason}")]
    NameListUnreadable { path: PathBuf, reason: String },
}

/// Convenience alias for `Result<T, PulError>`.
pub type Result<T> = std::result::Result<T, PulError>;

impl PulError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `BufferUnderrun` for an access of `needed` bytes at `offset`.
    pub fn underrun(offset: usize, needed: usize, len: usize) -> Self {
        Self::BufferUnderrun {
            offset,
            needed,
            len,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_lists_every_path() {
        let err = PulError::MissingInputFile(vec![
            PathBuf::from("old.pul"),
            PathBuf::from("new.txt"),
        ]);
        assert_eq!(
            err.to_string(),
            "Required file(s) missing: old.pul, new.txt"
        );
    }

    #[test]
    fn test_underrun_message() {
        let err = PulError::underrun(8, 4, 10);
        assert!(err.to_string().contains("offset 8"));
        assert!(err.to_string().contains("length 10"));
    }
}
