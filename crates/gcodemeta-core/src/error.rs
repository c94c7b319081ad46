//! Error handling for gcodemeta
//!
//! Only I/O faults are fatal to an extraction. Pattern-match failures and
//! normalization failures never surface here; they degrade to absent
//! attributes inside the parsers.
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Extraction error type
///
/// Fatal to the pipeline run for one file. No partial record accompanies it.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The file cannot be opened or read at all
    #[error("Cannot read file {path:?}: {source}")]
    Unreadable {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Reading a declared window bound failed part-way through
    #[error("Read of {expected} bytes at offset {offset} in {path:?} was cut short: {source}")]
    Truncated {
        /// The file being read.
        path: PathBuf,
        /// Absolute byte offset where the window starts.
        offset: u64,
        /// Number of bytes the window declared.
        expected: usize,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// File name does not carry a recognized G-code extension
    #[error("Unsupported file type: {path:?}")]
    UnsupportedFileType {
        /// The rejected path.
        path: PathBuf,
    },
}

impl ExtractError {
    /// Wrap an I/O error raised while opening or sizing `path`
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Check if this error came from an I/O fault
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Unreadable { .. } | Self::Truncated { .. })
    }
}

/// Errors related to scan configuration validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A window bound is zero or unreasonably large.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    /// The comment marker is empty.
    #[error("Comment marker must not be empty")]
    EmptyCommentMarker,

    /// The comment marker starts with whitespace and could never match.
    #[error("Comment marker must not start with whitespace: {0:?}")]
    PaddedCommentMarker(String),

    /// A required attribute is not part of the registry.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// An attribute name was declared twice in a registry.
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),
}

/// Result type using ExtractError
pub type Result<T> = std::result::Result<T, ExtractError>;
