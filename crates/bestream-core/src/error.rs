//! Error types for the bestream-core library.
//!
//! Every fallible operation returns [`Result`]. Bounds violations and I/O
//! failures are kept apart so callers can tell "the data is too short" from
//! "the storage misbehaved".

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bestream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all stream operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A read, skip or window request named a range past the stream's bound
    #[error("out of range at offset {offset}: requested {requested} bytes, {available} available")]
    OutOfRange {
        /// Absolute offset of the cursor when the request was made
        offset: u64,
        /// Number of bytes requested
        requested: u64,
        /// Number of bytes that were actually available
        available: u64,
    },

    /// Failed to open a file for reading
    #[error("failed to open file '{path}': {source}")]
    FileOpen {
        /// Path to the file that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to reposition a file handle
    #[error("failed to seek at offset {offset}: {source}")]
    Seek {
        /// Offset the handle was at (or was asked to move by)
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A read failed for a reason other than end of file
    #[error("failed to read at offset {offset}: {source}")]
    Io {
        /// Offset the read started at
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new out-of-range error
    pub fn out_of_range(offset: u64, requested: u64, available: u64) -> Self {
        Self::OutOfRange {
            offset,
            requested,
            available,
        }
    }

    /// Creates a new file open error
    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    /// Creates a new seek error
    pub fn seek(offset: u64, source: std::io::Error) -> Self {
        Self::Seek { offset, source }
    }

    /// Creates a new read error
    pub fn io(offset: u64, source: std::io::Error) -> Self {
        Self::Io { offset, source }
    }

    /// Returns true if this is a bounds violation rather than a storage failure
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Returns true if the underlying storage reported a failure
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::FileOpen { .. } | Self::Seek { .. } | Self::Io { .. }
        )
    }
}
