//! Contains the error for the deserialize() function.

use crate::error::decode::DecodeError;
use crate::error::{ErrorKind, TableError};
use std::collections::TryReserveError;
use std::error::Error;
use std::path::PathBuf;
use std::{fmt, io};

/// Error loading a ChainHash from a file.
/// Except for InvalidPath and Open the table will have been cleared and may be partially loaded.
#[derive(Debug)]
pub enum DeserializeError {
    /// The directory and file name did not combine into a usable path.
    InvalidPath(PathBuf),
    /// Error opening the source file.
    Open(io::Error),
    /// Error reading the bucket count and size (includes a file shorter than the header).
    ReadHeader(io::Error),
    /// The stored bucket count was rejected by create().
    Create(TableError),
    /// Error reading a chunk of entries.
    ReadEntries(io::Error),
    /// A key or value did not decode from its bytes.
    DecodeEntry(DecodeError),
    /// Inserting a decoded entry failed.
    Insert(TableError),
    /// Could not allocate the read buffer.
    Allocation(TryReserveError),
    /// The loaded entry count does not match the count stored in the file.
    Verification {
        /// Entry count declared by the file header.
        expected: u32,
        /// Entry count actually in the table after loading.
        actual: u32,
    },
}

impl DeserializeError {
    /// The condition behind this error.
    pub fn kind(&self) -> ErrorKind {
        match &self {
            Self::InvalidPath(_)
            | Self::Open(_)
            | Self::ReadHeader(_)
            | Self::ReadEntries(_)
            | Self::DecodeEntry(_) => ErrorKind::Io,
            Self::Create(e) | Self::Insert(e) => e.kind(),
            Self::Allocation(_) => ErrorKind::Allocation,
            Self::Verification { .. } => ErrorKind::Verification,
        }
    }
}

impl Error for DeserializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            Self::Open(e) | Self::ReadHeader(e) | Self::ReadEntries(e) => Some(e),
            Self::Create(e) | Self::Insert(e) => Some(e),
            Self::DecodeEntry(e) => Some(e),
            Self::Allocation(e) => Some(e),
            Self::InvalidPath(_) | Self::Verification { .. } => None,
        }
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidPath(p) => write!(f, "invalid path: {}", p.display()),
            Self::Open(e) => write!(f, "open: {}", e),
            Self::ReadHeader(e) => write!(f, "read header: {}", e),
            Self::Create(e) => write!(f, "create: {}", e),
            Self::ReadEntries(e) => write!(f, "read entries: {}", e),
            Self::DecodeEntry(e) => write!(f, "decode entry: {}", e),
            Self::Insert(e) => write!(f, "insert: {}", e),
            Self::Allocation(e) => write!(f, "allocation: {}", e),
            Self::Verification { expected, actual } => write!(
                f,
                "verification failed, loaded {} entries but file declares {}",
                actual, expected
            ),
        }
    }
}

impl From<DecodeError> for DeserializeError {
    fn from(err: DecodeError) -> Self {
        Self::DecodeEntry(err)
    }
}

impl From<TryReserveError> for DeserializeError {
    fn from(err: TryReserveError) -> Self {
        Self::Allocation(err)
    }
}
