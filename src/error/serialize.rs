//! Contains the error for the serialize() function.

use crate::error::ErrorKind;
use std::collections::TryReserveError;
use std::error::Error;
use std::path::PathBuf;
use std::{fmt, io};

/// Error writing a ChainHash to a file.
/// A failed serialize leaves whatever was already written in the target file.
#[derive(Debug)]
pub enum SerializeError {
    /// The table has no bucket array to write.
    NotCreated,
    /// The directory and file name did not combine into a usable path.
    InvalidPath(PathBuf),
    /// Error opening (creating/truncating) the target file.
    Open(io::Error),
    /// Error setting the file mode.
    Permissions(io::Error),
    /// Error writing the bucket count and size.
    WriteHeader(io::Error),
    /// Error writing a chunk of entries.
    WriteEntries(io::Error),
    /// Error writing the bucket offset and length tables.
    WriteBucketIndex(io::Error),
    /// Could not allocate the chunk or index buffers.
    Allocation(TryReserveError),
}

impl SerializeError {
    /// The condition behind this error.
    pub fn kind(&self) -> ErrorKind {
        match &self {
            Self::NotCreated => ErrorKind::NotCreated,
            Self::Allocation(_) => ErrorKind::Allocation,
            Self::InvalidPath(_)
            | Self::Open(_)
            | Self::Permissions(_)
            | Self::WriteHeader(_)
            | Self::WriteEntries(_)
            | Self::WriteBucketIndex(_) => ErrorKind::Io,
        }
    }
}

impl Error for SerializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            Self::Open(e)
            | Self::Permissions(e)
            | Self::WriteHeader(e)
            | Self::WriteEntries(e)
            | Self::WriteBucketIndex(e) => Some(e),
            Self::Allocation(e) => Some(e),
            Self::NotCreated | Self::InvalidPath(_) => None,
        }
    }
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::NotCreated => write!(f, "chain hash has not been created"),
            Self::InvalidPath(p) => write!(f, "invalid path: {}", p.display()),
            Self::Open(e) => write!(f, "open: {}", e),
            Self::Permissions(e) => write!(f, "set permissions: {}", e),
            Self::WriteHeader(e) => write!(f, "write header: {}", e),
            Self::WriteEntries(e) => write!(f, "write entries: {}", e),
            Self::WriteBucketIndex(e) => write!(f, "write bucket index: {}", e),
            Self::Allocation(e) => write!(f, "allocation: {}", e),
        }
    }
}

impl From<TryReserveError> for SerializeError {
    fn from(err: TryReserveError) -> Self {
        Self::Allocation(err)
    }
}
