//! Implements the errors for a ChainHash and its binary codec.

pub mod decode;
pub mod deserialize;
pub mod serialize;

use crate::error::decode::DecodeError;
use std::collections::TryReserveError;
use std::error::Error;
use std::fmt;
use std::io;

/// Broad condition behind an error, independent of which operation produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Zero or out of range bucket count, or a bucket not in an index.
    InvalidArgument,
    /// Operation attempted before a successful create().
    NotCreated,
    /// Node or buffer allocation failure.
    Allocation,
    /// Failure at the OS boundary (open, chmod, read, write).
    Io,
    /// A deserialized entry count did not match the declared count.
    Verification,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::NotCreated => write!(f, "not created"),
            Self::Allocation => write!(f, "allocation"),
            Self::Io => write!(f, "io"),
            Self::Verification => write!(f, "verification"),
        }
    }
}

/// Error from the in memory table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Bucket count was 0 or larger than u32::MAX.
    InvalidBucketCount(u64),
    /// The bucket array has not been allocated (create() never called or clear() was called).
    NotCreated,
    /// Could not reserve memory for the bucket array or a node.
    Allocation(TryReserveError),
    /// The table already holds u32::MAX entries.
    CapacityExhausted,
}

impl TableError {
    /// The condition behind this error.
    pub fn kind(&self) -> ErrorKind {
        match &self {
            Self::InvalidBucketCount(_) => ErrorKind::InvalidArgument,
            Self::NotCreated => ErrorKind::NotCreated,
            Self::Allocation(_) | Self::CapacityExhausted => ErrorKind::Allocation,
        }
    }
}

impl Error for TableError {}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::InvalidBucketCount(n) => write!(
                f,
                "invalid bucket count {}, must be in [1, {}]",
                n,
                u32::MAX
            ),
            Self::NotCreated => write!(f, "chain hash has not been created"),
            Self::Allocation(e) => write!(f, "allocation: {}", e),
            Self::CapacityExhausted => write!(f, "entry count would exceed {}", u32::MAX),
        }
    }
}

impl From<TryReserveError> for TableError {
    fn from(err: TryReserveError) -> Self {
        Self::Allocation(err)
    }
}

/// Error loading or using the bucket index at the tail of a serialized table.
#[derive(Debug)]
pub enum LoadIndexError {
    /// An underlying IO error.
    IO(io::Error),
    /// The file length does not match header + entries + index tables for these key/value types.
    InvalidLength {
        /// Length implied by the header.
        expected: u64,
        /// Actual file length.
        actual: u64,
    },
    /// Requested bucket is not in the index.
    BucketOutOfRange(u32),
    /// A key or value did not decode from its bytes.
    DecodeEntry(DecodeError),
    /// Could not allocate the index or entry buffers.
    Allocation(TryReserveError),
}

impl LoadIndexError {
    /// The condition behind this error.
    pub fn kind(&self) -> ErrorKind {
        match &self {
            Self::IO(_) | Self::DecodeEntry(_) => ErrorKind::Io,
            Self::InvalidLength { .. } => ErrorKind::Verification,
            Self::BucketOutOfRange(_) => ErrorKind::InvalidArgument,
            Self::Allocation(_) => ErrorKind::Allocation,
        }
    }
}

impl Error for LoadIndexError {}

impl fmt::Display for LoadIndexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::IO(e) => write!(f, "io: {}", e),
            Self::InvalidLength { expected, actual } => write!(
                f,
                "file is {} bytes, expected {} for a bucket index",
                actual, expected
            ),
            Self::BucketOutOfRange(b) => write!(f, "bucket {} out of range", b),
            Self::DecodeEntry(e) => write!(f, "decode entry: {}", e),
            Self::Allocation(e) => write!(f, "allocation: {}", e),
        }
    }
}

impl From<io::Error> for LoadIndexError {
    fn from(io_err: io::Error) -> Self {
        Self::IO(io_err)
    }
}

impl From<DecodeError> for LoadIndexError {
    fn from(err: DecodeError) -> Self {
        Self::DecodeEntry(err)
    }
}

impl From<TryReserveError> for LoadIndexError {
    fn from(err: TryReserveError) -> Self {
        Self::Allocation(err)
    }
}
