//! Define and manage the header of a serialized table file.

use std::io;
use std::io::{Read, Write};

/// The header is the bucket count and entry count of the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct FileHeader {
    bucket_count: u32,
    size: u32,
}

impl FileHeader {
    /// Size of a header in bytes.
    pub const SIZE: usize = 8;

    pub fn new(bucket_count: u32, size: u32) -> Self {
        Self { bucket_count, size }
    }

    /// Load a FileHeader from source at its current position.
    pub fn load_header<R: Read + ?Sized>(source: &mut R) -> Result<Self, io::Error> {
        let mut buffer = [0_u8; Self::SIZE];
        let mut buf32 = [0_u8; 4];
        source.read_exact(&mut buffer[..])?;
        buf32.copy_from_slice(&buffer[0..4]);
        let bucket_count = u32::from_le_bytes(buf32);
        buf32.copy_from_slice(&buffer[4..8]);
        let size = u32::from_le_bytes(buf32);
        Ok(Self { bucket_count, size })
    }

    /// Write this header to sync at its current position.
    pub fn write_header<W: Write + ?Sized>(&self, sync: &mut W) -> Result<(), io::Error> {
        let mut buffer = [0_u8; Self::SIZE];
        buffer[0..4].copy_from_slice(&self.bucket_count.to_le_bytes());
        buffer[4..8].copy_from_slice(&self.size.to_le_bytes());
        sync.write_all(&buffer)?;
        Ok(())
    }

    /// Number of buckets in the serialized table.
    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Number of entries in the serialized table.
    pub fn size(&self) -> u32 {
        self.size
    }
}
