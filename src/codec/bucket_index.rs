//! The bucket index written after the entries of a serialized table.
//!
//! It is two tables with one element per bucket: the u32 entry offset where the bucket's run of
//! entries starts, then the u16 number of entries in that run.  deserialize() never reads it, it
//! is here so a single bucket can be read from a file without loading the whole table.
//!
//! The u16 lengths saturate at u16::MAX for longer chains.  Ranges returned by entry_range() come
//! from the offsets and are exact regardless.

use crate::codec::file_header::FileHeader;
use crate::error::LoadIndexError;
use crate::fixed_bytes::FixedBytes;
use std::collections::TryReserveError;
use std::fs::File;
use std::io;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::ops::Range;
use std::path::Path;

/// Offsets and lengths of each bucket's entries in a serialized table with keys K and values V.
#[derive(Debug, Clone)]
pub struct BucketIndex<K, V> {
    _entry: PhantomData<(K, V)>,
    size: u32,
    offsets: Vec<u32>,
    lengths: Vec<u16>,
}

impl<K: FixedBytes, V: FixedBytes> BucketIndex<K, V> {
    const ENTRY_SIZE: usize = K::SIZE + V::SIZE;

    /// Empty index with room for bucket_count buckets, filled by push() while serializing.
    pub(crate) fn with_bucket_count(size: u32, bucket_count: u32) -> Result<Self, TryReserveError> {
        let mut offsets = Vec::new();
        offsets.try_reserve_exact(bucket_count as usize)?;
        let mut lengths = Vec::new();
        lengths.try_reserve_exact(bucket_count as usize)?;
        Ok(Self {
            _entry: PhantomData,
            size,
            offsets,
            lengths,
        })
    }

    /// Record the next bucket, its run starts at offset and has len entries.
    pub(crate) fn push(&mut self, offset: u32, len: u32) {
        let stored = if len > u16::MAX as u32 {
            log::warn!(
                "bucket {} has {} entries, index length saturates at {}",
                self.offsets.len(),
                len,
                u16::MAX
            );
            u16::MAX
        } else {
            len as u16
        };
        self.offsets.push(offset);
        self.lengths.push(stored);
    }

    /// Write the offset table then the length table to sync.
    pub(crate) fn write_index<W: Write + ?Sized>(&self, sync: &mut W) -> Result<(), io::Error> {
        let mut buffer = Vec::with_capacity(self.offsets.len() * 4);
        for offset in &self.offsets {
            buffer.extend_from_slice(&offset.to_le_bytes());
        }
        sync.write_all(&buffer)?;
        buffer.clear();
        for len in &self.lengths {
            buffer.extend_from_slice(&len.to_le_bytes());
        }
        sync.write_all(&buffer)?;
        Ok(())
    }

    /// Load the bucket index from the serialized table at path.
    /// The file length must match exactly what the header implies for K and V.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadIndexError> {
        let file = File::open(path.as_ref())?;
        let actual = file.metadata()?.len();
        let mut file = BufReader::new(file);
        let header = FileHeader::load_header(&mut file)?;
        let bucket_count = header.bucket_count() as u64;
        let entries_end = Self::entry_position(header.size());
        let expected = entries_end + bucket_count * 6;
        if actual != expected {
            log::error!(
                "bucket index length mismatch in file=[{}]: {} != {}",
                path.as_ref().display(),
                actual,
                expected
            );
            return Err(LoadIndexError::InvalidLength { expected, actual });
        }
        file.seek(SeekFrom::Start(entries_end))?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(bucket_count as usize * 4)?;
        buffer.resize(bucket_count as usize * 4, 0);
        file.read_exact(&mut buffer)?;
        let mut offsets = Vec::new();
        offsets.try_reserve_exact(bucket_count as usize)?;
        let mut buf32 = [0_u8; 4];
        for chunk in buffer.chunks_exact(4) {
            buf32.copy_from_slice(chunk);
            offsets.push(u32::from_le_bytes(buf32));
        }

        buffer.truncate(bucket_count as usize * 2);
        file.read_exact(&mut buffer)?;
        let mut lengths = Vec::new();
        lengths.try_reserve_exact(bucket_count as usize)?;
        let mut buf16 = [0_u8; 2];
        for chunk in buffer.chunks_exact(2) {
            buf16.copy_from_slice(chunk);
            lengths.push(u16::from_le_bytes(buf16));
        }
        Ok(Self {
            _entry: PhantomData,
            size: header.size(),
            offsets,
            lengths,
        })
    }

    /// Number of buckets in the indexed table.
    pub fn bucket_count(&self) -> u32 {
        self.offsets.len() as u32
    }

    /// Number of entries in the indexed table.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Entry offset where bucket's run starts.
    pub fn offset(&self, bucket: u32) -> Option<u32> {
        self.offsets.get(bucket as usize).copied()
    }

    /// Entry count stored for bucket (saturated at u16::MAX).
    pub fn stored_len(&self, bucket: u32) -> Option<u16> {
        self.lengths.get(bucket as usize).copied()
    }

    /// Range of entry offsets belonging to bucket.
    pub fn entry_range(&self, bucket: u32) -> Option<Range<u32>> {
        let start = self.offset(bucket)?;
        let end = bucket
            .checked_add(1)
            .and_then(|next| self.offset(next))
            .unwrap_or(self.size);
        Some(start..end.max(start))
    }

    /// Read just the entries of bucket from source (an open serialized table file).
    /// Entries come back in chain order, head first.
    pub fn read_bucket<R: Read + Seek + ?Sized>(
        &self,
        source: &mut R,
        bucket: u32,
    ) -> Result<Vec<(K, V)>, LoadIndexError> {
        let range = self
            .entry_range(bucket)
            .ok_or(LoadIndexError::BucketOutOfRange(bucket))?;
        let count = range.len();
        let mut entries = Vec::new();
        entries.try_reserve_exact(count)?;
        if count == 0 {
            return Ok(entries);
        }
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(count * Self::ENTRY_SIZE)?;
        buffer.resize(count * Self::ENTRY_SIZE, 0);
        source.seek(SeekFrom::Start(Self::entry_position(range.start)))?;
        source.read_exact(&mut buffer)?;
        for i in 0..count {
            let entry = &buffer[i * Self::ENTRY_SIZE..(i + 1) * Self::ENTRY_SIZE];
            let key = K::read_bytes(&entry[..K::SIZE])?;
            let value = V::read_bytes(&entry[K::SIZE..])?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// Byte position of the entry at offset.
    fn entry_position(offset: u32) -> u64 {
        FileHeader::SIZE as u64 + offset as u64 * Self::ENTRY_SIZE as u64
    }
}
