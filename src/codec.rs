//! Binary codec for a ChainHash.
//!
//! File layout, all integers little endian:
//!   - bucket_count: u32
//!   - size: u32
//!   - size entries, each the key bytes then the value bytes (see [`FixedBytes`]), in bucket
//!     order and within a bucket from chain head to tail
//!   - bucket_count u32 entry offsets, where each bucket's entries start
//!   - bucket_count u16 entry counts, one per bucket
//!
//! The trailing tables are the [`BucketIndex`], deserialize() does not use them.  Entries are
//! re-inserted through set() so bucket placement comes from the live hash strategy, not the file.
//! There is no version tag, the reader must use the same key and value types as the writer.
//!
//! Writes are not atomic.  A failed serialize() leaves a partial file and a failed deserialize()
//! leaves a partially loaded table, discard either on error.

use crate::chain_hash::ChainHash;
use crate::codec::bucket_index::BucketIndex;
use crate::codec::file_header::FileHeader;
use crate::codec_config::CodecConfig;
use crate::error::deserialize::DeserializeError;
use crate::error::serialize::SerializeError;
use crate::fixed_bytes::FixedBytes;
use crate::hash::{KeyEq, KeyHash};
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub mod bucket_index;
pub(crate) mod file_header;

impl<K, V, H, E> ChainHash<K, V, H, E>
where
    K: FixedBytes,
    V: FixedBytes,
{
    /// Write the table to the file file_name in dir, replacing any existing file.
    pub fn serialize<P: Into<PathBuf>, Q: Into<PathBuf>>(
        &self,
        dir: P,
        file_name: Q,
    ) -> Result<(), SerializeError> {
        self.serialize_with(&CodecConfig::new(dir, file_name))
    }

    /// Write the table to the file described by config, replacing any existing file.
    pub fn serialize_with(&self, config: &CodecConfig) -> Result<(), SerializeError> {
        if !self.is_created() {
            log::error!("chain hash hasn't been created, nothing to serialize");
            return Err(SerializeError::NotCreated);
        }
        let path = config_path(config).map_err(SerializeError::InvalidPath)?;
        let mut file = open_for_write(&path, config.mode).map_err(|e| {
            log::error!("fail to open file=[{}]: {}", path.display(), e);
            SerializeError::Open(e)
        })?;
        set_mode(&file, config.mode).map_err(|e| {
            log::error!("fail to change mode of file=[{}]: {}", path.display(), e);
            SerializeError::Permissions(e)
        })?;
        self.write_table(&mut file, config.write_buffer_size, config.bucket_index).map_err(|e| {
            log::error!("fail to serialize to file=[{}]: {}", path.display(), e);
            e
        })?;
        log::debug!(
            "serialized {} entries in {} buckets to file=[{}]",
            self.size(),
            self.bucket_count(),
            path.display()
        );
        Ok(())
    }

    /// Write the header, the entries and (if bucket_index) the bucket index to sync.
    /// Entries are buffered write_buffer_size bytes at a time.
    pub(crate) fn write_table<W: Write + ?Sized>(
        &self,
        sync: &mut W,
        write_buffer_size: u32,
        bucket_index: bool,
    ) -> Result<(), SerializeError> {
        FileHeader::new(self.bucket_count(), self.size())
            .write_header(sync)
            .map_err(SerializeError::WriteHeader)?;

        let entry_size = K::SIZE + V::SIZE;
        let chunk_bytes =
            CodecConfig::entries_per_chunk(write_buffer_size, entry_size) * entry_size;
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(chunk_bytes)?;
        let mut index = if bucket_index {
            Some(BucketIndex::<K, V>::with_bucket_count(self.size(), self.bucket_count())?)
        } else {
            None
        };

        let mut offset = 0_u32;
        for bucket in 0..self.bucket_count() as usize {
            let start = offset;
            for (key, value) in self.bucket_entries(bucket) {
                let pos = buffer.len();
                buffer.resize(pos + entry_size, 0);
                key.write_bytes(&mut buffer[pos..pos + K::SIZE]);
                value.write_bytes(&mut buffer[pos + K::SIZE..]);
                offset += 1;
                if buffer.len() >= chunk_bytes {
                    sync.write_all(&buffer)
                        .map_err(SerializeError::WriteEntries)?;
                    buffer.clear();
                }
            }
            if let Some(index) = index.as_mut() {
                index.push(start, offset - start);
            }
        }
        if !buffer.is_empty() {
            sync.write_all(&buffer)
                .map_err(SerializeError::WriteEntries)?;
        }
        if let Some(index) = index {
            index
                .write_index(sync)
                .map_err(SerializeError::WriteBucketIndex)?;
        }
        sync.flush().map_err(SerializeError::WriteEntries)?;
        Ok(())
    }
}

impl<K, V, H, E> ChainHash<K, V, H, E>
where
    K: FixedBytes,
    V: FixedBytes,
    H: KeyHash<K>,
    E: KeyEq<K>,
{
    /// Replace the contents of this table with the table in the file file_name in dir.
    pub fn deserialize<P: Into<PathBuf>, Q: Into<PathBuf>>(
        &mut self,
        dir: P,
        file_name: Q,
    ) -> Result<(), DeserializeError> {
        self.deserialize_with(&CodecConfig::new(dir, file_name))
    }

    /// Replace the contents of this table with the table in the file described by config.
    /// If the file can not be opened the table is left as is, any later error leaves it cleared
    /// or partially loaded.
    pub fn deserialize_with(&mut self, config: &CodecConfig) -> Result<(), DeserializeError> {
        let path = config_path(config).map_err(DeserializeError::InvalidPath)?;
        let mut file = File::open(&path).map_err(|e| {
            log::error!("fail to open file=[{}]: {}", path.display(), e);
            DeserializeError::Open(e)
        })?;
        self.read_table(&mut file, config.read_buffer_size).map_err(|e| {
            log::error!("fail to deserialize file=[{}]: {}", path.display(), e);
            e
        })?;
        log::debug!(
            "deserialized {} entries in {} buckets from file=[{}]",
            self.size(),
            self.bucket_count(),
            path.display()
        );
        Ok(())
    }

    /// Clear the table, then rebuild it from the header and entries in source.
    /// Reads exactly the declared number of entries (read_buffer_size bytes at a time) and
    /// ignores anything after them.
    pub(crate) fn read_table<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
        read_buffer_size: u32,
    ) -> Result<(), DeserializeError> {
        self.clear();
        let header = FileHeader::load_header(source)
            .map_err(DeserializeError::ReadHeader)?;
        self.create(header.bucket_count() as u64)
            .map_err(DeserializeError::Create)?;

        let entry_size = K::SIZE + V::SIZE;
        let mut remaining = header.size() as usize;
        if entry_size == 0 {
            // Nothing to read, every entry decodes from no bytes.
            for _ in 0..remaining {
                self.insert_entry(&[])?;
            }
            remaining = 0;
        }
        let per_chunk = CodecConfig::entries_per_chunk(read_buffer_size, entry_size);
        let mut buffer = Vec::new();
        let chunk_bytes = per_chunk.min(remaining) * entry_size;
        buffer.try_reserve_exact(chunk_bytes)?;
        buffer.resize(chunk_bytes, 0);

        while remaining > 0 {
            let want = remaining.min(per_chunk) * entry_size;
            let got = read_full(source, &mut buffer[..want])
                .map_err(DeserializeError::ReadEntries)?;
            let entries = got / entry_size;
            for entry in buffer[..entries * entry_size].chunks_exact(entry_size) {
                self.insert_entry(entry)?;
            }
            remaining -= entries;
            if got < want {
                // End of file before all the declared entries.
                break;
            }
        }

        if self.size() != header.size() {
            return Err(DeserializeError::Verification {
                expected: header.size(),
                actual: self.size(),
            });
        }
        Ok(())
    }

    fn insert_entry(&mut self, entry: &[u8]) -> Result<(), DeserializeError> {
        let key = K::read_bytes(&entry[..K::SIZE])?;
        let value = V::read_bytes(&entry[K::SIZE..])?;
        self.set(key, value, true)
            .map_err(DeserializeError::Insert)?;
        Ok(())
    }
}

/// Full path for config, or the unusable path on error.
fn config_path(config: &CodecConfig) -> Result<PathBuf, PathBuf> {
    config.path().ok_or_else(|| {
        let bad = config.dir().join(config.file_name());
        log::error!(
            "fail to combine path=[{}] fname=[{}]",
            config.dir().display(),
            config.file_name().display()
        );
        bad
    })
}

fn open_for_write(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

/// Set the mode explicitly, the mode given at open is filtered by the umask and ignored for an
/// existing file.
#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Fill buffer from source, returns fewer bytes than the buffer only at end of file.
fn read_full<R: Read + ?Sized>(source: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
