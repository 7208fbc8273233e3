//! Define the configuration used to serialize or deserialize a ChainHash.

use std::path::{Path, PathBuf};

/// Default size of the entry chunk buffers, 4Mb.
pub const DEFAULT_BUFFER_SIZE: u32 = 4 * 1024 * 1024;
/// Default mode for a serialized file (rw-r--r--).
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Configuration for one serialized table file.
#[derive(Clone, Debug)]
pub struct CodecConfig {
    pub(crate) dir: PathBuf,
    pub(crate) file_name: PathBuf,
    pub(crate) write_buffer_size: u32,
    pub(crate) read_buffer_size: u32,
    pub(crate) mode: u32,
    pub(crate) bucket_index: bool,
}

impl CodecConfig {
    /// Create a new config for the file file_name in dir.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(dir: P, file_name: Q) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            write_buffer_size: DEFAULT_BUFFER_SIZE,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            mode: DEFAULT_FILE_MODE,
            bucket_index: true,
        }
    }

    /// Set the directory that contains the file.
    pub fn set_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the name of the file in dir.
    pub fn set_file_name<P: Into<PathBuf>>(mut self, file_name: P) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Bytes of entries to buffer before each write.  Always holds at least one entry.
    pub fn set_write_buffer_size(mut self, size: u32) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Bytes of entries to read at a time.  Always holds at least one entry.
    pub fn set_read_buffer_size(mut self, size: u32) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the permission bits of a serialized file (unix only).
    pub fn set_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Do NOT write the bucket offset and length tables after the entries.
    /// The file still deserializes, it just can not be used with BucketIndex::load().
    pub fn no_bucket_index(mut self) -> Self {
        self.bucket_index = false;
        self
    }

    /// Directory containing the file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name of the file (without directory).
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Full path to the file, None if the file name is empty or names a directory.
    pub fn path(&self) -> Option<PathBuf> {
        self.file_name.file_name()?;
        Some(self.dir.join(&self.file_name))
    }

    /// Number of whole entries of entry_size bytes that fit in buffer_size, at least 1.
    pub(crate) fn entries_per_chunk(buffer_size: u32, entry_size: usize) -> usize {
        if entry_size == 0 {
            return 1;
        }
        (buffer_size as usize / entry_size).max(1)
    }
}
