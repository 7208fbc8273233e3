#![deny(missing_docs)]

//! Crate to implement a fixed capacity hash table with chained buckets.
//! The bucket count is set once by create() and never changes, collisions go on a per bucket
//! chain with the newest entry at the head.
//! A table with fixed width keys and values can be written to and rebuilt from a flat binary file,
//! see [`codec`] for the file layout.
//!
//! ```no_run
//! use chainhash::{ChainHash, FixedStr, SetOutcome};
//!
//! let mut table: ChainHash<u64, FixedStr<8>> = ChainHash::with_bucket_count(1024).unwrap();
//! let name = FixedStr::try_from("one").unwrap();
//! assert_eq!(table.set(1, name, false).unwrap(), SetOutcome::Inserted);
//! table.serialize("/tmp", "table.bin").unwrap();
//!
//! let mut loaded: ChainHash<u64, FixedStr<8>> = ChainHash::new();
//! loaded.deserialize("/tmp", "table.bin").unwrap();
//! assert_eq!(loaded.get(&1).unwrap().map(|v| v.as_str()), Some("one"));
//! ```

pub mod chain_hash;
pub mod codec;
pub mod codec_config;
pub mod error;
pub mod fixed_bytes;
pub mod hash;

pub use crate::chain_hash::iter::Iter;
pub use crate::chain_hash::{ChainHash, EraseOutcome, SetOutcome};
pub use crate::codec::bucket_index::BucketIndex;
pub use crate::codec_config::CodecConfig;
pub use crate::error::{ErrorKind, TableError};
pub use crate::fixed_bytes::{FixedBytes, FixedStr};
pub use crate::hash::{EqualTo, KeyEq, KeyHash, StdHash, XHash};
