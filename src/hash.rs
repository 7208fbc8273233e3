//! Hash and equality strategies for a ChainHash.
//!
//! A table is instantiated with one hashing strategy and one equality strategy, both fixed at
//! compile time.  The default hashing strategy, [`XHash`], is the identity for integers and a
//! polynomial (multiplier 5) rolling hash for byte strings.  Any std [`BuildHasher`] can be used
//! instead through [`StdHash`], which defaults to FxHasher.
//!
//! Note that a table written with serialize() is re-hashed on deserialize(), so the strategy does
//! not need to be stable across processes for the file to load, only for lookups in one table.

use crate::fixed_bytes::FixedStr;
use rustc_hash::FxHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

/// Maps a key to an unsigned integer, the bucket is this value modulo the bucket count.
pub trait KeyHash<K: ?Sized> {
    /// Hash key.
    fn hash_key(&self, key: &K) -> u64;
}

/// Tests two keys for equality.
pub trait KeyEq<K: ?Sized> {
    /// True if a and b are the same key.
    fn key_eq(&self, a: &K, b: &K) -> bool;
}

/// Default hash strategy: identity for integers, polynomial rolling hash for byte strings.
#[derive(Debug, Default, Copy, Clone)]
pub struct XHash;

/// Default equality strategy, uses PartialEq.
#[derive(Debug, Default, Copy, Clone)]
pub struct EqualTo;

/// Hash strategy that delegates to a std BuildHasher.
#[derive(Debug, Default, Clone)]
pub struct StdHash<S = BuildHasherDefault<FxHasher>> {
    build_hasher: S,
}

impl<S: BuildHasher> StdHash<S> {
    /// Wrap build_hasher.
    pub fn new(build_hasher: S) -> Self {
        Self { build_hasher }
    }
}

impl<K: Hash + ?Sized, S: BuildHasher> KeyHash<K> for StdHash<S> {
    fn hash_key(&self, key: &K) -> u64 {
        self.build_hasher.hash_one(key)
    }
}

impl<K: PartialEq + ?Sized> KeyEq<K> for EqualTo {
    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Polynomial hash of a byte string, stops at the first NUL.
/// Each byte is added as a signed char so strings with high bytes hash the same as they would
/// through a C char pointer.
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0;
    for &b in bytes.iter().take_while(|b| **b != 0) {
        h = h.wrapping_mul(5).wrapping_add(b as i8 as u64);
    }
    h
}

/// Round x up to the nearest power of 2 (0 stays 0).
/// Useful to size the bucket count for an expected number of entries.
pub fn roundup_power_of_two(x: u64) -> u64 {
    if x == 0 {
        return 0;
    }
    let mut x = x - 1;
    x |= x >> 1;
    x |= x >> 2;
    x |= x >> 4;
    x |= x >> 8;
    x |= x >> 16;
    x |= x >> 32;
    x.wrapping_add(1)
}

macro_rules! identity_hash {
    ($($t:ty),*) => {
        $(
            impl KeyHash<$t> for XHash {
                #[inline]
                fn hash_key(&self, key: &$t) -> u64 {
                    *key as u64
                }
            }
        )*
    };
}

identity_hash!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, bool);

impl KeyHash<[u8]> for XHash {
    fn hash_key(&self, key: &[u8]) -> u64 {
        hash_bytes(key)
    }
}

impl KeyHash<str> for XHash {
    fn hash_key(&self, key: &str) -> u64 {
        hash_bytes(key.as_bytes())
    }
}

impl KeyHash<String> for XHash {
    fn hash_key(&self, key: &String) -> u64 {
        hash_bytes(key.as_bytes())
    }
}

impl KeyHash<Vec<u8>> for XHash {
    fn hash_key(&self, key: &Vec<u8>) -> u64 {
        hash_bytes(key)
    }
}

impl<const N: usize> KeyHash<[u8; N]> for XHash {
    fn hash_key(&self, key: &[u8; N]) -> u64 {
        hash_bytes(key)
    }
}

impl<const N: usize> KeyHash<FixedStr<N>> for XHash {
    fn hash_key(&self, key: &FixedStr<N>) -> u64 {
        hash_bytes(key.as_bytes())
    }
}

impl<K: ?Sized> KeyHash<&K> for XHash
where
    XHash: KeyHash<K>,
{
    fn hash_key(&self, key: &&K) -> u64 {
        self.hash_key(*key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(XHash.hash_key(&0_u32), 0);
        assert_eq!(XHash.hash_key(&5_u64), 5);
        assert_eq!(XHash.hash_key(&-1_i32), u64::MAX);
        assert_eq!(XHash.hash_key(&'a'), 97);
        assert_eq!(XHash.hash_key(&true), 1);
    }

    #[test]
    fn test_string_hash() {
        assert_eq!(XHash.hash_key(""), 0);
        assert_eq!(XHash.hash_key("a"), 97);
        // 5 * 97 + 98
        assert_eq!(XHash.hash_key("ab"), 583);
        assert_eq!(XHash.hash_key(&"ab".to_string()), 583);
        assert_eq!(XHash.hash_key(&b"ab".to_vec()), 583);
        assert_eq!(XHash.hash_key(b"ab\0\0"), 583);
        assert_eq!(XHash.hash_key(&"ab"), 583);
        let key: FixedStr<8> = FixedStr::try_from("ab").unwrap();
        assert_eq!(XHash.hash_key(&key), 583);
    }

    #[test]
    fn test_high_bytes_are_signed() {
        // 0xff as a signed char is -1.
        assert_eq!(hash_bytes(&[0xff]), u64::MAX);
        assert_eq!(hash_bytes(&[0xff, 1]), u64::MAX.wrapping_mul(5).wrapping_add(1));
    }

    #[test]
    fn test_equal_to() {
        assert!(EqualTo.key_eq(&1_u32, &1_u32));
        assert!(!EqualTo.key_eq(&1_u32, &2_u32));
        assert!(EqualTo.key_eq("abc", "abc"));
    }

    #[test]
    fn test_std_hash() {
        let hasher: StdHash = StdHash::default();
        assert_eq!(hasher.hash_key(&42_u64), hasher.hash_key(&42_u64));
        assert_ne!(hasher.hash_key(&42_u64), hasher.hash_key(&43_u64));
        assert_eq!(hasher.hash_key("key"), hasher.hash_key(&"key".to_string()));
    }

    #[test]
    fn test_roundup_power_of_two() {
        assert_eq!(roundup_power_of_two(0), 0);
        assert_eq!(roundup_power_of_two(1), 1);
        assert_eq!(roundup_power_of_two(2), 2);
        assert_eq!(roundup_power_of_two(3), 4);
        assert_eq!(roundup_power_of_two(1000), 1024);
        assert_eq!(roundup_power_of_two(1 << 40), 1 << 40);
        assert_eq!(roundup_power_of_two((1 << 40) + 1), 1 << 41);
    }
}
