//! Main module for the chained hash table.  This implements the in memory table, the binary codec
//! lives in [`crate::codec`].
//!
//! The bucket count is chosen by create() and never changes afterwards, there is no rehashing.
//! Chains grow without bound as keys collide so sizing the table for the expected number of
//! entries is the caller's job.

use crate::chain_hash::iter::Iter;
use crate::chain_hash::node::{Link, Node, NodeArena, NodeId};
use crate::error::TableError;
use crate::hash::{EqualTo, KeyEq, KeyHash, XHash};
use std::fmt;

pub mod iter;
pub(crate) mod node;

/// Result of a set().
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key was new and a node was added at the head of its bucket.
    Inserted,
    /// The key existed and its value was replaced.
    Overwritten,
    /// The key existed, overwrite was false so nothing changed.
    KeyAlreadyExists,
}

/// Result of an erase().
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EraseOutcome<V> {
    /// The key was removed, contains the value it held.
    Erased(V),
    /// The key was not in the table.
    KeyNotFound,
}

/// Fixed capacity hash table using separate chaining.
///
/// Starts uncreated, create() allocates the buckets.  Every operation that needs buckets returns
/// [`TableError::NotCreated`] until then.
pub struct ChainHash<K, V, H = XHash, E = EqualTo> {
    buckets: Vec<Link>,
    nodes: NodeArena<K, V>,
    size: u32,
    hasher: H,
    equal: E,
}

impl<K, V, H: Default, E: Default> Default for ChainHash<K, V, H, E> {
    fn default() -> Self {
        Self::with_strategies(H::default(), E::default())
    }
}

impl<K, V, H: Default, E: Default> ChainHash<K, V, H, E> {
    /// New uncreated table with the default strategies.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, H, E> ChainHash<K, V, H, E> {
    /// New uncreated table with the given hash and equality strategies.
    pub fn with_strategies(hasher: H, equal: E) -> Self {
        Self {
            buckets: Vec::new(),
            nodes: NodeArena::default(),
            size: 0,
            hasher,
            equal,
        }
    }

    /// Allocate bucket_count empty buckets, any existing entries are dropped first.
    /// bucket_count must be in [1, u32::MAX].
    pub fn create(&mut self, bucket_count: u64) -> Result<(), TableError> {
        if bucket_count == 0 || bucket_count > u32::MAX as u64 {
            log::error!("invalid bucket count [{}]", bucket_count);
            return Err(TableError::InvalidBucketCount(bucket_count));
        }
        self.clear();
        let mut buckets = Vec::new();
        if let Err(e) = buckets.try_reserve_exact(bucket_count as usize) {
            log::error!(
                "failed to allocate {} buckets ({} bytes): {}",
                bucket_count,
                bucket_count as usize * std::mem::size_of::<Link>(),
                e
            );
            return Err(e.into());
        }
        buckets.resize(bucket_count as usize, None);
        self.buckets = buckets;
        log::trace!("created chain hash with {} buckets", bucket_count);
        Ok(())
    }

    /// Drop every entry and the bucket array, the table returns to uncreated.
    /// Safe to call on an uncreated table.
    pub fn clear(&mut self) {
        self.buckets = Vec::new();
        self.nodes.clear();
        self.size = 0;
    }

    /// True once create() has succeeded (and until clear()).
    pub fn is_created(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Number of entries in the table.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets, 0 when not created.
    pub fn bucket_count(&self) -> u32 {
        self.buckets.len() as u32
    }

    /// Estimated bytes used by buckets and nodes, ignores allocator overhead.
    pub fn memory_footprint(&self) -> u64 {
        self.buckets.len() as u64 * std::mem::size_of::<Link>() as u64
            + self.size as u64 * std::mem::size_of::<Node<K, V>>() as u64
    }

    /// Number of entries chained in bucket, 0 if bucket is out of range.
    pub fn bucket_len(&self, bucket: u32) -> usize {
        match self.buckets.get(bucket as usize) {
            Some(head) => self.chain(*head).count(),
            None => 0,
        }
    }

    /// Iterate over the (key, value) entries in bucket order, within a bucket from head to tail
    /// (most recently inserted first).  This is the order serialize() writes.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.buckets, &self.nodes)
    }

    /// Entries of one bucket from head to tail.
    pub(crate) fn bucket_entries(&self, bucket: usize) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.chain(self.buckets[bucket])
            .map(|(_, node)| (&node.key, &node.value))
    }

    /// Walk the nodes of the chain starting at head.
    fn chain(&self, head: Link) -> impl Iterator<Item = (NodeId, &Node<K, V>)> + '_ {
        let mut link = head;
        std::iter::from_fn(move || {
            let id = link?;
            let node = self.nodes.get(id);
            link = node.next;
            Some((id, node))
        })
    }

    fn check_created(&self) -> Result<(), TableError> {
        if self.buckets.is_empty() {
            log::error!("chain hash hasn't been created");
            Err(TableError::NotCreated)
        } else {
            Ok(())
        }
    }
}

impl<K, V, H, E> ChainHash<K, V, H, E>
where
    H: KeyHash<K>,
    E: KeyEq<K>,
{
    /// Create a new table with bucket_count buckets and the default strategies.
    pub fn with_bucket_count(bucket_count: u64) -> Result<Self, TableError>
    where
        H: Default,
        E: Default,
    {
        let mut table = Self::new();
        table.create(bucket_count)?;
        Ok(table)
    }

    /// Bucket index for key.
    #[inline]
    fn bucket_of(&self, key: &K) -> usize {
        (self.hasher.hash_key(key) % self.buckets.len() as u64) as usize
    }

    /// Find the node holding key, also returns the node before it in the chain (if any).
    fn find(&self, bucket: usize, key: &K) -> Option<(Option<NodeId>, NodeId)> {
        let mut prev = None;
        for (id, node) in self.chain(self.buckets[bucket]) {
            if self.equal.key_eq(&node.key, key) {
                return Some((prev, id));
            }
            prev = Some(id);
        }
        None
    }

    /// Get the value for key, None if key is not in the table.
    pub fn get(&self, key: &K) -> Result<Option<&V>, TableError> {
        self.check_created()?;
        let bucket = self.bucket_of(key);
        Ok(self
            .find(bucket, key)
            .map(|(_, id)| &self.nodes.get(id).value))
    }

    /// Get a mutable reference to the value for key, None if key is not in the table.
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, TableError> {
        self.check_created()?;
        let bucket = self.bucket_of(key);
        Ok(match self.find(bucket, key) {
            Some((_, id)) => Some(&mut self.nodes.get_mut(id).value),
            None => None,
        })
    }

    /// True if key is in the table.
    pub fn contains(&self, key: &K) -> Result<bool, TableError> {
        self.check_created()?;
        let bucket = self.bucket_of(key);
        Ok(self.find(bucket, key).is_some())
    }

    /// Set key to value.
    /// A new key is pushed on the head of its bucket's chain.  For an existing key the value is
    /// replaced if overwrite is true, otherwise the table is left unchanged.
    pub fn set(&mut self, key: K, value: V, overwrite: bool) -> Result<SetOutcome, TableError> {
        self.check_created()?;
        let bucket = self.bucket_of(&key);
        if let Some((_, id)) = self.find(bucket, &key) {
            if overwrite {
                self.nodes.get_mut(id).value = value;
                return Ok(SetOutcome::Overwritten);
            }
            return Ok(SetOutcome::KeyAlreadyExists);
        }
        if self.size == u32::MAX {
            log::error!("fail to construct a node, table is full");
            return Err(TableError::CapacityExhausted);
        }
        let node = Node {
            key,
            value,
            next: self.buckets[bucket],
        };
        let id = self.nodes.alloc(node).map_err(|e| {
            log::error!("fail to construct a node: {}", e);
            e
        })?;
        self.buckets[bucket] = Some(id);
        self.size += 1;
        Ok(SetOutcome::Inserted)
    }

    /// Remove key, the rest of its chain keeps its order.
    pub fn erase(&mut self, key: &K) -> Result<EraseOutcome<V>, TableError> {
        self.check_created()?;
        let bucket = self.bucket_of(key);
        let Some((prev, id)) = self.find(bucket, key) else {
            return Ok(EraseOutcome::KeyNotFound);
        };
        let node = self.nodes.free(id);
        match prev {
            None => self.buckets[bucket] = node.next,
            Some(prev) => self.nodes.get_mut(prev).next = node.next,
        }
        self.size -= 1;
        Ok(EraseOutcome::Erased(node.value))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, E> fmt::Debug for ChainHash<K, V, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::StdHash;

    type IntTable = ChainHash<u32, &'static str>;

    fn keys_in_bucket<V, H, E>(table: &ChainHash<u32, V, H, E>, bucket: u32) -> Vec<u32> {
        table
            .chain(table.buckets[bucket as usize])
            .map(|(_, node)| node.key)
            .collect()
    }

    #[test]
    fn test_create_bounds() {
        let mut table = IntTable::new();
        assert!(!table.is_created());
        assert_eq!(table.create(0), Err(TableError::InvalidBucketCount(0)));
        assert_eq!(
            table.create(u32::MAX as u64 + 1),
            Err(TableError::InvalidBucketCount(u32::MAX as u64 + 1))
        );
        assert!(!table.is_created());
        table.create(1).unwrap();
        assert!(table.is_created());
        assert_eq!(table.bucket_count(), 1);
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn test_not_created() {
        let mut table = IntTable::new();
        assert_eq!(table.get(&1), Err(TableError::NotCreated));
        assert_eq!(table.contains(&1), Err(TableError::NotCreated));
        assert_eq!(table.set(1, "a", true), Err(TableError::NotCreated));
        assert_eq!(table.erase(&1), Err(TableError::NotCreated));
        assert!(table.get_mut(&1).is_err());
        // clear on an uncreated table is fine.
        table.clear();
        assert_eq!(table.bucket_count(), 0);

        table.create(4).unwrap();
        table.set(1, "a", true).unwrap();
        table.clear();
        assert!(!table.is_created());
        assert_eq!(table.size(), 0);
        assert_eq!(table.get(&1), Err(TableError::NotCreated));
    }

    #[test]
    fn test_single_bucket_collides() {
        let mut table = IntTable::with_bucket_count(1).unwrap();
        for k in 0..10 {
            assert_eq!(table.set(k, "v", false), Ok(SetOutcome::Inserted));
        }
        assert_eq!(table.bucket_len(0), 10);
        assert_eq!(keys_in_bucket(&table, 0), (0..10).rev().collect::<Vec<_>>());
        for k in 0..10 {
            assert_eq!(table.get(&k), Ok(Some(&"v")));
        }
    }

    #[test]
    fn test_set_no_overwrite_keeps_first() {
        let mut table = IntTable::with_bucket_count(8).unwrap();
        assert_eq!(table.set(3, "v1", false), Ok(SetOutcome::Inserted));
        assert_eq!(table.set(3, "v2", false), Ok(SetOutcome::KeyAlreadyExists));
        assert_eq!(table.get(&3), Ok(Some(&"v1")));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_set_overwrite_replaces() {
        let mut table = IntTable::with_bucket_count(8).unwrap();
        assert_eq!(table.set(3, "v1", true), Ok(SetOutcome::Inserted));
        assert_eq!(table.set(3, "v2", true), Ok(SetOutcome::Overwritten));
        assert_eq!(table.get(&3), Ok(Some(&"v2")));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_get_miss_is_not_found() {
        let mut table = IntTable::with_bucket_count(4).unwrap();
        assert_eq!(table.get(&1), Ok(None));
        table.set(1, "a", false).unwrap();
        // Same bucket as 1, different key.
        assert_eq!(table.get(&5), Ok(None));
        assert_eq!(table.contains(&5), Ok(false));
        assert_eq!(table.contains(&1), Ok(true));
    }

    #[test]
    fn test_chain_order_and_erase() {
        let mut table = IntTable::with_bucket_count(4).unwrap();
        table.set(1, "a", false).unwrap();
        table.set(5, "b", false).unwrap();
        assert_eq!(keys_in_bucket(&table, 1), vec![5, 1]);
        assert_eq!(table.erase(&1), Ok(EraseOutcome::Erased("a")));
        assert_eq!(table.get(&5), Ok(Some(&"b")));
        assert_eq!(table.get(&1), Ok(None));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_erase_keeps_chain_order() {
        let mut table = IntTable::with_bucket_count(1).unwrap();
        for k in 0..5 {
            table.set(k, "v", false).unwrap();
        }
        // Head, middle and tail.
        assert_eq!(table.erase(&4), Ok(EraseOutcome::Erased("v")));
        assert_eq!(keys_in_bucket(&table, 0), vec![3, 2, 1, 0]);
        assert_eq!(table.erase(&2), Ok(EraseOutcome::Erased("v")));
        assert_eq!(keys_in_bucket(&table, 0), vec![3, 1, 0]);
        assert_eq!(table.erase(&0), Ok(EraseOutcome::Erased("v")));
        assert_eq!(keys_in_bucket(&table, 0), vec![3, 1]);
        // Freed slots get reused.
        table.set(7, "w", false).unwrap();
        assert_eq!(keys_in_bucket(&table, 0), vec![7, 3, 1]);
        assert_eq!(table.size(), 3);
    }

    #[test]
    fn test_erase_missing() {
        let mut table = IntTable::with_bucket_count(4).unwrap();
        table.set(1, "a", false).unwrap();
        assert_eq!(table.erase(&9), Ok(EraseOutcome::KeyNotFound));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_size_tracks_inserts_and_erases() {
        let mut table: ChainHash<u64, u64> = ChainHash::with_bucket_count(97).unwrap();
        let mut expected = 0_u32;
        for k in 0..1000_u64 {
            if table.set(k, k * 2, false) == Ok(SetOutcome::Inserted) {
                expected += 1;
            }
        }
        for k in (0..1000_u64).step_by(3) {
            if let Ok(EraseOutcome::Erased(v)) = table.erase(&k) {
                assert_eq!(v, k * 2);
                expected -= 1;
            }
        }
        for k in (0..1000_u64).step_by(3) {
            assert_eq!(table.erase(&k), Ok(EraseOutcome::KeyNotFound));
        }
        assert_eq!(table.size(), expected);
        assert_eq!(table.size(), 1000 - 334);
        assert_eq!(table.iter().count(), expected as usize);
        let total: usize = (0..97).map(|b| table.bucket_len(b)).sum();
        assert_eq!(total, expected as usize);
        for k in 0..1000_u64 {
            let expect = if k % 3 == 0 { None } else { Some(k * 2) };
            assert_eq!(table.get(&k).unwrap().copied(), expect);
        }
    }

    #[test]
    fn test_get_mut() {
        let mut table: ChainHash<u32, u32> = ChainHash::with_bucket_count(16).unwrap();
        table.set(2, 20, false).unwrap();
        *table.get_mut(&2).unwrap().unwrap() += 1;
        assert_eq!(table.get(&2), Ok(Some(&21)));
        assert_eq!(table.get_mut(&3), Ok(None));
    }

    #[test]
    fn test_recreate_discards() {
        let mut table = IntTable::with_bucket_count(4).unwrap();
        table.set(1, "a", false).unwrap();
        table.set(2, "b", false).unwrap();
        table.create(16).unwrap();
        assert_eq!(table.bucket_count(), 16);
        assert_eq!(table.size(), 0);
        assert_eq!(table.get(&1), Ok(None));
    }

    #[test]
    fn test_memory_footprint() {
        let mut table: ChainHash<u64, u64> = ChainHash::new();
        assert_eq!(table.memory_footprint(), 0);
        table.create(10).unwrap();
        let bucket = std::mem::size_of::<Link>() as u64;
        let node = std::mem::size_of::<Node<u64, u64>>() as u64;
        assert_eq!(table.memory_footprint(), 10 * bucket);
        table.set(1, 1, false).unwrap();
        table.set(2, 2, false).unwrap();
        assert_eq!(table.memory_footprint(), 10 * bucket + 2 * node);
    }

    #[test]
    fn test_string_keys() {
        let mut table: ChainHash<String, u32> = ChainHash::with_bucket_count(7).unwrap();
        table.set("alpha".to_string(), 1, false).unwrap();
        table.set("beta".to_string(), 2, false).unwrap();
        assert_eq!(table.get(&"alpha".to_string()), Ok(Some(&1)));
        assert_eq!(table.get(&"gamma".to_string()), Ok(None));
    }

    #[test]
    fn test_std_hash_strategy() {
        let mut table: ChainHash<&str, u32, StdHash> = ChainHash::with_bucket_count(3).unwrap();
        table.set("a", 1, false).unwrap();
        table.set("b", 2, false).unwrap();
        table.set("c", 3, false).unwrap();
        assert_eq!(table.get(&"b"), Ok(Some(&2)));
        assert_eq!(table.size(), 3);
    }

    #[test]
    fn test_debug() {
        let mut table = IntTable::with_bucket_count(4).unwrap();
        table.set(1, "a", false).unwrap();
        table.set(2, "b", false).unwrap();
        assert_eq!(format!("{:?}", table), r#"{1: "a", 2: "b"}"#);
    }
}
