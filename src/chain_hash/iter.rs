//! Iterator over the entries of a ChainHash.

use crate::chain_hash::node::{Link, NodeArena};
use std::iter::FusedIterator;

/// Iterates over the (key, value) entries of a table, bucket by bucket and within a bucket from
/// the head of the chain to the tail.
pub struct Iter<'a, K, V> {
    buckets: &'a [Link],
    nodes: &'a NodeArena<K, V>,
    // Next bucket to start on.
    bucket: usize,
    link: Link,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(buckets: &'a [Link], nodes: &'a NodeArena<K, V>) -> Self {
        Self {
            buckets,
            nodes,
            bucket: 0,
            link: None,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.link {
                let node = self.nodes.get(id);
                self.link = node.next;
                return Some((&node.key, &node.value));
            }
            let head = self.buckets.get(self.bucket)?;
            self.link = *head;
            self.bucket += 1;
        }
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use crate::ChainHash;

    #[test]
    fn test_iter_order() {
        let mut table: ChainHash<u32, u32> = ChainHash::with_bucket_count(4).unwrap();
        for k in [1, 5, 2, 9, 3, 0] {
            table.set(k, k * 10, false).unwrap();
        }
        let keys: Vec<u32> = table.iter().map(|(k, _)| *k).collect();
        // Bucket 0: [0], bucket 1: [9, 5, 1], bucket 2: [2], bucket 3: [3].
        assert_eq!(keys, vec![0, 9, 5, 1, 2, 3]);
        assert!(table.iter().all(|(k, v)| *v == *k * 10));
    }

    #[test]
    fn test_iter_empty() {
        let table: ChainHash<u32, u32> = ChainHash::new();
        assert_eq!(table.iter().count(), 0);
        let table: ChainHash<u32, u32> = ChainHash::with_bucket_count(8).unwrap();
        let mut iter = table.iter();
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }
}
