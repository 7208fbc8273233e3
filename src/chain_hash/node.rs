//! Node storage for the bucket chains.
//!
//! Nodes live in one arena and are linked by index, a bucket holds the index of its head node.
//! Erased slots go on a free list and are reused by later inserts.  Every occupied slot is
//! reachable from exactly one bucket.

use crate::error::TableError;
use std::num::NonZeroU32;

/// Index of a node in the arena, stored +1 so an empty link costs no extra space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct NodeId(NonZeroU32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        // Callers never push past u32::MAX - 1 slots.
        Self(NonZeroU32::MIN.saturating_add(index as u32))
    }

    #[inline]
    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// A bucket, the head of a chain.
pub(crate) type Link = Option<NodeId>;

/// One (key, value) entry and the link to the next node in its chain.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) next: Link,
}

#[derive(Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Link },
}

/// Owns every node of a table.
#[derive(Debug)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Link,
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }
}

impl<K, V> NodeArena<K, V> {
    /// Store a new node, returns its id.
    /// Fails without changing anything if memory for the node can not be reserved.
    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> Result<NodeId, TableError> {
        if let Some(id) = self.free_head {
            let slot = &mut self.slots[id.index()];
            if let Slot::Vacant { next_free } = slot {
                self.free_head = *next_free;
            }
            *slot = Slot::Occupied(node);
            return Ok(id);
        }
        if self.slots.len() >= u32::MAX as usize {
            return Err(TableError::CapacityExhausted);
        }
        self.slots.try_reserve(1)?;
        self.slots.push(Slot::Occupied(node));
        Ok(NodeId::from_index(self.slots.len() - 1))
    }

    /// Remove the node id, the slot goes on the free list.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let slot = std::mem::replace(
            &mut self.slots[id.index()],
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id);
        match slot {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("freed an unoccupied node slot"),
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("link to an unoccupied node slot"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("link to an unoccupied node slot"),
        }
    }

    /// Drop every node and release the storage.
    pub(crate) fn clear(&mut self) {
        self.slots = Vec::new();
        self.free_head = None;
    }
}
