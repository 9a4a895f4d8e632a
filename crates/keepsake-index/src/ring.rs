//! Circular doubly-linked index over catalog records.
//!
//! Nodes live in a `Vec` arena and link to each other by `SlotId`, so the
//! cycle never becomes an ownership cycle. Removed slots are pushed onto a
//! free list and reused by later inserts.
//!
//! ```text
//!        head
//!         v
//!   +--> [a] <-> [b] <-> [c] <--+
//!   |                           |
//!   +------- prev / next -------+
//! ```

use keepsake_common::{Record, RecordId, RecordStore};
use std::collections::HashSet;
use std::sync::Arc;

/// Index of a node in the ring arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotId(u32);

impl SlotId {
    /// Slot at arena position `len`; panics past the `u32` slot space.
    #[inline]
    fn at(len: usize) -> Self {
        match u32::try_from(len) {
            Ok(raw) => SlotId(raw),
            Err(_) => panic!("ring arena full: {} slots", len),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct RingNode {
    record: RecordId,
    next: SlotId,
    prev: SlotId,
}

/// Circular doubly-linked list of record ids in insertion order.
pub struct RingIndex {
    /// Node arena. Slots on the free list hold stale links.
    nodes: Vec<RingNode>,
    /// Recyclable slots.
    free_list: Vec<SlotId>,
    /// First node of the rotation; None when empty.
    head: Option<SlotId>,
    /// Number of linked nodes.
    size: usize,
}

impl RingIndex {
    /// Creates an empty ring.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty ring with arena room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            head: None,
            size: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the record id at the head of the ring.
    #[inline]
    pub fn head(&self) -> Option<RecordId> {
        self.head.map(|slot| self.node(slot).record)
    }

    #[inline]
    fn node(&self, slot: SlotId) -> &RingNode {
        &self.nodes[slot.index()]
    }

    #[inline]
    fn node_mut(&mut self, slot: SlotId) -> &mut RingNode {
        &mut self.nodes[slot.index()]
    }

    fn alloc(&mut self, node: RingNode) -> SlotId {
        if let Some(slot) = self.free_list.pop() {
            *self.node_mut(slot) = node;
            slot
        } else {
            let slot = SlotId::at(self.nodes.len());
            self.nodes.push(node);
            slot
        }
    }

    /// Appends a record at the tail, i.e. just before the head.
    ///
    /// # Panics
    ///
    /// Panics if `u32::MAX + 1` slots are already live.
    pub fn insert(&mut self, record: RecordId) {
        match self.head {
            None => {
                let slot = self.alloc(RingNode {
                    record,
                    next: SlotId(0),
                    prev: SlotId(0),
                });
                let node = self.node_mut(slot);
                node.next = slot;
                node.prev = slot;
                self.head = Some(slot);
            }
            Some(head) => {
                let tail = self.node(head).prev;
                let slot = self.alloc(RingNode {
                    record,
                    next: head,
                    prev: tail,
                });
                self.node_mut(tail).next = slot;
                self.node_mut(head).prev = slot;
            }
        }
        self.size += 1;
    }

    /// Unlinks the node holding `record`.
    ///
    /// Walks at most one lap from the head. Returns None, without touching
    /// the ring, if the id is not linked.
    pub fn remove(&mut self, record: RecordId) -> Option<RecordId> {
        let head = self.head?;
        let mut current = head;

        for _ in 0..self.size {
            let node = *self.node(current);
            if node.record == record {
                self.node_mut(node.prev).next = node.next;
                self.node_mut(node.next).prev = node.prev;
                if current == head {
                    self.head = if self.size > 1 { Some(node.next) } else { None };
                }
                self.size -= 1;
                self.free_list.push(current);
                return Some(record);
            }
            current = node.next;
        }

        None
    }

    /// Collects up to `limit` records walking forward from the head.
    ///
    /// A record is taken iff it matches `category` (None matches all). The
    /// walk stops after `limit` hits or once every linked id has been
    /// visited, so it never covers more than one lap. Ids that do not
    /// resolve in `store` are skipped.
    pub fn scan<'s>(
        &self,
        store: &'s RecordStore,
        limit: usize,
        category: Option<&str>,
    ) -> Vec<&'s Arc<Record>> {
        let Some(head) = self.head else {
            return Vec::new();
        };
        if limit == 0 {
            return Vec::new();
        }

        let mut results = Vec::with_capacity(limit.min(self.size));
        let mut visited: HashSet<RecordId> = HashSet::with_capacity(self.size);
        let mut current = head;

        while results.len() < limit && visited.len() < self.size {
            let node = self.node(current);
            if visited.insert(node.record) {
                if let Some(record) = store.get(node.record) {
                    if record.matches_category(category) {
                        results.push(record);
                    }
                }
            }
            current = node.next;
        }

        results
    }

    /// Iterates one lap forward from the head.
    pub fn iter(&self) -> RingIter<'_> {
        RingIter {
            ring: self,
            current: self.head,
            remaining: self.size,
            forward: true,
        }
    }

    /// Iterates one lap backward from the head (head first, then tail).
    pub fn iter_rev(&self) -> RingIter<'_> {
        RingIter {
            ring: self,
            current: self.head,
            remaining: self.size,
            forward: false,
        }
    }
}

impl Default for RingIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// One-lap iterator over ring record ids.
pub struct RingIter<'a> {
    ring: &'a RingIndex,
    current: Option<SlotId>,
    remaining: usize,
    forward: bool,
}

impl Iterator for RingIter<'_> {
    type Item = RecordId;

    fn next(&mut self) -> Option<RecordId> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.current?;
        let node = self.ring.node(slot);
        self.current = Some(if self.forward { node.next } else { node.prev });
        self.remaining -= 1;
        Some(node.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RingIter<'_> {}
