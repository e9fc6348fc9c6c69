//! Fixed-capacity circular buffer that overwrites its oldest entry.
//!
//! All slots are allocated up front and linked into a cycle. Writes go to the
//! cursor slot and advance it, so once the ring is full every new entry
//! replaces the one written `capacity` adds earlier. Traversal always starts
//! at the first allocated slot, not at the oldest entry.
//!
//! # Example
//!
//! ```
//! use nexus_linked::Ring;
//!
//! let ring = Ring::with_capacity(3).unwrap();
//!
//! ring.add(1);
//! ring.add(2);
//! ring.add(3);
//!
//! // Full: this overwrites slot 0 and hands back what was there.
//! let displaced = ring.add(4);
//! assert_eq!(displaced.as_deref(), Some(&1));
//!
//! let values: Vec<_> = ring.iter().map(|entry| *entry).collect();
//! assert_eq!(values, [4, 2, 3]);
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::{Identify, RingError};

/// Slot every traversal starts from.
const HEAD: usize = 0;

/// One pre-allocated slot in the cycle.
struct RingNode<T> {
    data: Option<Arc<T>>,
    next: usize,
    previous: usize,
}

/// Slots plus write position, guarded together.
struct Cycle<T> {
    nodes: Box<[RingNode<T>]>,
    cursor: usize,
    filled: usize,
}

impl<T> Cycle<T> {
    fn entry(&self, slot: usize) -> Option<RingEntry<T>> {
        let data = self.nodes[slot].data.clone()?;
        Some(RingEntry { slot, data })
    }
}

/// A fixed-capacity ring safe for concurrent writers and readers.
///
/// `add` takes the ring's lock exclusively; reads take it shared.
pub struct Ring<T> {
    cycle: RwLock<Cycle<T>>,
    capacity: usize,
}

impl<T> Ring<T> {
    /// Creates a ring with `capacity` empty slots.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::ZeroCapacity`] if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }

        let nodes = (0..capacity)
            .map(|slot| RingNode {
                data: None,
                next: (slot + 1) % capacity,
                previous: (slot + capacity - 1) % capacity,
            })
            .collect();

        trace!(capacity, "ring allocated");

        Ok(Self {
            cycle: RwLock::new(Cycle {
                nodes,
                cursor: HEAD,
                filled: 0,
            }),
            capacity,
        })
    }

    /// Writes `data` at the cursor and advances it.
    ///
    /// Returns the entry that was overwritten, or `None` while the ring is
    /// still filling.
    pub fn add(&self, data: T) -> Option<Arc<T>> {
        let mut cycle = self.cycle.write();

        let cursor = cycle.cursor;
        let node = &mut cycle.nodes[cursor];
        let displaced = node.data.replace(Arc::new(data));
        let next = node.next;

        cycle.cursor = next;
        if cycle.filled < self.capacity {
            cycle.filled += 1;
        }

        if next == HEAD {
            trace!(capacity = self.capacity, "ring cursor wrapped");
        }

        displaced
    }

    /// Returns the number of slots holding an entry.
    #[inline]
    pub fn len(&self) -> usize {
        self.cycle.read().filled
    }

    /// Returns the fixed number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if nothing has been added yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once every slot has been written.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Returns the most recently written entry.
    pub fn latest(&self) -> Option<RingEntry<T>> {
        let cycle = self.cycle.read();
        if cycle.filled == 0 {
            return None;
        }
        let slot = cycle.nodes[cycle.cursor].previous;
        cycle.entry(slot)
    }

    /// Returns a lazy walk over filled slots in cycle order from the first
    /// slot.
    ///
    /// The walk yields at most the length observed at creation and re-reads
    /// each slot when it reaches it, so a concurrent `add` may show up.
    pub fn iter(&self) -> RingIter<'_, T> {
        RingIter {
            ring: self,
            slot: HEAD,
            remaining: self.len(),
        }
    }

    /// Returns every filled entry, in cycle order, read under one lock.
    pub fn snapshot(&self) -> Vec<RingEntry<T>> {
        let cycle = self.cycle.read();
        let mut entries = Vec::with_capacity(cycle.filled);
        let mut slot = HEAD;

        for _ in 0..cycle.filled {
            let Some(entry) = cycle.entry(slot) else {
                break;
            };
            entries.push(entry);
            slot = cycle.nodes[slot].next;
        }

        entries
    }
}

impl<T: Identify> Ring<T> {
    /// Returns the first entry, in cycle order, whose identity is `id`.
    pub fn find(&self, id: &str) -> Option<RingEntry<T>> {
        self.iter().find(|entry| entry.data.id() == id)
    }
}

impl<T> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// A ring slot and the entry written there.
///
/// Derefs to the entry. The entry is shared, so it stays valid after the
/// slot is overwritten.
pub struct RingEntry<T> {
    slot: usize,
    data: Arc<T>,
}

impl<T> RingEntry<T> {
    /// Returns the slot index, counted from the first slot.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the shared entry.
    #[inline]
    pub fn data(&self) -> &Arc<T> {
        &self.data
    }

    /// Consumes the entry, returning the shared payload.
    #[inline]
    pub fn into_inner(self) -> Arc<T> {
        self.data
    }
}

impl<T> Clone for RingEntry<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot,
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> Deref for RingEntry<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: fmt::Debug> fmt::Debug for RingEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingEntry")
            .field("slot", &self.slot)
            .field("data", &self.data)
            .finish()
    }
}

/// Lazy walk over a ring's filled slots.
///
/// Created by [`Ring::iter`].
pub struct RingIter<'a, T> {
    ring: &'a Ring<T>,
    slot: usize,
    remaining: usize,
}

impl<T> Iterator for RingIter<'_, T> {
    type Item = RingEntry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let cycle = self.ring.cycle.read();
        let entry = cycle.entry(self.slot)?;
        self.slot = cycle.nodes[self.slot].next;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a Ring<T> {
    type Item = RingEntry<T>;
    type IntoIter = RingIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
