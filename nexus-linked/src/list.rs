//! Concurrent doubly-linked list with stable node handles.
//!
//! Nodes live in an arena owned by the list and link to each other by slot
//! index. Every insertion returns a [`NodeHandle`] that stays usable for O(1)
//! deletion or as an insertion anchor, without re-scanning the list.
//!
//! # Example
//!
//! ```
//! use nexus_linked::List;
//!
//! let list: List<String> = List::new();
//!
//! let a = list.append("a".to_string());
//! let c = list.append("c".to_string());
//! list.insert_before(&c, "b".to_string()).unwrap();
//! list.prepend("start".to_string());
//!
//! let values: Vec<_> = list.data().collect();
//! assert_eq!(values, ["start", "a", "b", "c"]);
//!
//! // O(1) removal from anywhere
//! assert!(list.delete(&a));
//! assert_eq!(list.len(), 3);
//!
//! // Lookup by identity
//! let b = list.get("b").unwrap();
//! assert_eq!(list.next(&b).as_deref().map(String::as_str), Some("c"));
//! ```
//!
//! # Concurrency
//!
//! All operations take `&self`; share the list behind an `Arc` to mutate it
//! from several threads.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use nexus_linked::List;
//!
//! let list = Arc::new(List::new());
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|t| {
//!         let list = Arc::clone(&list);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 list.append(format!("{t}-{i}"));
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! assert_eq!(list.len(), 400);
//! ```
//!
//! Three lock scopes, always acquired in this order:
//!
//! 1. **Structure lock**: head, tail, and length. Held for the whole of every
//!    insertion and deletion, so structural writers never lose updates.
//! 2. **Node locks**: each node's `previous`/`next`. A writer locks the
//!    subject node, then its successor, then its predecessor. Readers lock
//!    one node at a time and never take the structure lock while walking.
//! 3. **Arena lock**: slot allocation and slot lookup. Nothing else is
//!    acquired while it is held.
//!
//! # Traversal Is Not a Snapshot
//!
//! [`nodes`](List::nodes) and [`data`](List::data) capture the head and the
//! length when created, then follow live links one step at a time. A
//! deletion racing with the walk may end it early or skip nodes; an
//! insertion may or may not be observed. The walk never yields more than the
//! captured length. Use [`snapshot`](List::snapshot) for a consistent copy.
//!
//! # Handle Misuse
//!
//! Passing a handle from another list, or one whose node was already
//! deleted, is a no-op: [`delete`](List::delete) returns `false`, the
//! insertion methods return [`LinkError::Detached`] with the payload, and
//! navigation returns `None`. Other handles are unaffected.

use std::fmt;
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, RwLock};
use slab::Slab;
use tracing::debug;

use crate::node::{self, ListId, Node, NodeHandle};
use crate::{Identify, LinkError};

/// Head, tail, and length, guarded by the structure lock.
struct Ends<T> {
    head: Option<Arc<Node<T>>>,
    tail: Option<Arc<Node<T>>>,
    len: usize,
}

impl<T> Ends<T> {
    const fn empty() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    fn is_head(&self, node: &Arc<Node<T>>) -> bool {
        self.head.as_ref().is_some_and(|head| Arc::ptr_eq(head, node))
    }

    #[inline]
    fn is_tail(&self, node: &Arc<Node<T>>) -> bool {
        self.tail.as_ref().is_some_and(|tail| Arc::ptr_eq(tail, node))
    }
}

/// A doubly-linked list safe for concurrent insertion, deletion, and
/// traversal.
///
/// Payloads are stored by value and are immutable once inserted. Store an
/// `Arc<U>` to share a payload with other owners.
///
/// See the [module documentation](self) for the locking and traversal
/// guarantees.
pub struct List<T> {
    id: ListId,
    ends: CachePadded<Mutex<Ends<T>>>,
    arena: CachePadded<RwLock<Slab<Arc<Node<T>>>>>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    /// Creates an empty list.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes before the arena
    /// has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: ListId::next(),
            ends: CachePadded::new(Mutex::new(Ends::empty())),
            arena: CachePadded::new(RwLock::new(Slab::with_capacity(capacity))),
        }
    }

    /// Returns the number of nodes in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.ends.lock().len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the first node, or `None` if empty.
    pub fn head(&self) -> Option<NodeHandle<T>> {
        self.ends.lock().head.clone().map(NodeHandle::new)
    }

    /// Returns the last node, or `None` if empty.
    pub fn tail(&self) -> Option<NodeHandle<T>> {
        self.ends.lock().tail.clone().map(NodeHandle::new)
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Inserts `data` after the current tail.
    ///
    /// On an empty list the new node becomes both head and tail.
    pub fn append(&self, data: T) -> NodeHandle<T> {
        let mut ends = self.ends.lock();
        let node = self.allocate(data);
        self.link_back(&mut ends, &node);
        NodeHandle::new(node)
    }

    /// Inserts `data` before the current head.
    ///
    /// On an empty list the new node becomes both head and tail.
    pub fn prepend(&self, data: T) -> NodeHandle<T> {
        let mut ends = self.ends.lock();
        let node = self.allocate(data);
        self.link_front(&mut ends, &node);
        NodeHandle::new(node)
    }

    /// Inserts `data` directly after `at`.
    ///
    /// # Errors
    ///
    /// Returns `Err(LinkError::Detached(data))` if `at` belongs to another
    /// list or was already deleted. The list is left unchanged.
    pub fn insert_after(&self, at: &NodeHandle<T>, data: T) -> Result<NodeHandle<T>, LinkError<T>> {
        let mut ends = self.ends.lock();
        if !self.check_linked(at) {
            return Err(LinkError::Detached(data));
        }

        let node = self.allocate(data);
        self.link_after(&mut ends, at.node(), &node);
        Ok(NodeHandle::new(node))
    }

    /// Inserts `data` directly before `at`.
    ///
    /// # Errors
    ///
    /// Returns `Err(LinkError::Detached(data))` if `at` belongs to another
    /// list or was already deleted. The list is left unchanged.
    pub fn insert_before(
        &self,
        at: &NodeHandle<T>,
        data: T,
    ) -> Result<NodeHandle<T>, LinkError<T>> {
        let mut ends = self.ends.lock();
        if !self.check_linked(at) {
            return Err(LinkError::Detached(data));
        }

        let node = self.allocate(data);
        self.link_before(&mut ends, at.node(), &node);
        Ok(NodeHandle::new(node))
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes the node behind `handle`.
    ///
    /// Returns `true` if a node was removed, `false` if the handle belongs to
    /// another list or its node was already deleted. O(1).
    pub fn delete(&self, handle: &NodeHandle<T>) -> bool {
        let mut ends = self.ends.lock();
        if !self.check_linked(handle) {
            return false;
        }

        self.unlink(&mut ends, handle.node());
        true
    }

    /// Removes and returns the first node.
    pub fn pop_front(&self) -> Option<NodeHandle<T>> {
        let mut ends = self.ends.lock();
        let head = ends.head.clone()?;
        self.unlink(&mut ends, &head);
        Some(NodeHandle::new(head))
    }

    /// Removes and returns the last node.
    pub fn pop_back(&self) -> Option<NodeHandle<T>> {
        let mut ends = self.ends.lock();
        let tail = ends.tail.clone()?;
        self.unlink(&mut ends, &tail);
        Some(NodeHandle::new(tail))
    }

    /// Removes every node.
    ///
    /// Outstanding handles stay readable but are no longer linked.
    pub fn clear(&self) {
        let mut ends = self.ends.lock();
        *ends = Ends::empty();

        let nodes: Vec<_> = self.arena.write().drain().collect();
        for node in &nodes {
            node.links().clear();
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Returns `true` if `handle` refers to a node currently linked into this
    /// list.
    pub fn contains(&self, handle: &NodeHandle<T>) -> bool {
        let node = handle.node();
        node.owner() == self.id && self.holds(node)
    }

    /// Returns the node after `handle`.
    ///
    /// Returns `None` if `handle` is the tail, foreign, or deleted.
    pub fn next(&self, handle: &NodeHandle<T>) -> Option<NodeHandle<T>> {
        if !self.contains(handle) {
            return None;
        }
        let next = handle.node().links().next?;
        self.resolve(next).map(NodeHandle::new)
    }

    /// Returns the node before `handle`.
    ///
    /// Returns `None` if `handle` is the head, foreign, or deleted.
    pub fn previous(&self, handle: &NodeHandle<T>) -> Option<NodeHandle<T>> {
        if !self.contains(handle) {
            return None;
        }
        let previous = handle.node().links().previous?;
        self.resolve(previous).map(NodeHandle::new)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Returns a lazy head-to-tail walk over node handles.
    ///
    /// Not a snapshot: see the [module documentation](self#traversal-is-not-a-snapshot).
    pub fn nodes(&self) -> Nodes<'_, T> {
        let ends = self.ends.lock();
        Nodes {
            list: self,
            current: ends.head.clone(),
            remaining: ends.len,
        }
    }

    /// Returns a lazy head-to-tail walk over cloned payloads.
    ///
    /// Same consistency as [`nodes`](List::nodes).
    pub fn data(&self) -> Data<'_, T>
    where
        T: Clone,
    {
        Data {
            nodes: self.nodes(),
        }
    }

    /// Returns every node, head to tail, collected under the structure lock.
    ///
    /// Unlike [`nodes`](List::nodes), no insertion or deletion can interleave
    /// with the copy.
    pub fn snapshot(&self) -> Vec<NodeHandle<T>> {
        let ends = self.ends.lock();
        let mut nodes = Vec::with_capacity(ends.len);
        let mut current = ends.head.clone();

        while let Some(node) = current {
            let next = node.links().next;
            nodes.push(NodeHandle::new(node));
            current = next.and_then(|slot| self.resolve(slot));
        }

        nodes
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Places a new, unlinked node in the arena.
    fn allocate(&self, data: T) -> Arc<Node<T>> {
        let mut arena = self.arena.write();
        let entry = arena.vacant_entry();
        let node = Arc::new(Node::new(data, entry.key(), self.id));
        entry.insert(Arc::clone(&node));
        node
    }

    /// Frees the arena slot of an unlinked node.
    fn release(&self, node: &Node<T>) {
        self.arena.write().try_remove(node.slot());
    }

    /// Looks up the node occupying `slot`.
    #[inline]
    fn resolve(&self, slot: usize) -> Option<Arc<Node<T>>> {
        self.arena.read().get(slot).cloned()
    }

    /// Returns `true` if `node` still occupies its slot in this arena.
    #[inline]
    fn holds(&self, node: &Arc<Node<T>>) -> bool {
        self.arena
            .read()
            .get(node.slot())
            .is_some_and(|occupant| Arc::ptr_eq(occupant, node))
    }

    /// Like [`contains`](List::contains), logging why a handle was rejected.
    fn check_linked(&self, handle: &NodeHandle<T>) -> bool {
        let node = handle.node();
        if node.owner() != self.id {
            debug!(slot = node.slot(), "ignoring handle owned by another list");
            return false;
        }
        if !self.holds(node) {
            debug!(slot = node.slot(), "ignoring handle to a deleted node");
            return false;
        }
        true
    }

    fn link_back(&self, ends: &mut Ends<T>, node: &Arc<Node<T>>) {
        match ends.tail.take() {
            Some(tail) => {
                let mut links = node.links();
                let mut tail_links = tail.links();
                node::make_tail(&mut links, node.slot(), &mut tail_links, tail.slot());
            }
            None => ends.head = Some(Arc::clone(node)),
        }
        ends.tail = Some(Arc::clone(node));
        ends.len += 1;
    }

    fn link_front(&self, ends: &mut Ends<T>, node: &Arc<Node<T>>) {
        match ends.head.take() {
            Some(head) => {
                let mut links = node.links();
                let mut head_links = head.links();
                node::make_head(&mut links, node.slot(), &mut head_links, head.slot());
            }
            None => ends.tail = Some(Arc::clone(node)),
        }
        ends.head = Some(Arc::clone(node));
        ends.len += 1;
    }

    fn link_after(&self, ends: &mut Ends<T>, anchor: &Arc<Node<T>>, node: &Arc<Node<T>>) {
        let next = anchor.links().next;
        let Some(next) = next.and_then(|slot| self.resolve(slot)) else {
            return self.link_back(ends, node);
        };

        {
            let mut links = node.links();
            let mut next_links = next.links();
            let mut anchor_links = anchor.links();
            node::splice(
                (&mut anchor_links, anchor.slot()),
                (&mut links, node.slot()),
                (&mut next_links, next.slot()),
            );
        }
        ends.len += 1;
    }

    fn link_before(&self, ends: &mut Ends<T>, anchor: &Arc<Node<T>>, node: &Arc<Node<T>>) {
        let previous = anchor.links().previous;
        let Some(previous) = previous.and_then(|slot| self.resolve(slot)) else {
            return self.link_front(ends, node);
        };

        {
            let mut links = node.links();
            let mut anchor_links = anchor.links();
            let mut previous_links = previous.links();
            node::splice(
                (&mut previous_links, previous.slot()),
                (&mut links, node.slot()),
                (&mut anchor_links, anchor.slot()),
            );
        }
        ends.len += 1;
    }

    /// Unlinks a node known to be in this list and frees its slot.
    fn unlink(&self, ends: &mut Ends<T>, node: &Arc<Node<T>>) {
        match ends.len {
            0 => return,
            1 => {
                *ends = Ends::empty();
                node.links().clear();
            }
            2 => {
                // The survivor becomes head and tail with no links left.
                let survivor = if ends.is_head(node) {
                    ends.tail.take()
                } else {
                    ends.head.take()
                };
                let mut links = node.links();
                if let Some(survivor) = survivor {
                    survivor.links().clear();
                    ends.head = Some(Arc::clone(&survivor));
                    ends.tail = Some(survivor);
                }
                links.clear();
                ends.len = 1;
            }
            _ => {
                let mut links = node.links();
                if ends.is_head(node) {
                    if let Some(next) = links.next.and_then(|slot| self.resolve(slot)) {
                        next.links().set_previous(None);
                        ends.head = Some(next);
                    }
                } else if ends.is_tail(node) {
                    if let Some(previous) = links.previous.and_then(|slot| self.resolve(slot)) {
                        previous.links().set_next(None);
                        ends.tail = Some(previous);
                    }
                } else {
                    let next = links.next.and_then(|slot| self.resolve(slot));
                    let previous = links.previous.and_then(|slot| self.resolve(slot));
                    if let (Some(next), Some(previous)) = (next, previous) {
                        let mut next_links = next.links();
                        let mut previous_links = previous.links();
                        node::remove(
                            (&mut previous_links, previous.slot()),
                            &mut links,
                            (&mut next_links, next.slot()),
                        );
                    }
                }
                links.clear();
                ends.len -= 1;
            }
        }

        self.release(node);
    }
}

// =============================================================================
// Identity lookup
// =============================================================================

impl<T: Identify> List<T> {
    /// Returns the first node, head to tail, whose payload has identity `id`.
    ///
    /// O(n). Returns `None` on an empty list or when nothing matches.
    pub fn get(&self, id: &str) -> Option<NodeHandle<T>> {
        self.nodes().find(|node| node.id() == id)
    }

    /// Deletes the first node whose payload has identity `id` and returns it.
    pub fn remove_by_id(&self, id: &str) -> Option<NodeHandle<T>> {
        let handle = self.get(id)?;
        self.delete(&handle).then_some(handle)
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for data in iter {
            self.append(data);
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Lazy head-to-tail walk over a list's nodes.
///
/// Created by [`List::nodes`].
pub struct Nodes<'a, T> {
    list: &'a List<T>,
    current: Option<Arc<Node<T>>>,
    remaining: usize,
}

impl<T> Iterator for Nodes<'_, T> {
    type Item = NodeHandle<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.current.take()?;
        self.remaining -= 1;

        let next = node.links().next;
        self.current = next.and_then(|slot| self.list.resolve(slot));

        Some(NodeHandle::new(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Lazy head-to-tail walk over cloned payloads.
///
/// Created by [`List::data`].
pub struct Data<'a, T> {
    nodes: Nodes<'a, T>,
}

impl<T: Clone> Iterator for Data<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|node| node.data().clone())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}
