//! List nodes, their links, and the helpers that splice them.
//!
//! A node lives in its list's arena and is addressed by slot index. Links
//! between nodes are slot indices, never owning pointers, so the only strong
//! references to a node are the arena, the list's head/tail, and any
//! outstanding [`NodeHandle`].
//!
//! # Lock Discipline
//!
//! `previous`/`next` sit behind the node's own lock. The helpers in this
//! module take already-locked [`Links`] so the caller decides which locks are
//! held together. Writers lock every node whose links change, in the order
//! subject, successor, predecessor, while holding the list's structure lock.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::Identify;

/// Process-unique identity of a list, used as a node's owner reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListId(u64);

impl ListId {
    /// Returns an id no other list in this process has been given.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Neighbour slots of a node. `None` marks the end of the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) previous: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl Links {
    #[inline]
    pub(crate) fn set_next(&mut self, next: Option<usize>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn set_previous(&mut self, previous: Option<usize>) {
        self.previous = previous;
    }

    /// Detaches the node from both neighbours.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.previous = None;
        self.next = None;
    }
}

/// Links `node` in front of `old_head`, making it the first node.
#[inline]
pub(crate) fn make_head(node: &mut Links, slot: usize, old_head: &mut Links, old_head_slot: usize) {
    node.set_previous(None);
    node.set_next(Some(old_head_slot));
    old_head.set_previous(Some(slot));
}

/// Links `node` behind `old_tail`, making it the last node.
#[inline]
pub(crate) fn make_tail(node: &mut Links, slot: usize, old_tail: &mut Links, old_tail_slot: usize) {
    node.set_next(None);
    node.set_previous(Some(old_tail_slot));
    old_tail.set_next(Some(slot));
}

/// Links `node` between two adjacent nodes.
#[inline]
pub(crate) fn splice(
    previous: (&mut Links, usize),
    node: (&mut Links, usize),
    next: (&mut Links, usize),
) {
    let (previous, previous_slot) = previous;
    let (node, slot) = node;
    let (next, next_slot) = next;

    debug_assert_eq!(previous.next, Some(next_slot));
    debug_assert_eq!(next.previous, Some(previous_slot));

    node.set_previous(Some(previous_slot));
    node.set_next(Some(next_slot));
    previous.set_next(Some(slot));
    next.set_previous(Some(slot));
}

/// Unlinks an interior node, joining its neighbours to each other.
#[inline]
pub(crate) fn remove(
    previous: (&mut Links, usize),
    node: &mut Links,
    next: (&mut Links, usize),
) {
    let (previous, previous_slot) = previous;
    let (next, next_slot) = next;

    previous.set_next(Some(next_slot));
    next.set_previous(Some(previous_slot));
    node.clear();
}

/// A list node: payload, arena slot, owner, and locked links.
pub(crate) struct Node<T> {
    data: T,
    slot: usize,
    owner: ListId,
    links: Mutex<Links>,
}

impl<T> Node<T> {
    /// Creates an unlinked node for `slot` of `owner`'s arena.
    #[inline]
    pub(crate) fn new(data: T, slot: usize, owner: ListId) -> Self {
        Self {
            data,
            slot,
            owner,
            links: Mutex::new(Links::default()),
        }
    }

    #[inline]
    pub(crate) fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub(crate) fn owner(&self) -> ListId {
        self.owner
    }

    /// Locks this node's links.
    #[inline]
    pub(crate) fn links(&self) -> MutexGuard<'_, Links> {
        self.links.lock()
    }
}

/// Stable handle to a node in a [`List`](crate::List).
///
/// Returned by every insertion and by lookups. A handle keeps its node's
/// payload alive, derefs to it, and can later be passed to
/// [`List::delete`](crate::List::delete) or used as an insertion anchor
/// without re-scanning the list.
///
/// Cloning a handle is cheap; clones compare equal.
///
/// # Example
///
/// ```
/// use nexus_linked::List;
///
/// let list: List<String> = List::new();
/// let handle = list.append("hello".to_string());
///
/// assert_eq!(*handle, "hello");
/// assert_eq!(handle.run(|s| s.len()), 5);
/// assert!(list.delete(&handle));
/// ```
pub struct NodeHandle<T> {
    node: Arc<Node<T>>,
}

impl<T> NodeHandle<T> {
    #[inline]
    pub(crate) fn new(node: Arc<Node<T>>) -> Self {
        Self { node }
    }

    #[inline]
    pub(crate) fn node(&self) -> &Arc<Node<T>> {
        &self.node
    }

    /// Returns the payload.
    #[inline]
    pub fn data(&self) -> &T {
        &self.node.data
    }

    /// Runs `f` against the payload and returns its result.
    #[inline]
    pub fn run<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.node.data)
    }
}

impl<T> Clone for NodeHandle<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T> Deref for NodeHandle<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.node.data
    }
}

impl<T> PartialEq for NodeHandle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl<T> Eq for NodeHandle<T> {}

impl<T: Identify> Identify for NodeHandle<T> {
    #[inline]
    fn id(&self) -> &str {
        self.node.data.id()
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("slot", &self.node.slot)
            .field("data", &self.node.data)
            .finish()
    }
}
