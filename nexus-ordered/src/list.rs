//! Circular doubly linked list over external storage.
//!
//! Nodes live in storage and carry a [`ListLinks`] header; the list keeps
//! only the index of its first node and a count. The ring closes on itself,
//! so the last node is always `prev(first)` and no tail pointer is stored:
//!
//! ```text
//!        ┌──────────────────────────────────┐
//!        ▼                                  │
//!   [first] ◄──► [b] ◄──► [c] ◄──► [last] ──┘
//!        │                            ▲
//!        └────────── prev ────────────┘
//! ```
//!
//! A lone node links to itself in both directions; a detached node has both
//! links set to `Idx::NONE`.
//!
//! # Storage Invariant
//!
//! A list instance must always be used with the same storage instance.
//! Passing a different storage corrupts the list. This is the caller's
//! responsibility to enforce (same discipline as the `slab` crate).
//!
//! # Moving Nodes
//!
//! Use `unlink` followed by any `link_*` to reposition a node. The storage
//! index stays stable, so handles held elsewhere remain valid.

use std::marker::PhantomData;

use crate::{Index, Storage};

/// List link header embedded in every dual-index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLinks<Idx: Index> {
    pub(crate) prev: Idx,
    pub(crate) next: Idx,
}

impl<Idx: Index> ListLinks<Idx> {
    /// Creates a header that belongs to no list.
    #[inline]
    pub const fn detached() -> Self {
        Self {
            prev: Idx::NONE,
            next: Idx::NONE,
        }
    }

    /// Returns `true` if the node is in a list.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.next.is_some()
    }
}

impl<Idx: Index> Default for ListLinks<Idx> {
    fn default() -> Self {
        Self::detached()
    }
}

/// A storage entry that can be linked into a [`List`].
pub trait ListNode<Idx: Index> {
    /// List link header.
    fn list_links(&self) -> &ListLinks<Idx>;

    /// Mutable list link header.
    fn list_links_mut(&mut self) -> &mut ListLinks<Idx>;
}

/// A circular doubly linked list of indices into external storage.
///
/// # Type Parameters
///
/// - `N`: Node type stored in `S`
/// - `S`: Storage type
/// - `Idx`: Index type (default `u32`)
pub struct List<N, S, Idx: Index = u32>
where
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    first: Idx,
    len: usize,
    _marker: PhantomData<(N, S)>,
}

impl<N, S, Idx: Index> Default for List<N, S, Idx>
where
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, S, Idx: Index> core::fmt::Debug for List<N, S, Idx>
where
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("List")
            .field("first", &self.first)
            .field("len", &self.len)
            .finish()
    }
}

impl<N, S, Idx: Index> List<N, S, Idx>
where
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            first: Idx::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of linked nodes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Index of the first node.
    #[inline]
    pub fn first(&self) -> Option<Idx> {
        self.first.into_option()
    }

    /// Index of the last node, `prev(first)`.
    #[inline]
    pub fn last(&self, storage: &S) -> Option<Idx> {
        if self.first.is_none() {
            return None;
        }
        Some(Self::links(storage, self.first).prev)
    }

    /// Node after `idx`, `None` at the end of the list.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn next(&self, storage: &S, idx: Idx) -> Option<Idx> {
        let next = Self::links(storage, idx).next;
        if next == self.first { None } else { Some(next) }
    }

    /// Node before `idx`, `None` at the start of the list.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn prev(&self, storage: &S, idx: Idx) -> Option<Idx> {
        let prev = Self::links(storage, idx).prev;
        if idx == self.first { None } else { Some(prev) }
    }

    /// Iterates node indices from first to last.
    pub fn iter<'a>(&self, storage: &'a S) -> Indices<'a, N, S, Idx> {
        Indices {
            storage,
            front: self.first,
            back: self.last(storage).unwrap_or(Idx::NONE),
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    // ========================================================================
    // Link operations (no alloc/dealloc)
    // ========================================================================

    /// Links `idx` as the new first node.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage or already linked.
    #[inline]
    pub fn link_first(&mut self, storage: &mut S, idx: Idx) {
        self.link_last(storage, idx);
        self.first = idx;
    }

    /// Links `idx` after the current last node.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage or already linked.
    pub fn link_last(&mut self, storage: &mut S, idx: Idx) {
        if self.first.is_none() {
            let links = Self::links_mut(storage, idx);
            assert!(!links.is_linked(), "node is already linked");
            links.prev = idx;
            links.next = idx;
            self.first = idx;
            self.len = 1;
            return;
        }
        let first = self.first;
        self.splice_before(storage, first, idx);
    }

    /// Links `idx` immediately before `at`.
    ///
    /// If `at` is the first node, `idx` becomes first.
    ///
    /// # Panics
    ///
    /// Panics if either index is not valid in storage, or `idx` is already
    /// linked.
    pub fn link_before(&mut self, storage: &mut S, at: Idx, idx: Idx) {
        self.splice_before(storage, at, idx);
        if at == self.first {
            self.first = idx;
        }
    }

    /// Links `idx` immediately after `at`.
    ///
    /// # Panics
    ///
    /// Panics if either index is not valid in storage, or `idx` is already
    /// linked.
    pub fn link_after(&mut self, storage: &mut S, at: Idx, idx: Idx) {
        let next = Self::links(storage, at).next;
        // Inserting before the successor keeps `first` in place, including
        // when `at` is the last node and its successor is `first`.
        self.splice_before(storage, next, idx);
    }

    /// Unlinks `idx` without deallocating.
    ///
    /// If `idx` was first, its successor becomes first (or the list becomes
    /// empty). The node's links are reset to detached.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage or not linked.
    pub fn unlink(&mut self, storage: &mut S, idx: Idx) {
        let links = *Self::links(storage, idx);
        assert!(self.len > 0 && links.is_linked(), "node is not linked");

        if self.len == 1 {
            self.first = Idx::NONE;
        } else {
            if idx == self.first {
                self.first = links.next;
            }
            Self::links_mut(storage, links.prev).next = links.next;
            Self::links_mut(storage, links.next).prev = links.prev;
        }

        *Self::links_mut(storage, idx) = ListLinks::detached();
        self.len -= 1;
    }

    /// Frees every node from first to last, handing each one to `f`.
    ///
    /// The successor is read before the current node is freed.
    pub fn drain<F>(&mut self, storage: &mut S, mut f: F)
    where
        F: FnMut(N),
    {
        let mut cur = self.first;
        let count = self.len;
        self.first = Idx::NONE;
        self.len = 0;

        for _ in 0..count {
            let next = Self::links(storage, cur).next;
            let mut node = storage.remove(cur).expect("invalid index");
            *node.list_links_mut() = ListLinks::detached();
            f(node);
            cur = next;
        }
    }

    /// Inserts `idx` between `prev(at)` and `at`. Never changes `first`.
    fn splice_before(&mut self, storage: &mut S, at: Idx, idx: Idx) {
        let prev = Self::links(storage, at).prev;

        let links = Self::links_mut(storage, idx);
        assert!(!links.is_linked(), "node is already linked");
        links.prev = prev;
        links.next = at;

        Self::links_mut(storage, prev).next = idx;
        Self::links_mut(storage, at).prev = idx;
        self.len += 1;
    }

    #[inline]
    fn links<'a>(storage: &'a S, idx: Idx) -> &'a ListLinks<Idx>
    where
        N: 'a,
    {
        storage.get(idx).expect("invalid index").list_links()
    }

    #[inline]
    fn links_mut<'a>(storage: &'a mut S, idx: Idx) -> &'a mut ListLinks<Idx>
    where
        N: 'a,
    {
        storage.get_mut(idx).expect("invalid index").list_links_mut()
    }

    // ========================================================================
    // Invariant checking
    // ========================================================================

    /// Verifies that the ring is closed, symmetric, and `len` long.
    #[doc(hidden)]
    pub fn check_invariants(&self, storage: &S) -> Result<(), &'static str> {
        if self.first.is_none() {
            return if self.len == 0 {
                Ok(())
            } else {
                Err("empty list with nonzero len")
            };
        }

        let mut cur = self.first;
        for _ in 0..self.len {
            let links = storage.get(cur).ok_or("node not in storage")?.list_links();
            if !links.is_linked() {
                return Err("reachable node is detached");
            }
            let next = storage.get(links.next).ok_or("next not in storage")?;
            if next.list_links().prev != cur {
                return Err("next.prev does not point back");
            }
            cur = links.next;
        }

        if cur != self.first {
            return Err("ring length does not match len");
        }
        Ok(())
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Iterator over node indices in list order.
pub struct Indices<'a, N, S, Idx: Index> {
    storage: &'a S,
    front: Idx,
    back: Idx,
    remaining: usize,
    _marker: PhantomData<&'a N>,
}

impl<'a, N, S, Idx> Iterator for Indices<'a, N, S, Idx>
where
    Idx: Index,
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    type Item = Idx;

    #[inline]
    fn next(&mut self) -> Option<Idx> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = List::<N, S, Idx>::links(self.storage, idx).next;
        }
        Some(idx)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, N, S, Idx> DoubleEndedIterator for Indices<'a, N, S, Idx>
where
    Idx: Index,
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Idx> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = List::<N, S, Idx>::links(self.storage, idx).prev;
        }
        Some(idx)
    }
}

impl<'a, N, S, Idx> ExactSizeIterator for Indices<'a, N, S, Idx>
where
    Idx: Index,
    N: ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
}
