//! Shared engines behind the public containers.
//!
//! [`Core`] bundles storage, a red-black tree, the comparator and the entry
//! layout: everything a plain set or map needs. [`LinkedCore`] adds a ring
//! list over the same entries for the dual-index containers.
//!
//! Handles are storage indices. Every occupied slot of a container's
//! storage is a linked entry of that container, so a handle is live exactly
//! when `storage.get(handle)` succeeds.

use crate::entry::EntryNode;
use crate::layout::EntryLayout;
use crate::{Compare, Error, Index, List, ListNode, RbTree, Search, Slot, Storage};

/// Storage + tree + comparator.
pub(crate) struct Core<N, C, S, Idx>
where
    Idx: Index,
    N: EntryNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    pub(crate) storage: S,
    pub(crate) tree: RbTree<N, S, Idx>,
    pub(crate) cmp: C,
    layout: EntryLayout,
    /// Error for a key that is absent (`KeyNotFound` / `ValueNotFound`).
    missing: Error,
    /// Error for a key already present (`KeyAlreadyExists` / `ValueAlreadyExists`).
    duplicate: Error,
}

impl<N, C, S, Idx> Core<N, C, S, Idx>
where
    Idx: Index,
    N: EntryNode<Idx>,
    C: Compare<N::Key>,
    S: Storage<N, Index = Idx>,
{
    /// Fails with the layout error if the entry type has an empty payload
    /// or a size the platform cannot represent.
    pub(crate) fn new(
        storage: S,
        cmp: C,
        missing: Error,
        duplicate: Error,
    ) -> Result<Self, Error> {
        let layout = EntryLayout::of::<N::Header, N::Key, N::Value>()?;
        Ok(Self {
            storage,
            tree: RbTree::new(),
            cmp,
            layout,
            missing,
            duplicate,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub(crate) fn layout(&self) -> EntryLayout {
        self.layout
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Probes for `key` without allocating.
    #[inline]
    pub(crate) fn search(&self, key: &N::Key) -> Search<Idx> {
        self.tree.search(&self.storage, &self.cmp, key)
    }

    /// Stores a new entry and links it at `slot`.
    ///
    /// On storage failure nothing is linked and the payload is dropped.
    pub(crate) fn insert_at(
        &mut self,
        slot: Slot<Idx>,
        key: N::Key,
        value: N::Value,
    ) -> Result<Idx, Error> {
        let idx = self
            .storage
            .try_insert(N::new(key, value))
            .map_err(Into::<Error>::into)?;
        self.tree.link(&mut self.storage, slot, idx);
        Ok(idx)
    }

    /// Inserts a new entry, rejecting duplicates before allocating.
    pub(crate) fn add(&mut self, key: N::Key, value: N::Value) -> Result<Idx, Error> {
        match self.search(&key) {
            Search::Found(_) => Err(self.duplicate),
            Search::Vacant(slot) => {
                let idx = self.insert_at(slot, key, value)?;
                #[cfg(feature = "tracing")]
                tracing::trace!(index = ?idx, len = self.len(), "entry added");
                Ok(idx)
            }
        }
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Unlinks and frees the entry at `idx`.
    ///
    /// Callers holding other structures over the same entries must unlink
    /// from those first.
    pub(crate) fn remove_at(&mut self, idx: Idx) -> Result<(N::Key, N::Value), Error> {
        self.node(idx)?;
        self.tree.unlink(&mut self.storage, idx);
        let node = self.storage.remove(idx).ok_or(Error::InvalidHandle)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(index = ?idx, len = self.len(), "entry removed");
        Ok(node.into_parts())
    }

    /// Frees every entry, handing each payload to `f` exactly once.
    pub(crate) fn clear_with<F>(&mut self, mut f: F)
    where
        F: FnMut(N::Key, N::Value),
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(len = self.len(), "clearing container");
        self.tree.drain(&mut self.storage, |node| {
            let (key, value) = node.into_parts();
            f(key, value);
        });
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&N::Key, &mut N::Value) -> bool,
    {
        let mut cur = self.tree.first(&self.storage);
        while let Some(idx) = cur {
            cur = self.tree.next(&self.storage, idx);
            let (key, value) = self
                .storage
                .get_mut(idx)
                .expect("invalid index")
                .parts_mut();
            let keep_it = keep(key, value);
            if !keep_it {
                self.tree.unlink(&mut self.storage, idx);
                drop(self.storage.remove(idx));
            }
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the live entry at `idx`.
    #[inline]
    pub(crate) fn node(&self, idx: Idx) -> Result<&N, Error> {
        self.storage.get(idx).ok_or(Error::InvalidHandle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: Idx) -> Result<&mut N, Error> {
        self.storage.get_mut(idx).ok_or(Error::InvalidHandle)
    }

    #[inline]
    pub(crate) fn find(&self, key: &N::Key) -> Result<Idx, Error> {
        self.tree
            .find(&self.storage, &self.cmp, key)
            .ok_or(self.missing)
    }

    #[inline]
    pub(crate) fn contains(&self, key: &N::Key) -> bool {
        self.tree.find(&self.storage, &self.cmp, key).is_some()
    }

    #[inline]
    pub(crate) fn get(&self, key: &N::Key) -> Result<&N, Error> {
        let idx = self.find(key)?;
        self.node(idx)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, key: &N::Key) -> Result<&mut N, Error> {
        let idx = self.find(key)?;
        self.node_mut(idx)
    }

    #[inline]
    pub(crate) fn ceiling(&self, key: &N::Key) -> Result<Idx, Error> {
        self.tree
            .ceiling(&self.storage, &self.cmp, key)
            .ok_or(Error::NotFound)
    }

    #[inline]
    pub(crate) fn floor(&self, key: &N::Key) -> Result<Idx, Error> {
        self.tree
            .floor(&self.storage, &self.cmp, key)
            .ok_or(Error::NotFound)
    }

    #[inline]
    pub(crate) fn higher(&self, key: &N::Key) -> Result<Idx, Error> {
        self.tree
            .higher(&self.storage, &self.cmp, key)
            .ok_or(Error::NotFound)
    }

    #[inline]
    pub(crate) fn lower(&self, key: &N::Key) -> Result<Idx, Error> {
        self.tree
            .lower(&self.storage, &self.cmp, key)
            .ok_or(Error::NotFound)
    }

    // ========================================================================
    // Sorted navigation
    // ========================================================================

    #[inline]
    pub(crate) fn first(&self) -> Result<Idx, Error> {
        self.tree.first(&self.storage).ok_or(Error::Empty)
    }

    #[inline]
    pub(crate) fn last(&self) -> Result<Idx, Error> {
        self.tree.last(&self.storage).ok_or(Error::Empty)
    }

    #[inline]
    pub(crate) fn next(&self, idx: Idx) -> Result<Idx, Error> {
        self.node(idx)?;
        self.tree
            .next(&self.storage, idx)
            .ok_or(Error::EndOfSequence)
    }

    #[inline]
    pub(crate) fn prev(&self, idx: Idx) -> Result<Idx, Error> {
        self.node(idx)?;
        self.tree
            .prev(&self.storage, idx)
            .ok_or(Error::EndOfSequence)
    }

    /// Returns the entry at `idx`. `idx` must be live.
    #[inline]
    pub(crate) fn entry(&self, idx: Idx) -> &N {
        self.storage.get(idx).expect("invalid index")
    }

    pub(crate) fn check_invariants(&self) -> Result<(), &'static str> {
        self.tree.check_invariants(&self.storage, &self.cmp)
    }
}

// =============================================================================
// LinkedCore - tree + ring list over the same entries
// =============================================================================

/// Where a new or moved entry goes in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position<Idx> {
    Front,
    Back,
    Before(Idx),
    After(Idx),
}

/// Dual-index engine. Every live entry is linked in both the tree and the
/// list.
pub(crate) struct LinkedCore<N, C, S, Idx>
where
    Idx: Index,
    N: EntryNode<Idx> + ListNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    pub(crate) core: Core<N, C, S, Idx>,
    pub(crate) list: List<N, S, Idx>,
}

impl<N, C, S, Idx> LinkedCore<N, C, S, Idx>
where
    Idx: Index,
    N: EntryNode<Idx> + ListNode<Idx>,
    C: Compare<N::Key>,
    S: Storage<N, Index = Idx>,
{
    pub(crate) fn new(
        storage: S,
        cmp: C,
        missing: Error,
        duplicate: Error,
    ) -> Result<Self, Error> {
        Ok(Self {
            core: Core::new(storage, cmp, missing, duplicate)?,
            list: List::new(),
        })
    }

    /// Inserts a new entry at `pos` in list order.
    ///
    /// A reference handle in `pos` is validated before anything else, and
    /// duplicates are rejected before allocating.
    pub(crate) fn insert(
        &mut self,
        key: N::Key,
        value: N::Value,
        pos: Position<Idx>,
    ) -> Result<Idx, Error> {
        if let Position::Before(at) | Position::After(at) = pos {
            self.core.node(at)?;
        }

        match self.core.search(&key) {
            Search::Found(_) => Err(self.core.duplicate),
            Search::Vacant(slot) => self.insert_at(slot, key, value, pos),
        }
    }

    /// Stores a new entry, links it into the tree at `slot` and into the
    /// list at `pos`.
    ///
    /// `slot` must come from a search on the current tree and a reference
    /// handle in `pos` must be live.
    pub(crate) fn insert_at(
        &mut self,
        slot: Slot<Idx>,
        key: N::Key,
        value: N::Value,
        pos: Position<Idx>,
    ) -> Result<Idx, Error> {
        let idx = self.core.insert_at(slot, key, value)?;
        self.link(idx, pos);

        #[cfg(feature = "tracing")]
        tracing::trace!(index = ?idx, ?pos, len = self.core.len(), "linked entry added");
        Ok(idx)
    }

    /// Unlinks `idx` from both indices and frees it.
    pub(crate) fn remove_at(&mut self, idx: Idx) -> Result<(N::Key, N::Value), Error> {
        self.core.node(idx)?;
        self.list.unlink(&mut self.core.storage, idx);
        self.core.remove_at(idx)
    }

    pub(crate) fn remove_key(&mut self, key: &N::Key) -> Result<(N::Key, N::Value), Error> {
        let idx = self.core.find(key)?;
        self.remove_at(idx)
    }

    /// Repositions `idx` in list order. Tree order is unaffected.
    pub(crate) fn relink(&mut self, idx: Idx, pos: Position<Idx>) -> Result<(), Error> {
        self.core.node(idx)?;
        if let Position::Before(at) | Position::After(at) = pos {
            self.core.node(at)?;
            if at == idx {
                return Ok(());
            }
        }
        self.list.unlink(&mut self.core.storage, idx);
        self.link(idx, pos);
        Ok(())
    }

    fn link(&mut self, idx: Idx, pos: Position<Idx>) {
        let storage = &mut self.core.storage;
        match pos {
            Position::Front => self.list.link_first(storage, idx),
            Position::Back => self.list.link_last(storage, idx),
            Position::Before(at) => self.list.link_before(storage, at, idx),
            Position::After(at) => self.list.link_after(storage, at, idx),
        }
    }

    /// Frees every entry in list order, handing each payload to `f` once.
    pub(crate) fn clear_with<F>(&mut self, mut f: F)
    where
        F: FnMut(N::Key, N::Value),
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(len = self.core.len(), "clearing linked container");
        self.core.tree.reset();
        self.list.drain(&mut self.core.storage, |node| {
            let (key, value) = node.into_parts();
            f(key, value);
        });
    }

    // ========================================================================
    // List navigation
    // ========================================================================

    #[inline]
    pub(crate) fn first(&self) -> Result<Idx, Error> {
        self.list.first().ok_or(Error::Empty)
    }

    #[inline]
    pub(crate) fn last(&self) -> Result<Idx, Error> {
        self.list.last(&self.core.storage).ok_or(Error::Empty)
    }

    #[inline]
    pub(crate) fn next(&self, idx: Idx) -> Result<Idx, Error> {
        self.core.node(idx)?;
        self.list
            .next(&self.core.storage, idx)
            .ok_or(Error::EndOfSequence)
    }

    #[inline]
    pub(crate) fn prev(&self, idx: Idx) -> Result<Idx, Error> {
        self.core.node(idx)?;
        self.list
            .prev(&self.core.storage, idx)
            .ok_or(Error::EndOfSequence)
    }

    pub(crate) fn pop_front(&mut self) -> Option<(N::Key, N::Value)> {
        let idx = self.list.first()?;
        self.remove_at(idx).ok()
    }

    pub(crate) fn pop_back(&mut self) -> Option<(N::Key, N::Value)> {
        let idx = self.list.last(&self.core.storage)?;
        self.remove_at(idx).ok()
    }

    pub(crate) fn check_invariants(&self) -> Result<(), &'static str> {
        self.core.check_invariants()?;
        self.list.check_invariants(&self.core.storage)?;
        if self.list.len() != self.core.len() {
            return Err("list and tree disagree on len");
        }
        for idx in self.list.iter(&self.core.storage) {
            if !self.core.tree.contains_node(&self.core.storage, idx) {
                return Err("list entry missing from tree");
            }
        }
        Ok(())
    }
}
