//! Red-black tree over external storage.
//!
//! The tree owns no entries. It keeps a root index and a count; every node
//! lives in a [`Storage`] slot and carries its own [`TreeLinks`] header.
//! Ordering is supplied per call through a [`Compare`] value, so one tree
//! type serves any key order without global state.
//!
//! # Storage Invariant
//!
//! A tree instance must always be used with the same storage instance.
//! Passing a different storage corrupts the tree. This is the caller's
//! responsibility to enforce (same discipline as the `slab` crate).
//!
//! # Insertion Protocol
//!
//! ```text
//! let probe = tree.search(&storage, &cmp, &key);   // borrows key, no alloc
//! if let Search::Vacant(slot) = probe {
//!     let idx = storage.try_insert(node)?;          // allocate once
//!     tree.link(&mut storage, slot, idx);           // attach + rebalance
//! }
//! ```
//!
//! Red-black properties maintained after every `link` / `unlink`:
//!
//! 1. The root is black.
//! 2. A red node has no red child.
//! 3. Every root-to-leaf path crosses the same number of black nodes.

use std::marker::PhantomData;

use crate::{Compare, Index, Search, Side, Slot, Storage};
use core::cmp::Ordering;

/// Node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node.
    Red,
    /// Black node; detached headers are black.
    Black,
}

/// Tree link header embedded in every entry.
///
/// A detached header has every link set to `Idx::NONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLinks<Idx: Index> {
    pub(crate) parent: Idx,
    pub(crate) left: Idx,
    pub(crate) right: Idx,
    pub(crate) color: Color,
}

impl<Idx: Index> TreeLinks<Idx> {
    /// Creates a header that belongs to no tree.
    #[inline]
    pub const fn detached() -> Self {
        Self {
            parent: Idx::NONE,
            left: Idx::NONE,
            right: Idx::NONE,
            color: Color::Black,
        }
    }

    #[inline]
    fn has_links(&self) -> bool {
        self.parent.is_some() || self.left.is_some() || self.right.is_some()
    }

    /// Parent index, `Idx::NONE` for the root or a detached node.
    #[inline]
    pub fn parent(&self) -> Idx {
        self.parent
    }

    /// Left child, or `Idx::NONE`.
    #[inline]
    pub fn left(&self) -> Idx {
        self.left
    }

    /// Right child, or `Idx::NONE`.
    #[inline]
    pub fn right(&self) -> Idx {
        self.right
    }

    /// Node color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
}

impl<Idx: Index> Default for TreeLinks<Idx> {
    fn default() -> Self {
        Self::detached()
    }
}

/// A storage entry that can be linked into an [`RbTree`].
pub trait TreeNode<Idx: Index> {
    /// The ordered key.
    type Key;

    /// Key this node is ordered by.
    fn key(&self) -> &Self::Key;

    /// Tree link header.
    fn tree_links(&self) -> &TreeLinks<Idx>;

    /// Mutable tree link header.
    fn tree_links_mut(&mut self) -> &mut TreeLinks<Idx>;
}

/// A red-black tree of indices into external storage.
///
/// # Type Parameters
///
/// - `N`: Node type stored in `S`
/// - `S`: Storage type
/// - `Idx`: Index type (default `u32`)
pub struct RbTree<N, S, Idx: Index = u32>
where
    N: TreeNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    root: Idx,
    len: usize,
    _marker: PhantomData<(N, S)>,
}

impl<N, S, Idx: Index> Default for RbTree<N, S, Idx>
where
    N: TreeNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, S, Idx: Index> core::fmt::Debug for RbTree<N, S, Idx>
where
    N: TreeNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RbTree")
            .field("root", &self.root)
            .field("len", &self.len)
            .finish()
    }
}

impl<N, S, Idx: Index> RbTree<N, S, Idx>
where
    N: TreeNode<Idx>,
    S: Storage<N, Index = Idx>,
{
    /// Creates an empty tree.
    #[inline]
    pub const fn new() -> Self {
        Self {
            root: Idx::NONE,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of linked nodes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the root index, if any.
    #[inline]
    pub fn root(&self) -> Option<Idx> {
        self.root.into_option()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Locates `key`, or the slot where it would attach.
    ///
    /// Never allocates and never modifies the tree.
    pub fn search<C>(&self, storage: &S, cmp: &C, key: &N::Key) -> Search<Idx>
    where
        C: Compare<N::Key>,
    {
        let mut parent = Idx::NONE;
        let mut side = Side::Left;
        let mut cur = self.root;

        while cur.is_some() {
            let node = Self::node(storage, cur);
            match cmp.compare(key, node.key()) {
                Ordering::Less => {
                    parent = cur;
                    side = Side::Left;
                    cur = node.tree_links().left;
                }
                Ordering::Greater => {
                    parent = cur;
                    side = Side::Right;
                    cur = node.tree_links().right;
                }
                Ordering::Equal => return Search::Found(cur),
            }
        }

        Search::Vacant(Slot { parent, side })
    }

    /// Returns the index of the node comparing equal to `key`.
    #[inline]
    pub fn find<C>(&self, storage: &S, cmp: &C, key: &N::Key) -> Option<Idx>
    where
        C: Compare<N::Key>,
    {
        self.search(storage, cmp, key).found()
    }

    /// Smallest node `>= key`.
    pub fn ceiling<C>(&self, storage: &S, cmp: &C, key: &N::Key) -> Option<Idx>
    where
        C: Compare<N::Key>,
    {
        let mut best = Idx::NONE;
        let mut cur = self.root;
        while cur.is_some() {
            let node = Self::node(storage, cur);
            match cmp.compare(key, node.key()) {
                Ordering::Equal => return Some(cur),
                Ordering::Less => {
                    best = cur;
                    cur = node.tree_links().left;
                }
                Ordering::Greater => cur = node.tree_links().right,
            }
        }
        best.into_option()
    }

    /// Largest node `<= key`.
    pub fn floor<C>(&self, storage: &S, cmp: &C, key: &N::Key) -> Option<Idx>
    where
        C: Compare<N::Key>,
    {
        let mut best = Idx::NONE;
        let mut cur = self.root;
        while cur.is_some() {
            let node = Self::node(storage, cur);
            match cmp.compare(key, node.key()) {
                Ordering::Equal => return Some(cur),
                Ordering::Greater => {
                    best = cur;
                    cur = node.tree_links().right;
                }
                Ordering::Less => cur = node.tree_links().left,
            }
        }
        best.into_option()
    }

    /// Smallest node `> key`.
    pub fn higher<C>(&self, storage: &S, cmp: &C, key: &N::Key) -> Option<Idx>
    where
        C: Compare<N::Key>,
    {
        let mut best = Idx::NONE;
        let mut cur = self.root;
        while cur.is_some() {
            let node = Self::node(storage, cur);
            if cmp.compare(key, node.key()) == Ordering::Less {
                best = cur;
                cur = node.tree_links().left;
            } else {
                cur = node.tree_links().right;
            }
        }
        best.into_option()
    }

    /// Largest node `< key`.
    pub fn lower<C>(&self, storage: &S, cmp: &C, key: &N::Key) -> Option<Idx>
    where
        C: Compare<N::Key>,
    {
        let mut best = Idx::NONE;
        let mut cur = self.root;
        while cur.is_some() {
            let node = Self::node(storage, cur);
            if cmp.compare(key, node.key()) == Ordering::Greater {
                best = cur;
                cur = node.tree_links().right;
            } else {
                cur = node.tree_links().left;
            }
        }
        best.into_option()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Index of the smallest node.
    #[inline]
    pub fn first(&self, storage: &S) -> Option<Idx> {
        if self.root.is_none() {
            return None;
        }
        Some(Self::min_from(storage, self.root))
    }

    /// Index of the largest node.
    #[inline]
    pub fn last(&self, storage: &S) -> Option<Idx> {
        if self.root.is_none() {
            return None;
        }
        Some(Self::max_from(storage, self.root))
    }

    /// In-order successor of `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn next(&self, storage: &S, idx: Idx) -> Option<Idx> {
        Self::successor(storage, idx).into_option()
    }

    /// In-order predecessor of `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage.
    #[inline]
    pub fn prev(&self, storage: &S, idx: Idx) -> Option<Idx> {
        Self::predecessor(storage, idx).into_option()
    }

    /// Returns `true` if `idx` is a node of this tree.
    ///
    /// Walks to the root, O(log n). Returns `false` for indices not valid
    /// in storage.
    pub fn contains_node(&self, storage: &S, idx: Idx) -> bool {
        let mut cur = idx;
        loop {
            let Some(node) = storage.get(cur) else {
                return false;
            };
            let parent = node.tree_links().parent;
            if parent.is_none() {
                return cur == self.root;
            }
            cur = parent;
        }
    }

    /// Iterates node indices in ascending order.
    pub fn iter<'a>(&self, storage: &'a S) -> Indices<'a, N, S, Idx> {
        Indices {
            storage,
            front: self.first(storage).unwrap_or(Idx::NONE),
            back: self.last(storage).unwrap_or(Idx::NONE),
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    // ========================================================================
    // Link operations (no alloc/dealloc)
    // ========================================================================

    /// Attaches the stored node `idx` at `slot` and rebalances.
    ///
    /// `slot` must come from [`search`](Self::search) with no tree
    /// modification in between.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage or is already linked.
    pub fn link(&mut self, storage: &mut S, slot: Slot<Idx>, idx: Idx) {
        let is_root = self.root == idx;
        let links = Self::links_mut(storage, idx);
        assert!(!is_root && !links.has_links(), "node is already linked");

        links.parent = slot.parent;
        links.left = Idx::NONE;
        links.right = Idx::NONE;
        links.color = Color::Red;

        if slot.parent.is_none() {
            assert!(self.root.is_none(), "slot is stale");
            self.root = idx;
        } else {
            let parent = Self::links_mut(storage, slot.parent);
            match slot.side {
                Side::Left => {
                    debug_assert!(parent.left.is_none(), "slot is stale");
                    parent.left = idx;
                }
                Side::Right => {
                    debug_assert!(parent.right.is_none(), "slot is stale");
                    parent.right = idx;
                }
            }
        }

        self.len += 1;
        self.insert_fix(storage, idx);
    }

    /// Detaches `idx` from the tree and rebalances.
    ///
    /// The node stays in storage with a detached header.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not valid in storage or not linked.
    pub fn unlink(&mut self, storage: &mut S, z: Idx) {
        let zl = *Self::links(storage, z);
        assert!(
            self.len > 0 && (zl.parent.is_some() || self.root == z),
            "node is not linked"
        );

        let mut removed_color = zl.color;
        let x;
        let x_parent;

        if zl.left.is_none() {
            x = zl.right;
            x_parent = zl.parent;
            self.transplant(storage, z, x);
        } else if zl.right.is_none() {
            x = zl.left;
            x_parent = zl.parent;
            self.transplant(storage, z, x);
        } else {
            // Two children: splice in the successor.
            let y = Self::min_from(storage, zl.right);
            let yl = *Self::links(storage, y);
            removed_color = yl.color;
            x = yl.right;

            if yl.parent == z {
                x_parent = y;
            } else {
                x_parent = yl.parent;
                self.transplant(storage, y, x);
                Self::links_mut(storage, y).right = zl.right;
                Self::links_mut(storage, zl.right).parent = y;
            }

            self.transplant(storage, z, y);
            let y_links = Self::links_mut(storage, y);
            y_links.left = zl.left;
            y_links.color = zl.color;
            Self::links_mut(storage, zl.left).parent = y;
        }

        if removed_color == Color::Black {
            self.remove_fix(storage, x, x_parent);
        }

        *Self::links_mut(storage, z) = TreeLinks::detached();
        self.len -= 1;
    }

    /// Frees every node, handing each one to `f`.
    ///
    /// Nodes are released in post-order: a node's parent is recorded before
    /// the node is freed, so freed slots are never read again.
    pub fn drain<F>(&mut self, storage: &mut S, mut f: F)
    where
        F: FnMut(N),
    {
        let mut cur = self.root;
        self.root = Idx::NONE;
        self.len = 0;

        while cur.is_some() {
            let links = *Self::links(storage, cur);
            if links.left.is_some() {
                cur = links.left;
                continue;
            }
            if links.right.is_some() {
                cur = links.right;
                continue;
            }

            let parent = links.parent;
            if parent.is_some() {
                let p = Self::links_mut(storage, parent);
                if p.left == cur {
                    p.left = Idx::NONE;
                } else {
                    p.right = Idx::NONE;
                }
            }

            let mut node = storage.remove(cur).expect("invalid index");
            *node.tree_links_mut() = TreeLinks::detached();
            f(node);
            cur = parent;
        }
    }

    /// Forgets every node without touching storage.
    ///
    /// For use when the entries are being released through another
    /// structure that links the same nodes. Node headers are left stale.
    #[inline]
    pub fn reset(&mut self) {
        self.root = Idx::NONE;
        self.len = 0;
    }

    // ========================================================================
    // Rebalancing
    // ========================================================================

    fn insert_fix(&mut self, storage: &mut S, mut z: Idx) {
        loop {
            let p = Self::parent(storage, z);
            if !Self::is_red(storage, p) {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let g = Self::parent(storage, p);

            if p == Self::left(storage, g) {
                let uncle = Self::right(storage, g);
                if Self::is_red(storage, uncle) {
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, uncle, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    z = g;
                } else {
                    let mut p = p;
                    if z == Self::right(storage, p) {
                        z = p;
                        self.rotate_left(storage, z);
                        p = Self::parent(storage, z);
                    }
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    self.rotate_right(storage, g);
                }
            } else {
                let uncle = Self::left(storage, g);
                if Self::is_red(storage, uncle) {
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, uncle, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    z = g;
                } else {
                    let mut p = p;
                    if z == Self::left(storage, p) {
                        z = p;
                        self.rotate_right(storage, z);
                        p = Self::parent(storage, z);
                    }
                    Self::set_color(storage, p, Color::Black);
                    Self::set_color(storage, g, Color::Red);
                    self.rotate_left(storage, g);
                }
            }
        }

        let root = self.root;
        Self::set_color(storage, root, Color::Black);
    }

    /// `x` may be `NONE`; `parent` is its parent in either case.
    fn remove_fix(&mut self, storage: &mut S, mut x: Idx, mut parent: Idx) {
        while x != self.root && !Self::is_red(storage, x) {
            if x == Self::left(storage, parent) {
                let mut w = Self::right(storage, parent);
                if Self::is_red(storage, w) {
                    Self::set_color(storage, w, Color::Black);
                    Self::set_color(storage, parent, Color::Red);
                    self.rotate_left(storage, parent);
                    w = Self::right(storage, parent);
                }

                let wl = Self::left(storage, w);
                let wr = Self::right(storage, w);
                if !Self::is_red(storage, wl) && !Self::is_red(storage, wr) {
                    Self::set_color(storage, w, Color::Red);
                    x = parent;
                    parent = Self::parent(storage, x);
                } else {
                    if !Self::is_red(storage, wr) {
                        Self::set_color(storage, wl, Color::Black);
                        Self::set_color(storage, w, Color::Red);
                        self.rotate_right(storage, w);
                        w = Self::right(storage, parent);
                    }
                    let parent_color = Self::links(storage, parent).color;
                    Self::set_color(storage, w, parent_color);
                    Self::set_color(storage, parent, Color::Black);
                    let wr = Self::right(storage, w);
                    Self::set_color(storage, wr, Color::Black);
                    self.rotate_left(storage, parent);
                    x = self.root;
                    parent = Idx::NONE;
                }
            } else {
                let mut w = Self::left(storage, parent);
                if Self::is_red(storage, w) {
                    Self::set_color(storage, w, Color::Black);
                    Self::set_color(storage, parent, Color::Red);
                    self.rotate_right(storage, parent);
                    w = Self::left(storage, parent);
                }

                let wl = Self::left(storage, w);
                let wr = Self::right(storage, w);
                if !Self::is_red(storage, wl) && !Self::is_red(storage, wr) {
                    Self::set_color(storage, w, Color::Red);
                    x = parent;
                    parent = Self::parent(storage, x);
                } else {
                    if !Self::is_red(storage, wl) {
                        Self::set_color(storage, wr, Color::Black);
                        Self::set_color(storage, w, Color::Red);
                        self.rotate_left(storage, w);
                        w = Self::left(storage, parent);
                    }
                    let parent_color = Self::links(storage, parent).color;
                    Self::set_color(storage, w, parent_color);
                    Self::set_color(storage, parent, Color::Black);
                    let wl = Self::left(storage, w);
                    Self::set_color(storage, wl, Color::Black);
                    self.rotate_right(storage, parent);
                    x = self.root;
                    parent = Idx::NONE;
                }
            }
        }

        Self::set_color(storage, x, Color::Black);
    }

    fn rotate_left(&mut self, storage: &mut S, x: Idx) {
        let y = Self::right(storage, x);
        let y_left = Self::left(storage, y);

        Self::links_mut(storage, x).right = y_left;
        if y_left.is_some() {
            Self::links_mut(storage, y_left).parent = x;
        }

        let x_parent = Self::parent(storage, x);
        Self::links_mut(storage, y).parent = x_parent;
        self.replace_child(storage, x_parent, x, y);

        Self::links_mut(storage, y).left = x;
        Self::links_mut(storage, x).parent = y;
    }

    fn rotate_right(&mut self, storage: &mut S, x: Idx) {
        let y = Self::left(storage, x);
        let y_right = Self::right(storage, y);

        Self::links_mut(storage, x).left = y_right;
        if y_right.is_some() {
            Self::links_mut(storage, y_right).parent = x;
        }

        let x_parent = Self::parent(storage, x);
        Self::links_mut(storage, y).parent = x_parent;
        self.replace_child(storage, x_parent, x, y);

        Self::links_mut(storage, y).right = x;
        Self::links_mut(storage, x).parent = y;
    }

    /// Replaces the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, storage: &mut S, u: Idx, v: Idx) {
        let u_parent = Self::parent(storage, u);
        self.replace_child(storage, u_parent, u, v);
        if v.is_some() {
            Self::links_mut(storage, v).parent = u_parent;
        }
    }

    fn replace_child(&mut self, storage: &mut S, parent: Idx, old: Idx, new: Idx) {
        if parent.is_none() {
            self.root = new;
            return;
        }
        let p = Self::links_mut(storage, parent);
        if p.left == old {
            p.left = new;
        } else {
            p.right = new;
        }
    }

    // ========================================================================
    // Node access helpers
    // ========================================================================

    #[inline]
    fn node(storage: &S, idx: Idx) -> &N {
        storage.get(idx).expect("invalid index")
    }

    #[inline]
    fn links<'a>(storage: &'a S, idx: Idx) -> &'a TreeLinks<Idx>
    where
        N: 'a,
    {
        Self::node(storage, idx).tree_links()
    }

    #[inline]
    fn links_mut<'a>(storage: &'a mut S, idx: Idx) -> &'a mut TreeLinks<Idx>
    where
        N: 'a,
    {
        storage.get_mut(idx).expect("invalid index").tree_links_mut()
    }

    #[inline]
    fn parent(storage: &S, idx: Idx) -> Idx {
        Self::links(storage, idx).parent
    }

    #[inline]
    fn left(storage: &S, idx: Idx) -> Idx {
        Self::links(storage, idx).left
    }

    #[inline]
    fn right(storage: &S, idx: Idx) -> Idx {
        Self::links(storage, idx).right
    }

    /// `NONE` counts as black.
    #[inline]
    fn is_red(storage: &S, idx: Idx) -> bool {
        idx.is_some() && Self::links(storage, idx).color == Color::Red
    }

    #[inline]
    fn set_color(storage: &mut S, idx: Idx, color: Color) {
        if idx.is_some() {
            Self::links_mut(storage, idx).color = color;
        }
    }

    fn min_from(storage: &S, mut idx: Idx) -> Idx {
        loop {
            let left = Self::left(storage, idx);
            if left.is_none() {
                return idx;
            }
            idx = left;
        }
    }

    fn max_from(storage: &S, mut idx: Idx) -> Idx {
        loop {
            let right = Self::right(storage, idx);
            if right.is_none() {
                return idx;
            }
            idx = right;
        }
    }

    fn successor(storage: &S, mut idx: Idx) -> Idx {
        let right = Self::right(storage, idx);
        if right.is_some() {
            return Self::min_from(storage, right);
        }
        let mut parent = Self::parent(storage, idx);
        while parent.is_some() && idx == Self::right(storage, parent) {
            idx = parent;
            parent = Self::parent(storage, parent);
        }
        parent
    }

    fn predecessor(storage: &S, mut idx: Idx) -> Idx {
        let left = Self::left(storage, idx);
        if left.is_some() {
            return Self::max_from(storage, left);
        }
        let mut parent = Self::parent(storage, idx);
        while parent.is_some() && idx == Self::left(storage, parent) {
            idx = parent;
            parent = Self::parent(storage, parent);
        }
        parent
    }

    // ========================================================================
    // Invariant checking
    // ========================================================================

    /// Verifies structure, coloring, ordering, and count.
    #[doc(hidden)]
    pub fn check_invariants<C>(&self, storage: &S, cmp: &C) -> Result<(), &'static str>
    where
        C: Compare<N::Key>,
    {
        if self.root.is_none() {
            return if self.len == 0 {
                Ok(())
            } else {
                Err("empty tree with nonzero len")
            };
        }

        let root = storage.get(self.root).ok_or("root not in storage")?;
        if root.tree_links().parent.is_some() {
            return Err("root has a parent");
        }
        if root.tree_links().color != Color::Black {
            return Err("root is red");
        }

        let mut count = 0;
        self.check_subtree(storage, self.root, &mut count)?;
        if count != self.len {
            return Err("len does not match node count");
        }

        let mut prev: Option<&N> = None;
        for idx in self.iter(storage) {
            let node = storage.get(idx).ok_or("node not in storage")?;
            if let Some(prev) = prev {
                if cmp.compare(prev.key(), node.key()) != Ordering::Less {
                    return Err("keys out of order");
                }
            }
            prev = Some(node);
        }

        Ok(())
    }

    /// Returns the black height of the subtree at `idx`.
    fn check_subtree(
        &self,
        storage: &S,
        idx: Idx,
        count: &mut usize,
    ) -> Result<usize, &'static str> {
        if idx.is_none() {
            return Ok(1);
        }
        *count += 1;
        if *count > self.len {
            return Err("more nodes reachable than len");
        }

        let links = *storage.get(idx).ok_or("node not in storage")?.tree_links();
        for child in [links.left, links.right] {
            if child.is_some() {
                let child_links = storage.get(child).ok_or("child not in storage")?.tree_links();
                if child_links.parent != idx {
                    return Err("child parent link mismatch");
                }
                if links.color == Color::Red && child_links.color == Color::Red {
                    return Err("red node has red child");
                }
            }
        }

        let left = self.check_subtree(storage, links.left, count)?;
        let right = self.check_subtree(storage, links.right, count)?;
        if left != right {
            return Err("black height mismatch");
        }
        Ok(left + usize::from(links.color == Color::Black))
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Ascending iterator over node indices.
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
    N: TreeNode<Idx>,
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
            self.front = RbTree::<N, S, Idx>::successor(self.storage, idx);
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
    N: TreeNode<Idx>,
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
            self.back = RbTree::<N, S, Idx>::predecessor(self.storage, idx);
        }
        Some(idx)
    }
}

impl<'a, N, S, Idx> ExactSizeIterator for Indices<'a, N, S, Idx>
where
    Idx: Index,
    N: TreeNode<Idx>,
    S: Storage<N, Index = Idx>,
{
}
