//! Entry types stored by the containers.
//!
//! An entry is one storage slot: the link header(s) followed by the
//! payload. Sets store `V = ()`, so a set entry is header + key only.
//!
//! ```text
//! Entry:        [ TreeLinks ][ key ][ value ]
//! LinkedEntry:  [ TreeLinks ][ ListLinks ][ key ][ value ]
//! ```
//!
//! Entries are created detached; the containers link them into their index
//! structures before returning a handle.

use crate::{Index, ListLinks, ListNode, TreeLinks, TreeNode};

/// Entry of a plain ordered container.
#[derive(Debug)]
pub struct Entry<K, V, Idx: Index = u32> {
    links: TreeLinks<Idx>,
    key: K,
    value: V,
}

/// Entry of a plain ordered set.
pub type SetEntry<T, Idx = u32> = Entry<T, (), Idx>;

/// Entry of a dual-index container: ordered by key and positioned in a list.
#[derive(Debug)]
pub struct LinkedEntry<K, V, Idx: Index = u32> {
    tree: TreeLinks<Idx>,
    list: ListLinks<Idx>,
    key: K,
    value: V,
}

/// Entry of a dual-index set.
pub type LinkedSetEntry<T, Idx = u32> = LinkedEntry<T, (), Idx>;

/// Payload access shared by both entry kinds.
pub trait EntryNode<Idx: Index>: TreeNode<Idx> {
    /// Payload stored alongside the key; `()` for sets.
    type Value;

    /// Link header(s) preceding the payload.
    type Header;

    /// Creates a detached entry.
    fn new(key: Self::Key, value: Self::Value) -> Self;

    /// Borrows the value.
    fn value(&self) -> &Self::Value;

    /// Mutably borrows the value. The key stays immutable.
    fn value_mut(&mut self) -> &mut Self::Value;

    /// Key and value borrowed together.
    fn parts_mut(&mut self) -> (&Self::Key, &mut Self::Value);

    /// Consumes the entry, discarding its links.
    fn into_parts(self) -> (Self::Key, Self::Value);
}

impl<K, V, Idx: Index> TreeNode<Idx> for Entry<K, V, Idx> {
    type Key = K;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    fn tree_links(&self) -> &TreeLinks<Idx> {
        &self.links
    }

    #[inline]
    fn tree_links_mut(&mut self) -> &mut TreeLinks<Idx> {
        &mut self.links
    }
}

impl<K, V, Idx: Index> EntryNode<Idx> for Entry<K, V, Idx> {
    type Value = V;
    type Header = TreeLinks<Idx>;

    #[inline]
    fn new(key: K, value: V) -> Self {
        Self {
            links: TreeLinks::detached(),
            key,
            value,
        }
    }

    #[inline]
    fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    fn parts_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    #[inline]
    fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V, Idx: Index> TreeNode<Idx> for LinkedEntry<K, V, Idx> {
    type Key = K;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    fn tree_links(&self) -> &TreeLinks<Idx> {
        &self.tree
    }

    #[inline]
    fn tree_links_mut(&mut self) -> &mut TreeLinks<Idx> {
        &mut self.tree
    }
}

impl<K, V, Idx: Index> ListNode<Idx> for LinkedEntry<K, V, Idx> {
    #[inline]
    fn list_links(&self) -> &ListLinks<Idx> {
        &self.list
    }

    #[inline]
    fn list_links_mut(&mut self) -> &mut ListLinks<Idx> {
        &mut self.list
    }
}

impl<K, V, Idx: Index> EntryNode<Idx> for LinkedEntry<K, V, Idx> {
    type Value = V;
    type Header = (TreeLinks<Idx>, ListLinks<Idx>);

    #[inline]
    fn new(key: K, value: V) -> Self {
        Self {
            tree: TreeLinks::detached(),
            list: ListLinks::detached(),
            key,
            value,
        }
    }

    #[inline]
    fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    fn parts_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    #[inline]
    fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
