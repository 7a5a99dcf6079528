//! Key comparison and probe results.
//!
//! A container owns one comparator value and passes it into every tree
//! operation. A lookup borrows the candidate key, so nothing is allocated or
//! copied until a probe comes back [`Search::Vacant`] and the caller decides
//! to insert. The vacant [`Slot`] then records exactly where the new entry
//! attaches, so insertion never searches twice.
//!
//! ```text
//! search(&candidate) ──► Found(idx)            duplicate, nothing allocated
//!                    └─► Vacant(Slot)          allocate entry, link at slot
//! ```

use core::cmp::Ordering;

/// Total order over keys of type `K`.
///
/// The same comparison serves both candidate-vs-entry probes and
/// entry-vs-entry checks. Two keys are the same entry exactly when
/// `compare` returns [`Ordering::Equal`].
///
/// Implemented for [`NaturalOrder`], [`Reverse`], and any
/// `Fn(&K, &K) -> Ordering` closure.
///
/// # Example
///
/// ```
/// use core::cmp::Ordering;
/// use nexus_ordered::{Compare, NaturalOrder, Reverse};
///
/// assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
/// assert_eq!(Reverse(NaturalOrder).compare(&1, &2), Ordering::Greater);
///
/// let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
/// assert_eq!(by_len.compare(&"abc", &"xyz"), Ordering::Equal);
/// ```
pub trait Compare<K: ?Sized> {
    /// Compares `a` against `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Compare<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts another comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reverse<C>(pub C);

impl<K: ?Sized, C: Compare<K>> Compare<K> for Reverse<C> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

// =============================================================================
// Probe results
// =============================================================================

/// Which child of a parent a vacant position occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Attach as the parent's left child.
    Left,
    /// Attach as the parent's right child.
    Right,
}

/// Attachment point for a new entry, found by a failed search.
///
/// `parent` is `Idx::NONE` when the tree is empty. A slot stays valid until
/// the tree is next modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<Idx> {
    /// Node the new entry hangs from.
    pub parent: Idx,
    /// Which child of `parent` the new entry becomes.
    pub side: Side,
}

/// Outcome of a tree search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search<Idx> {
    /// An entry comparing equal exists at this index.
    Found(Idx),
    /// No equal entry; a new one would attach here.
    Vacant(Slot<Idx>),
}

impl<Idx: Copy> Search<Idx> {
    /// Returns the matching index, if any.
    #[inline]
    pub fn found(self) -> Option<Idx> {
        match self {
            Search::Found(idx) => Some(idx),
            Search::Vacant(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        assert_eq!(NaturalOrder.compare(&"a", &"b"), Ordering::Less);
        assert_eq!(NaturalOrder.compare(&3u8, &3u8), Ordering::Equal);
    }

    #[test]
    fn reverse_flips() {
        let cmp = Reverse(NaturalOrder);
        assert_eq!(cmp.compare(&1, &2), Ordering::Greater);
        assert_eq!(Reverse(cmp).compare(&1, &2), Ordering::Less);
    }

    #[test]
    fn closure_comparator() {
        let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
        assert_eq!(by_abs.compare(&-5, &3), Ordering::Greater);
        assert_eq!(by_abs.compare(&-3, &3), Ordering::Equal);
    }

    #[test]
    fn unsized_keys() {
        assert_eq!(NaturalOrder.compare("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn search_found() {
        assert_eq!(Search::Found(3u32).found(), Some(3));
        let vacant = Search::Vacant(Slot {
            parent: 1u32,
            side: Side::Left,
        });
        assert_eq!(vacant.found(), None);
    }
}
