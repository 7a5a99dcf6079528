//! Ordered set backed by a red-black tree over slab storage.
//!
//! # Example
//!
//! ```
//! use nexus_ordered::OrderedSet;
//!
//! let mut set: OrderedSet<u64> = OrderedSet::new();
//! set.add(5).unwrap();
//! set.add(1).unwrap();
//! set.add(3).unwrap();
//!
//! assert_eq!(set.entry(set.first().unwrap()), Ok(&1));
//! assert_eq!(set.entry(set.ceiling(&2).unwrap()), Ok(&3));
//! assert_eq!(set.entry(set.lower(&3).unwrap()), Ok(&1));
//!
//! let all: Vec<_> = set.iter().copied().collect();
//! assert_eq!(all, vec![1, 3, 5]);
//! ```
//!
//! # Handles
//!
//! `add` and the navigation methods return a handle (`Idx`), the storage
//! index of the entry. A handle stays valid until that entry is removed;
//! afterwards it may be reused by a later insert.

use std::fmt;

use crate::engine::Core;
use crate::rbtree::Indices;
use crate::{
    Compare, EntryLayout, Error, Index, NaturalOrder, SetEntry, Storage, TreeNode, VecStorage,
};

/// An ordered set of unique elements.
///
/// Uniqueness and order are both defined by the comparator `C`.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `C`: Comparator (default [`NaturalOrder`])
/// - `Idx`: Handle type (default `u32`)
/// - `S`: Storage (default [`VecStorage`])
pub struct OrderedSet<T, C = NaturalOrder, Idx = u32, S = VecStorage<SetEntry<T, Idx>, Idx>>
where
    Idx: Index,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    core: Core<SetEntry<T, Idx>, C, S, Idx>,
}

impl<T, C, Idx, S> OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T> + Default,
    S: Storage<SetEntry<T, Idx>, Index = Idx> + Default,
{
    /// Creates an empty set with default storage and comparator.
    ///
    /// # Errors
    ///
    /// Fails as [`try_with_storage`](Self::try_with_storage) does.
    pub fn try_new() -> Result<Self, Error> {
        Self::try_with_storage(S::default(), C::default())
    }

    /// Panicking form of [`try_new`](Self::try_new).
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn new() -> Self {
        Self::with_storage(S::default(), C::default())
    }
}

impl<T, C, Idx, S> Default for OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T> + Default,
    S: Storage<SetEntry<T, Idx>, Index = Idx> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, Idx, S> OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<SetEntry<T, Idx>, Index = Idx> + Default,
{
    /// Creates an empty set ordered by `cmp`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_storage(S::default(), cmp)
    }
}

impl<T, C, Idx, S> OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    /// Creates an empty set over `storage`, which must be empty.
    ///
    /// # Errors
    ///
    /// - [`Error::SizeIsZero`] if `T` is zero-sized
    /// - [`Error::EntrySizeTooLarge`] or [`Error::SizeTooLarge`] if the entry
    ///   size overflows
    pub fn try_with_storage(storage: S, cmp: C) -> Result<Self, Error> {
        Ok(Self {
            core: Core::new(storage, cmp, Error::ValueNotFound, Error::ValueAlreadyExists)?,
        })
    }

    /// Panicking form of [`try_with_storage`](Self::try_with_storage).
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn with_storage(storage: S, cmp: C) -> Self {
        match Self::try_with_storage(storage, cmp) {
            Ok(set) => set,
            Err(err) => panic!("cannot create set: {err}"),
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    /// Size and padding of one entry.
    #[inline]
    pub fn layout(&self) -> EntryLayout {
        self.core.layout()
    }

    /// Size of an element.
    #[inline]
    pub fn key_size(&self) -> usize {
        self.core.layout().key_size()
    }

    /// Always 0: a set stores no value region.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.core.layout().value_size()
    }

    /// Returns the comparator.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.core.cmp
    }

    // ========================================================================
    // Insert / remove
    // ========================================================================

    /// Adds `value`, returning its handle.
    ///
    /// The existing elements are probed before anything is allocated.
    ///
    /// # Errors
    ///
    /// - [`Error::ValueAlreadyExists`] if an equal element is present
    /// - [`Error::AllocationFailed`] if storage refuses the entry
    pub fn add(&mut self, value: T) -> Result<Idx, Error> {
        self.core.add(value, ())
    }

    /// Removes the element equal to `value` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::ValueNotFound`] if no element compares equal.
    pub fn remove(&mut self, value: &T) -> Result<T, Error> {
        let idx = self.core.find(value)?;
        self.core.remove_at(idx).map(|(value, ())| value)
    }

    /// Removes the element at handle `h` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `h` is not a live entry.
    pub fn remove_at(&mut self, h: Idx) -> Result<T, Error> {
        self.core.remove_at(h).map(|(value, ())| value)
    }

    /// Removes and returns the smallest element.
    pub fn pop_first(&mut self) -> Option<T> {
        let idx = self.core.first().ok()?;
        self.remove_at(idx).ok()
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<T> {
        let idx = self.core.last().ok()?;
        self.remove_at(idx).ok()
    }

    /// Keeps only the elements for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.core.retain(|value, ()| keep(value));
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.core.clear_with(|_, ()| {});
    }

    /// Removes every element, passing each one to `f` exactly once.
    pub fn clear_with<F>(&mut self, mut f: F)
    where
        F: FnMut(T),
    {
        self.core.clear_with(|value, ()| f(value));
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the handle of the element equal to `value`.
    ///
    /// # Errors
    ///
    /// [`Error::ValueNotFound`] if no element compares equal.
    #[inline]
    pub fn find(&self, value: &T) -> Result<Idx, Error> {
        self.core.find(value)
    }

    /// Returns the stored element equal to `value`.
    ///
    /// The stored element may differ from `value` in fields the comparator
    /// ignores.
    #[inline]
    pub fn get(&self, value: &T) -> Result<&T, Error> {
        self.core.get(value).map(|node| node.key())
    }

    /// Returns `true` if an equal element is present.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.core.contains(value)
    }

    /// Returns the element at handle `h`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `h` is not a live entry.
    #[inline]
    pub fn entry(&self, h: Idx) -> Result<&T, Error> {
        self.core.node(h).map(|node| node.key())
    }

    /// Smallest element `>= value`, or [`Error::NotFound`].
    #[inline]
    pub fn ceiling(&self, value: &T) -> Result<Idx, Error> {
        self.core.ceiling(value)
    }

    /// Largest element `<= value`, or [`Error::NotFound`].
    #[inline]
    pub fn floor(&self, value: &T) -> Result<Idx, Error> {
        self.core.floor(value)
    }

    /// Smallest element `> value`, or [`Error::NotFound`].
    #[inline]
    pub fn higher(&self, value: &T) -> Result<Idx, Error> {
        self.core.higher(value)
    }

    /// Largest element `< value`, or [`Error::NotFound`].
    #[inline]
    pub fn lower(&self, value: &T) -> Result<Idx, Error> {
        self.core.lower(value)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Handle of the smallest element, or [`Error::Empty`].
    #[inline]
    pub fn first(&self) -> Result<Idx, Error> {
        self.core.first()
    }

    /// Handle of the largest element, or [`Error::Empty`].
    #[inline]
    pub fn last(&self) -> Result<Idx, Error> {
        self.core.last()
    }

    /// Handle of the element after `h`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `h` is not a live entry
    /// - [`Error::EndOfSequence`] if `h` is the largest element
    #[inline]
    pub fn next(&self, h: Idx) -> Result<Idx, Error> {
        self.core.next(h)
    }

    /// Handle of the element before `h`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `h` is not a live entry
    /// - [`Error::EndOfSequence`] if `h` is the smallest element
    #[inline]
    pub fn prev(&self, h: Idx) -> Result<Idx, Error> {
        self.core.prev(h)
    }

    /// Iterates elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T, Idx, S> {
        Iter {
            storage: &self.core.storage,
            indices: self.core.tree.iter(&self.core.storage),
        }
    }

    /// Iterates `(handle, element)` pairs in ascending order.
    pub fn handles(&self) -> Handles<'_, T, Idx, S> {
        Handles {
            storage: &self.core.storage,
            indices: self.core.tree.iter(&self.core.storage),
        }
    }

    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        self.core.check_invariants()
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<T, C, Idx, S> Extend<T> for OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    /// Adds every element, skipping duplicates.
    ///
    /// # Panics
    ///
    /// Panics if storage refuses an entry.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            match self.add(value) {
                Ok(_) | Err(Error::ValueAlreadyExists) => {}
                Err(err) => panic!("cannot extend set: {err}"),
            }
        }
    }
}

impl<T, C, Idx, S> FromIterator<T> for OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T> + Default,
    S: Storage<SetEntry<T, Idx>, Index = Idx> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, C, Idx, S> fmt::Debug for OrderedSet<T, C, Idx, S>
where
    T: fmt::Debug,
    Idx: Index,
    C: Compare<T>,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C, Idx, S> IntoIterator for &'a OrderedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, Idx, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Ascending iterator over set elements.
pub struct Iter<'a, T, Idx: Index, S> {
    storage: &'a S,
    indices: Indices<'a, SetEntry<T, Idx>, S, Idx>,
}

impl<'a, T, Idx, S> Iterator for Iter<'a, T, Idx, S>
where
    Idx: Index,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let idx = self.indices.next()?;
        self.storage.get(idx).map(|node| node.key())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a, T, Idx, S> DoubleEndedIterator for Iter<'a, T, Idx, S>
where
    Idx: Index,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        let idx = self.indices.next_back()?;
        self.storage.get(idx).map(|node| node.key())
    }
}

impl<'a, T, Idx, S> ExactSizeIterator for Iter<'a, T, Idx, S>
where
    Idx: Index,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
}

/// Ascending iterator over `(handle, element)` pairs.
pub struct Handles<'a, T, Idx: Index, S> {
    storage: &'a S,
    indices: Indices<'a, SetEntry<T, Idx>, S, Idx>,
}

impl<'a, T, Idx, S> Iterator for Handles<'a, T, Idx, S>
where
    Idx: Index,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    type Item = (Idx, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.indices.next()?;
        self.storage.get(idx).map(|node| (idx, node.key()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a, T, Idx, S> DoubleEndedIterator for Handles<'a, T, Idx, S>
where
    Idx: Index,
    S: Storage<SetEntry<T, Idx>, Index = Idx>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let idx = self.indices.next_back()?;
        self.storage.get(idx).map(|node| (idx, node.key()))
    }
}
