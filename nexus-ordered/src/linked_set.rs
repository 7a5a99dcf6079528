//! Ordered set with a second, caller-controlled list order.
//!
//! Every element is indexed twice over the same storage slot:
//!
//! ```text
//!             sorted (tree)            list (ring)
//! slot 0  [ "b" ]  ◄── rank 1          position 2
//! slot 1  [ "c" ]  ◄── rank 2          position 0 (first)
//! slot 2  [ "a" ]  ◄── rank 0          position 1
//! ```
//!
//! Uniqueness and sorted order come from the comparator; list order is
//! whatever the caller builds with `append`, `prepend`, `insert_before`,
//! `insert_after` and the `move_*` methods. Reordering the list never
//! touches the tree.
//!
//! # Example
//!
//! ```
//! use nexus_ordered::LinkedSet;
//!
//! let mut set: LinkedSet<&str> = LinkedSet::new();
//! set.append("b").unwrap();
//! set.append("c").unwrap();
//! let a = set.append("a").unwrap();
//! set.move_to_front(a).unwrap();
//!
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
//! assert_eq!(set.entry(set.sorted_last().unwrap()), Ok(&"c"));
//! ```

use std::fmt;

use crate::engine::{LinkedCore, Position};
use crate::{
    Compare, EntryLayout, Error, Index, LinkedSetEntry, NaturalOrder, Storage, TreeNode,
    VecStorage,
};

/// An ordered set whose elements also form a doubly linked list.
///
/// # Type Parameters
///
/// - `T`: Element type
/// - `C`: Comparator (default [`NaturalOrder`])
/// - `Idx`: Handle type (default `u32`)
/// - `S`: Storage (default [`VecStorage`])
pub struct LinkedSet<T, C = NaturalOrder, Idx = u32, S = VecStorage<LinkedSetEntry<T, Idx>, Idx>>
where
    Idx: Index,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx>,
{
    inner: LinkedCore<LinkedSetEntry<T, Idx>, C, S, Idx>,
}

impl<T, C, Idx, S> LinkedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T> + Default,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx> + Default,
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

impl<T, C, Idx, S> Default for LinkedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T> + Default,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, Idx, S> LinkedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx> + Default,
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

impl<T, C, Idx, S> LinkedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx>,
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
            inner: LinkedCore::new(storage, cmp, Error::ValueNotFound, Error::ValueAlreadyExists)?,
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
        self.inner.core.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.core.len() == 0
    }

    /// Size and padding of one entry, including both link headers.
    #[inline]
    pub fn layout(&self) -> EntryLayout {
        self.inner.core.layout()
    }

    /// Size of an element.
    #[inline]
    pub fn key_size(&self) -> usize {
        self.inner.core.layout().key_size()
    }

    /// Always 0: a set stores no value region.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.inner.core.layout().value_size()
    }

    /// Returns the comparator.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.inner.core.cmp
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Adds `value` as the new first list element.
    ///
    /// Successive calls therefore list elements in reverse insertion order,
    /// the same as [`prepend`](Self::prepend).
    ///
    /// # Errors
    ///
    /// - [`Error::ValueAlreadyExists`] if an equal element is present
    /// - [`Error::AllocationFailed`] if storage refuses the entry
    #[inline]
    pub fn add(&mut self, value: T) -> Result<Idx, Error> {
        self.inner.insert(value, (), Position::Front)
    }

    /// Adds `value` after the current last list element.
    #[inline]
    pub fn append(&mut self, value: T) -> Result<Idx, Error> {
        self.inner.insert(value, (), Position::Back)
    }

    /// Adds `value` as the new first list element.
    #[inline]
    pub fn prepend(&mut self, value: T) -> Result<Idx, Error> {
        self.inner.insert(value, (), Position::Front)
    }

    /// Adds `value` immediately before `at` in list order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `at` is not a live entry (checked before
    /// anything else), plus the errors of [`add`](Self::add).
    #[inline]
    pub fn insert_before(&mut self, at: Idx, value: T) -> Result<Idx, Error> {
        self.inner.insert(value, (), Position::Before(at))
    }

    /// Adds `value` immediately after `at` in list order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `at` is not a live entry (checked before
    /// anything else), plus the errors of [`add`](Self::add).
    #[inline]
    pub fn insert_after(&mut self, at: Idx, value: T) -> Result<Idx, Error> {
        self.inner.insert(value, (), Position::After(at))
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Removes the element at handle `h` from both orders and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `h` is not a live entry.
    pub fn remove(&mut self, h: Idx) -> Result<T, Error> {
        self.inner.remove_at(h).map(|(value, ())| value)
    }

    /// Removes the element equal to `value` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::ValueNotFound`] if no element compares equal.
    pub fn remove_key(&mut self, value: &T) -> Result<T, Error> {
        self.inner.remove_key(value).map(|(value, ())| value)
    }

    /// Removes and returns the first list element.
    pub fn pop_front(&mut self) -> Option<T> {
        self.inner.pop_front().map(|(value, ())| value)
    }

    /// Removes and returns the last list element.
    pub fn pop_back(&mut self) -> Option<T> {
        self.inner.pop_back().map(|(value, ())| value)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.inner.clear_with(|_, ()| {});
    }

    /// Removes every element in list order, passing each to `f` exactly once.
    pub fn clear_with<F>(&mut self, mut f: F)
    where
        F: FnMut(T),
    {
        self.inner.clear_with(|value, ()| f(value));
    }

    // ========================================================================
    // Reorder (list only)
    // ========================================================================

    /// Moves `h` to the front of the list.
    #[inline]
    pub fn move_to_front(&mut self, h: Idx) -> Result<(), Error> {
        self.inner.relink(h, Position::Front)
    }

    /// Moves `h` to the back of the list.
    #[inline]
    pub fn move_to_back(&mut self, h: Idx) -> Result<(), Error> {
        self.inner.relink(h, Position::Back)
    }

    /// Moves `h` immediately before `at`. A no-op when `h == at`.
    #[inline]
    pub fn move_before(&mut self, at: Idx, h: Idx) -> Result<(), Error> {
        self.inner.relink(h, Position::Before(at))
    }

    /// Moves `h` immediately after `at`. A no-op when `h == at`.
    #[inline]
    pub fn move_after(&mut self, at: Idx, h: Idx) -> Result<(), Error> {
        self.inner.relink(h, Position::After(at))
    }

    // ========================================================================
    // Lookup (sorted)
    // ========================================================================

    /// Returns the handle of the element equal to `value`.
    #[inline]
    pub fn find(&self, value: &T) -> Result<Idx, Error> {
        self.inner.core.find(value)
    }

    /// Returns the stored element equal to `value`.
    #[inline]
    pub fn get(&self, value: &T) -> Result<&T, Error> {
        self.inner.core.get(value).map(|node| node.key())
    }

    /// Returns `true` if an equal element is present.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.inner.core.contains(value)
    }

    /// Returns the element at handle `h`.
    #[inline]
    pub fn entry(&self, h: Idx) -> Result<&T, Error> {
        self.inner.core.node(h).map(|node| node.key())
    }

    /// Smallest element `>= value`, or [`Error::NotFound`].
    #[inline]
    pub fn ceiling(&self, value: &T) -> Result<Idx, Error> {
        self.inner.core.ceiling(value)
    }

    /// Largest element `<= value`, or [`Error::NotFound`].
    #[inline]
    pub fn floor(&self, value: &T) -> Result<Idx, Error> {
        self.inner.core.floor(value)
    }

    /// Smallest element `> value`, or [`Error::NotFound`].
    #[inline]
    pub fn higher(&self, value: &T) -> Result<Idx, Error> {
        self.inner.core.higher(value)
    }

    /// Largest element `< value`, or [`Error::NotFound`].
    #[inline]
    pub fn lower(&self, value: &T) -> Result<Idx, Error> {
        self.inner.core.lower(value)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// First list element, or [`Error::Empty`].
    #[inline]
    pub fn first(&self) -> Result<Idx, Error> {
        self.inner.first()
    }

    /// Last list element, or [`Error::Empty`].
    #[inline]
    pub fn last(&self) -> Result<Idx, Error> {
        self.inner.last()
    }

    /// List successor of `h`, or [`Error::EndOfSequence`].
    #[inline]
    pub fn next(&self, h: Idx) -> Result<Idx, Error> {
        self.inner.next(h)
    }

    /// List predecessor of `h`, or [`Error::EndOfSequence`].
    #[inline]
    pub fn prev(&self, h: Idx) -> Result<Idx, Error> {
        self.inner.prev(h)
    }

    /// Smallest element, or [`Error::Empty`].
    #[inline]
    pub fn sorted_first(&self) -> Result<Idx, Error> {
        self.inner.core.first()
    }

    /// Largest element, or [`Error::Empty`].
    #[inline]
    pub fn sorted_last(&self) -> Result<Idx, Error> {
        self.inner.core.last()
    }

    /// Sorted successor of `h`, or [`Error::EndOfSequence`].
    #[inline]
    pub fn sorted_next(&self, h: Idx) -> Result<Idx, Error> {
        self.inner.core.next(h)
    }

    /// Sorted predecessor of `h`, or [`Error::EndOfSequence`].
    #[inline]
    pub fn sorted_prev(&self, h: Idx) -> Result<Idx, Error> {
        self.inner.core.prev(h)
    }

    /// Iterates elements in list order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        let core = &self.inner.core;
        self.inner
            .list
            .iter(&core.storage)
            .map(move |idx| core.entry(idx).key())
    }

    /// Iterates elements in sorted order.
    pub fn sorted_iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        let core = &self.inner.core;
        core.tree
            .iter(&core.storage)
            .map(move |idx| core.entry(idx).key())
    }

    /// Iterates handles in list order.
    pub fn handles(&self) -> impl DoubleEndedIterator<Item = Idx> + ExactSizeIterator {
        self.inner.list.iter(&self.inner.core.storage)
    }

    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        self.inner.check_invariants()
    }
}

impl<T, C, Idx, S> Extend<T> for LinkedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T>,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx>,
{
    /// Appends every element, skipping duplicates.
    ///
    /// # Panics
    ///
    /// Panics if storage refuses an entry.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            match self.append(value) {
                Ok(_) | Err(Error::ValueAlreadyExists) => {}
                Err(err) => panic!("cannot extend set: {err}"),
            }
        }
    }
}

impl<T, C, Idx, S> FromIterator<T> for LinkedSet<T, C, Idx, S>
where
    Idx: Index,
    C: Compare<T> + Default,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, C, Idx, S> fmt::Debug for LinkedSet<T, C, Idx, S>
where
    T: fmt::Debug,
    Idx: Index,
    C: Compare<T>,
    S: Storage<LinkedSetEntry<T, Idx>, Index = Idx>,
{
    /// Elements in list order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
