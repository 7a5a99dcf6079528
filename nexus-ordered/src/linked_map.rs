//! Ordered map with a second, caller-controlled list order.
//!
//! Keys are unique and sorted by the comparator; independently, entries sit
//! in a ring list whose order the caller controls. A typical use is an
//! LRU-style cache that needs both "find by key" and "oldest first":
//!
//! ```
//! use nexus_ordered::LinkedMap;
//!
//! let mut cache: LinkedMap<u64, &str> = LinkedMap::new();
//! cache.append(10, "ten").unwrap();
//! cache.append(20, "twenty").unwrap();
//! cache.append(30, "thirty").unwrap();
//!
//! // Touch 10: most recently used goes to the back.
//! let h = cache.find(&10).unwrap();
//! cache.move_to_back(h).unwrap();
//!
//! // Evict the least recently used.
//! assert_eq!(cache.pop_front(), Some((20, "twenty")));
//! assert_eq!(cache.keys().copied().collect::<Vec<_>>(), [30, 10]);
//! assert_eq!(cache.sorted_keys().copied().collect::<Vec<_>>(), [10, 30]);
//! ```

use std::fmt;

use crate::engine::{LinkedCore, Position};
use crate::entry::EntryNode;
use crate::{
    Compare, EntryLayout, Error, Index, LinkedEntry, NaturalOrder, Search, Storage, TreeNode,
    VecStorage,
};

/// An ordered map whose entries also form a doubly linked list.
///
/// # Type Parameters
///
/// - `K`: Key type
/// - `V`: Value type
/// - `C`: Comparator over keys (default [`NaturalOrder`])
/// - `Idx`: Handle type (default `u32`)
/// - `S`: Storage (default [`VecStorage`])
pub struct LinkedMap<K, V, C = NaturalOrder, Idx = u32, S = VecStorage<LinkedEntry<K, V, Idx>, Idx>>
where
    Idx: Index,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx>,
{
    inner: LinkedCore<LinkedEntry<K, V, Idx>, C, S, Idx>,
}

impl<K, V, C, Idx, S> LinkedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K> + Default,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx> + Default,
{
    /// Creates an empty map with default storage and comparator.
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
    /// Panics if both `K` and `V` are zero-sized.
    pub fn new() -> Self {
        Self::with_storage(S::default(), C::default())
    }
}

impl<K, V, C, Idx, S> Default for LinkedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K> + Default,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, Idx, S> LinkedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx> + Default,
{
    /// Creates an empty map ordered by `cmp`.
    ///
    /// # Panics
    ///
    /// Panics if both `K` and `V` are zero-sized.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_storage(S::default(), cmp)
    }
}

impl<K, V, C, Idx, S> LinkedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx>,
{
    /// Creates an empty map over `storage`, which must be empty.
    ///
    /// # Errors
    ///
    /// - [`Error::SizeIsZero`] if both `K` and `V` are zero-sized
    /// - [`Error::EntrySizeTooLarge`] or [`Error::SizeTooLarge`] if the entry
    ///   size overflows
    pub fn try_with_storage(storage: S, cmp: C) -> Result<Self, Error> {
        Ok(Self {
            inner: LinkedCore::new(storage, cmp, Error::KeyNotFound, Error::KeyAlreadyExists)?,
        })
    }

    /// Panicking form of [`try_with_storage`](Self::try_with_storage).
    ///
    /// # Panics
    ///
    /// Panics if both `K` and `V` are zero-sized.
    pub fn with_storage(storage: S, cmp: C) -> Self {
        match Self::try_with_storage(storage, cmp) {
            Ok(map) => map,
            Err(err) => panic!("cannot create map: {err}"),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.core.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.core.len() == 0
    }

    /// Size and padding of one entry, including both link headers.
    #[inline]
    pub fn layout(&self) -> EntryLayout {
        self.inner.core.layout()
    }

    /// Size in bytes of `K`.
    #[inline]
    pub fn key_size(&self) -> usize {
        self.inner.core.layout().key_size()
    }

    /// Size in bytes of `V`.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.inner.core.layout().value_size()
    }

    /// Returns the key comparator.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.inner.core.cmp
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Inserts a new entry as the first list element.
    ///
    /// Successive calls list entries in reverse insertion order, the same
    /// as [`prepend`](Self::prepend).
    ///
    /// # Errors
    ///
    /// - [`Error::KeyAlreadyExists`] if an equal key is present
    /// - [`Error::AllocationFailed`] if storage refuses the entry
    #[inline]
    pub fn add(&mut self, key: K, value: V) -> Result<Idx, Error> {
        self.inner.insert(key, value, Position::Front)
    }

    /// Inserts a new entry after the current last list element.
    #[inline]
    pub fn append(&mut self, key: K, value: V) -> Result<Idx, Error> {
        self.inner.insert(key, value, Position::Back)
    }

    /// Inserts a new entry as the first list element.
    #[inline]
    pub fn prepend(&mut self, key: K, value: V) -> Result<Idx, Error> {
        self.inner.insert(key, value, Position::Front)
    }

    /// Inserts a new entry immediately before `at` in list order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `at` is not a live entry (checked before
    /// anything else), plus the errors of [`add`](Self::add).
    #[inline]
    pub fn insert_before(&mut self, at: Idx, key: K, value: V) -> Result<Idx, Error> {
        self.inner.insert(key, value, Position::Before(at))
    }

    /// Inserts a new entry immediately after `at` in list order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `at` is not a live entry (checked before
    /// anything else), plus the errors of [`add`](Self::add).
    #[inline]
    pub fn insert_after(&mut self, at: Idx, key: K, value: V) -> Result<Idx, Error> {
        self.inner.insert(key, value, Position::After(at))
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Removes the entry at handle `h` from both orders.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `h` is not a live entry.
    #[inline]
    pub fn remove(&mut self, h: Idx) -> Result<(K, V), Error> {
        self.inner.remove_at(h)
    }

    /// Removes the entry for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if no key compares equal.
    #[inline]
    pub fn remove_key(&mut self, key: &K) -> Result<(K, V), Error> {
        self.inner.remove_key(key)
    }

    /// Removes and returns the first list entry.
    #[inline]
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        self.inner.pop_front()
    }

    /// Removes and returns the last list entry.
    #[inline]
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        self.inner.pop_back()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.inner.clear_with(|_, _| {});
    }

    /// Removes every entry in list order, passing each key and value to `f`
    /// exactly once.
    pub fn clear_with<F>(&mut self, f: F)
    where
        F: FnMut(K, V),
    {
        self.inner.clear_with(f);
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

    /// Handle of the entry for `key`, or [`Error::KeyNotFound`].
    #[inline]
    pub fn find(&self, key: &K) -> Result<Idx, Error> {
        self.inner.core.find(key)
    }

    /// Value for `key`, or [`Error::KeyNotFound`].
    #[inline]
    pub fn get(&self, key: &K) -> Result<&V, Error> {
        self.inner.core.get(key).map(|node| node.value())
    }

    /// Mutable value for `key`, or [`Error::KeyNotFound`].
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        self.inner.core.get_mut(key).map(|node| node.value_mut())
    }

    /// Returns `true` if an equal key is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.core.contains(key)
    }

    /// Smallest key `>= key`, or [`Error::NotFound`].
    #[inline]
    pub fn ceiling(&self, key: &K) -> Result<Idx, Error> {
        self.inner.core.ceiling(key)
    }

    /// Largest key `<= key`, or [`Error::NotFound`].
    #[inline]
    pub fn floor(&self, key: &K) -> Result<Idx, Error> {
        self.inner.core.floor(key)
    }

    /// Smallest key `> key`, or [`Error::NotFound`].
    #[inline]
    pub fn higher(&self, key: &K) -> Result<Idx, Error> {
        self.inner.core.higher(key)
    }

    /// Largest key `< key`, or [`Error::NotFound`].
    #[inline]
    pub fn lower(&self, key: &K) -> Result<Idx, Error> {
        self.inner.core.lower(key)
    }

    // ========================================================================
    // Handle access
    // ========================================================================

    /// Key at handle `h`, or [`Error::InvalidHandle`].
    #[inline]
    pub fn entry_key(&self, h: Idx) -> Result<&K, Error> {
        self.inner.core.node(h).map(|node| node.key())
    }

    /// Value at handle `h`, or [`Error::InvalidHandle`].
    #[inline]
    pub fn entry_value(&self, h: Idx) -> Result<&V, Error> {
        self.inner.core.node(h).map(|node| node.value())
    }

    /// Mutable value at handle `h`, or [`Error::InvalidHandle`].
    #[inline]
    pub fn entry_value_mut(&mut self, h: Idx) -> Result<&mut V, Error> {
        self.inner.core.node_mut(h).map(|node| node.value_mut())
    }

    /// Replaces the value at handle `h`, returning the old one.
    pub fn entry_set_value(&mut self, h: Idx, value: V) -> Result<V, Error> {
        let node = self.inner.core.node_mut(h)?;
        Ok(core::mem::replace(node.value_mut(), value))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// First list entry, or [`Error::Empty`].
    #[inline]
    pub fn first(&self) -> Result<Idx, Error> {
        self.inner.first()
    }

    /// Last list entry, or [`Error::Empty`].
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

    /// Entry with the smallest key, or [`Error::Empty`].
    #[inline]
    pub fn sorted_first(&self) -> Result<Idx, Error> {
        self.inner.core.first()
    }

    /// Entry with the largest key, or [`Error::Empty`].
    #[inline]
    pub fn sorted_last(&self) -> Result<Idx, Error> {
        self.inner.core.last()
    }

    /// Key-order successor of `h`, or [`Error::EndOfSequence`].
    #[inline]
    pub fn sorted_next(&self, h: Idx) -> Result<Idx, Error> {
        self.inner.core.next(h)
    }

    /// Key-order predecessor of `h`, or [`Error::EndOfSequence`].
    #[inline]
    pub fn sorted_prev(&self, h: Idx) -> Result<Idx, Error> {
        self.inner.core.prev(h)
    }

    /// Iterates `(key, value)` pairs in list order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator {
        let core = &self.inner.core;
        self.inner.list.iter(&core.storage).map(move |idx| {
            let node = core.entry(idx);
            (node.key(), node.value())
        })
    }

    /// Iterates `(key, value)` pairs in key order.
    pub fn sorted_iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator {
        let core = &self.inner.core;
        core.tree.iter(&core.storage).map(move |idx| {
            let node = core.entry(idx);
            (node.key(), node.value())
        })
    }

    /// Iterates keys in list order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates keys in key order.
    pub fn sorted_keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.sorted_iter().map(|(key, _)| key)
    }

    /// Iterates values in list order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
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

impl<K, V, C, Idx, S> Extend<(K, V)> for LinkedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx>,
{
    /// Appends every pair. A pair whose key is already present overwrites
    /// the value in place without moving the entry.
    ///
    /// # Panics
    ///
    /// Panics if storage refuses an entry.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            match self.inner.core.search(&key) {
                Search::Found(idx) => {
                    if let Ok(node) = self.inner.core.node_mut(idx) {
                        *node.value_mut() = value;
                    }
                }
                Search::Vacant(slot) => {
                    if let Err(err) = self.inner.insert_at(slot, key, value, Position::Back) {
                        panic!("cannot extend map: {err}");
                    }
                }
            }
        }
    }
}

impl<K, V, C, Idx, S> FromIterator<(K, V)> for LinkedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K> + Default,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, C, Idx, S> fmt::Debug for LinkedMap<K, V, C, Idx, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
    Idx: Index,
    C: Compare<K>,
    S: Storage<LinkedEntry<K, V, Idx>, Index = Idx>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxedStorage, Reverse};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    type TestMap = LinkedMap<u32, String>;

    fn keys(map: &TestMap) -> Vec<u32> {
        map.keys().copied().collect()
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn layout_includes_both_headers() {
        let map: LinkedMap<u32, u64> = LinkedMap::new();
        assert_eq!(map.layout().padding(), 4);
        assert_eq!(map.key_size(), 4);
        assert_eq!(map.value_size(), 8);
        assert_eq!(
            map.layout().header_size(),
            core::mem::size_of::<(crate::TreeLinks<u32>, crate::ListLinks<u32>)>()
        );
    }

    #[test]
    fn zero_sized_payload_is_rejected() {
        assert_eq!(LinkedMap::<(), ()>::try_new().err(), Some(Error::SizeIsZero));
        assert!(LinkedMap::<(), u8>::try_new().is_ok());
    }

    #[test]
    fn add_prepends_append_appends() {
        let mut map = TestMap::new();
        map.add(1, "a".into()).unwrap();
        map.add(2, "b".into()).unwrap();
        map.add(3, "c".into()).unwrap();
        assert_eq!(keys(&map), vec![3, 2, 1]);

        map.append(4, "d".into()).unwrap();
        assert_eq!(keys(&map), vec![3, 2, 1, 4]);
        assert_eq!(map.sorted_keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        map.check_invariants().unwrap();
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut map = TestMap::new();
        let h = map.append(1, "a".into()).unwrap();
        assert_eq!(map.prepend(1, "x".into()), Err(Error::KeyAlreadyExists));
        assert_eq!(map.insert_after(h, 1, "x".into()), Err(Error::KeyAlreadyExists));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1).map(String::as_str), Ok("a"));
    }

    #[test]
    fn insert_relative_and_remove() {
        let mut map = TestMap::new();
        let b = map.append(2, "b".into()).unwrap();
        map.insert_before(b, 1, "a".into()).unwrap();
        map.insert_after(b, 3, "c".into()).unwrap();
        assert_eq!(keys(&map), vec![1, 2, 3]);

        let first = map.first().unwrap();
        assert_eq!(map.remove(first), Ok((1, "a".to_string())));
        assert_eq!(map.first(), Ok(b));
        assert_eq!(map.remove_key(&3), Ok((3, "c".to_string())));
        assert_eq!(map.remove_key(&3), Err(Error::KeyNotFound));
        assert_eq!(map.last(), Ok(b));
        map.check_invariants().unwrap();
    }

    #[test]
    fn handle_accessors() {
        let mut map = TestMap::new();
        let h = map.append(7, "seven".into()).unwrap();
        assert_eq!(map.entry_key(h), Ok(&7));
        map.entry_value_mut(h).unwrap().push('!');
        assert_eq!(map.entry_value(h).map(String::as_str), Ok("seven!"));
        assert_eq!(map.entry_set_value(h, "7".into()), Ok("seven!".to_string()));
        *map.get_mut(&7).unwrap() += "7";
        assert_eq!(map.get(&7).map(String::as_str), Ok("77"));
        assert!(map.contains_key(&7));

        map.remove(h).unwrap();
        assert_eq!(map.entry_value(h), Err(Error::InvalidHandle));
        assert_eq!(map.next(h), Err(Error::InvalidHandle));
        assert_eq!(map.sorted_next(h), Err(Error::InvalidHandle));
    }

    #[test]
    fn sorted_navigation() {
        let map: TestMap = [(5, "e"), (1, "a"), (3, "c")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        let lo = map.sorted_first().unwrap();
        let hi = map.sorted_last().unwrap();
        assert_eq!(map.entry_key(lo), Ok(&1));
        assert_eq!(map.entry_key(hi), Ok(&5));
        assert_eq!(map.sorted_next(lo).and_then(|h| map.sorted_next(h)), Ok(hi));
        assert_eq!(map.sorted_prev(lo), Err(Error::EndOfSequence));
        assert_eq!(map.entry_key(map.ceiling(&2).unwrap()), Ok(&3));
        assert_eq!(map.entry_key(map.floor(&2).unwrap()), Ok(&1));
        assert_eq!(map.entry_key(map.higher(&3).unwrap()), Ok(&5));
        assert_eq!(map.entry_key(map.lower(&3).unwrap()), Ok(&1));
        assert_eq!(keys(&map), vec![5, 1, 3]);
    }

    #[test]
    fn lru_workflow() {
        let mut map = TestMap::new();
        for k in 0..5 {
            map.append(k, k.to_string()).unwrap();
        }
        for k in [0, 2] {
            let h = map.find(&k).unwrap();
            map.move_to_back(h).unwrap();
        }
        assert_eq!(keys(&map), vec![1, 3, 4, 0, 2]);
        assert_eq!(map.pop_front(), Some((1, "1".to_string())));
        assert_eq!(map.pop_back(), Some((2, "2".to_string())));
        map.check_invariants().unwrap();
    }

    #[test]
    fn move_before_and_after() {
        let mut map = TestMap::new();
        let a = map.append(1, "a".into()).unwrap();
        let b = map.append(2, "b".into()).unwrap();
        let c = map.append(3, "c".into()).unwrap();

        map.move_before(a, c).unwrap();
        assert_eq!(keys(&map), vec![3, 1, 2]);
        assert_eq!(map.first(), Ok(c));
        map.move_after(b, c).unwrap();
        assert_eq!(keys(&map), vec![1, 2, 3]);
        map.move_to_front(b).unwrap();
        assert_eq!(keys(&map), vec![2, 1, 3]);
        map.check_invariants().unwrap();
    }

    #[test]
    fn extend_overwrites_in_place() {
        let mut map = TestMap::new();
        map.extend([(1, "a".to_string()), (2, "b".to_string())]);
        map.extend([(1, "A".to_string()), (3, "c".to_string())]);
        assert_eq!(keys(&map), vec![1, 2, 3]);
        assert_eq!(map.get(&1).map(String::as_str), Ok("A"));
        assert_eq!(format!("{map:?}"), r#"{1: "A", 2: "b", 3: "c"}"#);
    }

    #[test]
    fn extend_searches_once_per_pair() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let cmp = move |a: &u32, b: &u32| {
            counter.set(counter.get() + 1);
            a.cmp(b)
        };
        let mut map: LinkedMap<u32, u32, _> = LinkedMap::with_comparator(cmp);
        map.append(1, 10).unwrap();
        calls.set(0);

        // One comparison against the root for each pair.
        map.extend([(2, 20), (1, 11)]);
        assert_eq!(calls.get(), 2);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(map.get(&1), Ok(&11));
        map.check_invariants().unwrap();
    }

    #[test]
    fn clear_with_list_order_then_reuse() {
        let storage: BoxedStorage<LinkedEntry<u32, u32>> = BoxedStorage::with_capacity(4);
        let mut map: LinkedMap<u32, u32, Reverse<NaturalOrder>, u32, _> =
            LinkedMap::with_storage(storage, Reverse(NaturalOrder));
        for k in [2, 4, 1, 3] {
            map.append(k, k * 100).unwrap();
        }
        assert_eq!(map.append(5, 500), Err(Error::AllocationFailed));
        assert_eq!(map.sorted_keys().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1]);

        let mut seen = Vec::new();
        map.clear_with(|k, v| seen.push((k, v)));
        assert_eq!(seen, vec![(2, 200), (4, 400), (1, 100), (3, 300)]);
        assert!(map.is_empty());
        map.check_invariants().unwrap();

        map.append(5, 500).unwrap();
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![500]);
    }

    #[test]
    fn stress_random_operations() {
        let mut map: LinkedMap<u32, u32> = LinkedMap::new();
        let mut order: Vec<u32> = Vec::new();
        let mut reference = BTreeMap::new();
        let mut rng = SmallRng::seed_from_u64(31337);

        for i in 0..3000u32 {
            let op = rng.random_range(0..100);
            let key = rng.random_range(0..150);

            if op < 35 {
                if map.append(key, i).is_ok() {
                    order.push(key);
                    reference.insert(key, i);
                }
            } else if op < 50 {
                if map.prepend(key, i).is_ok() {
                    order.insert(0, key);
                    reference.insert(key, i);
                }
            } else if op < 60 && !order.is_empty() {
                let pos = rng.random_range(0..order.len());
                let at = map.find(&order[pos]).unwrap();
                if map.insert_before(at, key, i).is_ok() {
                    order.insert(pos, key);
                    reference.insert(key, i);
                }
            } else if op < 70 && !order.is_empty() {
                let pos = rng.random_range(0..order.len());
                let moved = order.remove(pos);
                map.move_to_back(map.find(&moved).unwrap()).unwrap();
                order.push(moved);
            } else if op < 90 {
                let removed = map.remove_key(&key).ok();
                assert_eq!(removed.map(|(_, v)| v), reference.remove(&key));
                order.retain(|&k| k != key);
            } else {
                assert_eq!(map.get(&key).ok(), reference.get(&key));
            }
        }

        map.check_invariants().unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), order);
        assert!(map.sorted_iter().eq(reference.iter()));
    }
}
