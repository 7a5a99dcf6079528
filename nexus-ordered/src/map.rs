//! Ordered map backed by a red-black tree over slab storage.
//!
//! Each entry holds the key and value in one storage slot, with the value
//! placed on a pointer-aligned offset after the key (see [`EntryLayout`]).
//!
//! # Example
//!
//! ```
//! use nexus_ordered::{Error, OrderedMap};
//!
//! let mut prices: OrderedMap<u32, u64> = OrderedMap::new();
//! prices.add(101, 500).unwrap();
//! prices.add(99, 200).unwrap();
//! assert_eq!(prices.add(99, 1), Err(Error::KeyAlreadyExists));
//!
//! // Best bid below 100
//! let h = prices.floor(&100).unwrap();
//! assert_eq!(prices.entry_key(h), Ok(&99));
//! assert_eq!(prices.entry_set_value(h, 250), Ok(200));
//! assert_eq!(prices.get(&99), Ok(&250));
//!
//! // Upsert
//! assert_eq!(prices.set(101, 600), Ok(Some(500)));
//! assert_eq!(prices.set(102, 10), Ok(None));
//! ```

use std::fmt;

use crate::engine::Core;
use crate::entry::EntryNode;
use crate::rbtree::Indices;
use crate::{
    Compare, Entry, EntryLayout, Error, Index, NaturalOrder, Search, Storage, TreeNode, VecStorage,
};

/// An ordered map with unique keys.
///
/// # Type Parameters
///
/// - `K`: Key type
/// - `V`: Value type
/// - `C`: Comparator over keys (default [`NaturalOrder`])
/// - `Idx`: Handle type (default `u32`)
/// - `S`: Storage (default [`VecStorage`])
pub struct OrderedMap<K, V, C = NaturalOrder, Idx = u32, S = VecStorage<Entry<K, V, Idx>, Idx>>
where
    Idx: Index,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
    core: Core<Entry<K, V, Idx>, C, S, Idx>,
}

impl<K, V, C, Idx, S> OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K> + Default,
    S: Storage<Entry<K, V, Idx>, Index = Idx> + Default,
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

impl<K, V, C, Idx, S> Default for OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K> + Default,
    S: Storage<Entry<K, V, Idx>, Index = Idx> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, Idx, S> OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<Entry<K, V, Idx>, Index = Idx> + Default,
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

impl<K, V, C, Idx, S> OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
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
            core: Core::new(storage, cmp, Error::KeyNotFound, Error::KeyAlreadyExists)?,
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
        self.core.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    /// Size and padding of one entry.
    #[inline]
    pub fn layout(&self) -> EntryLayout {
        self.core.layout()
    }

    /// Size in bytes of `K`.
    #[inline]
    pub fn key_size(&self) -> usize {
        self.core.layout().key_size()
    }

    /// Size in bytes of `V`.
    #[inline]
    pub fn value_size(&self) -> usize {
        self.core.layout().value_size()
    }

    /// Returns the key comparator.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.core.cmp
    }

    // ========================================================================
    // Insert / remove
    // ========================================================================

    /// Inserts a new entry, returning its handle.
    ///
    /// # Errors
    ///
    /// - [`Error::KeyAlreadyExists`] if an equal key is present (the map is
    ///   unchanged and `value` is dropped)
    /// - [`Error::AllocationFailed`] if storage refuses the entry
    pub fn add(&mut self, key: K, value: V) -> Result<Idx, Error> {
        self.core.add(key, value)
    }

    /// Inserts or overwrites, returning the previous value if the key was
    /// present. An existing entry keeps its original key and handle.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailed`] if a new entry is needed and storage
    /// refuses it.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        match self.core.search(&key) {
            Search::Found(idx) => {
                let node = self.core.node_mut(idx)?;
                Ok(Some(core::mem::replace(node.value_mut(), value)))
            }
            Search::Vacant(slot) => {
                self.core.insert_at(slot, key, value)?;
                Ok(None)
            }
        }
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if no key compares equal.
    pub fn remove(&mut self, key: &K) -> Result<V, Error> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key`, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V), Error> {
        let idx = self.core.find(key)?;
        self.core.remove_at(idx)
    }

    /// Removes the entry at handle `h`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if `h` is not a live entry.
    pub fn remove_at(&mut self, h: Idx) -> Result<(K, V), Error> {
        self.core.remove_at(h)
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let idx = self.core.first().ok()?;
        self.core.remove_at(idx).ok()
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let idx = self.core.last().ok()?;
        self.core.remove_at(idx).ok()
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.core.retain(keep);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.core.clear_with(|_, _| {});
    }

    /// Removes every entry, passing each key and value to `f` exactly once.
    pub fn clear_with<F>(&mut self, f: F)
    where
        F: FnMut(K, V),
    {
        self.core.clear_with(f);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the handle of the entry for `key`.
    #[inline]
    pub fn find(&self, key: &K) -> Result<Idx, Error> {
        self.core.find(key)
    }

    /// Returns the value for `key`, or [`Error::KeyNotFound`].
    #[inline]
    pub fn get(&self, key: &K) -> Result<&V, Error> {
        self.core.get(key).map(|node| node.value())
    }

    /// Returns the value for `key` mutably, or [`Error::KeyNotFound`].
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        self.core.get_mut(key).map(|node| node.value_mut())
    }

    /// Returns `true` if an equal key is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    /// Smallest key `>= key`, or [`Error::NotFound`].
    #[inline]
    pub fn ceiling(&self, key: &K) -> Result<Idx, Error> {
        self.core.ceiling(key)
    }

    /// Largest key `<= key`, or [`Error::NotFound`].
    #[inline]
    pub fn floor(&self, key: &K) -> Result<Idx, Error> {
        self.core.floor(key)
    }

    /// Smallest key `> key`, or [`Error::NotFound`].
    #[inline]
    pub fn higher(&self, key: &K) -> Result<Idx, Error> {
        self.core.higher(key)
    }

    /// Largest key `< key`, or [`Error::NotFound`].
    #[inline]
    pub fn lower(&self, key: &K) -> Result<Idx, Error> {
        self.core.lower(key)
    }

    // ========================================================================
    // Handle access
    // ========================================================================

    /// Key stored at handle `h`.
    #[inline]
    pub fn entry_key(&self, h: Idx) -> Result<&K, Error> {
        self.core.node(h).map(|node| node.key())
    }

    /// Value stored at handle `h`.
    #[inline]
    pub fn entry_value(&self, h: Idx) -> Result<&V, Error> {
        self.core.node(h).map(|node| node.value())
    }

    /// Value stored at handle `h`, mutably.
    #[inline]
    pub fn entry_value_mut(&mut self, h: Idx) -> Result<&mut V, Error> {
        self.core.node_mut(h).map(|node| node.value_mut())
    }

    /// Replaces the value at handle `h`, returning the old one.
    pub fn entry_set_value(&mut self, h: Idx, value: V) -> Result<V, Error> {
        let node = self.core.node_mut(h)?;
        Ok(core::mem::replace(node.value_mut(), value))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Handle of the smallest key, or [`Error::Empty`].
    #[inline]
    pub fn first(&self) -> Result<Idx, Error> {
        self.core.first()
    }

    /// Handle of the largest key, or [`Error::Empty`].
    #[inline]
    pub fn last(&self) -> Result<Idx, Error> {
        self.core.last()
    }

    /// Handle after `h` in key order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `h` is not a live entry
    /// - [`Error::EndOfSequence`] if `h` has the largest key
    #[inline]
    pub fn next(&self, h: Idx) -> Result<Idx, Error> {
        self.core.next(h)
    }

    /// Handle before `h` in key order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `h` is not a live entry
    /// - [`Error::EndOfSequence`] if `h` has the smallest key
    #[inline]
    pub fn prev(&self, h: Idx) -> Result<Idx, Error> {
        self.core.prev(h)
    }

    /// Iterates `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V, Idx, S> {
        Iter {
            storage: &self.core.storage,
            indices: self.core.tree.iter(&self.core.storage),
        }
    }

    /// Iterates keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates values in ascending key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }

    /// Iterates handles in ascending key order.
    pub fn handles(&self) -> Indices<'_, Entry<K, V, Idx>, S, Idx> {
        self.core.tree.iter(&self.core.storage)
    }

    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        self.core.check_invariants()
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<K, V, C, Idx, S> Extend<(K, V)> for OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
    /// Inserts every pair, overwriting values of existing keys.
    ///
    /// # Panics
    ///
    /// Panics if storage refuses an entry.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(err) = self.set(key, value) {
                panic!("cannot extend map: {err}");
            }
        }
    }
}

impl<K, V, C, Idx, S> FromIterator<(K, V)> for OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K> + Default,
    S: Storage<Entry<K, V, Idx>, Index = Idx> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, C, Idx, S> fmt::Debug for OrderedMap<K, V, C, Idx, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
    Idx: Index,
    C: Compare<K>,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C, Idx, S> IntoIterator for &'a OrderedMap<K, V, C, Idx, S>
where
    Idx: Index,
    C: Compare<K>,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Idx, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Ascending iterator over `(key, value)` pairs.
pub struct Iter<'a, K, V, Idx: Index, S> {
    storage: &'a S,
    indices: Indices<'a, Entry<K, V, Idx>, S, Idx>,
}

impl<'a, K, V, Idx, S> Iterator for Iter<'a, K, V, Idx, S>
where
    Idx: Index,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.indices.next()?;
        self.storage.get(idx).map(|node| (node.key(), node.value()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a, K, V, Idx, S> DoubleEndedIterator for Iter<'a, K, V, Idx, S>
where
    Idx: Index,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let idx = self.indices.next_back()?;
        self.storage.get(idx).map(|node| (node.key(), node.value()))
    }
}

impl<'a, K, V, Idx, S> ExactSizeIterator for Iter<'a, K, V, Idx, S>
where
    Idx: Index,
    S: Storage<Entry<K, V, Idx>, Index = Idx>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxedStorage;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    type TestMap = OrderedMap<u64, String>;

    fn sample() -> TestMap {
        [(3, "c"), (1, "a"), (2, "b")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect()
    }

    // ========================================================================
    // Layout
    // ========================================================================

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn u32_key_u64_value_layout() {
        let map: OrderedMap<u32, u64> = OrderedMap::new();
        assert_eq!(map.key_size(), 4);
        assert_eq!(map.value_size(), 8);
        assert_eq!(map.layout().padding(), 4);
        assert_eq!(map.layout().value_offset(), 8);
    }

    #[test]
    fn zero_sized_payload_is_rejected() {
        assert_eq!(OrderedMap::<(), ()>::try_new().err(), Some(Error::SizeIsZero));
    }

    #[test]
    fn zero_sized_value_is_allowed() {
        let mut map = OrderedMap::<u64, ()>::try_new().unwrap();
        map.add(1, ()).unwrap();
        assert_eq!(map.value_size(), 0);
        assert_eq!(map.layout().padding(), 0);
    }

    // ========================================================================
    // Basic operations
    // ========================================================================

    #[test]
    fn add_and_get() {
        let map = sample();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&2).map(String::as_str), Ok("b"));
        assert_eq!(map.get(&4), Err(Error::KeyNotFound));
        assert!(map.contains_key(&1));
    }

    #[test]
    fn add_duplicate_rejected() {
        let mut map = sample();
        assert_eq!(map.add(2, "x".into()), Err(Error::KeyAlreadyExists));
        assert_eq!(map.get(&2).map(String::as_str), Ok("b"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn set_upserts() {
        let mut map = sample();
        let h = map.find(&2).unwrap();
        assert_eq!(map.set(2, "B".into()), Ok(Some("b".to_string())));
        assert_eq!(map.find(&2), Ok(h));
        assert_eq!(map.set(9, "z".into()), Ok(None));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn remove_variants() {
        let mut map = sample();
        assert_eq!(map.remove(&1), Ok("a".to_string()));
        assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
        assert_eq!(map.remove_entry(&3), Ok((3, "c".to_string())));

        let h = map.first().unwrap();
        assert_eq!(map.remove_at(h), Ok((2, "b".to_string())));
        assert_eq!(map.remove_at(h), Err(Error::InvalidHandle));
        assert!(map.is_empty());
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut map = sample();
        map.get_mut(&1).unwrap().push('!');
        assert_eq!(map.get(&1).map(String::as_str), Ok("a!"));
        assert_eq!(map.get_mut(&7), Err(Error::KeyNotFound));
    }

    #[test]
    fn handle_accessors() {
        let mut map = sample();
        let h = map.ceiling(&2).unwrap();
        assert_eq!(map.entry_key(h), Ok(&2));
        assert_eq!(map.entry_value(h).map(String::as_str), Ok("b"));

        map.entry_value_mut(h).unwrap().push('2');
        assert_eq!(map.entry_set_value(h, "new".into()), Ok("b2".to_string()));
        assert_eq!(map.get(&2).map(String::as_str), Ok("new"));

        map.remove(&2).unwrap();
        assert_eq!(map.entry_key(h), Err(Error::InvalidHandle));
        assert_eq!(
            map.entry_set_value(h, "x".into()),
            Err(Error::InvalidHandle)
        );
    }

    #[test]
    fn navigation() {
        let map = sample();
        let first = map.first().unwrap();
        let last = map.last().unwrap();
        assert_eq!(map.entry_key(first), Ok(&1));
        assert_eq!(map.entry_key(last), Ok(&3));
        assert_eq!(map.next(first).and_then(|h| map.next(h)), Ok(last));
        assert_eq!(map.prev(first), Err(Error::EndOfSequence));
        assert_eq!(map.next(last), Err(Error::EndOfSequence));
        assert_eq!(map.higher(&3), Err(Error::NotFound));
        assert_eq!(map.lower(&1), Err(Error::NotFound));
        assert_eq!(map.floor(&10), Ok(last));
    }

    #[test]
    fn iterators() {
        let map = sample();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(map.values().rev().cloned().collect::<Vec<_>>(), vec!["c", "b", "a"]);
        assert_eq!(map.handles().len(), 3);
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);
    }

    #[test]
    fn pop_and_retain() {
        let mut map: OrderedMap<u32, u32> = (0..10).map(|k| (k, k * 10)).collect();
        assert_eq!(map.pop_first(), Some((0, 0)));
        assert_eq!(map.pop_last(), Some((9, 90)));

        map.retain(|k, v| {
            *v += 1;
            k % 2 == 0
        });
        assert_eq!(
            map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            vec![(2, 21), (4, 41), (6, 61), (8, 81)]
        );
        map.check_invariants().unwrap();
    }

    #[test]
    fn clear_with_hands_out_pairs() {
        let mut map = sample();
        let mut pairs = Vec::new();
        map.clear_with(|k, v| pairs.push((k, v)));
        pairs.sort();
        assert_eq!(
            pairs,
            vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]
        );
        assert!(map.is_empty());
        assert_eq!(map.first(), Err(Error::Empty));
    }

    #[test]
    fn boxed_storage_exhaustion_leaves_map_unchanged() {
        let storage: BoxedStorage<Entry<u64, u64>> = BoxedStorage::with_capacity(1);
        let mut map: OrderedMap<u64, u64, NaturalOrder, u32, _> =
            OrderedMap::with_storage(storage, NaturalOrder);
        map.add(1, 1).unwrap();
        assert_eq!(map.add(2, 2), Err(Error::AllocationFailed));
        assert_eq!(map.set(3, 3), Err(Error::AllocationFailed));
        assert_eq!(map.set(1, 5), Ok(Some(1)));
        assert_eq!(map.len(), 1);
        map.check_invariants().unwrap();
    }

    #[test]
    fn drop_releases_values() {
        use std::rc::Rc;

        let tracker = Rc::new(());
        {
            let mut map: OrderedMap<u32, Rc<()>> = OrderedMap::new();
            for k in 0..8 {
                map.add(k, Rc::clone(&tracker)).unwrap();
            }
            map.remove(&3).unwrap();
            assert_eq!(Rc::strong_count(&tracker), 8);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn extend_searches_once_per_pair() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let cmp = move |a: &u32, b: &u32| {
            counter.set(counter.get() + 1);
            a.cmp(b)
        };
        let mut map: OrderedMap<u32, u32, _> = OrderedMap::with_comparator(cmp);
        map.add(1, 10).unwrap();
        calls.set(0);

        map.extend([(2, 20), (1, 11)]);
        assert_eq!(calls.get(), 2);
        assert_eq!(map.get(&1), Ok(&11));
        assert_eq!(map.len(), 2);
        map.check_invariants().unwrap();
    }

    // ========================================================================
    // Stress tests
    // ========================================================================

    #[test]
    fn stress_random_operations() {
        let mut map: OrderedMap<u64, u64> = OrderedMap::new();
        let mut reference = BTreeMap::new();
        let mut rng = SmallRng::seed_from_u64(12345);

        for i in 0..4000u64 {
            let op = rng.random_range(0..100);
            let key = rng.random_range(0..250);

            if op < 40 {
                assert_eq!(map.set(key, i), Ok(reference.insert(key, i)));
            } else if op < 55 {
                let expected = if reference.contains_key(&key) {
                    Err(Error::KeyAlreadyExists)
                } else {
                    reference.insert(key, i);
                    Ok(())
                };
                assert_eq!(map.add(key, i).map(|_| ()), expected);
            } else if op < 85 {
                assert_eq!(map.remove(&key).ok(), reference.remove(&key));
            } else {
                assert_eq!(map.get(&key).ok(), reference.get(&key));
                let ceiling = map.ceiling(&key).ok().map(|h| *map.entry_key(h).unwrap());
                assert_eq!(ceiling, reference.range(key..).next().map(|(k, _)| *k));
            }
        }

        map.check_invariants().unwrap();
        assert!(map.iter().eq(reference.iter()));
    }
}
