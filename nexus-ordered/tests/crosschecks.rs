//! Random workloads checked against `std::collections` models.

use nexus_ordered::{
    BoxedStorage, Error, LinkedMap, LinkedSet, NaturalOrder, OrderedMap, OrderedSet, SetEntry,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};

mod common;
use common::*;

fn check_set_bounds(set: &OrderedSet<u16>, model: &BTreeSet<u16>, k: u16) {
    let key = |r: Result<u32, Error>| r.ok().map(|h| *set.entry(h).unwrap());
    assert_eq!(key(set.ceiling(&k)), model.range(k..).next().copied());
    assert_eq!(key(set.floor(&k)), model.range(..=k).next_back().copied());
    assert_eq!(key(set.higher(&k)), model.range((Excluded(k), Unbounded)).next().copied());
    assert_eq!(key(set.lower(&k)), model.range(..k).next_back().copied());
}

fn move_to_front(order: &mut Vec<u16>, k: u16) {
    if let Some(pos) = order.iter().position(|&x| x == k) {
        let k = order.remove(pos);
        order.insert(0, k);
    }
}

proptest! {
    #[test]
    fn ordered_set_matches_btreeset(ops in ops()) {
        let mut set: OrderedSet<u16> = OrderedSet::new();
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Add(k, _) | Op::Append(k, _) => match set.add(k) {
                    Ok(h) => {
                        prop_assert!(model.insert(k));
                        prop_assert_eq!(set.entry(h), Ok(&k));
                    }
                    Err(err) => {
                        prop_assert_eq!(err, Error::ValueAlreadyExists);
                        prop_assert!(model.contains(&k));
                    }
                },
                Op::Set(k, _) => prop_assert_eq!(set.contains(&k), model.contains(&k)),
                Op::Remove(k) => prop_assert_eq!(set.remove(&k).ok(), model.take(&k)),
                Op::PopFirst => prop_assert_eq!(set.pop_first(), model.pop_first()),
                Op::PopLast => prop_assert_eq!(set.pop_last(), model.pop_last()),
                Op::Bounds(k) => check_set_bounds(&set, &model, k),
                Op::Touch(k) => prop_assert_eq!(set.get(&k).ok(), model.get(&k)),
            }
        }

        set.check_invariants().unwrap();
        prop_assert_eq!(set.len(), model.len());
        assert_eq_iters(set.iter(), model.iter());
        assert_eq_iters(set.iter().rev(), model.iter().rev());
    }

    #[test]
    fn ordered_map_matches_btreemap(ops in ops()) {
        let mut map: OrderedMap<u16, u16> = OrderedMap::new();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add(k, v) => match map.add(k, v) {
                    Ok(_) => prop_assert_eq!(model.insert(k, v), None),
                    Err(err) => {
                        prop_assert_eq!(err, Error::KeyAlreadyExists);
                        prop_assert!(model.contains_key(&k));
                    }
                },
                Op::Set(k, v) => prop_assert_eq!(map.set(k, v).unwrap(), model.insert(k, v)),
                Op::Remove(k) => prop_assert_eq!(map.remove(&k).ok(), model.remove(&k)),
                Op::PopFirst => prop_assert_eq!(map.pop_first(), model.pop_first()),
                Op::PopLast => prop_assert_eq!(map.pop_last(), model.pop_last()),
                Op::Bounds(k) => {
                    let key = map.ceiling(&k).ok().map(|h| *map.entry_key(h).unwrap());
                    prop_assert_eq!(key, model.range(k..).next().map(|(k, _)| *k));
                    let key = map.lower(&k).ok().map(|h| *map.entry_key(h).unwrap());
                    prop_assert_eq!(key, model.range(..k).next_back().map(|(k, _)| *k));
                }
                Op::Append(k, _) => prop_assert_eq!(map.get(&k).ok(), model.get(&k)),
                Op::Touch(k) => {
                    if let Ok(h) = map.find(&k) {
                        let old = map.entry_set_value(h, 0).unwrap();
                        prop_assert_eq!(model.insert(k, 0), Some(old));
                    }
                }
            }
        }

        map.check_invariants().unwrap();
        assert_eq_iters(map.iter(), model.iter());
        assert_eq_iters(map.values().rev(), model.values().rev());
    }

    #[test]
    fn linked_set_matches_model(ops in ops()) {
        let mut set: LinkedSet<u16> = LinkedSet::new();
        let mut sorted = BTreeSet::new();
        let mut order: Vec<u16> = Vec::new();

        for op in ops {
            match op {
                Op::Add(k, _) | Op::Set(k, _) => {
                    if set.add(k).is_ok() {
                        prop_assert!(sorted.insert(k));
                        order.insert(0, k);
                    }
                }
                Op::Append(k, _) => {
                    if set.append(k).is_ok() {
                        prop_assert!(sorted.insert(k));
                        order.push(k);
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(set.remove_key(&k).ok(), sorted.take(&k));
                    order.retain(|&x| x != k);
                }
                Op::PopFirst => {
                    let popped = set.pop_front();
                    prop_assert_eq!(popped, (!order.is_empty()).then(|| order.remove(0)));
                    if let Some(k) = popped {
                        sorted.remove(&k);
                    }
                }
                Op::PopLast => {
                    let popped = set.pop_back();
                    prop_assert_eq!(popped, order.pop());
                    if let Some(k) = popped {
                        sorted.remove(&k);
                    }
                }
                Op::Bounds(k) => {
                    let key = set.floor(&k).ok().map(|h| *set.entry(h).unwrap());
                    prop_assert_eq!(key, sorted.range(..=k).next_back().copied());
                }
                Op::Touch(k) => {
                    if let Ok(h) = set.find(&k) {
                        set.move_to_front(h).unwrap();
                        move_to_front(&mut order, k);
                    }
                }
            }
        }

        set.check_invariants().unwrap();
        assert_eq_iters(set.iter().copied(), order.iter().copied());
        assert_eq_iters(set.iter().rev().copied(), order.iter().rev().copied());
        assert_eq_iters(set.sorted_iter(), sorted.iter());

        // Handle navigation walks the same list.
        let mut walked = Vec::new();
        let mut cur = set.first();
        while let Ok(h) = cur {
            walked.push(*set.entry(h).unwrap());
            cur = set.next(h);
        }
        prop_assert_eq!(walked, order);
    }

    #[test]
    fn linked_map_matches_model(ops in ops()) {
        let mut map: LinkedMap<u16, u16> = LinkedMap::new();
        let mut sorted = BTreeMap::new();
        let mut order: Vec<u16> = Vec::new();

        for op in ops {
            match op {
                Op::Add(k, v) => {
                    if map.add(k, v).is_ok() {
                        prop_assert_eq!(sorted.insert(k, v), None);
                        order.insert(0, k);
                    }
                }
                Op::Append(k, v) => {
                    if map.append(k, v).is_ok() {
                        prop_assert_eq!(sorted.insert(k, v), None);
                        order.push(k);
                    }
                }
                Op::Set(k, v) => {
                    map.extend([(k, v)]);
                    if sorted.insert(k, v).is_none() {
                        order.push(k);
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(
                        map.remove_key(&k).ok(),
                        sorted.remove(&k).map(|v| (k, v))
                    );
                    order.retain(|&x| x != k);
                }
                Op::PopFirst => {
                    let popped = map.pop_front();
                    let expected = (!order.is_empty()).then(|| order.remove(0));
                    prop_assert_eq!(popped.map(|(k, _)| k), expected);
                    if let Some((k, v)) = popped {
                        prop_assert_eq!(sorted.remove(&k), Some(v));
                    }
                }
                Op::PopLast => {
                    let popped = map.pop_back();
                    prop_assert_eq!(popped.map(|(k, _)| k), order.pop());
                    if let Some((k, v)) = popped {
                        prop_assert_eq!(sorted.remove(&k), Some(v));
                    }
                }
                Op::Bounds(k) => {
                    let key = map.higher(&k).ok().map(|h| *map.entry_key(h).unwrap());
                    prop_assert_eq!(key, sorted.range((Excluded(k), Unbounded)).next().map(|(k, _)| *k));
                }
                Op::Touch(k) => {
                    if let Ok(h) = map.find(&k) {
                        map.move_to_back(h).unwrap();
                        order.retain(|&x| x != k);
                        order.push(k);
                    }
                }
            }
        }

        map.check_invariants().unwrap();
        assert_eq_iters(map.keys().copied(), order.iter().copied());
        assert_eq_iters(map.sorted_iter(), sorted.iter());
        for (k, v) in map.iter() {
            prop_assert_eq!(sorted.get(k), Some(v));
        }
    }

    #[test]
    fn bounded_set_never_exceeds_capacity(keys in prop::collection::vec(0u16..512, 0..200)) {
        let storage: BoxedStorage<SetEntry<u16>> = BoxedStorage::with_capacity(32);
        let mut set: OrderedSet<u16, NaturalOrder, u32, _> =
            OrderedSet::with_storage(storage, NaturalOrder);
        let mut model = BTreeSet::new();

        for k in keys {
            match set.add(k) {
                Ok(_) => prop_assert!(model.insert(k)),
                Err(Error::ValueAlreadyExists) => prop_assert!(model.contains(&k)),
                Err(err) => {
                    prop_assert_eq!(err, Error::AllocationFailed);
                    prop_assert_eq!(model.len(), 32);
                    prop_assert!(!set.contains(&k));
                }
            }
            prop_assert!(set.len() <= 32);
        }

        set.check_invariants().unwrap();
        assert_eq_iters(set.iter(), model.iter());
    }
}
