//! Ordered containers over slab storage.
//!
//! Every container here is the same engine: a red-black tree threaded
//! through entries that live in a slab, plus an optional ring list threaded
//! through the same entries. The tree gives key order; the list gives an
//! order the caller controls.
//!
//! # Design Philosophy
//!
//! Separate storage from structure:
//!
//! ```text
//! Storage (VecStorage, BoxedStorage, slab::Slab) - owns entries, stable indices
//! RbTree / List                                 - coordinate indices, own nothing
//! OrderedSet / OrderedMap / LinkedSet / LinkedMap - own one storage + structures
//! ```
//!
//! Benefits:
//! - **Stable handles**: a handle stays valid until its entry is removed
//! - **One allocation per entry slot**: links live inside the entry
//! - **Pre-sized storage**: [`BoxedStorage`] never allocates after construction
//! - **Explicit ordering**: comparators are values, not global state
//!
//! # Containers
//!
//! | Container | Payload | Orders | Duplicate error |
//! |-----------|---------|--------|-----------------|
//! | [`OrderedSet`] | key | key | [`Error::ValueAlreadyExists`] |
//! | [`OrderedMap`] | key + value | key | [`Error::KeyAlreadyExists`] |
//! | [`LinkedSet`] | key | key + list | [`Error::ValueAlreadyExists`] |
//! | [`LinkedMap`] | key + value | key + list | [`Error::KeyAlreadyExists`] |
//!
//! # Quick Start
//!
//! ```
//! use nexus_ordered::{Error, OrderedMap};
//!
//! let mut map: OrderedMap<u32, &str> = OrderedMap::new();
//! let h = map.add(3, "three").unwrap();
//! map.add(1, "one").unwrap();
//!
//! assert_eq!(map.add(3, "again"), Err(Error::KeyAlreadyExists));
//! assert_eq!(map.entry_value(h), Ok(&"three"));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3]);
//! ```
//!
//! # Custom Ordering
//!
//! ```
//! use nexus_ordered::{NaturalOrder, OrderedSet, Reverse};
//!
//! let mut desc = OrderedSet::<i32, _>::with_comparator(Reverse(NaturalOrder));
//! desc.extend([2, 9, 4]);
//! assert_eq!(desc.iter().copied().collect::<Vec<_>>(), [9, 4, 2]);
//!
//! let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
//! let mut words = OrderedSet::<&str, _>::with_comparator(by_len);
//! words.extend(["ccc", "a", "bb"]);
//! assert_eq!(words.iter().copied().collect::<Vec<_>>(), ["a", "bb", "ccc"]);
//! ```
//!
//! # Fixed Capacity
//!
//! ```
//! use nexus_ordered::{BoxedStorage, Error, NaturalOrder, OrderedSet, SetEntry};
//!
//! let storage: BoxedStorage<SetEntry<u64>> = BoxedStorage::with_capacity(2);
//! let mut set: OrderedSet<u64, NaturalOrder, u32, _> =
//!     OrderedSet::with_storage(storage, NaturalOrder);
//! set.add(1).unwrap();
//! set.add(2).unwrap();
//! assert_eq!(set.add(3), Err(Error::AllocationFailed));
//! ```
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`
//! - `tracing` - Emit `trace!`/`debug!` events on structural changes

#![warn(missing_docs)]

pub mod compare;
mod engine;
pub mod entry;
pub mod error;
pub mod index;
pub mod layout;
pub mod linked_map;
pub mod linked_set;
pub mod list;
pub mod map;
pub mod rbtree;
pub mod set;
pub mod storage;

pub use compare::{Compare, NaturalOrder, Reverse, Search, Side, Slot};
pub use entry::{Entry, EntryNode, LinkedEntry, LinkedSetEntry, SetEntry};
pub use error::{Error, Full};
pub use index::Index;
pub use layout::{EntryLayout, value_padding};
pub use linked_map::LinkedMap;
pub use linked_set::LinkedSet;
pub use list::{List, ListLinks, ListNode};
pub use map::OrderedMap;
pub use rbtree::{Color, RbTree, TreeLinks, TreeNode};
pub use set::OrderedSet;
pub use storage::{BoxedStorage, Storage, VecStorage};
