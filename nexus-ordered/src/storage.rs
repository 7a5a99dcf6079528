//! Slab-like storage for container entries.
//!
//! Storage owns entries and hands out stable indices that remain valid until
//! the entry is removed. Containers keep their tree and list links as
//! indices into this storage, so an entry never moves once inserted and a
//! handle is simply its slot number.

use crate::{Error, Full, Index};

use core::mem::MaybeUninit;
use core::ptr::NonNull;
use std::alloc::{Layout, alloc, dealloc};
use std::marker::PhantomData;

/// Entry storage for the ordered containers.
///
/// An index handed out by `try_insert` names the same entry until that
/// entry is removed, and `Index::NONE` is never handed out. Insert, remove
/// and lookup are O(1); the tree and list links depend on it.
///
/// # Implementations
///
/// - [`VecStorage<T>`] - growable, reports allocation failure
/// - [`BoxedStorage<T>`] - fixed capacity, single allocation
/// - `slab::Slab<T>` - growable (feature `slab`)
pub trait Storage<T> {
    /// Slot number type; doubles as the container handle.
    type Index: Index;

    /// Why an insert was refused. Containers report it as
    /// [`Error::AllocationFailed`].
    ///
    /// - `Full<T>` when the storage can refuse a value
    /// - `Infallible` when it cannot
    type Error: Into<Error>;

    /// Stores `value` in a free slot and returns the slot number.
    fn try_insert(&mut self, value: T) -> Result<Self::Index, Self::Error>;

    /// Vacates slot `index`, returning its value. `None` if the slot is
    /// vacant or out of range.
    fn remove(&mut self, index: Self::Index) -> Option<T>;

    /// Value in slot `index`, if occupied.
    fn get(&self, index: Self::Index) -> Option<&T>;

    /// Mutable value in slot `index`, if occupied.
    fn get_mut(&mut self, index: Self::Index) -> Option<&mut T>;
}

// =============================================================================
// VecStorage - growable, free list threaded through vacant slots
// =============================================================================

#[derive(Debug, Clone)]
enum Slot<T, Idx> {
    Occupied(T),
    Vacant(Idx),
}

/// Growable storage backed by a `Vec`.
///
/// Vacant slots form a LIFO free list, so removed slots are reused before
/// the vector grows. Growth uses `try_reserve`: if the allocator refuses,
/// the insert fails with [`Full`] and nothing is modified.
///
/// # Example
///
/// ```
/// use nexus_ordered::{Storage, VecStorage};
///
/// let mut storage: VecStorage<u64> = VecStorage::new();
/// let idx = storage.try_insert(42).unwrap();
/// assert_eq!(storage.get(idx), Some(&42));
/// assert_eq!(storage.remove(idx), Some(42));
/// assert_eq!(storage.get(idx), None);
/// ```
#[derive(Debug, Clone)]
pub struct VecStorage<T, Idx: Index = u32> {
    slots: Vec<Slot<T, Idx>>,
    free_head: Idx,
    len: usize,
}

impl<T, Idx: Index> Default for VecStorage<T, Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Idx: Index> VecStorage<T, Idx> {
    /// Creates empty storage without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: Idx::NONE,
            len: 0,
        }
    }

    /// Creates empty storage with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: Idx::NONE,
            len: 0,
        }
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Errors
    ///
    /// - [`Error::SizeTooLarge`] if the result would exceed the index type or
    ///   the platform object limit
    /// - [`Error::AllocationFailed`] if the allocator refuses
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let wanted = self
            .slots
            .len()
            .checked_add(additional)
            .ok_or(Error::SizeTooLarge)?;
        if wanted > Idx::MAX_SLOTS || Layout::array::<Slot<T, Idx>>(wanted).is_err() {
            return Err(Error::SizeTooLarge);
        }
        self.slots
            .try_reserve(additional)
            .map_err(|_| Error::AllocationFailed)
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots available without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Drops every value and releases all slots.
    ///
    /// Any structure still holding indices into this storage is left with
    /// dangling handles; clear those structures first.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = Idx::NONE;
        self.len = 0;
    }
}

impl<T, Idx: Index> Storage<T> for VecStorage<T, Idx> {
    type Index = Idx;
    type Error = Full<T>;

    fn try_insert(&mut self, value: T) -> Result<Idx, Full<T>> {
        if self.free_head.is_some() {
            let idx = self.free_head;
            let slot = &mut self.slots[idx.as_usize()];
            let Slot::Vacant(next_free) = *slot else {
                unreachable!("free list points at an occupied slot");
            };
            *slot = Slot::Occupied(value);
            self.free_head = next_free;
            self.len += 1;
            return Ok(idx);
        }

        let i = self.slots.len();
        if i >= Idx::MAX_SLOTS {
            return Err(Full(value));
        }
        if self.slots.try_reserve(1).is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!(slots = i, "storage growth refused by allocator");
            return Err(Full(value));
        }
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        Ok(Idx::from_usize(i))
    }

    fn remove(&mut self, index: Idx) -> Option<T> {
        let slot = self.slots.get_mut(index.as_usize())?;
        if let Slot::Vacant(_) = slot {
            return None;
        }
        let Slot::Occupied(value) = core::mem::replace(slot, Slot::Vacant(self.free_head)) else {
            unreachable!();
        };
        self.free_head = index;
        self.len -= 1;
        Some(value)
    }

    #[inline]
    fn get(&self, index: Idx) -> Option<&T> {
        match self.slots.get(index.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, index: Idx) -> Option<&mut T> {
        match self.slots.get_mut(index.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }
}

// =============================================================================
// BoxedStorage - runtime capacity, single allocation, bitmap occupancy
// =============================================================================

/// Pre-sized storage that never allocates after construction.
///
/// Entries, an occupancy bitmap and a stack of free slot numbers share one
/// allocation made up front. Once every slot is taken, inserts fail with
/// [`Full`] and the container reports [`Error::AllocationFailed`].
///
/// The requested capacity is rounded up to a power of two.
///
/// # Example
///
/// ```
/// use nexus_ordered::{BoxedStorage, Storage};
///
/// let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(1000);
/// assert_eq!(storage.capacity(), 1024);
///
/// let idx = storage.try_insert(42).unwrap();
/// assert_eq!(storage.get(idx), Some(&42));
/// ```
pub struct BoxedStorage<T, Idx: Index = u32> {
    /// `[entries][bitmap][free stack]`
    ptr: NonNull<u8>,
    capacity: usize,
    /// Depth of the free stack.
    free_len: usize,
    layout: Layout,
    bitmap_offset: usize,
    free_stack_offset: usize,
    _marker: PhantomData<(T, Idx)>,
}

impl<T, Idx: Index> BoxedStorage<T, Idx> {
    /// Allocates room for `min_capacity` entries, rounded up to a power of
    /// two.
    ///
    /// # Errors
    ///
    /// - [`Error::SizeIsZero`] if `min_capacity` is 0
    /// - [`Error::SizeTooLarge`] if the rounded capacity exceeds the index type
    ///   or the allocation would exceed the platform object limit
    /// - [`Error::AllocationFailed`] if the allocator returns null
    pub fn try_with_capacity(min_capacity: usize) -> Result<Self, Error> {
        if min_capacity == 0 {
            return Err(Error::SizeIsZero);
        }

        let capacity = min_capacity
            .checked_next_power_of_two()
            .ok_or(Error::SizeTooLarge)?;
        if capacity > Idx::MAX_SLOTS {
            return Err(Error::SizeTooLarge);
        }

        let bitmap_words = bitmap_words(capacity);
        let (layout, bitmap_offset, free_stack_offset) = (|| {
            let entries = Layout::array::<MaybeUninit<T>>(capacity).ok()?;
            let bitmap = Layout::array::<u64>(bitmap_words).ok()?;
            let free_stack = Layout::array::<Idx>(capacity).ok()?;
            let (layout, bitmap_offset) = entries.extend(bitmap).ok()?;
            let (layout, free_stack_offset) = layout.extend(free_stack).ok()?;
            Some((layout.pad_to_align(), bitmap_offset, free_stack_offset))
        })()
        .ok_or(Error::SizeTooLarge)?;

        // Safety: layout has non-zero size (the bitmap alone is >= 8 bytes)
        let ptr = NonNull::new(unsafe { alloc(layout) }).ok_or(Error::AllocationFailed)?;

        // All slots start vacant; occupancy lives in the bitmap.
        unsafe {
            let bitmap_ptr = ptr.as_ptr().add(bitmap_offset) as *mut u64;
            core::ptr::write_bytes(bitmap_ptr, 0, bitmap_words);

            let free_stack_ptr = ptr.as_ptr().add(free_stack_offset) as *mut Idx;
            // Reverse order so the first insert gets slot 0.
            for i in 0..capacity {
                free_stack_ptr.add(i).write(Idx::from_usize(capacity - 1 - i));
            }
        }

        Ok(Self {
            ptr,
            capacity,
            free_len: capacity,
            layout,
            bitmap_offset,
            free_stack_offset,
            _marker: PhantomData,
        })
    }

    /// Panicking form of [`try_with_capacity`](Self::try_with_capacity).
    ///
    /// # Panics
    ///
    /// Panics if [`try_with_capacity`](Self::try_with_capacity) fails.
    pub fn with_capacity(min_capacity: usize) -> Self {
        match Self::try_with_capacity(min_capacity) {
            Ok(storage) => storage,
            Err(err) => panic!("cannot create storage: {err}"),
        }
    }

    /// Returns the capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub const fn len(&self) -> usize {
        self.capacity - self.free_len
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.free_len == self.capacity
    }

    /// Returns `true` if all slots are occupied.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.free_len == 0
    }

    /// Drops every stored value and makes all slots available again.
    ///
    /// Any structure still holding indices into this storage is left with
    /// dangling handles; clear those structures first.
    pub fn clear(&mut self) {
        for i in 0..self.capacity {
            if self.is_occupied(i) {
                // Safety: slot is occupied
                unsafe {
                    let ptr = self.entries_ptr().add(i);
                    core::ptr::drop_in_place((*ptr).as_mut_ptr());
                }
            }
        }

        unsafe {
            core::ptr::write_bytes(self.bitmap_ptr(), 0, bitmap_words(self.capacity));
        }

        let free_stack = self.free_stack_ptr();
        for i in 0..self.capacity {
            unsafe {
                *free_stack.add(i) = Idx::from_usize(self.capacity - 1 - i);
            }
        }
        self.free_len = self.capacity;
    }

    #[inline]
    fn entries_ptr(&self) -> *mut MaybeUninit<T> {
        self.ptr.as_ptr() as *mut MaybeUninit<T>
    }

    #[inline]
    fn bitmap_ptr(&self) -> *mut u64 {
        unsafe { self.ptr.as_ptr().add(self.bitmap_offset) as *mut u64 }
    }

    #[inline]
    fn free_stack_ptr(&self) -> *mut Idx {
        unsafe { self.ptr.as_ptr().add(self.free_stack_offset) as *mut Idx }
    }

    #[inline]
    fn is_occupied(&self, idx: usize) -> bool {
        let word = idx / 64;
        let bit = idx % 64;
        unsafe { (*self.bitmap_ptr().add(word) & (1 << bit)) != 0 }
    }

    #[inline]
    fn set_occupied(&mut self, idx: usize) {
        let word = idx / 64;
        let bit = idx % 64;
        unsafe {
            *self.bitmap_ptr().add(word) |= 1 << bit;
        }
    }

    #[inline]
    fn set_vacant(&mut self, idx: usize) {
        let word = idx / 64;
        let bit = idx % 64;
        unsafe {
            *self.bitmap_ptr().add(word) &= !(1 << bit);
        }
    }
}

impl<T, Idx: Index> Storage<T> for BoxedStorage<T, Idx> {
    type Index = Idx;
    type Error = Full<T>;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<Idx, Full<T>> {
        if self.free_len == 0 {
            return Err(Full(value));
        }

        self.free_len -= 1;
        let idx = unsafe { *self.free_stack_ptr().add(self.free_len) };
        let i = idx.as_usize();

        unsafe {
            self.entries_ptr().add(i).write(MaybeUninit::new(value));
        }
        self.set_occupied(i);

        Ok(idx)
    }

    #[inline]
    fn remove(&mut self, index: Idx) -> Option<T> {
        let i = index.as_usize();
        if i >= self.capacity || !self.is_occupied(i) {
            return None;
        }

        self.set_vacant(i);
        let value = unsafe { self.entries_ptr().add(i).read().assume_init() };

        unsafe {
            self.free_stack_ptr().add(self.free_len).write(index);
        }
        self.free_len += 1;

        Some(value)
    }

    #[inline]
    fn get(&self, index: Idx) -> Option<&T> {
        let i = index.as_usize();
        if i >= self.capacity || !self.is_occupied(i) {
            return None;
        }

        Some(unsafe { (*self.entries_ptr().add(i)).assume_init_ref() })
    }

    #[inline]
    fn get_mut(&mut self, index: Idx) -> Option<&mut T> {
        let i = index.as_usize();
        if i >= self.capacity || !self.is_occupied(i) {
            return None;
        }

        Some(unsafe { (*self.entries_ptr().add(i)).assume_init_mut() })
    }
}

impl<T, Idx: Index> Drop for BoxedStorage<T, Idx> {
    fn drop(&mut self) {
        for i in 0..self.capacity {
            if self.is_occupied(i) {
                unsafe {
                    self.entries_ptr().add(i).read().assume_init_drop();
                }
            }
        }

        unsafe {
            dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

impl<T, Idx: Index> core::fmt::Debug for BoxedStorage<T, Idx> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxedStorage")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

// Safety: BoxedStorage owns its data, safe to send if T is Send
unsafe impl<T: Send, Idx: Index + Send> Send for BoxedStorage<T, Idx> {}

#[inline]
const fn bitmap_words(capacity: usize) -> usize {
    capacity.div_ceil(64)
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Index = usize;
    type Error = core::convert::Infallible;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, Self::Error> {
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, index: usize) -> Option<T> {
        self.try_remove(index)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.get(index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }
}
