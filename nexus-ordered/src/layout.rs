//! Entry size and padding calculation.
//!
//! Every entry is one storage slot holding the node header(s), the key and,
//! for maps, the value. The canonical layout places the value on a
//! pointer-aligned offset after the key:
//!
//! ```text
//! [ header(s) ][ key: K ][ padding: P ][ value: V ]
//!
//! P = 0                         if K % size_of::<usize>() == 0
//! P = size_of::<usize>() - K % size_of::<usize>()   otherwise
//! ```
//!
//! The layout is computed once when a container is created and reported
//! through `layout()`, `key_size()` and `value_size()`. All sums are checked;
//! overflow is reported instead of wrapping.

use crate::Error;

const WORD: usize = core::mem::size_of::<usize>();

/// Platform limit for a single object.
const MAX_OBJECT_SIZE: usize = isize::MAX as usize;

/// Sizes and offsets of one container entry.
///
/// # Example
///
/// ```
/// use nexus_ordered::EntryLayout;
///
/// // u32 key, u64 value: the value starts on the next word boundary.
/// let layout = EntryLayout::new(0, 4, 8).unwrap();
/// assert_eq!(layout.padding(), core::mem::size_of::<usize>() - 4);
/// assert_eq!(layout.value_offset(), 4 + layout.padding());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryLayout {
    header_size: usize,
    key_size: usize,
    padding: usize,
    value_size: usize,
    total_size: usize,
}

impl EntryLayout {
    /// Computes the layout for the given header, key and value sizes.
    ///
    /// # Errors
    ///
    /// - [`Error::SizeIsZero`] if the payload (`key_size + value_size`) is empty
    /// - [`Error::EntrySizeTooLarge`] if any partial sum overflows
    /// - [`Error::SizeTooLarge`] if the total exceeds the platform object limit
    pub fn new(header_size: usize, key_size: usize, value_size: usize) -> Result<Self, Error> {
        let payload = key_size
            .checked_add(value_size)
            .ok_or(Error::EntrySizeTooLarge)?;
        if payload == 0 {
            return Err(Error::SizeIsZero);
        }

        let padding = if value_size == 0 {
            0
        } else {
            value_padding(key_size)
        };

        let total_size = payload
            .checked_add(padding)
            .ok_or(Error::EntrySizeTooLarge)?
            .checked_add(header_size)
            .ok_or(Error::EntrySizeTooLarge)?;

        if total_size > MAX_OBJECT_SIZE {
            return Err(Error::SizeTooLarge);
        }

        Ok(Self {
            header_size,
            key_size,
            padding,
            value_size,
            total_size,
        })
    }

    /// Computes the layout for header type `H`, key type `K` and value type `V`.
    ///
    /// Sets use `V = ()`, which yields no value region and no padding.
    #[inline]
    pub fn of<H, K, V>() -> Result<Self, Error> {
        Self::new(
            core::mem::size_of::<H>(),
            core::mem::size_of::<K>(),
            core::mem::size_of::<V>(),
        )
    }

    /// Size of the node header(s) preceding the payload.
    #[inline]
    pub const fn header_size(&self) -> usize {
        self.header_size
    }

    /// Size of the key region.
    #[inline]
    pub const fn key_size(&self) -> usize {
        self.key_size
    }

    /// Bytes between the end of the key and the start of the value.
    #[inline]
    pub const fn padding(&self) -> usize {
        self.padding
    }

    /// Size of the value region (0 for sets).
    #[inline]
    pub const fn value_size(&self) -> usize {
        self.value_size
    }

    /// Offset of the value from the start of the payload.
    #[inline]
    pub const fn value_offset(&self) -> usize {
        self.key_size + self.padding
    }

    /// Key + padding + value.
    #[inline]
    pub const fn payload_size(&self) -> usize {
        self.total_size - self.header_size
    }

    /// Header + key + padding + value.
    #[inline]
    pub const fn total_size(&self) -> usize {
        self.total_size
    }
}

/// Padding needed after a key of `key_size` bytes so the next region is
/// pointer aligned.
#[inline]
pub const fn value_padding(key_size: usize) -> usize {
    match key_size % WORD {
        0 => 0,
        rem => WORD - rem,
    }
}
