//! Sentinel-based index trait used for entry handles and node links.
//!
//! Links inside tree and list nodes use a reserved sentinel value
//! (e.g. `u32::MAX`) instead of `Option<Idx>`, which keeps node headers
//! as small as the index type itself.

/// A copyable index type with a sentinel "none" value.
///
/// Every handle returned by a container is an `Index`. The sentinel is never
/// handed out by storage, so it doubles as the "detached" link value.
///
/// # Example
///
/// ```
/// use nexus_ordered::Index;
///
/// let idx: u32 = 5;
/// assert!(idx.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u32::NONE.into_option(), None);
/// assert_eq!(idx.into_option(), Some(5));
/// ```
pub trait Index: Copy + Eq + core::fmt::Debug {
    /// Sentinel value representing "no index".
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is not the sentinel value.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Converts the sentinel into `None`.
    #[inline]
    fn into_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }

    /// Returns the index as a `usize` slot number.
    fn as_usize(self) -> usize;

    /// Creates an index from a `usize` slot number.
    ///
    /// Callers must ensure `val` fits; storage checks this against
    /// [`Index::MAX_SLOTS`] before handing out a slot.
    fn from_usize(val: usize) -> Self;

    /// Number of addressable slots (the sentinel is excluded).
    const MAX_SLOTS: usize;
}

macro_rules! impl_index_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Index for $ty {
                const NONE: Self = <$ty>::MAX;

                const MAX_SLOTS: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                    <$ty>::MAX as usize
                } else {
                    usize::MAX
                };

                #[inline]
                fn as_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }
            }
        )*
    };
}

impl_index_for_unsigned!(u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_index_sentinel {
        ($($ty:ty => $name:ident),*) => {
            $(
                #[test]
                fn $name() {
                    assert!(<$ty>::NONE.is_none());
                    assert!(!<$ty>::NONE.is_some());
                    assert!((0 as $ty).is_some());
                    assert!((<$ty>::MAX - 1).is_some());
                    assert_eq!(<$ty>::NONE.into_option(), None);
                }
            )*
        };
    }

    test_index_sentinel!(
        u8 => u8_sentinel,
        u16 => u16_sentinel,
        u32 => u32_sentinel,
        u64 => u64_sentinel,
        usize => usize_sentinel
    );

    #[test]
    fn max_slots_excludes_sentinel() {
        assert_eq!(u8::MAX_SLOTS, 255);
        assert_eq!(u16::MAX_SLOTS, 65_535);
        assert_eq!(usize::MAX_SLOTS, usize::MAX);
    }

    #[test]
    fn usize_round_trip() {
        assert_eq!(u16::from_usize(300).as_usize(), 300);
    }
}
