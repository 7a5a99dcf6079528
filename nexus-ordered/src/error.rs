//! Error types for container and storage operations.

use core::fmt;

/// Failure codes returned by container operations.
///
/// "Not found" and "already exists" are ordinary outcomes of key-based
/// operations, not defects; callers are expected to branch on them
/// (e.g. insert-if-absent). Resource failures leave the container in its
/// pre-call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// A requested size (entry payload, storage capacity) was zero.
    SizeIsZero,
    /// A requested allocation exceeds the platform object size limit.
    SizeTooLarge,
    /// The header + key + padding + value sum overflowed.
    EntrySizeTooLarge,
    /// Storage could not provide a slot for a new entry.
    AllocationFailed,
    /// A map entry with an equal key already exists.
    KeyAlreadyExists,
    /// A set entry comparing equal already exists.
    ValueAlreadyExists,
    /// No map entry has an equal key.
    KeyNotFound,
    /// No set entry compares equal.
    ValueNotFound,
    /// No entry satisfies a ceiling/floor/higher/lower query.
    NotFound,
    /// The container holds no entries.
    Empty,
    /// Navigation stepped past the first or last entry.
    EndOfSequence,
    /// A handle does not refer to a live entry of this container.
    InvalidHandle,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::SizeIsZero => "size is zero",
            Error::SizeTooLarge => "size exceeds the platform object limit",
            Error::EntrySizeTooLarge => "entry size overflows",
            Error::AllocationFailed => "allocation failed",
            Error::KeyAlreadyExists => "key already exists",
            Error::ValueAlreadyExists => "value already exists",
            Error::KeyNotFound => "key not found",
            Error::ValueNotFound => "value not found",
            Error::NotFound => "no matching entry",
            Error::Empty => "container is empty",
            Error::EndOfSequence => "end of sequence",
            Error::InvalidHandle => "handle does not refer to a live entry",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

/// Error returned when storage cannot accept another value.
///
/// Fixed-capacity storage returns this when every slot is occupied;
/// growable storage returns it when the allocator refuses to grow.
/// The rejected value is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage is full")
    }
}

impl<T: fmt::Debug> std::error::Error for Full<T> {}

impl<T> From<Full<T>> for Error {
    #[inline]
    fn from(_: Full<T>) -> Self {
        Error::AllocationFailed
    }
}

impl From<core::convert::Infallible> for Error {
    #[inline]
    fn from(never: core::convert::Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_converts_to_allocation_failed() {
        let err: Error = Full(42u64).into();
        assert_eq!(err, Error::AllocationFailed);
    }

    #[test]
    fn full_returns_value() {
        assert_eq!(Full("x").into_inner(), "x");
    }

    #[test]
    fn display_messages() {
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        assert_eq!(Error::EndOfSequence.to_string(), "end of sequence");
        assert_eq!(Full(1).to_string(), "storage is full");
    }
}
