use crate::error::Result;

/// A minimal interface for anything that hands out 64-bit IDs.
///
/// This is the seam between the generator and a transport: a request handler
/// only needs `next_id`, so it can be driven by a [`Generator`] in production
/// and by a canned sequence in tests.
///
/// [`Generator`]: crate::Generator
pub trait IdSequence {
    /// Returns the next packed ID.
    ///
    /// # Errors
    ///
    /// Returns the generator's error unchanged, so callers can tell a
    /// transient [`NumberOverflow`] from a permanent [`TimestampOverflow`].
    ///
    /// [`NumberOverflow`]: crate::Error::NumberOverflow
    /// [`TimestampOverflow`]: crate::Error::TimestampOverflow
    fn next_id(&self) -> Result<u64>;
}
