use crate::id::Id64;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
///
/// The three overflow variants are validation failures of the packed layout.
/// They are returned unchanged by both [`Id64::encode`] and the generator so
/// callers can pick a retry policy by matching on the kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The timestamp does not fit in the 41-bit field.
    ///
    /// The clock has run past the useful lifetime of its epoch. This is a
    /// configuration fault: it does not heal by retrying.
    #[error("timestamp is too big: {timestamp} > {}", Id64::MAX_TIMESTAMP)]
    TimestampOverflow { timestamp: u64 },

    /// The machine ID does not fit in the 10-bit field.
    #[error("machine id is too big: {machine_id} > {}", Id64::MAX_MACHINE_ID)]
    MachineIdOverflow { machine_id: u64 },

    /// The per-tick sequence budget is exhausted.
    ///
    /// Transient: the generator recovers once the time source reports the
    /// next millisecond.
    #[error("number is too big: {number} > {}", Id64::MAX_NUMBER)]
    NumberOverflow { number: u64 },

    /// The system clock reads earlier than the requested epoch.
    #[error("system clock is before the epoch ({epoch_millis} ms since 1970-01-01)")]
    ClockBeforeEpoch { epoch_millis: u128 },

    /// The operation failed because the generator lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` if retrying after the next tick can succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NumberOverflow { .. })
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
