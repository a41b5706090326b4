#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::{IdSequence, Mutex},
    id::Id64,
    time::TimeSource,
};

/// Mutable sequence state, only touched while the generator lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SequenceState {
    /// Last timestamp observed by this generator.
    last_timestamp: u64,
    /// Number issued for `last_timestamp`. May run past [`Id64::MAX_NUMBER`]
    /// while the tick is exhausted.
    counter: u64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// One instance is meant to be shared (e.g. behind an `Arc`) by every request
/// handler in a process. Each call to [`Generator::next_id`] reads the clock,
/// advances the counter and packs the ID inside a single critical section, so
/// two callers can never observe the same `(timestamp, counter)` pair.
///
/// ## Overflow
///
/// At most 4096 IDs are issued per millisecond tick. Past that, the counter
/// keeps advancing and every call fails with [`Error::NumberOverflow`] until
/// the time source moves to the next tick, at which point the counter resets
/// to zero. Callers should treat that error as "retry shortly".
///
/// A timestamp beyond 41 bits fails with [`Error::TimestampOverflow`] on every
/// call and never recovers without a new epoch.
pub struct Generator<T>
where
    T: TimeSource,
{
    machine_id: u64,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<SequenceState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<SequenceState>,
    time: T,
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a new [`Generator`] for `machine_id`, starting from
    /// `last_timestamp = 0` and `counter = 0`.
    ///
    /// # Parameters
    ///
    /// - `machine_id`: A unique identifier for the node or instance generating
    ///   IDs. Encoded into every generated ID.
    /// - `time`: A [`TimeSource`] (e.g. [`MonotonicClock`], a shared
    ///   `Arc<MonotonicClock>` or an [`FnTime`] closure) reporting milliseconds
    ///   since the chosen epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOverflow`] if `machine_id` does not fit in 10
    /// bits.
    ///
    /// # Example
    /// ```
    /// use flakeid::{CUSTOM_EPOCH, Generator, MonotonicClock};
    ///
    /// let clock = MonotonicClock::with_epoch(CUSTOM_EPOCH).unwrap();
    /// let generator = Generator::new(1, clock).unwrap();
    ///
    /// let id = loop {
    ///     match generator.next_id() {
    ///         Ok(id) => break id,
    ///         Err(e) if e.is_transient() => std::thread::yield_now(),
    ///         Err(e) => panic!("generator error: {e}"),
    ///     }
    /// };
    /// assert_eq!(id.machine_id(), 1);
    /// ```
    ///
    /// [`MonotonicClock`]: crate::MonotonicClock
    /// [`FnTime`]: crate::FnTime
    pub fn new(machine_id: u64, time: T) -> Result<Self> {
        Self::from_components(0, machine_id, 0, time)
    }

    /// Creates a generator with explicit sequence state.
    ///
    /// Useful for restoring a known position or for tests that need to start
    /// mid-tick. In typical use you should prefer [`Self::new`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOverflow`] if `machine_id` does not fit in 10
    /// bits.
    pub fn from_components(
        last_timestamp: u64,
        machine_id: u64,
        counter: u64,
        time: T,
    ) -> Result<Self> {
        if machine_id > Id64::MAX_MACHINE_ID {
            return Err(Error::MachineIdOverflow { machine_id });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(machine_id, last_timestamp, counter, "generator created");

        let state = Mutex::new(SequenceState {
            last_timestamp,
            counter,
        });
        Ok(Self {
            machine_id,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            time,
        })
    }

    /// Returns the machine ID embedded in every ID from this generator.
    pub const fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// Generates the next ID.
    ///
    /// # Errors
    ///
    /// - [`Error::NumberOverflow`] when more than 4096 IDs were requested in
    ///   the current tick. Heals on the next tick.
    /// - [`Error::TimestampOverflow`] when the clock no longer fits in 41 bits.
    /// - `Error::LockPoisoned` when another thread panicked while holding the
    ///   lock (only without the `parking-lot` feature).
    ///
    /// # Example
    /// ```
    /// use flakeid::{Error, FnTime, Generator, Id64};
    ///
    /// let generator = Generator::from_components(42, 7, Id64::MAX_NUMBER, FnTime(|| 42_u64)).unwrap();
    /// assert!(matches!(generator.next_id(), Err(Error::NumberOverflow { .. })));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<Id64> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let now = self.time.current_millis();
        if now == state.last_timestamp {
            state.counter = state.counter.saturating_add(1);
        } else {
            state.last_timestamp = now;
            state.counter = 0;
        }

        Id64::encode(state.last_timestamp, self.machine_id, state.counter)
    }
}

impl<T> IdSequence for Generator<T>
where
    T: TimeSource,
{
    fn next_id(&self) -> Result<u64> {
        self.next_id().map(u64::from)
    }
}
