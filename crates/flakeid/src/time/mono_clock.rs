use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use crate::{
    error::{Error, Result},
    time::TimeSource,
};

/// Shared tick counter, updated once per millisecond by a ticker thread.
struct SharedTicker {
    current: AtomicU64,
}

/// A monotonic time source that returns elapsed time since construction,
/// offset from a caller-chosen epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP steps) while still aligning
/// timestamps to a fixed origin. The wall clock is consulted exactly once, at
/// construction, to compute the distance between the epoch and now. After
/// that a background thread advances a shared atomic from [`Instant`] once per
/// millisecond, so reads on the hot path are a single atomic load and never
/// go backward.
///
/// Clones share the same ticker. The ticker thread exits after the last clone
/// is dropped.
#[derive(Clone)]
pub struct MonotonicClock {
    inner: Arc<SharedTicker>,
    epoch_offset: u64, // in milliseconds
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin (t = 0).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the current system time is
    /// earlier than `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::{CUSTOM_EPOCH, MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::with_epoch(CUSTOM_EPOCH).unwrap();
    /// let first = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(5));
    /// assert!(clock.current_millis() >= first);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let before_epoch = || Error::ClockBeforeEpoch {
            epoch_millis: epoch.as_millis(),
        };
        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| before_epoch())?;
        let offset = system_now.checked_sub(epoch).ok_or_else(before_epoch)?;

        let inner = Arc::new(SharedTicker {
            current: AtomicU64::new(0),
        });

        let weak_inner = Arc::downgrade(&inner);
        thread::spawn(move || {
            let start = Instant::now();
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms, Ordering::Release);

                tick = now_ms + 1;
            }
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(
            epoch_ms = epoch.as_millis() as u64,
            offset_ms = offset.as_millis() as u64,
            "monotonic clock started"
        );

        Ok(Self {
            inner,
            epoch_offset: offset.as_millis() as u64,
        })
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.inner.current.load(Ordering::Acquire)
    }
}
