use std::sync::Arc;
use std::time::Duration;

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A source of the current time in milliseconds since a configured epoch.
///
/// This abstraction allows you to plug in a real monotonic clock or a pinned
/// time source in tests. Implementations are expected to be monotonic
/// non-decreasing; the generator relies on this but does not verify it.
///
/// Shared clocks work through `Arc<T>` and `&T`. Wrap a closure in [`FnTime`]
/// to use it as a time source.
///
/// # Example
///
/// ```
/// use flakeid::{FnTime, TimeSource};
/// use std::sync::Arc;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// assert_eq!(Arc::new(FixedTime).current_millis(), 1234);
/// assert_eq!(FnTime(|| 42_u64).current_millis(), 42);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T> TimeSource for Arc<T>
where
    T: TimeSource + ?Sized,
{
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T> TimeSource for &T
where
    T: TimeSource + ?Sized,
{
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// A time source backed by a closure returning milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct FnTime<F>(pub F);

impl<F> TimeSource for FnTime<F>
where
    F: Fn() -> u64,
{
    fn current_millis(&self) -> u64 {
        (self.0)()
    }
}
