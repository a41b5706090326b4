use crate::{
    CUSTOM_EPOCH, Error, FnTime, Generator, Id64, IdSequence, MonotonicClock, TimeSource,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test can move forward while the generator holds it.
#[derive(Clone)]
struct SharedMockTime {
    millis: Arc<AtomicU64>,
}

impl SharedMockTime {
    fn new(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for SharedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Counts how many times the generator asked for the time.
struct CountingTime {
    millis: u64,
    reads: AtomicU64,
}

impl TimeSource for CountingTime {
    fn current_millis(&self) -> u64 {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.millis
    }
}

fn encode(timestamp: u64, machine_id: u64, number: u64) -> Id64 {
    Id64::encode(timestamp, machine_id, number).unwrap()
}

/// Runs `callers` threads that each call `next_id` once, all released at the
/// same time. Returns the successes and the errors.
fn run_concurrent_callers<T>(generator: &Generator<T>, callers: usize) -> (Vec<Id64>, Vec<Error>)
where
    T: TimeSource + Sync,
{
    let barrier = Barrier::new(callers);
    let results = Mutex::new(Vec::with_capacity(callers));

    scope(|s| {
        for _ in 0..callers {
            s.spawn(|| {
                barrier.wait();
                let result = generator.next_id();
                results.lock().unwrap().push(result);
            });
        }
    });

    results.into_inner().unwrap().into_iter().partition_map()
}

trait PartitionResults {
    fn partition_map(self) -> (Vec<Id64>, Vec<Error>);
}

impl<I> PartitionResults for I
where
    I: Iterator<Item = Result<Id64, Error>>,
{
    fn partition_map(self) -> (Vec<Id64>, Vec<Error>) {
        let mut ids = Vec::new();
        let mut errors = Vec::new();
        for result in self {
            match result {
                Ok(id) => ids.push(id),
                Err(e) => errors.push(e),
            }
        }
        (ids, errors)
    }
}

fn assert_unique(ids: &[Id64]) {
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
}

#[test]
fn rejects_machine_id_overflow() {
    assert!(matches!(
        Generator::new(Id64::MAX_MACHINE_ID + 1, MockTime { millis: 0 }),
        Err(Error::MachineIdOverflow { machine_id: 1024 })
    ));
    assert!(matches!(
        Generator::from_components(0, u64::MAX, 0, MockTime { millis: 0 }),
        Err(Error::MachineIdOverflow { .. })
    ));
    assert!(Generator::new(Id64::MAX_MACHINE_ID, MockTime { millis: 0 }).is_ok());
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = Generator::new(7, MockTime { millis: 42 }).unwrap();

    assert_eq!(generator.next_id(), Ok(encode(42, 7, 0)));
    assert_eq!(generator.next_id(), Ok(encode(42, 7, 1)));
    assert_eq!(generator.next_id(), Ok(encode(42, 7, 2)));
}

#[test]
fn sequence_resets_on_new_tick() {
    let generator = Generator::from_components(41, 0b101, 5, MockTime { millis: 42 }).unwrap();

    assert_eq!(generator.next_id(), Ok(encode(42, 0b101, 0)));
}

#[test]
fn first_call_at_time_zero_continues_initial_state() {
    // A fresh generator starts at last_timestamp = 0, so a clock reading of
    // zero counts as the same tick.
    let generator = Generator::new(3, MockTime { millis: 0 }).unwrap();

    assert_eq!(generator.next_id(), Ok(encode(0, 3, 1)));
    assert_eq!(generator.next_id(), Ok(encode(0, 3, 2)));
}

#[test]
fn overflow_persists_until_next_tick() {
    let time = SharedMockTime::new(42);
    let generator = Generator::from_components(42, 1, Id64::MAX_NUMBER, time.clone()).unwrap();

    // The counter is not rolled back, so every call within the tick fails.
    for attempt in 1..=3 {
        assert_eq!(
            generator.next_id(),
            Err(Error::NumberOverflow {
                number: Id64::MAX_NUMBER + attempt
            })
        );
    }

    time.set(43);
    assert_eq!(generator.next_id(), Ok(encode(43, 1, 0)));
    assert_eq!(generator.next_id(), Ok(encode(43, 1, 1)));
}

#[test]
fn exhausts_a_full_tick_then_heals() {
    let time = SharedMockTime::new(42);
    let generator = Generator::new(1, time.clone()).unwrap();

    for number in 0..=Id64::MAX_NUMBER {
        let id = generator.next_id().unwrap();
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.number(), number);
    }

    let err = generator.next_id().unwrap_err();
    assert!(err.is_transient());

    time.set(43);
    let id = generator.next_id().unwrap();
    assert_eq!((id.timestamp(), id.number()), (43, 0));
}

#[test]
fn timestamp_overflow_is_permanent() {
    let generator = Generator::new(1, MockTime { millis: Id64::MAX_TIMESTAMP + 1 }).unwrap();

    for _ in 0..3 {
        let err = generator.next_id().unwrap_err();
        assert_eq!(
            err,
            Error::TimestampOverflow {
                timestamp: Id64::MAX_TIMESTAMP + 1
            }
        );
        assert!(!err.is_transient());
    }
}

#[test]
fn reads_the_clock_once_per_call() {
    let time = Arc::new(CountingTime {
        millis: 42,
        reads: AtomicU64::new(0),
    });
    let generator = Generator::new(1, Arc::clone(&time)).unwrap();

    for _ in 0..5 {
        generator.next_id().unwrap();
    }
    assert_eq!(time.reads.load(Ordering::SeqCst), 5);
}

#[test]
fn sequence_trait_returns_packed_value() {
    let generator = Generator::new(7, MockTime { millis: 42 }).unwrap();
    let sequence: &dyn IdSequence = &generator;

    assert_eq!(sequence.next_id(), Ok(encode(42, 7, 0).to_raw()));
    assert_eq!(sequence.next_id(), Ok(encode(42, 7, 1).to_raw()));
}

#[test]
fn concurrent_callers_on_one_tick_get_unique_ids() {
    const CALLERS: usize = 64;
    let generator = Generator::new(9, MockTime { millis: 100 }).unwrap();

    let (ids, errors) = run_concurrent_callers(&generator, CALLERS);

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(ids.len(), CALLERS);
    assert_unique(&ids);
    let numbers: HashSet<_> = ids.iter().map(Id64::number).collect();
    assert_eq!(numbers, (0..CALLERS as u64).collect::<HashSet<_>>());
}

#[test]
fn concurrent_callers_past_the_budget_split_into_ids_and_overflows() {
    const CALLERS: usize = 64;
    const PRIMED: u64 = Id64::MAX_NUMBER - 25;
    let generator = Generator::from_components(100, 9, PRIMED, MockTime { millis: 100 }).unwrap();

    let (ids, errors) = run_concurrent_callers(&generator, CALLERS);

    assert_eq!(ids.len() + errors.len(), CALLERS);
    assert_eq!(ids.len(), 25);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, Error::NumberOverflow { .. }))
    );
    assert_unique(&ids);
}

#[test]
fn concurrent_callers_across_a_few_ticks_get_unique_ids() {
    const CALLERS: usize = 64;
    // Non-decreasing clock over a handful of values: 100, 101, 102, 103.
    let reads = AtomicU64::new(0);
    let generator = Generator::new(
        9,
        FnTime(move || 100 + reads.fetch_add(1, Ordering::SeqCst) / 20),
    )
    .unwrap();

    let (ids, errors) = run_concurrent_callers(&generator, CALLERS);

    assert_eq!(ids.len() + errors.len(), CALLERS);
    assert!(errors.is_empty(), "{errors:?}");
    assert_unique(&ids);
    assert!(ids.iter().all(|id| (100..=103).contains(&id.timestamp())));
}

#[test]
fn threaded_monotonic_clock_ids_are_unique() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let clock = MonotonicClock::with_epoch(CUSTOM_EPOCH).unwrap();
    let generator = Generator::new(1, clock).unwrap();
    let seen_ids = Mutex::new(HashSet::with_capacity(TOTAL_IDS));

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                let mut last = Id64::default();
                while local.len() < IDS_PER_THREAD {
                    match generator.next_id() {
                        Ok(id) => {
                            // Each thread observes a strictly increasing sequence.
                            assert!(id > last);
                            last = id;
                            local.push(id);
                        }
                        Err(e) if e.is_transient() => std::thread::yield_now(),
                        Err(e) => panic!("generator error: {e}"),
                    }
                }
                seen_ids.lock().unwrap().extend(local);
            });
        }
    });

    let final_count = seen_ids.into_inner().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn generators_can_share_one_clock() {
    let clock = Arc::new(MonotonicClock::with_epoch(CUSTOM_EPOCH).unwrap());
    let first = Generator::new(1, Arc::clone(&clock)).unwrap();
    let second = Generator::new(2, Arc::clone(&clock)).unwrap();

    let a = first.next_id().unwrap();
    let b = second.next_id().unwrap();

    assert_eq!((a.machine_id(), b.machine_id()), (1, 2));
    assert!(b.timestamp() >= a.timestamp());
    assert!(clock.current_millis() >= b.timestamp());
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn poisoned_lock_is_reported() {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::AtomicBool;

    let armed = AtomicBool::new(true);
    let generator = Generator::new(
        1,
        FnTime(|| {
            assert!(!armed.swap(false, Ordering::SeqCst), "clock failure");
            42_u64
        }),
    )
    .unwrap();

    // The first read panics while the generator holds its lock.
    let panicked = catch_unwind(AssertUnwindSafe(|| generator.next_id()));
    assert!(panicked.is_err());

    assert_eq!(generator.next_id(), Err(Error::LockPoisoned));
}
