// Clock Port (for testability)

use std::sync::OnceLock;
use std::time::Instant;

/// Monotonic time source with microsecond resolution.
pub trait Clock: Send + Sync {
    /// Microseconds since an arbitrary, fixed origin
    fn now_micros(&self) -> i64;
}

/// Process-relative monotonic clock (production)
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

fn process_origin() -> Instant {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    *ORIGIN.get_or_init(Instant::now)
}

impl Clock for MonotonicClock {
    fn now_micros(&self) -> i64 {
        i64::try_from(process_origin().elapsed().as_micros()).unwrap_or(i64::MAX)
    }
}

/// Mock implementations for testing
pub mod mocks {
    use super::Clock;
    use crate::domain::TimeDelta;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to
    #[derive(Debug, Default)]
    pub struct ManualClock {
        now_us: AtomicI64,
    }

    impl ManualClock {
        pub fn new(start_us: i64) -> Self {
            Self {
                now_us: AtomicI64::new(start_us),
            }
        }

        pub fn advance(&self, delta: TimeDelta) {
            self.now_us.fetch_add(delta.us(), Ordering::SeqCst);
        }

        pub fn set_micros(&self, now_us: i64) {
            self.now_us.store(now_us, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_micros(&self) -> i64 {
            self.now_us.load(Ordering::SeqCst)
        }
    }
}
