use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source used for playback pacing and keep-alive bookkeeping.
///
/// - now(): current monotonic instant
/// - sleep(): block the calling task for `d` (test clocks only advance time)
/// - elapsed_since(): saturating distance from an earlier instant
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Time elapsed since `epoch`, zero if `epoch` lies in the future.
    fn elapsed_since(&self, epoch: Instant) -> Duration {
        self.now().saturating_duration_since(epoch)
    }
}

/// Wall-clock backed by `std::time::Instant` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct State {
        offset: Duration,
        slept: Duration,
        sleeps: usize,
    }

    /// Deterministic clock for tests. Clones share the same timeline.
    ///
    /// now() = origin + offset
    /// sleep(d) advances the offset by d and records the request instead of blocking.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        state: Arc<Mutex<State>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                state: Arc::new(Mutex::new(State::default())),
            }
        }

        /// Move time forward without counting it as a sleep.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut st) = self.state.lock() {
                st.offset = st.offset.saturating_add(d);
            }
        }

        /// Total time requested through `sleep`.
        pub fn slept(&self) -> Duration {
            self.state.lock().map(|st| st.slept).unwrap_or(Duration::ZERO)
        }

        /// Number of `sleep` calls observed.
        pub fn sleep_calls(&self) -> usize {
            self.state.lock().map(|st| st.sleeps).unwrap_or(0)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.state.lock().map(|st| st.offset).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut st) = self.state.lock() {
                st.offset = st.offset.saturating_add(d);
                st.slept = st.slept.saturating_add(d);
                st.sleeps += 1;
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sleep_advances_shared_timeline() {
            let clock = TestClock::new();
            let other = clock.clone();
            let t0 = clock.now();
            other.sleep(Duration::from_millis(100));
            clock.advance(Duration::from_millis(5));
            assert_eq!(clock.elapsed_since(t0), Duration::from_millis(105));
            assert_eq!(clock.slept(), Duration::from_millis(100));
            assert_eq!(clock.sleep_calls(), 1);
        }

        #[test]
        fn elapsed_saturates_for_future_epoch() {
            let clock = TestClock::new();
            let future = clock.now() + Duration::from_secs(1);
            assert_eq!(clock.elapsed_since(future), Duration::ZERO);
        }
    }
}
