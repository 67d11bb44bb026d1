//! Time source for hardware settling delays.
//!
//! Drivers that must wait for hardware to settle sleep through a [`Clock`]
//! instead of calling `std::thread::sleep` directly, so the wait can be
//! observed on a synthetic clock.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Blocking sleep source.
pub trait Clock {
    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock; sleeps the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Synthetic clock that advances instantly.
///
/// Clones share the same elapsed time, so a test can keep one handle while the
/// driver owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time slept so far.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner) += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        clock.sleep(Duration::from_millis(200));
        clock.sleep(Duration::from_millis(300));
        assert_eq!(handle.elapsed(), Duration::from_millis(500));
    }
}
