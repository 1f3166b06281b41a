//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock clock for testing.
///
/// Allows tests to pin event timestamps, so serialized events can be
/// compared byte for byte.
///
/// # Examples
///
/// ```
/// use event_constraints::infrastructure::mocks::MockClock;
/// use event_constraints::application::ports::Clock;
/// use std::time::Duration;
///
/// let clock = MockClock::new(1_000);
/// assert_eq!(clock.now_millis(), 1_000);
///
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(clock.now_millis(), 3_000);
///
/// clock.set(10);
/// assert_eq!(clock.now_millis(), 10);
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying time value, so advancing time in
/// one clone affects all clones.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_millis: Arc<Mutex<u64>>,
}

impl MockClock {
    /// Create a mock clock starting at the given epoch milliseconds.
    pub fn new(start_millis: u64) -> Self {
        Self {
            current_millis: Arc::new(Mutex::new(start_millis)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_millis
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        let step: u64 = duration.as_millis().try_into().unwrap_or(u64::MAX);
        *time = time.saturating_add(step);
    }

    /// Set the clock to specific epoch milliseconds.
    pub fn set(&self, millis: u64) {
        let mut time = self
            .current_millis
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = millis;
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        *self
            .current_millis
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}
