//! Clock adapters for time operations.
//!
//! Provides SystemClock implementation for production use.
//!
//! # Testing
//!
//! See `MockClock` (in `crate::infrastructure::mocks`) for a controllable test clock.
//! Available with the `test-helpers` feature or in test builds:
//!
//! ```toml
//! [dev-dependencies]
//! event-constraints = { version = "*", features = ["test-helpers"] }
//! ```

use crate::application::ports::Clock;
use std::time::{SystemTime, UNIX_EPOCH};

/// System clock implementation using `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // A clock set before 1970 reports the epoch itself
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis().try_into().unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock() {
        let clock = SystemClock::new();
        let t1 = clock.now_millis();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.now_millis();

        assert!(t2 > t1);
    }

    #[test]
    fn test_system_clock_is_wall_time() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock::new().now_millis() > 1_577_836_800_000);
    }
}
