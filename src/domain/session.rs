//! Session metadata attached to every event.

use serde::{Deserialize, Serialize};

/// The analytics session an event was recorded in.
///
/// Timestamps are milliseconds since the Unix epoch. A session without a
/// stop timestamp is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSession {
    /// Session identifier
    pub id: String,
    /// When the session started
    pub start_timestamp: u64,
    /// When the session stopped, if it has
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_timestamp: Option<u64>,
}

impl EventSession {
    /// Create an open session.
    pub fn new(id: impl Into<String>, start_timestamp: u64) -> Self {
        Self {
            id: id.into(),
            start_timestamp,
            stop_timestamp: None,
        }
    }

    /// Mark the session as stopped.
    pub fn with_stop(mut self, stop_timestamp: u64) -> Self {
        self.stop_timestamp = Some(stop_timestamp);
        self
    }

    /// Session length in milliseconds, or `None` while the session is open.
    ///
    /// A stop timestamp earlier than the start yields zero.
    pub fn duration(&self) -> Option<u64> {
        self.stop_timestamp
            .map(|stop| stop.saturating_sub(self.start_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_session_has_no_duration() {
        let session = EventSession::new("s-1", 1_000);
        assert_eq!(session.duration(), None);
    }

    #[test]
    fn test_stopped_session_duration() {
        let session = EventSession::new("s-1", 1_000).with_stop(4_500);
        assert_eq!(session.duration(), Some(3_500));
    }

    #[test]
    fn test_clock_skew_saturates() {
        let session = EventSession::new("s-1", 5_000).with_stop(4_000);
        assert_eq!(session.duration(), Some(0));
    }
}
