//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::session::EventSession;
use std::collections::HashMap;
use std::fmt::{self, Debug};

/// Error reported by an event record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record refused to store an entry
    Rejected {
        /// Key of the refused entry
        key: String,
        /// Why it was refused
        reason: String,
    },
    /// The record could not be serialized or deserialized
    Serialization(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Rejected { key, reason } => {
                write!(f, "record rejected entry '{}': {}", key, reason)
            }
            RecordError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Serialization(e.to_string())
    }
}

/// Port for a mutable telemetry event.
///
/// The guard wraps any implementation of this trait and intercepts the two
/// mutating calls. Everything else is forwarded unchanged.
/// Infrastructure provides the concrete implementation (`AnalyticsEvent`).
pub trait EventRecord: Send + Debug {
    /// The event type identifier.
    fn event_type(&self) -> &str;

    /// Unique identifier of this event.
    fn event_id(&self) -> &str;

    /// When the event was recorded, in epoch milliseconds.
    fn timestamp(&self) -> u64;

    /// Client identifier, if known.
    fn unique_id(&self) -> Option<&str>;

    /// Session the event belongs to.
    fn session(&self) -> &EventSession;

    /// Look up an attribute value.
    fn attribute(&self, key: &str) -> Option<&str>;

    /// Check whether an attribute exists.
    fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// Store an attribute, replacing any existing value.
    fn put_attribute(&mut self, key: String, value: String) -> Result<(), RecordError>;

    /// Look up a metric value.
    fn metric(&self, key: &str) -> Option<f64>;

    /// Check whether a metric exists.
    fn has_metric(&self, key: &str) -> bool {
        self.metric(key).is_some()
    }

    /// Store a metric, replacing any existing value.
    fn put_metric(&mut self, key: String, value: f64) -> Result<(), RecordError>;

    /// Copy of all attributes.
    fn all_attributes(&self) -> HashMap<String, String>;

    /// Copy of all metrics.
    fn all_metrics(&self) -> HashMap<String, f64>;

    /// Serialize the event for upload.
    fn to_json(&self) -> Result<String, RecordError>;
}

/// Port for obtaining the current wall-clock time.
///
/// Event timestamps are wall-clock milliseconds, so this is based on
/// `SystemTime` rather than `Instant`.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}
