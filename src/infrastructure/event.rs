//! Default event record.
//!
//! `AnalyticsEvent` is the record the SDK queues for upload. It stores
//! entries as given; limits are the job of the guard wrapping it.

use crate::application::ports::{Clock, EventRecord, RecordError};
use crate::domain::session::EventSession;
use crate::infrastructure::clock::SystemClock;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// SDK name stamped on events when none is given.
pub const DEFAULT_SDK_NAME: &str = "event-constraints";

/// SDK version stamped on events when none is given.
pub const DEFAULT_SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A telemetry event with string attributes and numeric metrics.
///
/// # Example
/// ```
/// use event_constraints::{AnalyticsEvent, EventRecord, EventSession};
///
/// let mut event = AnalyticsEvent::builder("level_complete")
///     .with_session(EventSession::new("session-1", 1_700_000_000_000))
///     .build();
/// event.put_metric("score".to_string(), 4200.0).unwrap();
///
/// let json = event.to_json().unwrap();
/// let restored = AnalyticsEvent::from_json(&json).unwrap();
/// assert_eq!(restored.metric("score"), Some(4200.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    event_id: String,
    event_type: String,
    timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unique_id: Option<String>,
    sdk_name: String,
    sdk_version: String,
    session: EventSession,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    metrics: HashMap<String, f64>,
}

/// Builder for constructing an `AnalyticsEvent`.
#[derive(Debug)]
pub struct AnalyticsEventBuilder {
    event_type: String,
    session: Option<EventSession>,
    unique_id: Option<String>,
    sdk_name: String,
    sdk_version: String,
    clock: Arc<dyn Clock>,
}

impl AnalyticsEventBuilder {
    /// Attach the event to a session.
    ///
    /// Without one, the event gets a fresh session starting at its own timestamp.
    pub fn with_session(mut self, session: EventSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the client identifier.
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Set the SDK name and version reported with the event.
    pub fn with_sdk(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.sdk_name = name.into();
        self.sdk_version = version.into();
        self
    }

    /// Use a custom clock for the event timestamp.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the event, stamping it with a new id and the current time.
    pub fn build(self) -> AnalyticsEvent {
        let timestamp = self.clock.now_millis();
        let session = self
            .session
            .unwrap_or_else(|| EventSession::new(Uuid::new_v4().to_string(), timestamp));

        AnalyticsEvent {
            event_id: Uuid::new_v4().to_string(),
            event_type: self.event_type,
            timestamp,
            unique_id: self.unique_id,
            sdk_name: self.sdk_name,
            sdk_version: self.sdk_version,
            session,
            attributes: HashMap::new(),
            metrics: HashMap::new(),
        }
    }
}

impl AnalyticsEvent {
    /// Start building an event of the given type.
    pub fn builder(event_type: impl Into<String>) -> AnalyticsEventBuilder {
        AnalyticsEventBuilder {
            event_type: event_type.into(),
            session: None,
            unique_id: None,
            sdk_name: DEFAULT_SDK_NAME.to_string(),
            sdk_version: DEFAULT_SDK_VERSION.to_string(),
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Restore an event previously produced by [`EventRecord::to_json`].
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Name of the SDK that recorded the event.
    pub fn sdk_name(&self) -> &str {
        &self.sdk_name
    }

    /// Version of the SDK that recorded the event.
    pub fn sdk_version(&self) -> &str {
        &self.sdk_version
    }
}

impl EventRecord for AnalyticsEvent {
    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref()
    }

    fn session(&self) -> &EventSession {
        &self.session
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    fn put_attribute(&mut self, key: String, value: String) -> Result<(), RecordError> {
        self.attributes.insert(key, value);
        Ok(())
    }

    fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    fn has_metric(&self, key: &str) -> bool {
        self.metrics.contains_key(key)
    }

    fn put_metric(&mut self, key: String, value: f64) -> Result<(), RecordError> {
        self.metrics.insert(key, value);
        Ok(())
    }

    fn all_attributes(&self) -> HashMap<String, String> {
        self.attributes.clone()
    }

    fn all_metrics(&self) -> HashMap<String, f64> {
        self.metrics.clone()
    }

    fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }
}
