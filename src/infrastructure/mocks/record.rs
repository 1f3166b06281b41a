//! Mock event record that misbehaves on demand.

use crate::application::ports::{EventRecord, RecordError};
use crate::domain::session::EventSession;
use std::collections::HashMap;

/// Failure mode injected by a [`FaultyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Behave like a normal in-memory record
    Healthy,
    /// Return `RecordError::Rejected` from every write
    RejectWrites,
    /// Panic inside every write
    PanicOnWrite,
    /// Panic inside `has_attribute` / `has_metric`
    PanicOnQuery,
}

/// In-memory record for exercising the guard's failure handling.
#[derive(Debug, Clone)]
pub struct FaultyRecord {
    fault: Fault,
    session: EventSession,
    attributes: HashMap<String, String>,
    metrics: HashMap<String, f64>,
    writes: usize,
}

impl FaultyRecord {
    /// Create a record with the given failure mode.
    pub fn new(fault: Fault) -> Self {
        Self {
            fault,
            session: EventSession::new("mock-session", 0),
            attributes: HashMap::new(),
            metrics: HashMap::new(),
            writes: 0,
        }
    }

    /// Number of writes that reached the record, including failed ones.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn before_write(&mut self, key: &str) -> Result<(), RecordError> {
        self.writes += 1;
        match self.fault {
            Fault::RejectWrites => Err(RecordError::Rejected {
                key: key.to_string(),
                reason: "mock record is read-only".to_string(),
            }),
            Fault::PanicOnWrite => panic!("mock record panicked on write of '{}'", key),
            Fault::Healthy | Fault::PanicOnQuery => Ok(()),
        }
    }

    fn before_query(&self) {
        if self.fault == Fault::PanicOnQuery {
            panic!("mock record panicked on query");
        }
    }
}

impl EventRecord for FaultyRecord {
    fn event_type(&self) -> &str {
        "mock"
    }

    fn event_id(&self) -> &str {
        "mock-event"
    }

    fn timestamp(&self) -> u64 {
        0
    }

    fn unique_id(&self) -> Option<&str> {
        None
    }

    fn session(&self) -> &EventSession {
        &self.session
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn has_attribute(&self, key: &str) -> bool {
        self.before_query();
        self.attributes.contains_key(key)
    }

    fn put_attribute(&mut self, key: String, value: String) -> Result<(), RecordError> {
        self.before_write(&key)?;
        self.attributes.insert(key, value);
        Ok(())
    }

    fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    fn has_metric(&self, key: &str) -> bool {
        self.before_query();
        self.metrics.contains_key(key)
    }

    fn put_metric(&mut self, key: String, value: f64) -> Result<(), RecordError> {
        self.before_write(&key)?;
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
        Err(RecordError::Serialization(
            "mock record cannot be serialized".to_string(),
        ))
    }
}
