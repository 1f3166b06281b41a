//! Constraint guard for event attributes and metrics.
//!
//! The guard wraps an [`EventRecord`] and intercepts its two mutating calls,
//! keeping the event within the analytics service's per-event limits. It never
//! reports a failure to the caller: a write that cannot be applied is dropped,
//! and the event stays as it was.

use crate::application::metrics::GuardMetrics;
use crate::application::ports::{EventRecord, RecordError};
use crate::domain::limits::{truncate_chars, BuildError, EventLimits};
use crate::domain::outcome::AddOutcome;
use crate::domain::session::EventSession;

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

/// Internal failure while applying a guarded operation.
///
/// Never escapes a public method; it is logged and turned into a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GuardError {
    /// The wrapped record returned an error
    Record {
        operation: &'static str,
        source: RecordError,
    },
    /// The wrapped record panicked
    Panicked { operation: &'static str },
}

impl GuardError {
    fn operation(&self) -> &'static str {
        match self {
            GuardError::Record { operation, .. } | GuardError::Panicked { operation } => {
                *operation
            }
        }
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Record { operation, source } => {
                write!(f, "{} failed: {}", operation, source)
            }
            GuardError::Panicked { operation } => write!(f, "{} panicked", operation),
        }
    }
}

impl std::error::Error for GuardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GuardError::Record { source, .. } => Some(source),
            GuardError::Panicked { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Attribute,
    Metric,
}

impl EntryKind {
    fn operation(self) -> &'static str {
        match self {
            EntryKind::Attribute => "add_attribute",
            EntryKind::Metric => "add_metric",
        }
    }
}

#[derive(Debug)]
struct GuardState<R> {
    record: R,
    current_count: usize,
}

/// Builder for constructing an `EventConstraintGuard`.
#[derive(Debug)]
pub struct EventConstraintGuardBuilder<R> {
    record: R,
    limits: EventLimits,
    metrics: Option<GuardMetrics>,
}

impl<R: EventRecord> EventConstraintGuardBuilder<R> {
    /// Set the ceiling on combined attribute + metric entries.
    pub fn with_max_attributes_and_metrics(mut self, max: usize) -> Self {
        self.limits.max_entries = max;
        self
    }

    /// Set the maximum key length in characters.
    pub fn with_max_key_length(mut self, max: usize) -> Self {
        self.limits.max_key_length = max;
        self
    }

    /// Set the maximum attribute value length in characters.
    pub fn with_max_value_length(mut self, max: usize) -> Self {
        self.limits.max_value_length = max;
        self
    }

    /// Replace all limits at once.
    pub fn with_limits(mut self, limits: EventLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Report into a shared metrics tracker instead of a private one.
    pub fn with_metrics(mut self, metrics: GuardMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the guard.
    ///
    /// # Errors
    /// Returns `BuildError` if a length limit is zero.
    pub fn build(self) -> Result<EventConstraintGuard<R>, BuildError> {
        self.limits.validate()?;
        Ok(EventConstraintGuard::from_parts(
            self.record,
            self.limits,
            self.metrics.unwrap_or_default(),
        ))
    }
}

/// Bounded attribute/metric validator wrapping an event record.
///
/// Enforces, for every write made through it:
/// - at most `max_entries` attributes and metrics combined,
/// - keys clipped to `max_key_length` characters,
/// - attribute values clipped to `max_value_length` characters,
/// - first writer wins on duplicate keys.
///
/// Both adders hold one lock across the whole check, truncate, write and
/// increment sequence, so concurrent callers on the same guard cannot push
/// the event past its limit.
///
/// # Example
/// ```
/// use event_constraints::{AnalyticsEvent, EventConstraintGuard, EventSession};
///
/// let event = AnalyticsEvent::builder("purchase")
///     .with_session(EventSession::new("session-1", 0))
///     .build();
/// let guard = EventConstraintGuard::with_max_attributes_and_metrics(event, 2);
///
/// assert!(guard.add_attribute("a", "1").is_added());
/// assert!(guard.add_metric("b", 2.0).is_added());
/// assert!(guard.add_attribute("c", "3").is_dropped());
///
/// assert_eq!(guard.current_count(), 2);
/// assert!(!guard.has_attribute("c"));
/// ```
pub struct EventConstraintGuard<R: EventRecord> {
    state: Mutex<GuardState<R>>,
    limits: EventLimits,
    metrics: GuardMetrics,
}

impl<R: EventRecord> EventConstraintGuard<R> {
    /// Wrap a record using the default limits.
    pub fn new(record: R) -> Self {
        Self::from_parts(record, EventLimits::default(), GuardMetrics::new())
    }

    /// Wrap a record with a custom combined entry ceiling.
    pub fn with_max_attributes_and_metrics(record: R, max: usize) -> Self {
        Self::from_parts(record, EventLimits::with_max_entries(max), GuardMetrics::new())
    }

    /// Create a builder for a guard around `record`.
    pub fn builder(record: R) -> EventConstraintGuardBuilder<R> {
        EventConstraintGuardBuilder {
            record,
            limits: EventLimits::default(),
            metrics: None,
        }
    }

    fn from_parts(record: R, limits: EventLimits, metrics: GuardMetrics) -> Self {
        Self {
            state: Mutex::new(GuardState {
                record,
                current_count: 0,
            }),
            limits,
            metrics,
        }
    }

    /// Add a string attribute.
    ///
    /// No-op when either input is `None`, when the attribute already exists,
    /// or when the event is full. Oversized keys and values are clipped.
    pub fn add_attribute<'k, 'v>(
        &self,
        key: impl Into<Option<&'k str>>,
        value: impl Into<Option<&'v str>>,
    ) -> AddOutcome {
        let (key, value) = match (key.into(), value.into()) {
            (Some(key), Some(value)) => (key, value),
            _ => {
                self.metrics.record_invalid_input();
                return AddOutcome::InvalidInput;
            }
        };

        let mut state = self.lock();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.try_add_attribute(&mut state, key, value)
        }));
        self.settle(EntryKind::Attribute, result)
    }

    /// Add a numeric metric.
    ///
    /// Same contract as [`add_attribute`](Self::add_attribute), but only the
    /// key is length-limited and duplicates are checked against the metrics.
    /// NaN and infinite values are rejected as invalid input, since they
    /// cannot survive a JSON round trip.
    pub fn add_metric<'k>(
        &self,
        key: impl Into<Option<&'k str>>,
        value: impl Into<Option<f64>>,
    ) -> AddOutcome {
        let (key, value) = match (key.into(), value.into()) {
            (Some(key), Some(value)) if value.is_finite() => (key, value),
            _ => {
                self.metrics.record_invalid_input();
                return AddOutcome::InvalidInput;
            }
        };

        let mut state = self.lock();
        let result =
            panic::catch_unwind(AssertUnwindSafe(|| self.try_add_metric(&mut state, key, value)));
        self.settle(EntryKind::Metric, result)
    }

    /// Chainable form of [`add_attribute`](Self::add_attribute).
    pub fn with_attribute<'k, 'v>(
        self,
        key: impl Into<Option<&'k str>>,
        value: impl Into<Option<&'v str>>,
    ) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Chainable form of [`add_metric`](Self::add_metric).
    pub fn with_metric<'k>(
        self,
        key: impl Into<Option<&'k str>>,
        value: impl Into<Option<f64>>,
    ) -> Self {
        self.add_metric(key, value);
        self
    }

    fn try_add_attribute(
        &self,
        state: &mut GuardState<R>,
        key: &str,
        value: &str,
    ) -> Result<AddOutcome, GuardError> {
        if state.record.has_attribute(key) {
            return Ok(AddOutcome::Duplicate);
        }
        if state.current_count >= self.limits.max_entries {
            return Ok(AddOutcome::CapacityExceeded);
        }

        let clipped_key = truncate_chars(key, self.limits.max_key_length);
        let stored_key = clipped_key.unwrap_or(key);
        // Two long keys can share a prefix; the clipped key must be new too.
        if clipped_key.is_some() && state.record.has_attribute(stored_key) {
            return Ok(AddOutcome::Duplicate);
        }
        let clipped_value = truncate_chars(value, self.limits.max_value_length);
        let stored_value = clipped_value.unwrap_or(value);

        if clipped_key.is_some() {
            warn!(
                event_type = state.record.event_type(),
                key = stored_key,
                max_length = self.limits.max_key_length,
                "attribute key truncated"
            );
        }
        if clipped_value.is_some() {
            warn!(
                event_type = state.record.event_type(),
                key = stored_key,
                max_length = self.limits.max_value_length,
                "attribute value truncated"
            );
        }

        state
            .record
            .put_attribute(stored_key.to_owned(), stored_value.to_owned())
            .map_err(|source| GuardError::Record {
                operation: EntryKind::Attribute.operation(),
                source,
            })?;
        state.current_count += 1;

        Ok(AddOutcome::Added {
            truncated: clipped_key.is_some() || clipped_value.is_some(),
        })
    }

    fn try_add_metric(
        &self,
        state: &mut GuardState<R>,
        key: &str,
        value: f64,
    ) -> Result<AddOutcome, GuardError> {
        if state.record.has_metric(key) {
            return Ok(AddOutcome::Duplicate);
        }
        if state.current_count >= self.limits.max_entries {
            return Ok(AddOutcome::CapacityExceeded);
        }

        let clipped_key = truncate_chars(key, self.limits.max_key_length);
        let stored_key = clipped_key.unwrap_or(key);
        if clipped_key.is_some() {
            if state.record.has_metric(stored_key) {
                return Ok(AddOutcome::Duplicate);
            }
            warn!(
                event_type = state.record.event_type(),
                key = stored_key,
                max_length = self.limits.max_key_length,
                "metric key truncated"
            );
        }

        state
            .record
            .put_metric(stored_key.to_owned(), value)
            .map_err(|source| GuardError::Record {
                operation: EntryKind::Metric.operation(),
                source,
            })?;
        state.current_count += 1;

        Ok(AddOutcome::Added {
            truncated: clipped_key.is_some(),
        })
    }

    /// Collapse the result of a guarded write into an outcome, logging and
    /// counting along the way.
    fn settle(
        &self,
        kind: EntryKind,
        result: std::thread::Result<Result<AddOutcome, GuardError>>,
    ) -> AddOutcome {
        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => self.fail(e),
            Err(_) => self.fail(GuardError::Panicked {
                operation: kind.operation(),
            }),
        };

        match outcome {
            AddOutcome::Added { truncated } => {
                match kind {
                    EntryKind::Attribute => self.metrics.record_attribute_added(),
                    EntryKind::Metric => self.metrics.record_metric_added(),
                }
                if truncated {
                    self.metrics.record_truncation();
                }
            }
            AddOutcome::Duplicate => {
                debug!(operation = kind.operation(), "duplicate key ignored");
                self.metrics.record_duplicate();
            }
            AddOutcome::CapacityExceeded => {
                debug!(
                    operation = kind.operation(),
                    max_entries = self.limits.max_entries,
                    "event full, entry dropped"
                );
                self.metrics.record_capacity_drop();
            }
            // Counted where they are detected
            AddOutcome::InvalidInput | AddOutcome::Failed => {}
        }

        outcome
    }

    fn fail(&self, e: GuardError) -> AddOutcome {
        error!(operation = e.operation(), error = %e, "event constraint operation failed");
        self.metrics.record_failure();
        AddOutcome::Failed
    }

    /// Run a read-only query against the record, treating a panic as `fallback`.
    fn query<T>(&self, operation: &'static str, fallback: T, f: impl FnOnce(&R) -> T) -> T {
        let state = self.lock();
        match panic::catch_unwind(AssertUnwindSafe(|| f(&state.record))) {
            Ok(value) => value,
            Err(_) => {
                self.fail(GuardError::Panicked { operation });
                fallback
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, GuardState<R>> {
        // Record panics are caught while the lock is held; the counter is
        // only bumped after a successful write, so the state is never torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether an attribute exists. Failures report `false`.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.query("has_attribute", false, |record| record.has_attribute(key))
    }

    /// Check whether a metric exists. Failures report `false`.
    pub fn has_metric(&self, key: &str) -> bool {
        self.query("has_metric", false, |record| record.has_metric(key))
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.lock().record.attribute(key).map(str::to_owned)
    }

    /// Look up a metric value.
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.lock().record.metric(key)
    }

    /// Copy of all attributes.
    pub fn all_attributes(&self) -> HashMap<String, String> {
        self.lock().record.all_attributes()
    }

    /// Copy of all metrics.
    pub fn all_metrics(&self) -> HashMap<String, f64> {
        self.lock().record.all_metrics()
    }

    /// The event type of the wrapped record.
    pub fn event_type(&self) -> String {
        self.lock().record.event_type().to_owned()
    }

    /// The event id of the wrapped record.
    pub fn event_id(&self) -> String {
        self.lock().record.event_id().to_owned()
    }

    /// When the event was recorded, in epoch milliseconds.
    pub fn timestamp(&self) -> u64 {
        self.lock().record.timestamp()
    }

    /// Client identifier of the wrapped record.
    pub fn unique_id(&self) -> Option<String> {
        self.lock().record.unique_id().map(str::to_owned)
    }

    /// Copy of the session metadata.
    pub fn session(&self) -> EventSession {
        self.lock().record.session().clone()
    }

    /// Identifier of the event's session.
    pub fn session_id(&self) -> String {
        self.lock().record.session().id.clone()
    }

    /// When the session started, in epoch milliseconds.
    pub fn session_start(&self) -> u64 {
        self.lock().record.session().start_timestamp
    }

    /// When the session stopped, if it has.
    pub fn session_stop(&self) -> Option<u64> {
        self.lock().record.session().stop_timestamp
    }

    /// Session length in milliseconds, or `None` while it is open.
    pub fn session_duration(&self) -> Option<u64> {
        self.lock().record.session().duration()
    }

    /// Serialize the wrapped record.
    pub fn to_json(&self) -> Result<String, RecordError> {
        self.lock().record.to_json()
    }

    /// Number of entries accepted so far.
    pub fn current_count(&self) -> usize {
        self.lock().current_count
    }

    /// Configured ceiling on combined entries.
    pub fn max_entries(&self) -> usize {
        self.limits.max_entries
    }

    /// How many more entries the event accepts.
    pub fn remaining_capacity(&self) -> usize {
        self.limits.max_entries.saturating_sub(self.current_count())
    }

    /// Limits enforced by this guard.
    pub fn limits(&self) -> &EventLimits {
        &self.limits
    }

    /// Metrics tracker for this guard.
    pub fn metrics(&self) -> &GuardMetrics {
        &self.metrics
    }

    /// Finalize the event and hand back the wrapped record.
    pub fn into_inner(self) -> R {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .record
    }
}

impl<R: EventRecord> fmt::Debug for EventConstraintGuard<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("EventConstraintGuard")
            .field("record", &state.record)
            .field("current_count", &state.current_count)
            .field("limits", &self.limits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::limits::{
        MAX_EVENT_ATTRIBUTE_METRIC_KEY_LENGTH, MAX_EVENT_ATTRIBUTE_VALUE_LENGTH,
    };
    use crate::infrastructure::event::AnalyticsEvent;
    use crate::infrastructure::mocks::{Fault, FaultyRecord};
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn event() -> AnalyticsEvent {
        AnalyticsEvent::builder("test_event")
            .with_session(EventSession::new("session-1", 1_000))
            .build()
    }

    #[test]
    fn test_add_attribute_stores_and_counts() {
        let guard = EventConstraintGuard::new(event());

        let outcome = guard.add_attribute("color", "blue");

        assert_eq!(outcome, AddOutcome::Added { truncated: false });
        assert_eq!(guard.attribute("color").as_deref(), Some("blue"));
        assert_eq!(guard.current_count(), 1);
        assert_eq!(guard.metrics().attributes_added(), 1);
    }

    #[test]
    fn test_add_metric_stores_and_counts() {
        let guard = EventConstraintGuard::new(event());

        assert!(guard.add_metric("price", 9.99).is_added());
        assert_eq!(guard.metric("price"), Some(9.99));
        assert!(guard.has_metric("price"));
        assert_eq!(guard.current_count(), 1);
    }

    #[test]
    fn test_none_inputs_are_ignored() {
        let guard = EventConstraintGuard::new(event());

        assert_eq!(guard.add_attribute(None, "v"), AddOutcome::InvalidInput);
        assert_eq!(guard.add_attribute("k", None), AddOutcome::InvalidInput);
        assert_eq!(guard.add_metric(None, 1.0), AddOutcome::InvalidInput);
        assert_eq!(guard.add_metric("k", None), AddOutcome::InvalidInput);

        assert_eq!(guard.current_count(), 0);
        assert!(guard.all_attributes().is_empty());
        assert!(guard.all_metrics().is_empty());
        assert_eq!(guard.metrics().invalid_inputs(), 4);
    }

    #[test]
    fn test_first_writer_wins() {
        let guard = EventConstraintGuard::new(event());

        guard.add_attribute("k", "first");
        assert_eq!(guard.add_attribute("k", "second"), AddOutcome::Duplicate);

        assert_eq!(guard.attribute("k").as_deref(), Some("first"));
        assert_eq!(guard.current_count(), 1);

        guard.add_metric("m", 1.0);
        assert_eq!(guard.add_metric("m", 2.0), AddOutcome::Duplicate);
        assert_eq!(guard.metric("m"), Some(1.0));
        assert_eq!(guard.current_count(), 2);
    }

    #[test]
    fn test_attribute_and_metric_keys_are_independent() {
        let guard = EventConstraintGuard::new(event());

        assert!(guard.add_attribute("shared", "v").is_added());
        assert!(guard.add_metric("shared", 1.0).is_added());
        assert_eq!(guard.current_count(), 2);
    }

    #[test]
    fn test_long_key_truncated() {
        let guard = EventConstraintGuard::new(event());
        let key = "x".repeat(45);

        let outcome = guard.add_attribute(key.as_str(), "v");

        assert_eq!(outcome, AddOutcome::Added { truncated: true });
        let stored = "x".repeat(MAX_EVENT_ATTRIBUTE_METRIC_KEY_LENGTH);
        assert!(guard.has_attribute(&stored));
        assert!(!guard.has_attribute(&key));
        assert_eq!(guard.metrics().truncations(), 1);
    }

    #[test]
    fn test_long_value_truncated() {
        let guard = EventConstraintGuard::new(event());
        let value = "v".repeat(250);

        guard.add_attribute("k", value.as_str());

        let stored = guard.attribute("k").unwrap();
        assert_eq!(stored, "v".repeat(MAX_EVENT_ATTRIBUTE_VALUE_LENGTH));
    }

    #[test]
    fn test_long_metric_key_truncated_value_untouched() {
        let guard = EventConstraintGuard::new(event());
        let key = "m".repeat(60);

        let outcome = guard.add_metric(key.as_str(), 123456789.125);

        assert!(outcome.is_truncated());
        assert_eq!(guard.metric(&"m".repeat(40)), Some(123456789.125));
    }

    #[test]
    fn test_truncated_key_collision_is_duplicate() {
        let guard = EventConstraintGuard::new(event());
        let prefix = "p".repeat(40);

        assert!(guard.add_attribute(format!("{}AAA", prefix).as_str(), "first").is_added());
        assert_eq!(
            guard.add_attribute(format!("{}BBB", prefix).as_str(), "second"),
            AddOutcome::Duplicate
        );

        assert_eq!(guard.attribute(&prefix).as_deref(), Some("first"));
        assert_eq!(guard.current_count(), 1);
    }

    #[test]
    fn test_capacity_shared_between_attributes_and_metrics() {
        let guard = EventConstraintGuard::with_max_attributes_and_metrics(event(), 2);

        assert!(guard.add_attribute("a", "1").is_added());
        assert_eq!(guard.current_count(), 1);
        assert!(guard.add_metric("b", 2.0).is_added());
        assert_eq!(guard.current_count(), 2);

        assert_eq!(guard.add_attribute("c", "3"), AddOutcome::CapacityExceeded);
        assert_eq!(guard.add_metric("d", 4.0), AddOutcome::CapacityExceeded);

        assert_eq!(guard.current_count(), 2);
        assert!(!guard.has_attribute("c"));
        assert!(!guard.has_metric("d"));
        assert_eq!(guard.remaining_capacity(), 0);
        assert_eq!(guard.metrics().capacity_drops(), 2);
    }

    #[test]
    fn test_duplicate_reported_before_capacity() {
        let guard = EventConstraintGuard::with_max_attributes_and_metrics(event(), 1);

        guard.add_attribute("a", "1");
        assert_eq!(guard.add_attribute("a", "2"), AddOutcome::Duplicate);
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let guard = EventConstraintGuard::with_max_attributes_and_metrics(event(), 0);

        assert_eq!(guard.add_attribute("a", "1"), AddOutcome::CapacityExceeded);
        assert_eq!(guard.current_count(), 0);
    }

    #[test]
    fn test_default_capacity() {
        let guard = EventConstraintGuard::new(event());

        for i in 0..60 {
            guard.add_attribute(format!("attr{}", i).as_str(), "v");
        }

        assert_eq!(guard.current_count(), 50);
        assert_eq!(guard.all_attributes().len(), 50);
    }

    #[test]
    fn test_non_finite_metrics_are_invalid() {
        let guard = EventConstraintGuard::new(event());

        assert_eq!(guard.add_metric("nan", f64::NAN), AddOutcome::InvalidInput);
        assert_eq!(guard.add_metric("inf", f64::INFINITY), AddOutcome::InvalidInput);
        assert_eq!(
            guard.add_metric("neg_inf", f64::NEG_INFINITY),
            AddOutcome::InvalidInput
        );

        assert_eq!(guard.current_count(), 0);
        assert!(!guard.has_metric("nan"));
        assert_eq!(guard.metrics().invalid_inputs(), 3);
    }

    #[test]
    fn test_builder_with_limits() {
        let limits = EventLimits {
            max_entries: 1,
            max_key_length: 3,
            max_value_length: 5,
        };
        let guard = EventConstraintGuard::builder(event())
            .with_limits(limits)
            .build()
            .unwrap();

        assert_eq!(guard.limits(), &limits);
        assert!(guard.add_attribute("abcdef", "123456789").is_truncated());
        assert_eq!(guard.attribute("abc").as_deref(), Some("12345"));
        assert_eq!(guard.add_metric("m", 1.0), AddOutcome::CapacityExceeded);
    }

    #[test]
    fn test_builder_with_invalid_limits() {
        let limits = EventLimits {
            max_key_length: 0,
            ..EventLimits::default()
        };
        let result = EventConstraintGuard::builder(event())
            .with_limits(limits)
            .build();

        assert_eq!(result.err(), Some(BuildError::ZeroMaxKeyLength));
    }

    #[test]
    fn test_default_limits_exposed() {
        let guard = EventConstraintGuard::new(event());
        assert_eq!(guard.limits(), &EventLimits::default());
    }

    #[test]
    fn test_builder_custom_limits() {
        let guard = EventConstraintGuard::builder(event())
            .with_max_attributes_and_metrics(3)
            .with_max_key_length(4)
            .with_max_value_length(2)
            .build()
            .unwrap();

        guard.add_attribute("abcdef", "xyz");

        assert_eq!(guard.attribute("abcd").as_deref(), Some("xy"));
        assert_eq!(guard.max_entries(), 3);
        assert_eq!(guard.remaining_capacity(), 2);
    }

    #[test]
    fn test_builder_rejects_zero_lengths() {
        let result = EventConstraintGuard::builder(event())
            .with_max_key_length(0)
            .build();
        assert_eq!(result.err(), Some(BuildError::ZeroMaxKeyLength));

        let result = EventConstraintGuard::builder(event())
            .with_max_value_length(0)
            .build();
        assert_eq!(result.err(), Some(BuildError::ZeroMaxValueLength));
    }

    #[test]
    fn test_builder_shared_metrics() {
        let metrics = GuardMetrics::new();
        let first = EventConstraintGuard::builder(event())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let second = EventConstraintGuard::builder(event())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();

        first.add_attribute("a", "1");
        second.add_metric("b", 1.0);

        assert_eq!(metrics.snapshot().total_added(), 2);
    }

    #[test]
    fn test_chaining() {
        let guard = EventConstraintGuard::new(event())
            .with_attribute("a", "1")
            .with_metric("b", 2.0)
            .with_attribute("a", "ignored");

        assert_eq!(guard.current_count(), 2);
        assert_eq!(guard.attribute("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_pass_through_queries() {
        let record = AnalyticsEvent::builder("checkout")
            .with_session(EventSession::new("s-42", 1_000).with_stop(3_000))
            .with_unique_id("client-7")
            .build();
        let event_id = record.event_id().to_owned();
        let timestamp = record.timestamp();
        let guard = EventConstraintGuard::new(record);

        assert_eq!(guard.event_type(), "checkout");
        assert_eq!(guard.event_id(), event_id);
        assert_eq!(guard.timestamp(), timestamp);
        assert_eq!(guard.unique_id().as_deref(), Some("client-7"));
        assert_eq!(guard.session_id(), "s-42");
        assert_eq!(guard.session_start(), 1_000);
        assert_eq!(guard.session_stop(), Some(3_000));
        assert_eq!(guard.session_duration(), Some(2_000));
        assert_eq!(guard.session().id, "s-42");
    }

    #[test]
    fn test_into_inner_returns_record() {
        let guard = EventConstraintGuard::new(event());
        guard.add_attribute("a", "1");

        let record = guard.into_inner();
        assert_eq!(record.attribute("a"), Some("1"));
    }

    #[test]
    fn test_record_error_is_swallowed() {
        let guard = EventConstraintGuard::new(FaultyRecord::new(Fault::RejectWrites));

        assert_eq!(guard.add_attribute("a", "1"), AddOutcome::Failed);
        assert_eq!(guard.add_metric("b", 1.0), AddOutcome::Failed);

        assert_eq!(guard.current_count(), 0);
        assert_eq!(guard.metrics().failures(), 2);
    }

    #[test]
    fn test_record_panic_is_swallowed() {
        let guard = EventConstraintGuard::new(FaultyRecord::new(Fault::PanicOnWrite));

        assert_eq!(guard.add_attribute("a", "1"), AddOutcome::Failed);
        assert_eq!(guard.current_count(), 0);

        // The guard stays usable after a panic
        assert_eq!(guard.add_metric("b", 1.0), AddOutcome::Failed);
        assert_eq!(guard.metrics().failures(), 2);
    }

    #[test]
    fn test_query_panic_reports_false() {
        let guard = EventConstraintGuard::new(FaultyRecord::new(Fault::PanicOnQuery));

        assert!(!guard.has_attribute("a"));
        assert!(!guard.has_metric("a"));
        assert_eq!(guard.metrics().failures(), 2);
    }

    #[test]
    fn test_concurrent_adds_respect_capacity() {
        let guard = Arc::new(EventConstraintGuard::with_max_attributes_and_metrics(
            event(),
            1,
        ));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["left", "right"]
            .into_iter()
            .map(|key| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.add_attribute(key, "v").is_added()
                })
            })
            .collect();

        let wins: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(wins, 1);
        assert_eq!(guard.current_count(), 1);
        assert_eq!(guard.all_attributes().len(), 1);
    }

    #[test]
    fn test_guard_error_display() {
        let err = GuardError::Record {
            operation: "add_attribute",
            source: RecordError::Rejected {
                key: "k".to_string(),
                reason: "read-only".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "add_attribute failed: record rejected entry 'k': read-only"
        );
        assert_eq!(
            GuardError::Panicked { operation: "add_metric" }.to_string(),
            "add_metric panicked"
        );
    }
}
