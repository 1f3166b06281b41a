//! # event-constraints
//!
//! Client-side limits for analytics telemetry events.
//!
//! Analytics services cap how many attributes and metrics one event may carry
//! and how long their keys and values may be. An event that breaks those caps
//! is rejected at upload time, taking every other entry on it down too. This
//! crate wraps an event record in an [`EventConstraintGuard`] that enforces the
//! caps as entries are written, so the event that reaches the uploader is
//! always valid.
//!
//! ## Quick Start
//!
//! ```rust
//! use event_constraints::{AnalyticsEvent, EventConstraintGuard, EventSession};
//!
//! let event = AnalyticsEvent::builder("purchase")
//!     .with_session(EventSession::new("session-1", 1_700_000_000_000))
//!     .build();
//!
//! // Defaults: 50 entries, 40-char keys, 200-char values
//! let guard = EventConstraintGuard::new(event);
//!
//! guard.add_attribute("item", "coffee");
//! guard.add_metric("price", 3.5);
//!
//! let json = guard.to_json().unwrap();
//! assert!(json.contains("coffee"));
//! ```
//!
//! ## Limits
//!
//! | Limit | Default | Constant |
//! |-------|---------|----------|
//! | Attributes + metrics per event | 50 | [`DEFAULT_MAX_ATTRIBUTES_AND_METRICS`] |
//! | Key length (characters) | 40 | [`MAX_EVENT_ATTRIBUTE_METRIC_KEY_LENGTH`] |
//! | Attribute value length (characters) | 200 | [`MAX_EVENT_ATTRIBUTE_VALUE_LENGTH`] |
//!
//! Attributes and metrics draw from **one** pool: an event holding 50
//! attributes accepts no metrics.
//!
//! ```rust
//! # use event_constraints::{AnalyticsEvent, EventConstraintGuard};
//! # let event = AnalyticsEvent::builder("purchase").build();
//! let guard = EventConstraintGuard::builder(event)
//!     .with_max_attributes_and_metrics(20)
//!     .build()
//!     .expect("valid limits");
//! ```
//!
//! ## Write Semantics
//!
//! - A `None` key or value is ignored.
//! - A key that already exists is ignored: the first writer wins.
//! - A full event drops further writes.
//! - Oversized keys and values are clipped by character count and a
//!   warning is logged through `tracing`.
//!
//! Every `add_*` call returns an [`AddOutcome`] describing what happened.
//! None of these cases is an error.
//!
//! ## Fail-Safe Operation
//!
//! Instrumentation must not break the host application. A failing or
//! panicking record is caught at the guard boundary, logged at `ERROR`, and
//! the write becomes a no-op. `has_attribute` / `has_metric` report `false`
//! on failure.
//!
//! ## Concurrency
//!
//! A guard is `Sync` and may be shared through an `Arc`. Each write holds the
//! guard's lock for its full check-and-insert sequence, so concurrent writers
//! cannot exceed the entry limit.
//!
//! ## Observability
//!
//! ```rust
//! # use event_constraints::{AnalyticsEvent, EventConstraintGuard, GuardMetrics};
//! let metrics = GuardMetrics::new();
//! let guard = EventConstraintGuard::builder(AnalyticsEvent::builder("open").build())
//!     .with_metrics(metrics.clone())
//!     .build()
//!     .unwrap();
//!
//! guard.add_attribute("screen", "home");
//! guard.add_attribute("screen", "settings");
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.attributes_added, 1);
//! assert_eq!(snapshot.duplicates_ignored, 1);
//! ```

// Domain layer - pure types
pub mod domain;

// Application layer - the guard and its ports
pub mod application;

// Infrastructure layer - concrete adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    limits::{
        truncate_chars, BuildError, EventLimits, DEFAULT_MAX_ATTRIBUTES_AND_METRICS,
        MAX_EVENT_ATTRIBUTE_METRIC_KEY_LENGTH, MAX_EVENT_ATTRIBUTE_VALUE_LENGTH,
    },
    outcome::AddOutcome,
    session::EventSession,
};

pub use application::{
    guard::{EventConstraintGuard, EventConstraintGuardBuilder},
    metrics::{GuardMetrics, GuardMetricsSnapshot},
    ports::{Clock, EventRecord, RecordError},
};

pub use infrastructure::{
    clock::SystemClock,
    event::{AnalyticsEvent, AnalyticsEventBuilder},
};
