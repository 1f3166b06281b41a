//! Observability metrics for guarded writes.
//!
//! Provides counters describing what the guard accepted, clipped and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking constraint guard statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Cloning shares the counters, so one `GuardMetrics` can be handed to
/// every guard in a session to observe totals across events.
#[derive(Debug, Clone)]
pub struct GuardMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Attributes stored
    attributes_added: AtomicU64,
    /// Metrics stored
    metrics_added: AtomicU64,
    /// Writes ignored because the key already existed
    duplicates_ignored: AtomicU64,
    /// Writes ignored because key or value was missing
    invalid_inputs: AtomicU64,
    /// Writes dropped because the event was full
    capacity_drops: AtomicU64,
    /// Keys or values clipped before storing
    truncations: AtomicU64,
    /// Record failures swallowed by the guard
    failures: AtomicU64,
}

impl GuardMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_attribute_added(&self) {
        self.inner.attributes_added.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_metric_added(&self) {
        self.inner.metrics_added.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.inner.duplicates_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid_input(&self) {
        self.inner.invalid_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_capacity_drop(&self) {
        self.inner.capacity_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_truncation(&self) {
        self.inner.truncations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of attributes stored.
    pub fn attributes_added(&self) -> u64 {
        self.inner.attributes_added.load(Ordering::Relaxed)
    }

    /// Get the number of metrics stored.
    pub fn metrics_added(&self) -> u64 {
        self.inner.metrics_added.load(Ordering::Relaxed)
    }

    /// Get the number of duplicate writes ignored.
    pub fn duplicates_ignored(&self) -> u64 {
        self.inner.duplicates_ignored.load(Ordering::Relaxed)
    }

    /// Get the number of writes with a missing key or value.
    pub fn invalid_inputs(&self) -> u64 {
        self.inner.invalid_inputs.load(Ordering::Relaxed)
    }

    /// Get the number of writes dropped at capacity.
    pub fn capacity_drops(&self) -> u64 {
        self.inner.capacity_drops.load(Ordering::Relaxed)
    }

    /// Get the number of truncated writes.
    pub fn truncations(&self) -> u64 {
        self.inner.truncations.load(Ordering::Relaxed)
    }

    /// Get the number of swallowed record failures.
    pub fn failures(&self) -> u64 {
        self.inner.failures.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> GuardMetricsSnapshot {
        GuardMetricsSnapshot {
            attributes_added: self.attributes_added(),
            metrics_added: self.metrics_added(),
            duplicates_ignored: self.duplicates_ignored(),
            invalid_inputs: self.invalid_inputs(),
            capacity_drops: self.capacity_drops(),
            truncations: self.truncations(),
            failures: self.failures(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.attributes_added.store(0, Ordering::Relaxed);
        self.inner.metrics_added.store(0, Ordering::Relaxed);
        self.inner.duplicates_ignored.store(0, Ordering::Relaxed);
        self.inner.invalid_inputs.store(0, Ordering::Relaxed);
        self.inner.capacity_drops.store(0, Ordering::Relaxed);
        self.inner.truncations.store(0, Ordering::Relaxed);
        self.inner.failures.store(0, Ordering::Relaxed);
    }
}

impl Default for GuardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of guard metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardMetricsSnapshot {
    /// Attributes stored
    pub attributes_added: u64,
    /// Metrics stored
    pub metrics_added: u64,
    /// Writes ignored because the key already existed
    pub duplicates_ignored: u64,
    /// Writes ignored because key or value was missing
    pub invalid_inputs: u64,
    /// Writes dropped because the event was full
    pub capacity_drops: u64,
    /// Keys or values clipped before storing
    pub truncations: u64,
    /// Record failures swallowed by the guard
    pub failures: u64,
}

impl GuardMetricsSnapshot {
    /// Total entries stored (attributes + metrics).
    pub fn total_added(&self) -> u64 {
        self.attributes_added.saturating_add(self.metrics_added)
    }

    /// Total writes that left the event unchanged.
    pub fn total_dropped(&self) -> u64 {
        self.duplicates_ignored
            .saturating_add(self.invalid_inputs)
            .saturating_add(self.capacity_drops)
            .saturating_add(self.failures)
    }

    /// Ratio of dropped writes to all writes (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.total_dropped();
        let total = self.total_added().saturating_add(dropped);
        if total == 0 {
            0.0
        } else {
            dropped as f64 / total as f64
        }
    }
}
