//! Per-event limits imposed by the analytics service.
//!
//! The service rejects events that carry too many entries or oversized
//! keys and values. These limits are enforced client-side before an event
//! is queued for upload.

use std::fmt;

/// Maximum length, in characters, of an attribute or metric key.
pub const MAX_EVENT_ATTRIBUTE_METRIC_KEY_LENGTH: usize = 40;

/// Maximum length, in characters, of an attribute value.
pub const MAX_EVENT_ATTRIBUTE_VALUE_LENGTH: usize = 200;

/// Default ceiling on the combined number of attributes and metrics per event.
pub const DEFAULT_MAX_ATTRIBUTES_AND_METRICS: usize = 50;

/// Error returned when building a guard with invalid limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Maximum key length must be greater than zero
    ZeroMaxKeyLength,
    /// Maximum value length must be greater than zero
    ZeroMaxValueLength,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ZeroMaxKeyLength => write!(f, "max_key_length must be greater than 0"),
            BuildError::ZeroMaxValueLength => {
                write!(f, "max_value_length must be greater than 0")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Limits applied to a single event.
///
/// `max_entries` is one pool shared by attributes and metrics: an event
/// holding `max_entries` attributes cannot accept any metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLimits {
    /// Ceiling on combined attribute + metric entries
    pub max_entries: usize,
    /// Maximum key length in characters
    pub max_key_length: usize,
    /// Maximum attribute value length in characters
    pub max_value_length: usize,
}

impl EventLimits {
    /// Create limits with the given entry ceiling and the default length limits.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    /// Validate the limits.
    ///
    /// A `max_entries` of zero is accepted; such an event never accepts a write.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.max_key_length == 0 {
            return Err(BuildError::ZeroMaxKeyLength);
        }
        if self.max_value_length == 0 {
            return Err(BuildError::ZeroMaxValueLength);
        }
        Ok(())
    }
}

impl Default for EventLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ATTRIBUTES_AND_METRICS,
            max_key_length: MAX_EVENT_ATTRIBUTE_METRIC_KEY_LENGTH,
            max_value_length: MAX_EVENT_ATTRIBUTE_VALUE_LENGTH,
        }
    }
}

/// Clip `input` to at most `max_chars` characters.
///
/// Counts `char`s, never bytes, so a multi-byte scalar is never split.
/// Returns `None` when no truncation was needed.
pub fn truncate_chars(input: &str, max_chars: usize) -> Option<&str> {
    match input.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Some(&input[..byte_idx]),
        None => None,
    }
}
