//! Outcome of a guarded write.

/// What happened to an attribute or metric handed to the guard.
///
/// Every variant other than `Added` leaves the event unchanged. None of them
/// is an error from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The entry was stored
    Added {
        /// Whether the key or value was clipped before storing
        truncated: bool,
    },
    /// Key or value was missing
    InvalidInput,
    /// An entry already exists under this key; first writer wins
    Duplicate,
    /// The event already holds its maximum number of entries
    CapacityExceeded,
    /// The underlying record failed; the failure was logged
    Failed,
}

impl AddOutcome {
    /// Check if the entry was stored.
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }

    /// Check if the entry was stored after truncation.
    pub fn is_truncated(&self) -> bool {
        matches!(self, AddOutcome::Added { truncated: true })
    }

    /// Check if the write was dropped for any reason.
    pub fn is_dropped(&self) -> bool {
        !self.is_added()
    }
}
