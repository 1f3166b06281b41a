//! Domain layer - pure types with no knowledge of records or locking.
//!
//! This layer contains the core concepts of event constraint checking:
//! - Per-event limits and character-based truncation
//! - Outcomes of guarded writes
//! - Session metadata carried by events

pub mod limits;
pub mod outcome;
pub mod session;
