//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of guard behavior.

pub mod clock;
pub mod layer;
pub mod record;

pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use record::{Fault, FaultyRecord};
