//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and owns the runtime behavior:
//! - Constraint guard (locking, limit checks, failure swallowing)
//! - Guard metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the guard independent from any
//! concrete event representation.

pub mod guard;
pub mod metrics;
pub mod ports;
