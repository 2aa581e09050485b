//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Waiting on a submitted transaction:
//!     → backoff.rs (delay between receipt polls)
//!     → transaction.rs (overall confirmation deadline)
//! ```
//!
//! # Design Decisions
//! - Every external wait has a deadline
//! - Submissions are never retried; a failed write ends the flow

pub mod backoff;
