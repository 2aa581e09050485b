//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Flows and the chain layer produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!     → tracing.rs (spans carrying the flow id)
//! ```
//!
//! # Design Decisions
//! - Structured fields (flow_id, tx_hash, stage) instead of formatted text
//! - Metrics go through the `metrics` facade; no exporter is installed by
//!   default, so recording is a no-op unless an embedder installs one

pub mod logging;
pub mod metrics;
pub mod tracing;
