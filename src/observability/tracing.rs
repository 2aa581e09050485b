//! Flow spans.
//!
//! Every started flow gets a UUID v4. All events emitted while the flow's
//! task runs carry it, so one flow's approve and action can be followed
//! across interleaved log output.

use tracing::Span;
use uuid::Uuid;

/// Fresh identifier for a flow run.
pub fn new_flow_id() -> Uuid {
    Uuid::new_v4()
}

/// Span wrapping one flow run.
pub fn flow_span(flow: &'static str, flow_id: Uuid) -> Span {
    tracing::info_span!("flow", name = flow, flow_id = %flow_id)
}
