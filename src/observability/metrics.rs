//! Flow metrics.
//!
//! # Metrics
//! - `flow_started_total` (counter): flows accepted, by flow name
//! - `flow_finished_total` (counter): flows ended, by flow name and outcome
//! - `flow_rejected_total` (counter): starts refused before submission
//! - `tx_submitted_total` (counter): broadcasts, by function name

pub fn record_flow_started(flow: &'static str) {
    metrics::counter!("flow_started_total", "flow" => flow).increment(1);
}

pub fn record_flow_finished(flow: &'static str, outcome: &'static str) {
    metrics::counter!("flow_finished_total", "flow" => flow, "outcome" => outcome).increment(1);
}

pub fn record_flow_rejected(flow: &'static str, reason: &'static str) {
    metrics::counter!("flow_rejected_total", "flow" => flow, "reason" => reason).increment(1);
}
