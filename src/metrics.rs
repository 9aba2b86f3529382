//! Metric helpers for `hps_reassembler`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::error::FailureReason;

/// Name of the counter tracking finished exchanges.
pub const EXCHANGES_TOTAL: &str = "hps_reassembler_exchanges_total";
/// Name of the counter tracking failed exchanges by reason.
pub const FAILURES_TOTAL: &str = "hps_reassembler_failures_total";
/// Name of the counter tracking truncated fields.
pub const TRUNCATIONS_TOTAL: &str = "hps_reassembler_truncations_total";

/// How an exchange ended.
#[derive(Clone, Copy, Debug)]
pub enum Outcome {
    /// A record was produced.
    Completed,
    /// The exchange failed.
    Failed,
}

impl Outcome {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "failed",
        }
    }
}

/// Captured field that exceeded its cap.
#[derive(Clone, Copy, Debug)]
pub enum Field {
    /// The header block.
    Headers,
    /// The body.
    Body,
}

impl Field {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Field::Headers => "headers",
            Field::Body => "body",
        }
    }
}

/// Record a finished exchange.
#[cfg(feature = "metrics")]
pub fn inc_exchanges(outcome: Outcome) {
    counter!(EXCHANGES_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Record a failed exchange under its reason.
#[cfg(feature = "metrics")]
pub fn inc_failures(reason: FailureReason) {
    counter!(FAILURES_TOTAL, "reason" => reason.as_str()).increment(1);
}

/// Record a truncated field.
#[cfg(feature = "metrics")]
pub fn inc_truncations(field: Field) {
    counter!(TRUNCATIONS_TOTAL, "field" => field.as_str()).increment(1);
}

/// Record a finished exchange.
#[cfg(not(feature = "metrics"))]
pub fn inc_exchanges(_outcome: Outcome) {}

/// Record a failed exchange under its reason.
#[cfg(not(feature = "metrics"))]
pub fn inc_failures(_reason: FailureReason) {}

/// Record a truncated field.
#[cfg(not(feature = "metrics"))]
pub fn inc_truncations(_field: Field) {}
