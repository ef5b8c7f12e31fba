// std
use std::time::Duration as StdDuration;
// self
use crate::obs::{OpKind, OpOutcome};

/// Increments `graph_mailer_op_total{op, outcome}` when the `metrics` feature is enabled.
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"graph_mailer_op_total",
		"op" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records `graph_mailer_op_duration_seconds{op}` for a finished operation.
pub fn record_op_duration(kind: OpKind, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	metrics::histogram!("graph_mailer_op_duration_seconds", "op" => kind.as_str())
		.record(elapsed.as_secs_f64());
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, elapsed);
}
