//! Optional observability helpers for token resolution and mail sends.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `graph_mailer.op` with `op`,
//!   `stage` and `outcome` fields, plus events where tokens are reused or fetched and where
//!   Graph accepts or rejects a message.
//! - Enable `metrics` to increment `graph_mailer_op_total{op, outcome}` for every
//!   attempt/success/failure/skip and to record `graph_mailer_op_duration_seconds{op}`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::{future::Future, time::Instant};
// self
use crate::_prelude::*;

/// Emits a `tracing` event at the given level when the `tracing` feature is enabled.
macro_rules! event {
	($level:ident, $($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!(target: "graph_mailer", $($arg)+);
		}
	};
}
pub(crate) use event;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Bearer token resolution (delegated, cached, or exchanged).
	Token,
	/// A `sendMail` invocation, including dry runs.
	SendMail,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Token => "token",
			OpKind::SendMail => "send_mail",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Completed after contacting the remote endpoint.
	Success,
	/// Completed without a network call (cached or delegated token, dry run).
	Skipped,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Skipped => "skipped",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an [`OpSpan`], recording the attempt, the final outcome, and the elapsed
/// time. `fut` reports which successful outcome applied; errors count as
/// [`OpOutcome::Failure`].
pub(crate) async fn observe<Fut, T, E>(kind: OpKind, stage: &'static str, fut: Fut) -> Result<T, E>
where
	Fut: Future<Output = Result<(T, OpOutcome), E>>,
{
	let span = OpSpan::new(kind, stage);
	let started = Instant::now();

	record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;
	let outcome = match &result {
		Ok((_, outcome)) => *outcome,
		Err(_) => OpOutcome::Failure,
	};

	span.record(outcome);
	record_op_outcome(kind, outcome);
	record_op_duration(kind, started.elapsed());

	result.map(|(value, _)| value)
}
