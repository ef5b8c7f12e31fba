// std
use std::future::Future;
// self
use crate::obs::{OpKind, OpOutcome};

#[cfg(feature = "tracing")]
type Instrumented<F> = tracing::instrument::Instrumented<F>;
#[cfg(not(feature = "tracing"))]
type Instrumented<F> = F;

/// Span named `graph_mailer.op` carrying `op`, `stage`, and a late-bound `outcome` field.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Opens a span for `kind` at `stage`; `outcome` stays empty until [`OpSpan::record`].
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"graph_mailer.op",
				op = kind.as_str(),
				stage,
				outcome = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Fills the span's `outcome` field.
	pub fn record(&self, outcome: OpOutcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());
		#[cfg(not(feature = "tracing"))]
		let _ = outcome;
	}

	pub(crate) fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_passes_output_through() {
		let span = OpSpan::new(OpKind::Token, "instrument_passes_output_through");
		let value = span.instrument(async { 42 }).await;

		span.record(OpOutcome::Success);

		assert_eq!(value, 42);
	}
}
