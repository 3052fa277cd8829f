// self
use crate::obs::{FlowKind, FlowOutcome, SessionEnd};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"medrecords_client_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how many parked requests a settled refresh released, labeled by whether they resume
/// with a fresh token (`success`) or fail with the refresh error (`failure`).
///
/// A refresh that nobody waited on records `0`, so the histogram count matches the number of
/// settled refreshes.
pub fn record_released_waiters(outcome: FlowOutcome, released: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("medrecords_client_refresh_released_waiters", "outcome" => outcome.as_str())
			.record(released as f64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (outcome, released);
	}
}

/// Counts sessions ended by the client rather than by an explicit logout.
pub fn record_session_end(reason: SessionEnd) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("medrecords_client_session_end_total", "reason" => reason.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}
