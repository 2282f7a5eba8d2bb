// self
use crate::obs::{Outcome, Stage};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_outcome(stage: Stage, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"request_authorizer_dispatch_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

/// Records `Success` or `Failure` depending on `result`.
pub fn record_result<T, E>(stage: Stage, result: &Result<T, E>) {
	match result {
		Ok(_) => record_outcome(stage, Outcome::Success),
		Err(_) => record_outcome(stage, Outcome::Failure),
	}
}
