//! Optional observability helpers for authorized dispatch.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `request_authorizer.dispatch` with a `stage`
//!   field, plus events for rejections and settled authentication cycles.
//! - Enable `metrics` to increment the `request_authorizer_dispatch_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of an authorized dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Whole `perform_authorized`/`send` call, including any retry.
	Dispatch,
	/// Authentication cycle (challenge + settle).
	Authenticate,
	/// A single transport call carrying a token.
	Perform,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Dispatch => "dispatch",
			Stage::Authenticate => "authenticate",
			Stage::Perform => "perform",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
