//! Authentication cycles: challenge on the UI context, then settle the shared state.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::Token,
	authorizer::Authorizer,
	context::{ExecutionContext, Job},
	error::{AuthenticationError, contract_violation},
	obs::{self, Outcome, Stage, StageSpan},
	provider::{AuthProvider, SurfaceLocator},
	transport::Transport,
};

impl<T, X> Authorizer<T, X>
where
	T: Token,
	X: ?Sized + Transport,
{
	/// Runs one authentication cycle detached from the request that started it.
	///
	/// Must only be called after [`AuthState::begin`](crate::auth::AuthState) handed out
	/// `Admission::Start`; the cycle always ends in `settle`, which moves the state out of
	/// `Authenticating` and wakes every waiter.
	pub(super) fn start_authentication(&self) {
		const STAGE: Stage = Stage::Authenticate;

		let state = self.state.clone();
		let ui_context = self.ui_context.clone();
		let surfaces = self.surfaces.clone();
		let provider = self.provider.clone();

		self.metrics.record_challenge();
		self.runtime.spawn(async move {
			let span = StageSpan::new(STAGE, "authentication_cycle");

			obs::record_outcome(STAGE, Outcome::Attempt);

			let outcome = span.instrument(challenge(ui_context, surfaces, provider)).await;

			obs::record_result(STAGE, &outcome);

			let notified = span.instrument(state.settle(outcome)).await;

			obs::note("authentication cycle settled", notified);
		});
	}
}

/// Looks up a surface and runs the provider's challenge on the UI context.
///
/// A missing surface, or a UI context that no longer accepts work, fails the cycle with
/// [`AuthenticationError::UserInteractionRequired`].
async fn challenge<T>(
	ui_context: Arc<dyn ExecutionContext>,
	surfaces: Arc<dyn SurfaceLocator>,
	provider: Arc<dyn AuthProvider<T>>,
) -> Result<T, AuthenticationError>
where
	T: Token,
{
	let (sender, receiver) = oneshot::channel();
	let job: Job = Box::pin(async move {
		let outcome = match surfaces.topmost_surface() {
			Some(surface) => provider.authorize(surface).await.map_err(AuthenticationError::from),
			None => Err(AuthenticationError::UserInteractionRequired),
		};
		let _ = sender.send(outcome);
	});

	if ui_context.execute(job).is_err() {
		return Err(AuthenticationError::UserInteractionRequired);
	}

	match receiver.await {
		Ok(outcome) => outcome,
		Err(_) => contract_violation("UI context dropped an accepted authentication challenge"),
	}
}
