//! Authorized dispatch with single-flight authentication and one guarded retry.
//!
//! Each dispatch loops over at most two transport calls:
//!
//! 1. Ask [`AuthState`](crate::auth::AuthState) for an admission. A ready token is used directly;
//!    otherwise the request either starts the only authentication cycle or joins the one in
//!    flight, and in both cases waits for its broadcast.
//! 2. Perform the request with the provider-derived header.
//! 3. If the response is a rejection and the request may still reauthenticate, clear the rejected
//!    token and go back to 1 with reauthentication disabled. A token obtained by waiting on a cycle
//!    is fresh, so it also disables reauthentication.

// self
use crate::{
	_prelude::*,
	auth::{AuthOutcome, Credential, Subscription, Token, state::Admission},
	authorizer::Authorizer,
	error::{TransportError, contract_violation},
	obs::{self, Outcome, Stage, StageSpan},
	transport::{HttpRequest, HttpResponse, Transport},
};

impl<T, X> Authorizer<T, X>
where
	T: Token,
	X: ?Sized + Transport,
{
	/// Dispatches `request` in the background and reports the result to `completion`.
	///
	/// Returns immediately. `completion` runs exactly once, on the callback context, with either
	/// the transport response (a second rejection included) or a domain error.
	pub fn perform_authorized<F>(
		&self,
		request: HttpRequest,
		reauthenticate_on_rejection: bool,
		completion: F,
	) where
		F: 'static + Send + FnOnce(Result<HttpResponse>),
	{
		let this = self.clone();

		self.runtime.spawn(async move {
			let result = this.send_with(request, reauthenticate_on_rejection).await;

			if this.callback_context.execute(Box::pin(async move { completion(result) })).is_err() {
				contract_violation("callback context closed before a completion was delivered");
			}
		});
	}

	/// Dispatches `request` using the configured reauthentication policy and awaits the result.
	pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
		self.send_with(request, self.policy.reauthenticate).await
	}

	/// Dispatches `request` and awaits the result.
	///
	/// Dropping the returned future never strands other requests: authentication cycles run
	/// detached from the request that started them.
	pub async fn send_with(
		&self,
		request: HttpRequest,
		reauthenticate_on_rejection: bool,
	) -> Result<HttpResponse> {
		const STAGE: Stage = Stage::Dispatch;

		let span = StageSpan::new(STAGE, "send_with");

		obs::record_outcome(STAGE, Outcome::Attempt);
		self.metrics.record_dispatch();

		let result = span.instrument(self.dispatch(&request, reauthenticate_on_rejection)).await;

		obs::record_result(STAGE, &result);

		result
	}

	async fn dispatch(&self, request: &HttpRequest, mut reauthenticate: bool) -> Result<HttpResponse> {
		loop {
			let credential = match self.state.begin().await? {
				Admission::Ready(credential) => credential,
				Admission::Start(subscription) => {
					self.start_authentication();

					reauthenticate = false;

					wait_for_cycle(subscription).await?
				},
				Admission::Wait(subscription) => {
					self.metrics.record_wait();

					reauthenticate = false;

					wait_for_cycle(subscription).await?
				},
			};
			let response = self.perform(request, &credential.token).await?;

			if response.status != self.policy.rejection_status {
				return Ok(response);
			}

			self.metrics.record_rejection();
			obs::note("credential rejected", response.status);

			if !reauthenticate {
				return Ok(response);
			}

			self.state.clear_rejected(credential.generation).await?;
			self.metrics.record_retry();

			reauthenticate = false;
		}
	}

	async fn perform(&self, request: &HttpRequest, token: &T) -> Result<HttpResponse> {
		const STAGE: Stage = Stage::Perform;

		let header = self.provider.authorization_header(token);
		let authorized = request.authorized(&self.policy.header, &header)?;
		let span = StageSpan::new(STAGE, "perform");

		obs::record_outcome(STAGE, Outcome::Attempt);

		let result = span
			.instrument(self.transport.execute(authorized))
			.await
			.map_err(|e| Error::from(TransportError::network(e)));

		obs::record_result(STAGE, &result);

		result
	}
}

async fn wait_for_cycle<T>(subscription: Subscription<AuthOutcome<T>>) -> Result<Credential<T>> {
	match subscription.wait().await {
		Some(outcome) => outcome.map_err(Error::from),
		None => contract_violation("authentication state dropped while requests were waiting"),
	}
}
