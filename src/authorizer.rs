//! Request authorizer: the orchestrator that attaches the shared credential to outbound requests.

pub mod config;

mod authenticate;
mod dispatch;
mod metrics;

pub use config::AuthorizerConfig;
pub use metrics::AuthorizerMetrics;

// crates.io
use tokio::runtime::Handle;
// self
use crate::{
	_prelude::*,
	auth::{AuthState, AuthenticationState, Token},
	authorizer::config::DispatchPolicy,
	context::{ExecutionContext, SerialContext},
	error::ConfigError,
	provider::{AuthProvider, SurfaceLocator},
	store::TokenStore,
	transport::Transport,
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Authorizer specialized for the crate's default reqwest transport.
pub type ReqwestAuthorizer<T> = Authorizer<T, ReqwestTransport>;

/// Coordinates authorization of outbound requests against a single, lazily obtained token.
///
/// Every request consults one synchronized [`AuthState`]: it either runs immediately with the
/// current token, starts the only authentication cycle, or waits for the cycle already in flight.
/// A rejected request clears the token it used and replays once with a freshly obtained one.
///
/// Clones share the same state, contexts, and counters.
pub struct Authorizer<T, X>
where
	T: Token,
	X: ?Sized + Transport,
{
	/// Transport executing every authorized request.
	pub transport: Arc<X>,
	/// Provider deriving headers and running challenges.
	pub provider: Arc<dyn AuthProvider<T>>,
	/// Locator consulted for a presentation surface before each challenge.
	pub surfaces: Arc<dyn SurfaceLocator>,
	/// Shared counters for dispatch activity.
	pub metrics: Arc<AuthorizerMetrics>,
	state: Arc<AuthState<T>>,
	ui_context: Arc<dyn ExecutionContext>,
	callback_context: Arc<dyn ExecutionContext>,
	policy: DispatchPolicy,
	runtime: Handle,
}
impl<T, X> Authorizer<T, X>
where
	T: Token,
	X: ?Sized + Transport,
{
	/// Creates an authorizer bound to the Tokio runtime the caller is running on.
	///
	/// Fails with [`ConfigError::RuntimeUnavailable`] outside a runtime; use
	/// [`Authorizer::with_runtime`] to pass a handle explicitly.
	pub fn new(
		store: Arc<dyn TokenStore<T>>,
		provider: Arc<dyn AuthProvider<T>>,
		surfaces: Arc<dyn SurfaceLocator>,
		transport: impl Into<Arc<X>>,
	) -> Result<Self> {
		let runtime = Handle::try_current().map_err(|_| ConfigError::RuntimeUnavailable)?;

		Ok(Self::with_runtime(runtime, store, provider, surfaces, transport))
	}

	/// Creates an authorizer whose dispatch work, UI context, and callback context all live on
	/// `runtime`.
	pub fn with_runtime(
		runtime: Handle,
		store: Arc<dyn TokenStore<T>>,
		provider: Arc<dyn AuthProvider<T>>,
		surfaces: Arc<dyn SurfaceLocator>,
		transport: impl Into<Arc<X>>,
	) -> Self {
		Self {
			transport: transport.into(),
			provider,
			surfaces,
			metrics: Default::default(),
			state: Arc::new(AuthState::new(store)),
			ui_context: Arc::new(SerialContext::spawn(&runtime, "ui")),
			callback_context: Arc::new(SerialContext::spawn(&runtime, "callbacks")),
			policy: DispatchPolicy::default(),
			runtime,
		}
	}

	/// Replaces the context that runs authentication challenges.
	pub fn with_ui_context(mut self, context: Arc<dyn ExecutionContext>) -> Self {
		self.ui_context = context;

		self
	}

	/// Replaces the context that `perform_authorized` completions are delivered on.
	pub fn with_callback_context(mut self, context: Arc<dyn ExecutionContext>) -> Self {
		self.callback_context = context;

		self
	}

	/// Applies a validated [`AuthorizerConfig`].
	pub fn with_config(mut self, config: &AuthorizerConfig) -> Result<Self> {
		self.policy = config.policy()?;

		Ok(self)
	}

	/// Returns the current authentication state, loading the persisted token on first use.
	pub async fn state(&self) -> Result<AuthenticationState<T>> {
		self.state.current().await
	}

	/// Forgets the current token in memory and in the store.
	///
	/// An authentication cycle that is already in flight is not interrupted.
	pub async fn sign_out(&self) -> Result<()> {
		self.state.sign_out().await
	}
}
#[cfg(feature = "reqwest")]
impl<T> Authorizer<T, ReqwestTransport>
where
	T: Token,
{
	/// Creates an authorizer with a default reqwest transport on the current Tokio runtime.
	pub fn with_reqwest(
		store: Arc<dyn TokenStore<T>>,
		provider: Arc<dyn AuthProvider<T>>,
		surfaces: Arc<dyn SurfaceLocator>,
	) -> Result<Self> {
		Self::new(store, provider, surfaces, ReqwestTransport::default())
	}
}
impl<T, X> Clone for Authorizer<T, X>
where
	T: Token,
	X: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			provider: self.provider.clone(),
			surfaces: self.surfaces.clone(),
			metrics: self.metrics.clone(),
			state: self.state.clone(),
			ui_context: self.ui_context.clone(),
			callback_context: self.callback_context.clone(),
			policy: self.policy.clone(),
			runtime: self.runtime.clone(),
		}
	}
}
impl<T, X> Debug for Authorizer<T, X>
where
	T: Token,
	X: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authorizer")
			.field("rejection_status", &self.policy.rejection_status)
			.field("header", &self.policy.header)
			.field("reauthenticate", &self.policy.reauthenticate)
			.field("metrics", &self.metrics)
			.finish()
	}
}
