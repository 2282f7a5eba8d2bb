//! Test doubles shared by the integration tests: a scripted provider, a recording transport, a
//! counting execution context, and a store whose persisted token cannot be decoded.

#![allow(dead_code)]

// std
use std::{
	collections::{HashSet, VecDeque},
	io,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::Semaphore};
// self
use request_authorizer::{
	auth::AccessToken,
	authorizer::Authorizer,
	context::{ContextClosed, ExecutionContext, Job, SerialContext},
	error::ProviderError,
	http::{StatusCode, header::AUTHORIZATION},
	provider::{AuthProvider, AuthorizeFuture, FixedSurface, PresentationSurface, SurfaceLocator},
	store::{MemoryStore, StoreError, StoreFuture, TokenStore},
	transport::{HttpRequest, HttpResponse, Transport, TransportFuture},
	url::Url,
};

pub type TestAuthorizer = Authorizer<AccessToken, RecordingTransport>;

/// Provider that replays a fixed list of challenge outcomes, optionally held behind a gate.
pub struct ScriptedProvider {
	outcomes: Mutex<VecDeque<Result<AccessToken, ProviderError>>>,
	calls: AtomicUsize,
	surfaces: Mutex<Vec<String>>,
	gate: Option<Arc<Semaphore>>,
}
impl ScriptedProvider {
	pub fn new(outcomes: impl IntoIterator<Item = Result<AccessToken, ProviderError>>) -> Self {
		Self {
			outcomes: Mutex::new(outcomes.into_iter().collect()),
			calls: AtomicUsize::new(0),
			surfaces: Mutex::new(Vec::new()),
			gate: None,
		}
	}

	pub fn issuing(tokens: &[&str]) -> Self {
		Self::new(tokens.iter().map(|token| Ok(AccessToken::new(*token))))
	}

	/// Holds every challenge until a permit is added to `gate`.
	pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
		self.gate = Some(gate);

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn surfaces(&self) -> Vec<String> {
		self.surfaces.lock().clone()
	}
}
impl AuthProvider<AccessToken> for ScriptedProvider {
	fn authorization_header(&self, token: &AccessToken) -> String {
		token.bearer()
	}

	fn authorize(&self, surface: PresentationSurface) -> AuthorizeFuture<'_, AccessToken> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.surfaces.lock().push(surface.label().to_owned());

			if let Some(gate) = &self.gate {
				gate.acquire().await.expect("Challenge gate should stay open.").forget();
			}

			let next = self.outcomes.lock().pop_front();

			next.unwrap_or_else(|| Err(ProviderError::Declined { reason: "script exhausted".into() }))
		})
	}
}

/// Transport that records the authorization header of every call and rejects listed tokens.
#[derive(Default)]
pub struct RecordingTransport {
	rejected: HashSet<String>,
	seen: Mutex<Vec<Option<String>>>,
	unreachable: bool,
}
impl RecordingTransport {
	pub fn rejecting(tokens: &[&str]) -> Self {
		Self { rejected: tokens.iter().map(|token| token.to_string()).collect(), ..Default::default() }
	}

	pub fn unreachable() -> Self {
		Self { unreachable: true, ..Default::default() }
	}

	pub fn calls(&self) -> usize {
		self.seen.lock().len()
	}

	pub fn headers(&self) -> Vec<Option<String>> {
		self.seen.lock().clone()
	}
}
impl Transport for RecordingTransport {
	type TransportError = io::Error;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let header = request
				.headers
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);

			self.seen.lock().push(header.clone());

			if self.unreachable {
				return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"));
			}

			let rejected = header
				.as_deref()
				.and_then(|value| value.strip_prefix("Bearer "))
				.is_some_and(|token| self.rejected.contains(token));
			let status = if rejected { StatusCode::UNAUTHORIZED } else { StatusCode::OK };

			Ok(HttpResponse::new(status).with_body("ok"))
		})
	}
}

/// Serial context that counts the jobs it accepted.
pub struct CountingContext {
	inner: SerialContext,
	executed: AtomicUsize,
}
impl CountingContext {
	pub fn spawn(label: &str) -> Self {
		Self { inner: SerialContext::spawn(&Handle::current(), label), executed: AtomicUsize::new(0) }
	}

	pub fn executed(&self) -> usize {
		self.executed.load(Ordering::SeqCst)
	}
}
impl ExecutionContext for CountingContext {
	fn execute(&self, job: Job) -> Result<(), ContextClosed> {
		self.executed.fetch_add(1, Ordering::SeqCst);
		self.inner.execute(job)
	}
}

/// Store whose persisted token cannot be decoded until it is deleted.
#[derive(Default)]
pub struct UndecodableStore {
	deleted: Mutex<bool>,
	saved: Mutex<Option<AccessToken>>,
}
impl TokenStore<AccessToken> for UndecodableStore {
	fn fetch(&self) -> StoreFuture<'_, Option<AccessToken>> {
		Box::pin(async move {
			if *self.deleted.lock() {
				Ok(self.saved.lock().clone())
			} else {
				Err(StoreError::Decode { message: "expected a JSON string".into() })
			}
		})
	}

	fn save(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.saved.lock() = Some(token);

			Ok(())
		})
	}

	fn delete(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.deleted.lock() = true;

			Ok(())
		})
	}
}

pub struct Harness {
	pub authorizer: TestAuthorizer,
	pub provider: Arc<ScriptedProvider>,
	pub transport: Arc<RecordingTransport>,
}

pub fn main_window() -> Arc<dyn SurfaceLocator> {
	Arc::new(FixedSurface(PresentationSurface::new("main-window", ())))
}

pub fn harness(
	store: Arc<dyn TokenStore<AccessToken>>,
	provider: ScriptedProvider,
	transport: RecordingTransport,
	surfaces: Arc<dyn SurfaceLocator>,
) -> Harness {
	let provider = Arc::new(provider);
	let transport = Arc::new(transport);
	let authorizer: TestAuthorizer =
		Authorizer::new(store, provider.clone(), surfaces, transport.clone())
			.expect("Authorizer should build inside a Tokio runtime.");

	Harness { authorizer, provider, transport }
}

pub fn memory_harness(
	store: MemoryStore<AccessToken>,
	provider: ScriptedProvider,
	transport: RecordingTransport,
) -> Harness {
	harness(Arc::new(store), provider, transport, main_window())
}

pub fn request() -> HttpRequest {
	HttpRequest::get(Url::parse("https://api.example.com/me").expect("Fixture URL should parse."))
}

/// Polls `condition` until it holds, failing the test after a few seconds.
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
	for _ in 0..500 {
		if condition() {
			return;
		}

		tokio::time::sleep(Duration::from_millis(10)).await;
	}

	panic!("Timed out waiting for {what}.");
}
