//! Demonstrates plugging a custom [`Transport`] and [`AuthProvider`] into an [`Authorizer`].
//!
//! 1. Implement [`Transport`] over whatever HTTP stack the application already has. Every HTTP
//!    status comes back as `Ok`; only failures to get a response are errors.
//! 2. Implement [`AuthProvider`] so the authorizer can derive headers and run the login challenge.
//! 3. Seed the store with an expired token and watch the authorizer reauthenticate once and
//!    replay the request, first through `send` and then through `perform_authorized`.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use color_eyre::Result;
use tokio::sync::oneshot;
// self
use request_authorizer::{
	auth::AccessToken,
	authorizer::Authorizer,
	error::ProviderError,
	http::{StatusCode, header::AUTHORIZATION},
	provider::{AuthProvider, AuthorizeFuture, FixedSurface, PresentationSurface},
	store::MemoryStore,
	transport::{HttpRequest, HttpResponse, Transport, TransportFuture},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store = MemoryStore::with_token(AccessToken::new("expired"));
	let surfaces = Arc::new(FixedSurface(PresentationSurface::new("main-window", ())));
	let authorizer: Authorizer<AccessToken, InProcessApi> = Authorizer::new(
		Arc::new(store.clone()),
		Arc::new(ConsoleLogin::default()),
		surfaces,
		InProcessApi,
	)?;
	let me = Url::parse("https://api.example.com/me")?;
	let response = authorizer.send(HttpRequest::get(me.clone())).await?;

	println!(
		"First request finished with {}: {}.",
		response.status,
		String::from_utf8_lossy(&response.body)
	);

	if let Some(token) = authorizer.state().await?.token() {
		println!("Authorizer now holds `{}`.", token.expose());
	}

	let (sender, receiver) = oneshot::channel();

	authorizer.perform_authorized(HttpRequest::get(me), true, move |result| {
		let _ = sender.send(result);
	});

	let response = receiver.await??;

	println!("Callback-delivered request finished with {}.", response.status);
	println!(
		"Challenges: {}, retries: {}, persisted token present: {}.",
		authorizer.metrics.challenges(),
		authorizer.metrics.retries(),
		!store.is_empty(),
	);

	Ok(())
}

#[derive(Debug)]
struct ApiOffline;
impl Display for ApiOffline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("In-process API is offline")
	}
}
impl StdError for ApiOffline {}

/// Answers every request locally, rejecting the `expired` token.
struct InProcessApi;
impl Transport for InProcessApi {
	type TransportError = ApiOffline;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let Some(header) = request.headers.get(AUTHORIZATION) else {
				return Err(ApiOffline);
			};

			if header.as_bytes() == b"Bearer expired" {
				return Ok(HttpResponse::new(StatusCode::UNAUTHORIZED));
			}

			let body = format!("hello from {}", request.url.path());

			Ok(HttpResponse::new(StatusCode::OK).with_body(body))
		})
	}
}

/// Pretends to show a login sheet and issues numbered session tokens.
#[derive(Default)]
struct ConsoleLogin {
	issued: AtomicUsize,
}
impl AuthProvider<AccessToken> for ConsoleLogin {
	fn authorization_header(&self, token: &AccessToken) -> String {
		token.bearer()
	}

	fn authorize(&self, surface: PresentationSurface) -> AuthorizeFuture<'_, AccessToken> {
		Box::pin(async move {
			let session = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

			println!("Presenting login on `{}`.", surface.label());

			if session > 3 {
				return Err(ProviderError::Declined { reason: "too many logins".into() });
			}

			Ok(AccessToken::new(format!("session-{session}")))
		})
	}
}
