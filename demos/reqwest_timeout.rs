//! Sends an authorized request through a reqwest transport with a request timeout.
//!
//! The target echoes bearer credentials and answers `401` without one, so the run shows a login
//! challenge followed by a successful request. Network failures are printed, not raised.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
// self
use request_authorizer::{
	auth::AccessToken,
	authorizer::ReqwestAuthorizer,
	error::ProviderError,
	provider::{AuthProvider, AuthorizeFuture, FixedSurface, PresentationSurface},
	store::MemoryStore,
	transport::{HttpRequest, ReqwestTransport},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = ReqwestTransport::with_timeout(Duration::from_secs(5))?;
	let authorizer: ReqwestAuthorizer<AccessToken> = ReqwestAuthorizer::new(
		Arc::new(MemoryStore::default()),
		Arc::new(StaticLogin),
		Arc::new(FixedSurface(PresentationSurface::new("terminal", ()))),
		transport,
	)?;
	let request = HttpRequest::get(Url::parse("https://httpbin.org/bearer")?);

	match authorizer.send(request).await {
		Ok(response) => println!(
			"Server answered {} with {} bytes.",
			response.status,
			response.body.len()
		),
		Err(e) => println!("Request could not be authorized: {e}."),
	}

	Ok(())
}

struct StaticLogin;
impl AuthProvider<AccessToken> for StaticLogin {
	fn authorization_header(&self, token: &AccessToken) -> String {
		token.bearer()
	}

	fn authorize(&self, surface: PresentationSurface) -> AuthorizeFuture<'_, AccessToken> {
		Box::pin(async move {
			println!("Logging in on `{}`.", surface.label());

			Ok::<_, ProviderError>(AccessToken::new("demo-token"))
		})
	}
}
