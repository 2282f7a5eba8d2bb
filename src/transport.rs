//! Transport primitives for authorized requests.
//!
//! The module exposes crate-owned [`HttpRequest`]/[`HttpResponse`] values and the [`Transport`]
//! trait, the authorizer's only dependency on an HTTP stack. Requests are plain data so the
//! authorizer can replay the original request after a reauthentication without asking the caller
//! to rebuild it.

// crates.io
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
// self
use crate::_prelude::*;

/// Boxed future returned by [`Transport::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP clients able to execute authorized requests.
///
/// Implementations return every HTTP response, including error statuses, as `Ok`; only failures
/// to obtain a response belong in [`Transport::TransportError`]. The authorizer inspects the
/// status to detect a rejected credential.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying client.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and resolves to the raw response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Outbound request the authorizer attaches credentials to.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Caller-supplied headers; the authorization header is added per attempt.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Vec<u8>,
}
impl HttpRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Adds (or replaces) a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Returns a copy carrying `value` under `header`, marked sensitive so it never shows up in
	/// `Debug` output.
	pub(crate) fn authorized(&self, header: &HeaderName, value: &str) -> Result<Self> {
		let mut value = HeaderValue::from_str(value).map_err(crate::error::ConfigError::from)?;
		let mut request = self.clone();

		value.set_sensitive(true);
		request.headers.insert(header.clone(), value);

		Ok(request)
	}
}

/// Response returned by a [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with the given status and no headers or body.
	pub fn new(status: StatusCode) -> Self {
		Self { status, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Sets the response body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that gives up on requests after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let HttpRequest { method, url, headers, body } = request;
			let response = client.request(method, url).headers(headers).body(body).send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::header::AUTHORIZATION;
	// self
	use super::*;

	#[test]
	fn authorized_copy_redacts_header_and_keeps_original() {
		let url = Url::parse("https://api.example.com/me").expect("Fixture URL should parse.");
		let request = HttpRequest::get(url).with_header(
			HeaderName::from_static("x-trace"),
			HeaderValue::from_static("abc"),
		);
		let authorized = request
			.authorized(&AUTHORIZATION, "Bearer secret-value")
			.expect("Bearer header should be a valid header value.");

		assert!(request.headers.get(AUTHORIZATION).is_none());
		assert_eq!(
			authorized.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
			Some("Bearer secret-value")
		);
		assert_eq!(authorized.headers.get("x-trace"), request.headers.get("x-trace"));
		assert!(!format!("{authorized:?}").contains("secret-value"));
	}

	#[test]
	fn authorized_rejects_invalid_header_values() {
		let url = Url::parse("https://api.example.com/me").expect("Fixture URL should parse.");
		let err = HttpRequest::get(url)
			.authorized(&http::header::AUTHORIZATION, "Bearer line\nbreak")
			.expect_err("Header values with newlines should be rejected.");

		assert!(matches!(err, Error::Config(_)));
	}
}
