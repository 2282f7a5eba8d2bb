//! Authentication provider hooks and presentation-surface lookup.
//!
//! The authorizer never authenticates by itself. An [`AuthProvider`] derives authorization
//! headers from tokens and runs the interactive challenge that produces one; a
//! [`SurfaceLocator`] tells the authorizer where that challenge can be presented.

pub mod surface;

pub use surface::*;

// self
use crate::{_prelude::*, error::ProviderError};

/// Boxed future returned by [`AuthProvider::authorize`].
pub type AuthorizeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Pluggable collaborator that turns a presentation surface into a token.
///
/// [`authorize`](AuthProvider::authorize) runs on the authorizer's UI context and resolves exactly
/// once. Failures must be reported as [`ProviderError`].
pub trait AuthProvider<T>
where
	Self: Send + Sync,
{
	/// Formats the value of the authorization header for `token`.
	fn authorization_header(&self, token: &T) -> String;

	/// Runs the authentication challenge over `surface`.
	fn authorize(&self, surface: PresentationSurface) -> AuthorizeFuture<'_, T>;
}
