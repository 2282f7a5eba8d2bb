//! Storage contract and built-in store implementations for the authorizer's single token.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the credential an authorizer hands out.
///
/// An absent token is not an error: [`TokenStore::fetch`] resolves to `Ok(None)`. Stores must
/// only fail with [`StoreError`].
pub trait TokenStore<T>
where
	Self: Send + Sync,
{
	/// Fetches the persisted token, if any.
	fn fetch(&self) -> StoreFuture<'_, Option<T>>;

	/// Persists or replaces the token.
	fn save(&self, token: T) -> StoreFuture<'_, ()>;

	/// Removes the persisted token. Deleting an absent token succeeds.
	fn delete(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The stored credential exists but cannot be decoded.
	#[error("Stored token could not be decoded: {message}.")]
	Decode {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_domain_error_with_source() {
		let store_error = StoreError::Backend { message: "keychain unavailable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("keychain unavailable"));

		let source = StdError::source(&error)
			.expect("Domain error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn decode_and_backend_failures_stay_distinct() {
		let decode = StoreError::Decode { message: "bad json".into() };
		let backend = StoreError::Backend { message: "disk full".into() };

		assert_ne!(decode, backend);
		assert!(decode.to_string().starts_with("Stored token could not be decoded"));
	}
}
