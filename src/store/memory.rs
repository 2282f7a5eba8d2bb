//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Thread-safe storage backend that keeps the token in-process.
///
/// Clones share the same slot, so a test can keep one handle while the authorizer owns another.
#[derive(Debug)]
pub struct MemoryStore<T>(Arc<RwLock<Option<T>>>);
impl<T> MemoryStore<T> {
	/// Creates a store that already holds `token`.
	pub fn with_token(token: T) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	/// Returns `true` when no token is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_none()
	}
}
impl<T> MemoryStore<T>
where
	T: Clone,
{
	/// Returns a copy of the stored token without going through the async contract.
	pub fn snapshot(&self) -> Option<T> {
		self.0.read().clone()
	}
}
impl<T> Clone for MemoryStore<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}
impl<T> Default for MemoryStore<T> {
	fn default() -> Self {
		Self(Arc::new(RwLock::new(None)))
	}
}
impl<T> TokenStore<T> for MemoryStore<T>
where
	T: 'static + Clone + Send + Sync,
{
	fn fetch(&self) -> StoreFuture<'_, Option<T>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok::<_, StoreError>(slot.read().clone()) })
	}

	fn save(&self, token: T) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}

	fn delete(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}
