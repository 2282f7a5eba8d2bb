// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for dispatch activity.
#[derive(Debug, Default)]
pub struct AuthorizerMetrics {
	dispatches: AtomicU64,
	challenges: AtomicU64,
	waits: AtomicU64,
	rejections: AtomicU64,
	retries: AtomicU64,
}
impl AuthorizerMetrics {
	/// Returns the number of dispatched requests.
	pub fn dispatches(&self) -> u64 {
		self.dispatches.load(Ordering::Relaxed)
	}

	/// Returns the number of authentication cycles started.
	pub fn challenges(&self) -> u64 {
		self.challenges.load(Ordering::Relaxed)
	}

	/// Returns how often a request joined another request's authentication cycle.
	pub fn waits(&self) -> u64 {
		self.waits.load(Ordering::Relaxed)
	}

	/// Returns the number of rejection responses observed, including final ones.
	pub fn rejections(&self) -> u64 {
		self.rejections.load(Ordering::Relaxed)
	}

	/// Returns the number of automatic retries after a rejection.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_challenge(&self) {
		self.challenges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_wait(&self) {
		self.waits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejection(&self) {
		self.rejections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}
}
