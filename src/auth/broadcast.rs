//! One-shot, multi-subscriber signal that fans an authentication outcome out to queued callers.
//!
//! A subscription always joins the *next* broadcast. Firing delivers the value to every
//! registered subscriber, clears the list, and opens a new generation. The authorizer only
//! subscribes while holding the state lock with the state at `Authenticating`, and only
//! broadcasts under that same lock, so a subscriber can never miss the attempt it joined.

// crates.io
use tokio::sync::oneshot;
// self
use crate::_prelude::*;

/// Fan-out channel delivering one value per generation.
pub struct BroadcastChannel<V> {
	subscribers: Vec<oneshot::Sender<V>>,
	generation: u64,
}
impl<V> BroadcastChannel<V>
where
	V: Clone,
{
	/// Creates an empty channel at generation zero.
	pub fn new() -> Self {
		Self { subscribers: Vec::new(), generation: 0 }
	}

	/// Registers a subscriber for the next broadcast.
	pub fn subscribe(&mut self) -> Subscription<V> {
		let (sender, receiver) = oneshot::channel();

		self.subscribers.push(sender);

		Subscription { generation: self.generation, receiver }
	}

	/// Delivers `value` to every registered subscriber and starts a new generation.
	///
	/// Returns how many subscribers were still listening.
	pub fn broadcast(&mut self, value: V) -> usize {
		let mut subscribers = std::mem::take(&mut self.subscribers);
		let mut delivered = 0;

		self.generation += 1;

		if let Some(last) = subscribers.pop() {
			for subscriber in subscribers {
				if subscriber.send(value.clone()).is_ok() {
					delivered += 1;
				}
			}
			if last.send(value).is_ok() {
				delivered += 1;
			}
		}

		delivered
	}

	/// Number of broadcasts fired so far.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}
impl<V> Default for BroadcastChannel<V>
where
	V: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<V> Debug for BroadcastChannel<V> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BroadcastChannel")
			.field("pending", &self.subscribers.len())
			.field("generation", &self.generation)
			.finish()
	}
}

/// Receiving half handed out by [`BroadcastChannel::subscribe`].
#[derive(Debug)]
pub struct Subscription<V> {
	generation: u64,
	receiver: oneshot::Receiver<V>,
}
impl<V> Subscription<V> {
	/// Generation this subscription was registered in.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Waits for the broadcast without blocking a thread.
	///
	/// Resolves to `None` only if the channel was dropped before firing.
	pub async fn wait(self) -> Option<V> {
		self.receiver.await.ok()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn broadcast_reaches_every_subscriber_once() {
		let mut channel = BroadcastChannel::new();
		let first = channel.subscribe();
		let second = channel.subscribe();
		let third = channel.subscribe();

		assert_eq!(channel.broadcast("done"), 3);
		assert_eq!(channel.broadcast("again"), 0);

		for subscription in [first, second, third] {
			assert_eq!(subscription.generation(), 0);
			assert_eq!(subscription.wait().await, Some("done"));
		}
	}

	#[tokio::test]
	async fn subscribers_after_a_broadcast_join_the_next_generation() {
		let mut channel = BroadcastChannel::new();
		let early = channel.subscribe();

		channel.broadcast(1_u8);

		let late = channel.subscribe();

		assert_eq!(late.generation(), 1);
		assert_eq!(channel.generation(), 1);
		assert_eq!(early.wait().await, Some(1));

		channel.broadcast(2);

		assert_eq!(late.wait().await, Some(2));
	}

	#[tokio::test]
	async fn dropped_subscribers_are_not_counted() {
		let mut channel = BroadcastChannel::new();
		let kept = channel.subscribe();

		drop(channel.subscribe());

		assert_eq!(channel.broadcast(7_u32), 1);
		assert_eq!(kept.wait().await, Some(7));
	}

	#[tokio::test]
	async fn dropping_the_channel_resolves_waiters_to_none() {
		let mut channel = BroadcastChannel::<u8>::new();
		let orphan = channel.subscribe();

		drop(channel);

		assert_eq!(orphan.wait().await, None);
	}

	#[test]
	fn broadcasting_without_subscribers_still_advances_generation() {
		let mut channel = BroadcastChannel::new();

		assert_eq!(channel.broadcast(()), 0);
		assert_eq!(channel.generation(), 1);
	}
}
