//! Lock-guarded authentication state machine.
//!
//! [`AuthState`] owns the only shared mutable data of an authorizer: the current
//! [`AuthenticationState`], the generation counter of the credential in use, and the
//! [`BroadcastChannel`] that waiters subscribe to. Every operation holds a single async lock for
//! its whole body, including the token-store round-trip that reconciles the in-memory state with
//! persisted data on first access. No operation holds the lock across a network call.
//!
//! The public operations (`fetch`, `update`, `clear_token`) and the ones the authorizer drives
//! (`begin`, `settle`, `clear_rejected`) share their transitions: `begin` is `fetch` with a
//! subscription attached, `update` and `settle` both go through one apply step, and both clears
//! go through one delete-then-forget step. The store is always written before memory changes, so
//! a store fault never leaves memory ahead of persisted data.

// self
use crate::{
	_prelude::*,
	auth::{BroadcastChannel, Subscription, Token},
	error::{AuthenticationError, ProviderError},
	store::{StoreError, TokenStore},
};

/// Outcome fanned out to waiters when an authentication cycle settles.
pub type AuthOutcome<T> = Result<Credential<T>, AuthenticationError>;

/// Lifecycle of the single credential an authorizer manages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthenticationState<T> {
	/// No usable token; the next request starts an authentication cycle.
	Unauthenticated,
	/// An authentication cycle is in flight; new requests wait on the broadcast channel.
	Authenticating,
	/// A token is available for requests.
	Authenticated(T),
}
impl<T> AuthenticationState<T> {
	/// Returns the token when authenticated.
	pub fn token(&self) -> Option<&T> {
		match self {
			Self::Authenticated(token) => Some(token),
			_ => None,
		}
	}

	/// Returns `true` while an authentication cycle is in flight.
	pub fn is_authenticating(&self) -> bool {
		matches!(self, Self::Authenticating)
	}

	/// Stable label suitable for span fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::Unauthenticated => "unauthenticated",
			Self::Authenticating => "authenticating",
			Self::Authenticated(_) => "authenticated",
		}
	}
}

/// Token paired with the generation it was issued in.
///
/// The generation increases every time the state enters `Authenticated`, which lets a request
/// that saw its token rejected clear exactly that token and nothing newer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential<T> {
	/// Token to authorize requests with.
	pub token: T,
	/// Generation of the `Authenticated` state that held this token.
	pub generation: u64,
}

/// Decision taken under the state lock for one dispatch attempt.
#[derive(Debug)]
pub(crate) enum Admission<T> {
	/// A token is available.
	Ready(Credential<T>),
	/// This caller moved the state to `Authenticating` and must run the cycle.
	Start(Subscription<AuthOutcome<T>>),
	/// Another caller's cycle is in flight.
	Wait(Subscription<AuthOutcome<T>>),
}

struct Inner<T> {
	state: AuthenticationState<T>,
	loaded: bool,
	generation: u64,
	waiters: BroadcastChannel<AuthOutcome<T>>,
}
impl<T> Inner<T>
where
	T: Token,
{
	fn authenticate(&mut self, token: T) -> Credential<T> {
		self.generation += 1;
		self.state = AuthenticationState::Authenticated(token.clone());

		Credential { token, generation: self.generation }
	}
}

/// Synchronized authentication state backed by a [`TokenStore`].
pub struct AuthState<T> {
	store: Arc<dyn TokenStore<T>>,
	inner: AsyncMutex<Inner<T>>,
}
impl<T> AuthState<T>
where
	T: Token,
{
	/// Creates a state cell that lazily reconciles with `store` on first access.
	pub fn new(store: Arc<dyn TokenStore<T>>) -> Self {
		Self {
			store,
			inner: AsyncMutex::new(Inner {
				state: AuthenticationState::Unauthenticated,
				loaded: false,
				generation: 0,
				waiters: BroadcastChannel::new(),
			}),
		}
	}

	/// Inspects the state and optionally starts authenticating, atomically.
	///
	/// `body` sees the current state and a `started_authenticating` flag. If the state is
	/// `Unauthenticated` and `body` sets the flag, the state becomes `Authenticating` before the
	/// lock is released, so two callers can never both start a cycle.
	pub async fn fetch<R>(
		&self,
		body: impl FnOnce(&AuthenticationState<T>, &mut bool) -> R,
	) -> Result<R> {
		let mut inner = self.lock_loaded().await?;
		let mut started_authenticating = false;
		let output = body(&inner.state, &mut started_authenticating);

		if started_authenticating && matches!(inner.state, AuthenticationState::Unauthenticated) {
			inner.state = AuthenticationState::Authenticating;
		}

		Ok(output)
	}

	/// Replaces the state with `Authenticated(token)` (`Some`) or `Unauthenticated` (`None`).
	///
	/// A new token is persisted before it becomes visible and a cleared one is deleted before it
	/// disappears; if the store fails, the previous state is kept and the fault is returned.
	/// Leaving `Authenticating` this way settles the in-flight cycle the same way the authorizer
	/// does when a challenge ends: waiters receive the new token, the storage fault, or
	/// [`ProviderError::Cancelled`], and the state never stays `Authenticating`.
	pub async fn update(&self, body: impl FnOnce(&AuthenticationState<T>) -> Option<T>) -> Result<()> {
		let mut inner = self.lock_loaded().await?;

		match body(&inner.state) {
			Some(token) => self.apply(&mut inner, Ok(token)).await.1?,
			None if inner.state.is_authenticating() => {
				self.apply(&mut inner, Err(ProviderError::Cancelled.into())).await.1?
			},
			None => {
				self.clear_locked(&mut inner, None).await?;
			},
		}

		Ok(())
	}

	/// Discards the current token, in the store first and then in memory.
	///
	/// Callers must only invoke this after a token was actually in use; outside `Authenticated`
	/// it does nothing. A failed delete leaves the token in place.
	pub async fn clear_token(&self) -> Result<()> {
		let mut inner = self.lock_loaded().await?;

		self.clear_locked(&mut inner, None).await?;

		Ok(())
	}

	/// Returns a snapshot of the current state.
	pub async fn current(&self) -> Result<AuthenticationState<T>> {
		Ok(self.lock_loaded().await?.state.clone())
	}

	/// Forgets any token, in the store first and then in memory.
	///
	/// Unlike every other operation this does not read the store first, so it also recovers from
	/// a persisted token that no longer decodes. An in-flight cycle is left untouched. A failed
	/// delete changes nothing.
	pub async fn sign_out(&self) -> Result<()> {
		let mut inner = self.inner.lock().await;

		self.store.delete().await?;

		inner.loaded = true;

		if !inner.state.is_authenticating() {
			inner.state = AuthenticationState::Unauthenticated;
		}

		Ok(())
	}

	/// Decides, under the lock, whether a request can proceed, must start a cycle, or must wait.
	///
	/// Same check-and-transition as [`fetch`](Self::fetch), plus the subscription a caller needs
	/// to hear how the cycle ends.
	pub(crate) async fn begin(&self) -> Result<Admission<T>> {
		let mut guard = self.lock_loaded().await?;
		let inner = &mut *guard;
		let admission = match &inner.state {
			AuthenticationState::Authenticated(token) =>
				Admission::Ready(Credential { token: token.clone(), generation: inner.generation }),
			AuthenticationState::Authenticating => Admission::Wait(inner.waiters.subscribe()),
			AuthenticationState::Unauthenticated => Admission::Start(inner.waiters.subscribe()),
		};

		if matches!(admission, Admission::Start(_)) {
			inner.state = AuthenticationState::Authenticating;
		}

		Ok(admission)
	}

	/// Applies the result of an authentication cycle and broadcasts it before releasing the lock.
	///
	/// A successful token is persisted first; if that fails the state resets to `Unauthenticated`
	/// and the storage fault is what waiters receive. Returns how many waiters were notified.
	pub(crate) async fn settle(&self, outcome: Result<T, AuthenticationError>) -> usize {
		let mut inner = self.inner.lock().await;

		self.apply(&mut inner, outcome).await.0
	}

	/// Clears the token only if it is still the one issued in `generation`.
	pub(crate) async fn clear_rejected(&self, generation: u64) -> Result<bool> {
		let mut inner = self.lock_loaded().await?;

		Ok(self.clear_locked(&mut inner, Some(generation)).await?)
	}

	/// Moves to `Authenticated(token)` or, when settling a cycle, to `Unauthenticated`.
	///
	/// Shared by [`update`](Self::update) and [`settle`](Self::settle). Outside `Authenticating` a
	/// failed save leaves the state alone. Returns the number of notified waiters and the storage
	/// fault, if any.
	async fn apply(
		&self,
		inner: &mut Inner<T>,
		next: Result<T, AuthenticationError>,
	) -> (usize, Result<(), StoreError>) {
		let settling = inner.state.is_authenticating();
		let (outcome, fault) = match next {
			Ok(token) => match self.store.save(token.clone()).await {
				Ok(()) => (Ok(inner.authenticate(token)), Ok(())),
				Err(e) => (Err(AuthenticationError::Storage(e.clone())), Err(e)),
			},
			Err(e) => (Err(e), Ok(())),
		};

		if !settling {
			return (0, fault);
		}
		if outcome.is_err() {
			inner.state = AuthenticationState::Unauthenticated;
		}

		(inner.waiters.broadcast(outcome), fault)
	}

	/// Deletes the stored token, then leaves `Authenticated`.
	///
	/// Shared by [`clear_token`](Self::clear_token) (`None`) and
	/// [`clear_rejected`](Self::clear_rejected) (`Some(generation)`).
	async fn clear_locked(
		&self,
		inner: &mut Inner<T>,
		generation: Option<u64>,
	) -> Result<bool, StoreError> {
		if !matches!(inner.state, AuthenticationState::Authenticated(_))
			|| generation.is_some_and(|generation| generation != inner.generation)
		{
			return Ok(false);
		}

		self.store.delete().await?;

		inner.state = AuthenticationState::Unauthenticated;

		Ok(true)
	}

	async fn lock_loaded(&self) -> Result<async_lock::MutexGuard<'_, Inner<T>>, StoreError> {
		let mut inner = self.inner.lock().await;

		if !inner.loaded {
			if let Some(token) = self.store.fetch().await? {
				inner.authenticate(token);
			}

			inner.loaded = true;
		}

		Ok(inner)
	}
}
impl<T> Debug for AuthState<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthState").finish_non_exhaustive()
	}
}
