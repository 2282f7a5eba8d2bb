//! Authorizer-level error types shared across the state machine, stores, and transports.

// self
use crate::{_prelude::*, store::StoreError};

/// Authorizer-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical domain error delivered to request completions.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token store failure (unreadable credential or backend fault).
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The transport could not execute the request.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Authentication is required but no presentation surface is available for the challenge.
	#[error("User interaction is required, but no presentation surface is available.")]
	UserInteractionRequired,
	/// The auth provider declined to produce a token.
	#[error("Authentication failed: {0}")]
	AuthenticationFailed(#[source] ProviderError),
}
impl From<AuthenticationError> for Error {
	fn from(e: AuthenticationError) -> Self {
		match e {
			AuthenticationError::UserInteractionRequired => Self::UserInteractionRequired,
			AuthenticationError::Provider(e) => Self::AuthenticationFailed(e),
			AuthenticationError::Storage(e) => Self::Storage(e),
		}
	}
}

/// Failure reported by an [`AuthProvider`](crate::provider::AuthProvider) challenge.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderError {
	/// The provider (or the user) refused to issue a token.
	#[error("Provider declined to issue a token: {reason}.")]
	Declined {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// The challenge was dismissed before it completed.
	#[error("Authentication challenge was cancelled.")]
	Cancelled,
}

/// Outcome of a failed authentication cycle, fanned out to every waiting request.
///
/// Unlike [`Error`], this type is cheap to clone so one failure can be delivered to any number
/// of subscribers.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthenticationError {
	/// No presentation surface was available to run the challenge on.
	#[error("User interaction is required, but no presentation surface is available.")]
	UserInteractionRequired,
	/// The provider's challenge failed.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// The issued token could not be persisted.
	#[error(transparent)]
	Storage(#[from] StoreError),
}

/// Configuration and validation failures raised while building an authorizer.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No Tokio runtime is available to run dispatch work on.
	#[error("No Tokio runtime is available; construct the authorizer inside a runtime or pass a handle.")]
	RuntimeUnavailable,
	/// Configured rejection status is not a valid HTTP status code.
	#[error("Rejection status {status} is not a valid HTTP status code.")]
	InvalidRejectionStatus {
		/// Offending status value.
		status: u16,
	},
	/// Configured authorization header name cannot be used.
	#[error("Authorization header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
		/// Underlying parsing failure.
		#[source]
		source: http::header::InvalidHeaderName,
	},
	/// The provider derived a header value that is not valid HTTP.
	#[error("Provider produced an invalid authorization header value.")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while executing the authorized request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while executing the authorized request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Aborts the process after a collaborator broke its contract.
///
/// Collaborators may only fail with the documented domain errors. A broken contract (a dropped
/// job, a vanished broadcast) leaves callers without a completion, so it is never downgraded to
/// a recoverable error.
#[cold]
pub(crate) fn contract_violation(what: &str) -> ! {
	#[cfg(feature = "tracing")]
	tracing::error!(violation = what, "request authorizer contract violated; aborting");

	#[cfg(not(feature = "tracing"))]
	let _ = what;

	std::process::abort()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authentication_errors_map_onto_domain_errors() {
		assert!(matches!(
			Error::from(AuthenticationError::UserInteractionRequired),
			Error::UserInteractionRequired
		));

		let declined = ProviderError::Declined { reason: "user said no".into() };
		let err = Error::from(AuthenticationError::Provider(declined.clone()));

		assert!(matches!(&err, Error::AuthenticationFailed(inner) if *inner == declined));
		assert!(err.to_string().contains("user said no"));

		let storage = StoreError::Backend { message: "keychain locked".into() };
		let err = Error::from(AuthenticationError::Storage(storage));

		assert!(matches!(err, Error::Storage(StoreError::Backend { .. })));
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
		let err = Error::from(TransportError::network(io));
		let source = StdError::source(&err).expect("Transport error should expose its cause.");

		assert_eq!(source.to_string(), "peer reset");
	}
}
