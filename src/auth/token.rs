//! Token marker trait and a redacting bearer token wrapper.

// self
use crate::_prelude::*;

/// Opaque credential handled by an authorizer.
///
/// Only possession matters to the authorizer; tokens are never compared. Blanket-implemented for
/// every cloneable, thread-safe type.
pub trait Token
where
	Self: 'static + Clone + Send + Sync,
{
}
impl<T> Token for T where T: 'static + Clone + Send + Sync {}

/// Redacted access token wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the token as an RFC 6750 `Bearer` credential.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AccessToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(token.bearer(), "Bearer super-secret");
	}

	#[test]
	fn token_serializes_as_plain_string() {
		let token = AccessToken::new("abc");
		let json = serde_json::to_string(&token).expect("Token should serialize.");

		assert_eq!(json, "\"abc\"");
	}
}
