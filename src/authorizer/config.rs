//! Tunables for rejection detection and header placement.

// crates.io
use http::{HeaderName, StatusCode, header::AUTHORIZATION};
// self
use crate::{_prelude::*, error::ConfigError};

/// Serializable authorizer configuration.
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// let config: request_authorizer::authorizer::AuthorizerConfig =
/// 	serde_json::from_str(r#"{ "rejection_status": 403 }"#).unwrap();
///
/// assert_eq!(config.authorization_header, "authorization");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
	/// Response status that signals a rejected credential.
	pub rejection_status: u16,
	/// Header that carries the provider-derived credential.
	pub authorization_header: String,
	/// Whether [`Authorizer::send`](crate::authorizer::Authorizer::send) reauthenticates once
	/// after a rejection.
	pub reauthenticate_on_rejection: bool,
}
impl AuthorizerConfig {
	pub(crate) fn policy(&self) -> Result<DispatchPolicy, ConfigError> {
		let rejection_status = StatusCode::from_u16(self.rejection_status)
			.map_err(|_| ConfigError::InvalidRejectionStatus { status: self.rejection_status })?;
		let header = HeaderName::from_bytes(self.authorization_header.as_bytes()).map_err(|source| {
			ConfigError::InvalidHeaderName { name: self.authorization_header.clone(), source }
		})?;

		Ok(DispatchPolicy {
			rejection_status,
			header,
			reauthenticate: self.reauthenticate_on_rejection,
		})
	}
}
impl Default for AuthorizerConfig {
	fn default() -> Self {
		Self {
			rejection_status: StatusCode::UNAUTHORIZED.as_u16(),
			authorization_header: AUTHORIZATION.as_str().to_owned(),
			reauthenticate_on_rejection: true,
		}
	}
}

/// Validated form of [`AuthorizerConfig`].
#[derive(Clone, Debug)]
pub(crate) struct DispatchPolicy {
	pub(crate) rejection_status: StatusCode,
	pub(crate) header: HeaderName,
	pub(crate) reauthenticate: bool,
}
impl Default for DispatchPolicy {
	fn default() -> Self {
		Self { rejection_status: StatusCode::UNAUTHORIZED, header: AUTHORIZATION, reauthenticate: true }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_validate_to_bearer_policy() {
		let policy =
			AuthorizerConfig::default().policy().expect("Default configuration should validate.");

		assert_eq!(policy.rejection_status, StatusCode::UNAUTHORIZED);
		assert_eq!(policy.header, AUTHORIZATION);
		assert!(policy.reauthenticate);
	}

	#[test]
	fn partial_documents_fill_defaults() {
		let config: AuthorizerConfig = serde_json::from_str(
			r#"{ "authorization_header": "X-Api-Token", "reauthenticate_on_rejection": false }"#,
		)
		.expect("Partial configuration should deserialize.");
		let policy = config.policy().expect("Custom header should validate.");

		assert_eq!(config.rejection_status, 401);
		assert_eq!(policy.header.as_str(), "x-api-token");
		assert!(!policy.reauthenticate);
	}

	#[test]
	fn invalid_values_are_rejected() {
		let config = AuthorizerConfig { rejection_status: 42, ..Default::default() };

		assert!(matches!(
			config.policy(),
			Err(ConfigError::InvalidRejectionStatus { status: 42 })
		));

		let config =
			AuthorizerConfig { authorization_header: "bad header".into(), ..Default::default() };

		assert!(matches!(config.policy(), Err(ConfigError::InvalidHeaderName { .. })));
	}
}
