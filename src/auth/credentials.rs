//! Credential snapshots and the wire payloads exchanged with the token endpoints.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Snapshot of the credentials currently held by a [`CredentialStore`](crate::store::CredentialStore).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCredentials {
	/// Short-lived bearer credential, if one is stored.
	pub access_token: Option<TokenSecret>,
	/// Longer-lived credential exchanged for new access tokens, if one is stored.
	pub refresh_token: Option<TokenSecret>,
}
impl SessionCredentials {
	/// Returns true when an access token is available.
	pub fn is_authenticated(&self) -> bool {
		self.access_token.is_some()
	}

	/// Returns true when both tokens are stored, which is what a restored session requires.
	pub fn is_complete(&self) -> bool {
		self.access_token.is_some() && self.refresh_token.is_some()
	}
}
impl From<TokenPair> for SessionCredentials {
	fn from(pair: TokenPair) -> Self {
		Self { access_token: Some(pair.access), refresh_token: Some(pair.refresh) }
	}
}

/// Access/refresh pair issued by the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Newly issued access token.
	pub access: TokenSecret,
	/// Newly issued refresh token.
	pub refresh: TokenSecret,
}

#[derive(Serialize)]
pub(crate) struct LoginPayload<'a> {
	pub(crate) username: &'a str,
	pub(crate) password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RefreshPayload<'a> {
	pub(crate) refresh: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct RefreshGrant {
	pub(crate) access: TokenSecret,
}
