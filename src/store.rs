//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{SessionCredentials, TokenSecret},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable key-value storage for session credentials, shared process-wide.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Reads the secret stored under `key`, if present.
	fn get(&self, key: StoreKey) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Persists or replaces the secret stored under `key`.
	fn set(&self, key: StoreKey, value: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes the secret stored under `key`; removing a missing key is not an error.
	fn remove(&self, key: StoreKey) -> StoreFuture<'_, ()>;
}
impl dyn CredentialStore {
	/// Reads both tokens into a single snapshot.
	pub async fn credentials(&self) -> Result<SessionCredentials, StoreError> {
		Ok(SessionCredentials {
			access_token: self.get(StoreKey::AccessToken).await?,
			refresh_token: self.get(StoreKey::RefreshToken).await?,
		})
	}

	/// Removes both tokens.
	pub async fn clear(&self) -> Result<(), StoreError> {
		self.remove(StoreKey::AccessToken).await?;
		self.remove(StoreKey::RefreshToken).await
	}
}

/// Fixed storage keys used for session credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoreKey {
	/// Key holding the access token.
	#[serde(rename = "accessToken")]
	AccessToken,
	/// Key holding the refresh token.
	#[serde(rename = "refreshToken")]
	RefreshToken,
}
impl StoreKey {
	/// Returns the storage key string.
	pub const fn as_str(self) -> &'static str {
		match self {
			StoreKey::AccessToken => "accessToken",
			StoreKey::RefreshToken => "refreshToken",
		}
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
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
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn store_keys_serialize_to_fixed_names() {
		let payload = serde_json::to_string(&[StoreKey::AccessToken, StoreKey::RefreshToken])
			.expect("Store keys should serialize to JSON.");

		assert_eq!(payload, r#"["accessToken","refreshToken"]"#);
		assert_eq!(StoreKey::RefreshToken.to_string(), "refreshToken");
	}
}
