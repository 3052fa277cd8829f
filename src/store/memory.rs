//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CredentialStore, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, TokenSecret>>>;

/// Thread-safe storage backend that keeps credentials in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store pre-populated with both tokens.
	pub fn with_tokens(access: impl Into<TokenSecret>, refresh: impl Into<TokenSecret>) -> Self {
		let store = Self::default();

		{
			let mut map = store.0.write();

			map.insert(StoreKey::AccessToken, access.into());
			map.insert(StoreKey::RefreshToken, refresh.into());
		}

		store
	}

	/// Returns the value stored under `key` without going through the async contract.
	pub fn peek(&self, key: StoreKey) -> Option<TokenSecret> {
		self.0.read().get(&key).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self, key: StoreKey) -> StoreFuture<'_, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&key).cloned()) })
	}

	fn set(&self, key: StoreKey, value: TokenSecret) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key, value);

			Ok(())
		})
	}

	fn remove(&self, key: StoreKey) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(&key);

			Ok(())
		})
	}
}
