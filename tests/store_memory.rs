// std
use std::sync::Arc;
// self
use medrecords_client::{
	auth::TokenSecret,
	store::{CredentialStore, MemoryStore, StoreKey},
};

#[tokio::test]
async fn snapshot_reflects_stored_tokens() {
	let backend = MemoryStore::default();
	let store: Arc<dyn CredentialStore> = Arc::new(backend.clone());
	let empty = store.credentials().await.expect("Empty snapshot should load.");

	assert!(!empty.is_authenticated());

	store
		.set(StoreKey::AccessToken, TokenSecret::new("T1"))
		.await
		.expect("Access token should be stored.");

	let partial = store.credentials().await.expect("Partial snapshot should load.");

	assert!(partial.is_authenticated());
	assert!(!partial.is_complete());

	store
		.set(StoreKey::RefreshToken, TokenSecret::new("R1"))
		.await
		.expect("Refresh token should be stored.");
	store
		.set(StoreKey::AccessToken, TokenSecret::new("T2"))
		.await
		.expect("Access token should be replaced.");

	assert_eq!(backend.peek(StoreKey::AccessToken), Some(TokenSecret::new("T2")));
	assert!(store.credentials().await.expect("Snapshot should load.").is_complete());
}

#[tokio::test]
async fn clear_removes_both_tokens_and_tolerates_missing_keys() {
	let backend = MemoryStore::with_tokens("T1", "R1");
	let store: Arc<dyn CredentialStore> = Arc::new(backend.clone());

	store.clear().await.expect("Clearing a full store should succeed.");
	store.clear().await.expect("Clearing an empty store should succeed.");

	assert_eq!(backend.peek(StoreKey::AccessToken), None);
	assert_eq!(backend.peek(StoreKey::RefreshToken), None);
}

#[test]
fn token_debug_output_is_redacted() {
	let token = TokenSecret::new("super-secret");

	assert!(!format!("{token:?}").contains("super-secret"));
	assert_eq!(StoreKey::AccessToken.to_string(), "accessToken");
	assert_eq!(StoreKey::RefreshToken.as_str(), "refreshToken");
}
