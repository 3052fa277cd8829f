//! Authenticated client for the patient records backend: bearer injection, single-flight
//! access-token refresh with request replay, and typed access to the clinical resources.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod navigate;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ReqwestApiClient,
		config::ClientConfig,
		http::ReqwestHttpClient,
		navigate::RecordingNavigator,
		store::{CredentialStore, MemoryStore, StoreKey},
	};

	/// Client, store, and navigator wired together against a mock backend.
	pub struct TestHarness {
		/// Client under test.
		pub client: ReqwestApiClient,
		/// Store backing the client, for seeding and inspecting tokens.
		pub store: Arc<MemoryStore>,
		/// Navigator capturing forced-logout redirects.
		pub navigator: RecordingNavigator,
	}
	impl TestHarness {
		/// Wires a client whose API root is `{server_base}/api/` to `store` and a recording
		/// navigator.
		pub fn new(server_base: &str, store: MemoryStore) -> Self {
			let config = ClientConfig::builder(format!("{server_base}/api/"))
				.build()
				.expect("Mock server base URL should be accepted.");
			let store = Arc::new(store);
			let dyn_store: Arc<dyn CredentialStore> = store.clone();
			let navigator = RecordingNavigator::default();
			let client =
				ReqwestApiClient::with_transport(config, dyn_store, test_reqwest_http_client())
					.with_navigator(navigator.clone());

			Self { client, store, navigator }
		}

		/// Same as [`TestHarness::new`] with both tokens already stored.
		pub fn with_tokens(server_base: &str, access: &str, refresh: &str) -> Self {
			Self::new(server_base, MemoryStore::with_tokens(access, refresh))
		}

		/// Currently stored access token.
		pub fn access_token(&self) -> Option<String> {
			self.store.peek(StoreKey::AccessToken).map(|token| token.expose().to_owned())
		}

		/// Currently stored refresh token.
		pub fn refresh_token(&self) -> Option<String> {
			self.store.peek(StoreKey::RefreshToken).map(|token| token.expose().to_owned())
		}
	}

	/// Builds a reqwest HTTP client suited for talking to `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.build()
			.expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use client::{ApiClient, ApiRequest, ApiResponse};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
