#![cfg(all(feature = "reqwest", feature = "test"))]

// std
use std::time::Duration;
// crates.io
use futures::future;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use httpmock::prelude::*;
use serde_json::json;
// self
use medrecords_client::{
	_preludet::*,
	ApiRequest,
	auth::TokenSecret,
	client::ReqwestApiClient,
	config::{ClientConfig, DEFAULT_LOGIN_ROUTE},
	error::RefreshError,
	navigate::RecordingNavigator,
	store::{CredentialStore, MemoryStore, StoreFuture, StoreKey},
};

const PATIENTS: &str = "/api/patients/";
const REFRESH: &str = "/api/token/refresh/";

/// Memory store whose refresh-token lookup takes a while, keeping the leader busy so concurrent
/// `401`s park behind it.
struct SlowRefreshLookup {
	inner: MemoryStore,
	delay: Duration,
}
impl CredentialStore for SlowRefreshLookup {
	fn get(&self, key: StoreKey) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move {
			if key == StoreKey::RefreshToken {
				tokio::time::sleep(self.delay).await;
			}

			self.inner.get(key).await
		})
	}

	fn set(&self, key: StoreKey, value: TokenSecret) -> StoreFuture<'_, ()> {
		self.inner.set(key, value)
	}

	fn remove(&self, key: StoreKey) -> StoreFuture<'_, ()> {
		self.inner.remove(key)
	}
}

fn patient_list() -> serde_json::Value {
	json!([{ "id": 1, "last_name": "Ivanova", "first_name": "Anna", "date_of_birth": "1980-02-11" }])
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_request_replayed() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS).header("authorization", "Bearer T1");
			then.status(401).json_body(json!({ "detail": "Token is invalid or expired" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH).json_body(json!({ "refresh": "R1" }));
			then.status(200).json_body(json!({ "access": "T2" }));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS).header("authorization", "Bearer T2");
			then.status(200).json_body(patient_list());
		})
		.await;
	let patients = harness.client.patients(None).await?;

	rejected.assert_async().await;
	refresh.assert_async().await;
	accepted.assert_async().await;

	assert_eq!(patients.len(), 1);
	assert_eq!(patients[0].last_name, "Ivanova");
	assert_eq!(harness.access_token().as_deref(), Some("T2"));
	assert_eq!(harness.refresh_token().as_deref(), Some("R1"));
	assert_eq!(
		harness
			.client
			.default_headers()
			.get("authorization")
			.and_then(|value| value.to_str().ok()),
		Some("Bearer T2"),
	);
	assert!(harness.navigator.routes().is_empty());
	assert!(!harness.client.is_refreshing());
	assert_eq!(harness.client.refresh_metrics.attempts(), 1);
	assert_eq!(harness.client.refresh_metrics.successes(), 1);

	Ok(())
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
	const CONCURRENCY: usize = 5;

	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS).header("authorization", "Bearer T1");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200).delay(Duration::from_millis(500)).json_body(json!({ "access": "T2" }));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS).header("authorization", "Bearer T2");
			then.status(200).json_body(patient_list());
		})
		.await;
	let results =
		future::join_all((0..CONCURRENCY).map(|_| harness.client.patients(None))).await;

	for result in results {
		let patients = result.expect("Every request should succeed after the shared refresh.");

		assert_eq!(patients.len(), 1);
	}

	rejected.assert_calls_async(CONCURRENCY).await;
	refresh.assert_async().await;
	accepted.assert_calls_async(CONCURRENCY).await;

	assert_eq!(harness.access_token().as_deref(), Some("T2"));
	assert_eq!(harness.client.refresh_metrics.attempts(), 1);
	assert_eq!(harness.client.refresh_metrics.queued(), CONCURRENCY as u64 - 1);
	assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn refresh_rejection_fails_every_queued_request_and_ends_session() {
	const CONCURRENCY: usize = 3;

	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(401)
				.delay(Duration::from_millis(300))
				.json_body(json!({ "detail": "Token is blacklisted" }));
		})
		.await;
	let results =
		future::join_all((0..CONCURRENCY).map(|_| harness.client.patients(None))).await;

	for result in results {
		match result {
			Err(Error::Refresh(RefreshError::Rejected { status, .. })) => assert_eq!(status, 401),
			other => panic!("Expected a refresh rejection, got {other:?}."),
		}
	}

	rejected.assert_calls_async(CONCURRENCY).await;
	refresh.assert_async().await;

	assert_eq!(harness.access_token(), None);
	assert_eq!(harness.refresh_token(), None);
	assert_eq!(harness.navigator.routes(), vec![DEFAULT_LOGIN_ROUTE.to_string()]);
	assert!(harness.client.default_headers().get("authorization").is_none());
	assert_eq!(harness.client.refresh_metrics.failures(), 1);
	assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn missing_refresh_token_ends_session_without_calling_refresh() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::default();

	store
		.set(StoreKey::AccessToken, "T1".into())
		.await
		.expect("Seeding the access token should succeed.");

	let harness = TestHarness::new(&server.base_url(), store);
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS).header("authorization", "Bearer T1");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200).json_body(json!({ "access": "T2" }));
		})
		.await;
	let err = harness.client.patients(None).await.expect_err("The 401 should propagate.");

	rejected.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert!(err.is_unauthorized());
	assert_eq!(harness.access_token(), None);
	assert_eq!(harness.navigator.routes(), vec![DEFAULT_LOGIN_ROUTE.to_string()]);
	assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn missing_refresh_token_releases_every_queued_request() -> color_eyre::Result<()> {
	const CONCURRENCY: usize = 4;

	let server = MockServer::start_async().await;
	let inner = MemoryStore::default();

	inner.set(StoreKey::AccessToken, "T1".into()).await?;

	let store = Arc::new(SlowRefreshLookup { inner: inner.clone(), delay: Duration::from_millis(400) });
	let navigator = RecordingNavigator::default();
	let client = ReqwestApiClient::with_transport(
		ClientConfig::builder(format!("{}/api/", server.base_url())).build()?,
		store,
		test_reqwest_http_client(),
	)
	.with_navigator(navigator.clone());
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200).json_body(json!({ "access": "T2" }));
		})
		.await;
	let results = tokio::time::timeout(
		Duration::from_secs(5),
		future::join_all((0..CONCURRENCY).map(|_| client.patients(None))),
	)
	.await?;
	let mut unauthorized = 0;
	let mut released = 0;

	for result in results {
		match result {
			Err(e) if e.is_unauthorized() => unauthorized += 1,
			Err(Error::Refresh(RefreshError::MissingRefreshToken)) => released += 1,
			other => panic!("Expected a 401 or a missing refresh token, got {other:?}."),
		}
	}

	rejected.assert_calls_async(CONCURRENCY).await;
	refresh.assert_calls_async(0).await;

	assert_eq!(unauthorized, 1);
	assert_eq!(released, CONCURRENCY - 1);
	assert_eq!(client.refresh_metrics.queued(), CONCURRENCY as u64 - 1);
	assert_eq!(inner.peek(StoreKey::AccessToken), None);
	assert_eq!(navigator.routes(), vec![DEFAULT_LOGIN_ROUTE.to_string()]);
	assert!(!client.is_refreshing());

	Ok(())
}

#[tokio::test]
async fn unauthorized_refresh_endpoint_ends_session() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(401);
		})
		.await;
	let err = harness
		.client
		.send(ApiRequest::post("token/refresh/").json(&json!({ "refresh": "R1" }))?)
		.await
		.expect_err("The refresh endpoint rejection should propagate.");

	refresh.assert_async().await;

	assert!(err.is_unauthorized());
	assert_eq!(harness.access_token(), None);
	assert_eq!(harness.refresh_token(), None);
	assert_eq!(harness.navigator.routes(), vec![DEFAULT_LOGIN_ROUTE.to_string()]);
	assert_eq!(harness.client.refresh_metrics.attempts(), 0);

	Ok(())
}

#[tokio::test]
async fn second_unauthorized_after_replay_is_returned_unchanged() {
	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PATIENTS);
			then.status(401).body("still unauthorized");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200).json_body(json!({ "access": "T2" }));
		})
		.await;
	let err = harness.client.patients(None).await.expect_err("The replay should fail.");

	rejected.assert_calls_async(2).await;
	refresh.assert_async().await;

	match err {
		Error::Status { status, body, .. } => {
			assert_eq!(status, 401);
			assert_eq!(body, "still unauthorized");
		},
		other => panic!("Expected the replay's status error, got {other:?}."),
	}

	assert_eq!(harness.access_token().as_deref(), Some("T2"));
	assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn non_unauthorized_failures_pass_through() {
	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/patients/42/");
			then.status(404).header("retry-after", "5").json_body(json!({ "detail": "Not found." }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200).json_body(json!({ "access": "T2" }));
		})
		.await;
	let err = harness.client.patient(42).await.expect_err("The 404 should propagate.");

	missing.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert_eq!(err.status(), Some(404));
	assert!(matches!(err, Error::Status { retry_after: Some(_), .. }));
	assert_eq!(harness.access_token().as_deref(), Some("T1"));
	assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn request_headers_override_defaults_but_not_the_stored_bearer() {
	let server = MockServer::start_async().await;
	let harness = TestHarness::with_tokens(&server.base_url(), "T1", "R1");
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/parameters/")
				.header("authorization", "Bearer T1")
				.header("content-type", "text/plain")
				.header("x-request-id", "abc");
			then.status(200).json_body(json!([]));
		})
		.await;
	let response = harness
		.client
		.send(
			ApiRequest::get("/parameters/")
				.header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
				.header(AUTHORIZATION, HeaderValue::from_static("Bearer stale"))
				.header(HeaderName::from_static("x-request-id"), HeaderValue::from_static("abc")),
		)
		.await
		.expect("Request should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn dictionary_search_works_without_a_session() {
	let server = MockServer::start_async().await;
	let harness = TestHarness::new(&server.base_url(), MemoryStore::default());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/mkb-codes/").query_param("search", "C71");
			then.status(200).json_body(json!([{ "code": "C71.0", "name": "Cerebrum" }]));
		})
		.await;
	let codes = harness.client.search_mkb_codes("C71").await.expect("Search should succeed.");

	mock.assert_async().await;

	assert_eq!(codes.len(), 1);
	assert_eq!(codes[0].code, "C71.0");
}
