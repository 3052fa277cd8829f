//! Login, logout, and session inspection.

// crates.io
use http::{HeaderMap, HeaderValue, Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{LoginPayload, SessionCredentials, TokenPair},
	client::{ApiClient, request},
	error::ConfigError,
	http::{HttpRequest, HttpTransport, RequestBody},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreKey,
};

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Exchanges username and password for a token pair and stores both tokens.
	///
	/// The call bypasses the refresh logic: rejected credentials surface as
	/// [`Error::Status`] with status `401`, and the navigator is not invoked.
	pub async fn login(&self, username: &str, password: &str) -> Result<SessionCredentials> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.config.login_url()?;
				let body = serde_json::to_vec(&LoginPayload { username, password })
					.map_err(ConfigError::from)?;
				let mut headers = HeaderMap::new();

				headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

				let response = self
					.transport
					.execute(HttpRequest {
						method: Method::POST,
						url,
						headers,
						body: RequestBody::Json(body),
						timeout: self.config.timeout,
					})
					.await?;

				if !response.status.is_success() {
					return Err(response.into_status_error());
				}

				let pair: TokenPair = request::decode_json(&response.body, response.status)?;

				self.store.set(StoreKey::AccessToken, pair.access.clone()).await?;
				self.store.set(StoreKey::RefreshToken, pair.refresh.clone()).await?;
				obs::flow_info(KIND, "Session established.");

				Ok(SessionCredentials::from(pair))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Clears both tokens and the default bearer header, then navigates to the login route.
	pub async fn logout(&self) -> Result<()> {
		let cleared = self.store.clear().await;

		self.forget_default_authorization();
		obs::record_flow_outcome(FlowKind::Logout, FlowOutcome::Success);
		obs::flow_info(FlowKind::Logout, "Session cleared.");
		self.navigator.navigate(&self.config.login_route);

		cleared.map_err(Error::from)
	}

	/// Returns the credentials currently held by the store.
	pub async fn credentials(&self) -> Result<SessionCredentials> {
		Ok(self.store.credentials().await?)
	}

	/// Returns true when an access token is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.credentials().await?.is_authenticated())
	}

	/// Returns true when both tokens are stored, i.e. a previous session can be resumed.
	pub async fn has_session(&self) -> Result<bool> {
		Ok(self.credentials().await?.is_complete())
	}
}
