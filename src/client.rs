//! Authenticated backend client with transparent access-token refresh.
//!
//! Every call made through [`ApiClient::send`] passes two interceptors:
//!
//! - the request side reads the stored access token and sets `Authorization: Bearer <token>`;
//! - the response side recovers from a `401` by refreshing the access token once, replaying the
//!   request with the new token, and parking concurrent `401`s behind that single refresh.
//!
//! Unrecoverable failures (refresh endpoint rejection, missing refresh token) clear the stored
//! credentials and hand the configured login route to the [`Navigator`].

pub mod refresh;
pub mod request;

mod session;

pub use refresh::{RefreshCoordinator, RefreshMetrics};
pub use request::{ApiRequest, ApiResponse};

// crates.io
use http::{
	HeaderMap, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{RefreshGrant, RefreshPayload, TokenSecret},
	config::ClientConfig,
	error::{ConfigError, RefreshError},
	http::{HttpRequest, HttpResponse, HttpTransport, RequestBody},
	navigate::{Navigator, NoopNavigator},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, SessionEnd},
	store::{CredentialStore, StoreKey},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use refresh::RefreshTicket;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Backend client that owns the transport, credential store, navigator, and refresh state.
///
/// Clones share the same refresh coordinator, default headers, and metrics, so a clone handed
/// to another task still participates in the single in-flight refresh.
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound call, the refresh call included.
	pub transport: Arc<T>,
	/// Durable credential storage shared with the rest of the process.
	pub store: Arc<dyn CredentialStore>,
	/// Hook invoked with the login route when the session ends involuntarily.
	pub navigator: Arc<dyn Navigator>,
	/// Endpoint and timeout configuration.
	pub config: ClientConfig,
	/// Counters describing refresh activity.
	pub refresh_metrics: Arc<RefreshMetrics>,
	default_headers: Arc<RwLock<HeaderMap>>,
	coordinator: Arc<RefreshCoordinator>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client around a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let mut default_headers = HeaderMap::new();

		default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Self {
			transport: transport.into(),
			store,
			navigator: Arc::new(NoopNavigator),
			config,
			refresh_metrics: Default::default(),
			default_headers: Arc::new(RwLock::new(default_headers)),
			coordinator: Default::default(),
		}
	}

	/// Replaces the navigator invoked on forced logout.
	pub fn with_navigator(mut self, navigator: impl 'static + Navigator) -> Self {
		self.navigator = Arc::new(navigator);

		self
	}

	/// Returns a snapshot of the headers applied to every request.
	pub fn default_headers(&self) -> HeaderMap {
		self.default_headers.read().clone()
	}

	/// Returns true while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.coordinator.is_refreshing()
	}

	/// Sends `request`, refreshing the access token and replaying once if the backend answers
	/// `401`.
	///
	/// Non-`401` failures are returned unchanged. A request that already went through a replay
	/// fails on a second `401` instead of triggering another refresh.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.dispatch(&request).await?;

				if response.status.is_success() {
					return Ok(response.into());
				}

				self.recover(request, response).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Applies default headers, request headers, and the stored bearer token, then executes.
	async fn dispatch(&self, request: &ApiRequest) -> Result<HttpResponse> {
		let url = request.url(&self.config)?;
		let mut headers = self.default_headers();

		headers.extend(request.headers().clone());

		if let Some(token) = self.store.get(StoreKey::AccessToken).await? {
			headers.insert(AUTHORIZATION, token.bearer_header().map_err(ConfigError::from)?);
		}

		let response = self
			.transport
			.execute(HttpRequest {
				method: request.method().clone(),
				url,
				headers,
				body: request.body().clone(),
				timeout: self.config.timeout,
			})
			.await?;

		Ok(response)
	}

	async fn recover(&self, mut request: ApiRequest, response: HttpResponse) -> Result<ApiResponse> {
		if response.status != StatusCode::UNAUTHORIZED || request.is_retried() {
			return Err(response.into_status_error());
		}
		if self.config.is_refresh_endpoint(&request.url(&self.config)?) {
			obs::flow_warn(FlowKind::Refresh, "Refresh endpoint rejected the session.");
			self.end_session(SessionEnd::RefreshEndpointRejected).await;

			return Err(response.into_status_error());
		}

		let token = match self.coordinator.join() {
			RefreshTicket::Wait(waiter) => {
				self.refresh_metrics.record_queued();
				obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Queued);

				waiter.wait().await?
			},
			RefreshTicket::Lead(lead) => self.refresh(lead, response).await?,
		};

		request.mark_retried();
		request.set_bearer(&token)?;

		self.replay(&request).await
	}

	async fn refresh(
		&self,
		mut lead: refresh::RefreshLead,
		original: HttpResponse,
	) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		span.instrument(async move {
			let refresh_token = match self.store.get(StoreKey::RefreshToken).await {
				Ok(Some(token)) => token,
				Ok(None) => {
					obs::flow_warn(KIND, "No refresh token is stored; ending the session.");
					let released = lead.resolve(Err(RefreshError::MissingRefreshToken));

					obs::record_released_waiters(FlowOutcome::Failure, released);
					self.end_session(SessionEnd::MissingRefreshToken).await;

					return Err(original.into_status_error());
				},
				Err(e) => {
					let released =
						lead.resolve(Err(RefreshError::Storage { message: e.to_string() }));

					obs::record_released_waiters(FlowOutcome::Failure, released);

					return Err(e.into());
				},
			};

			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
			obs::flow_info(KIND, "Access token rejected; refreshing.");
			self.refresh_metrics.record_attempt();

			let outcome = match self.request_access_token(&refresh_token).await {
				Ok(access) => self
					.store
					.set(StoreKey::AccessToken, access.clone())
					.await
					.map(|()| access)
					.map_err(|e| RefreshError::Storage { message: e.to_string() }),
				Err(e) => Err(e),
			};

			match outcome {
				Ok(access) => {
					self.remember_default_authorization(&access);
					let released = lead.resolve(Ok(access.clone()));

					obs::record_released_waiters(FlowOutcome::Success, released);
					self.refresh_metrics.record_success();
					obs::record_flow_outcome(KIND, FlowOutcome::Success);
					obs::flow_info(KIND, "Access token refreshed.");

					Ok(access)
				},
				Err(e) => {
					obs::flow_warn(KIND, &format!("Token refresh failed: {e}"));
					let released = lead.resolve(Err(e.clone()));

					obs::record_released_waiters(FlowOutcome::Failure, released);
					self.end_session(SessionEnd::RefreshFailed).await;
					self.refresh_metrics.record_failure();
					obs::record_flow_outcome(KIND, FlowOutcome::Failure);

					Err(e.into())
				},
			}
		})
		.await
	}

	/// Calls the refresh endpoint directly through the transport, bypassing both interceptors.
	async fn request_access_token(
		&self,
		refresh_token: &TokenSecret,
	) -> Result<TokenSecret, RefreshError> {
		let request_failed = |message: String| RefreshError::Request { message };
		let url = self.config.refresh_url().map_err(|e| request_failed(e.to_string()))?;
		let body = serde_json::to_vec(&RefreshPayload { refresh: refresh_token.expose() })
			.map_err(|e| request_failed(e.to_string()))?;
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
			.await
			.map_err(|e| request_failed(e.to_string()))?;

		if !response.status.is_success() {
			return Err(RefreshError::Rejected {
				status: response.status.as_u16(),
				body: response.text_lossy(),
			});
		}

		request::decode_json::<RefreshGrant>(&response.body, response.status)
			.map(|grant| grant.access)
			.map_err(|e| match e {
				Error::Decode { source, .. } => RefreshError::MalformedResponse {
					message: format!("{} at `{}`", source.inner(), source.path()),
				},
				other => RefreshError::MalformedResponse { message: other.to_string() },
			})
	}

	/// Executes an already-retried request; any failure is final.
	async fn replay(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let response = self.dispatch(request).await?;

		if response.status.is_success() {
			Ok(response.into())
		} else {
			Err(response.into_status_error())
		}
	}

	/// Clears credentials and the default bearer header, then navigates to the login route.
	pub(crate) async fn end_session(&self, reason: SessionEnd) {
		obs::record_session_end(reason);

		if let Err(e) = self.store.clear().await {
			obs::flow_warn(FlowKind::Logout, &format!("Failed to clear stored credentials: {e}"));
		}

		self.forget_default_authorization();
		obs::record_flow_outcome(FlowKind::Logout, FlowOutcome::Success);
		self.navigator.navigate(&self.config.login_route);
	}

	fn remember_default_authorization(&self, token: &TokenSecret) {
		match token.bearer_header() {
			Ok(value) => {
				self.default_headers.write().insert(AUTHORIZATION, value);
			},
			Err(_) => self.forget_default_authorization(),
		}
	}

	fn forget_default_authorization(&self) {
		self.default_headers.write().remove(AUTHORIZATION);
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
		Self::with_transport(config, store, ReqwestHttpClient::default())
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			navigator: self.navigator.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			default_headers: self.default_headers.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("refreshing", &self.coordinator.is_refreshing())
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
