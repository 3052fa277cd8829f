//! Replayable request descriptions and decoded responses.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::AUTHORIZATION,
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	error::ConfigError,
	http::{HttpResponse, MultipartField, RequestBody},
};

/// Backend request that can be replayed after a token refresh.
///
/// Paths are resolved against [`ClientConfig::base_url`] at dispatch time. The retry mark is
/// set by the client the first time the request is replayed and is never cleared, which caps
/// every logical request at one replay.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	method: Method,
	path: String,
	query: Vec<(String, String)>,
	headers: HeaderMap,
	body: RequestBody,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request with no query, headers, or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: RequestBody::Empty,
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair; repeated keys are kept in insertion order.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Appends a query pair only when `value` is present.
	pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
		match value {
			Some(value) => self.query(key, value),
			None => self,
		}
	}

	/// Sets a request header, replacing any previous value.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = RequestBody::Json(serde_json::to_vec(body)?);

		Ok(self)
	}

	/// Uses `fields` as a `multipart/form-data` payload.
	pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
		self.body = RequestBody::Multipart(fields);

		self
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Path as supplied by the caller.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Request-specific headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Request payload.
	pub fn body(&self) -> &RequestBody {
		&self.body
	}

	/// Returns true once the request has been replayed after a refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	/// Resolves the absolute URL, query included.
	pub fn url(&self, config: &ClientConfig) -> Result<Url, ConfigError> {
		let mut url = config.resolve(&self.path)?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		Ok(url)
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}

	pub(crate) fn set_bearer(&mut self, token: &TokenSecret) -> Result<(), ConfigError> {
		self.headers.insert(AUTHORIZATION, token.bearer_header()?);

		Ok(())
	}
}

/// Successful backend response.
#[derive(Clone, Debug)]
pub struct ApiResponse(HttpResponse);
impl ApiResponse {
	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.0.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.0.headers
	}

	/// Raw response body.
	pub fn bytes(&self) -> &[u8] {
		&self.0.body
	}

	/// Consumes the response, returning the raw body.
	pub fn into_bytes(self) -> Vec<u8> {
		self.0.body
	}

	/// Body decoded lossily as UTF-8.
	pub fn text(&self) -> String {
		self.0.text_lossy()
	}

	/// Decodes the body as JSON, reporting the failing JSON path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		decode_json(&self.0.body, self.0.status)
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(response: HttpResponse) -> Self {
		Self(response)
	}
}

pub(crate) fn decode_json<T>(body: &[u8], status: StatusCode) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { source, status: status.as_u16() })
}
