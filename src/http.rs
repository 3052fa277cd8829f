//! Transport primitives for backend calls.
//!
//! The module exposes [`HttpTransport`], the client's only dependency on an HTTP stack, together
//! with the owned [`HttpRequest`]/[`HttpResponse`] pair it exchanges. Requests are plain data so
//! the refresh coordinator can replay them after a token rotation without rebuilding bodies.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")] use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing fully prepared backend requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by the
/// client, its refresh coordinator, and every replayed request. The transport never inspects
/// credentials; bearer injection and refresh handling live in [`ApiClient`](crate::ApiClient).
/// Any non-2xx status must be returned as a normal [`HttpResponse`], never as an error.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the full response body is available.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, HttpResponse>;
}

/// Fully resolved request handed to an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL, query included.
	pub url: Url,
	/// Final header set, credentials included.
	pub headers: HeaderMap,
	/// Request payload.
	pub body: RequestBody,
	/// Per-call timeout after which the transport must fail with a network error.
	pub timeout: StdDuration,
}

/// Replayable request payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Serialized JSON document.
	Json(Vec<u8>),
	/// `multipart/form-data` fields; the transport owns boundary generation.
	Multipart(Vec<MultipartField>),
}
impl RequestBody {
	/// Returns true for multipart payloads, whose content type the transport must set.
	pub fn is_multipart(&self) -> bool {
		matches!(self, Self::Multipart(_))
	}
}

/// Single `multipart/form-data` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartField {
	/// Form field name.
	pub name: String,
	/// Field content.
	pub value: MultipartValue,
}
impl MultipartField {
	/// Builds a plain text field.
	pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { name: name.into(), value: MultipartValue::Text(value.into()) }
	}

	/// Builds a file field.
	pub fn file(
		name: impl Into<String>,
		file_name: impl Into<String>,
		content_type: Option<String>,
		bytes: Vec<u8>,
	) -> Self {
		Self {
			name: name.into(),
			value: MultipartValue::File { file_name: file_name.into(), content_type, bytes },
		}
	}
}

/// Content of a [`MultipartField`].
#[derive(Clone, PartialEq, Eq)]
pub enum MultipartValue {
	/// Text value.
	Text(String),
	/// File upload.
	File {
		/// File name reported to the backend.
		file_name: String,
		/// MIME type, when known.
		content_type: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}
impl Debug for MultipartValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
			Self::File { file_name, content_type, bytes } => f
				.debug_struct("File")
				.field("file_name", file_name)
				.field("content_type", content_type)
				.field("len", &bytes.len())
				.finish(),
		}
	}
}

/// Response returned by an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Full response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns the Retry-After hint as a relative duration, if the backend supplied one.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(&self.headers)
	}

	/// Returns the body decoded lossily as UTF-8.
	pub fn text_lossy(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Converts a non-success response into [`Error::Status`].
	pub fn into_status_error(self) -> Error {
		Error::Status {
			status: self.status.as_u16(),
			retry_after: self.retry_after(),
			body: self.text_lossy(),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn multipart_form(
		fields: Vec<MultipartField>,
	) -> Result<reqwest::multipart::Form, ReqwestError> {
		let mut form = reqwest::multipart::Form::new();

		for field in fields {
			form = match field.value {
				MultipartValue::Text(value) => form.text(field.name, value),
				MultipartValue::File { file_name, content_type, bytes } => {
					let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);

					if let Some(mime) = content_type {
						part = part.mime_str(&mime)?;
					}

					form.part(field.name, part)
				},
			};
		}

		Ok(form)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, HttpResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let HttpRequest { method, url, mut headers, body, timeout } = request;

			if body.is_multipart() {
				headers.remove(CONTENT_TYPE);
			}

			let mut builder = client.request(method, url).headers(headers).timeout(timeout);

			builder = match body {
				RequestBody::Empty => builder,
				RequestBody::Json(bytes) => builder.body(bytes),
				RequestBody::Multipart(fields) => builder.multipart(Self::multipart_form(fields)?),
			};

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
