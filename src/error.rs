//! Client-level error types shared across the transport, refresh coordinator, stores, and APIs.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token refresh failed; the session has been cleared.
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// Backend answered with a non-success status.
	#[error("Backend responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Raw response body, decoded lossily as UTF-8.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Backend answered with a payload that does not match the expected shape.
	#[error("Backend returned a malformed JSON payload.")]
	Decode {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl Error {
	/// Returns the HTTP status carried by the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::Refresh(RefreshError::Rejected { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns true when the backend rejected the request as unauthenticated.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http or https.
	#[error("Base URL scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
	/// Endpoint path must be relative to the base URL.
	#[error("Endpoint path `{path}` must be relative to the base URL.")]
	AbsoluteEndpoint {
		/// Offending path.
		path: String,
	},
	/// Request timeout must be positive.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
	/// Request path could not be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
	/// Header value contains characters HTTP does not allow.
	#[error("Header value is invalid.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Refresh failure delivered to the request that triggered the refresh and to every waiter.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the refresh token with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Refresh request could not be built or delivered.
	#[error("Refresh request could not be completed: {message}.")]
	Request {
		/// Transport or request-construction failure summary.
		message: String,
	},
	/// Refresh endpoint answered without a usable access token.
	#[error("Refresh endpoint returned a malformed payload: {message}.")]
	MalformedResponse {
		/// Parsing failure summary.
		message: String,
	},
	/// No refresh token is stored for the current session.
	#[error("No refresh token is stored for the current session.")]
	MissingRefreshToken,
	/// Credential store failed while persisting the refreshed token.
	#[error("Credential store failed during refresh: {message}.")]
	Storage {
		/// Store failure summary.
		message: String,
	},
	/// The refresh was dropped before it settled.
	#[error("Token refresh was abandoned before it settled.")]
	Abandoned,
}
