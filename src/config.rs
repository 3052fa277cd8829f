//! Client configuration: backend base URL, token endpoint paths, login route, and timeouts.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Backend API root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
/// Refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "token/refresh/";
/// Login endpoint, relative to the base URL.
pub const DEFAULT_LOGIN_PATH: &str = "token/";
/// Route handed to the navigator when the session becomes unrecoverable.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
/// Per-call network timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Validated client configuration.
///
/// Build one through [`ClientConfig::builder`] or deserialize it from any serde format; both
/// paths run the same validation. The base URL always ends with `/` so relative request paths
/// resolve beneath it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClientConfigBuilder")]
pub struct ClientConfig {
	/// Backend API root.
	pub base_url: Url,
	/// Refresh endpoint path relative to [`Self::base_url`].
	pub refresh_path: String,
	/// Login endpoint path relative to [`Self::base_url`].
	pub login_path: String,
	/// Route passed to the navigator on forced logout.
	pub login_route: String,
	/// Per-call network timeout.
	pub timeout: StdDuration,
}
impl ClientConfig {
	/// Starts a builder targeting `base_url`.
	pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder { base_url: base_url.into(), ..Default::default() }
	}

	/// Resolves a request path against the base URL.
	///
	/// Absolute URLs pass through untouched. Relative paths resolve beneath the base URL whether
	/// or not they carry a leading `/`, so `token/refresh/` and `/token/refresh/` address the
	/// same endpoint.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		if let Ok(url) = Url::parse(path) {
			return Ok(url);
		}

		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidPath { path: path.into(), source })
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.refresh_path)
	}

	/// Absolute URL of the login endpoint.
	pub fn login_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.login_path)
	}

	/// Returns true when `url` addresses the refresh endpoint, ignoring query and fragment.
	pub fn is_refresh_endpoint(&self, url: &Url) -> bool {
		let Ok(refresh) = self.refresh_url() else {
			return false;
		};
		let mut candidate = url.clone();

		candidate.set_query(None);
		candidate.set_fragment(None);

		candidate == refresh
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL)
				.unwrap_or_else(|e| unreachable!("Default base URL must parse: {e}.")),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			login_path: DEFAULT_LOGIN_PATH.into(),
			login_route: DEFAULT_LOGIN_ROUTE.into(),
			timeout: DEFAULT_TIMEOUT,
		}
	}
}
impl TryFrom<ClientConfigBuilder> for ClientConfig {
	type Error = ConfigError;

	fn try_from(builder: ClientConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigBuilder {
	base_url: String,
	refresh_path: String,
	login_path: String,
	login_route: String,
	timeout: StdDuration,
}
impl ClientConfigBuilder {
	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the route handed to the navigator on forced logout.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the per-call network timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Validates the collected values.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let mut base_url = Url::parse(self.base_url.trim())
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: base_url.scheme().into() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		for path in [&self.refresh_path, &self.login_path] {
			if Url::parse(path).is_ok() {
				return Err(ConfigError::AbsoluteEndpoint { path: path.clone() });
			}
		}

		if self.timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(ClientConfig {
			base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			login_route: self.login_route,
			timeout: self.timeout,
		})
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			login_path: DEFAULT_LOGIN_PATH.into(),
			login_route: DEFAULT_LOGIN_ROUTE.into(),
			timeout: DEFAULT_TIMEOUT,
		}
	}
}
