//! Secure token secret wrapper that redacts sensitive material.

// crates.io
use http::header::{HeaderValue, InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds a sensitive `Authorization: Bearer <token>` header value.
	pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn bearer_header_is_marked_sensitive() {
		let header = TokenSecret::new("T2")
			.bearer_header()
			.expect("Plain ASCII tokens should form a valid header value.");

		assert_eq!(header.to_str().expect("Header should be visible ASCII."), "Bearer T2");
		assert!(header.is_sensitive());
	}

	#[test]
	fn bearer_header_rejects_control_characters() {
		assert!(TokenSecret::new("bad\ntoken").bearer_header().is_err());
	}
}
