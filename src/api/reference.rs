// self
use crate::{
	_prelude::*,
	api::{DiagnosisMkb, ParameterCode},
	client::{ApiClient, ApiRequest},
	http::HttpTransport,
};

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Lists every measurable parameter known to the backend.
	pub async fn parameter_codes(&self) -> Result<Vec<ParameterCode>> {
		self.fetch_json(ApiRequest::get("parameters/")).await
	}

	/// Searches the MKB diagnosis dictionary by code or name.
	pub async fn search_mkb_codes(&self, term: &str) -> Result<Vec<DiagnosisMkb>> {
		let term = Some(term).filter(|term| !term.is_empty());

		self.fetch_json(ApiRequest::get("mkb-codes/").query_opt("search", term)).await
	}
}
