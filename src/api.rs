//! Typed operations on the patient records backend.
//!
//! Every operation is routed through [`ApiClient::send`](crate::ApiClient::send), so each one
//! carries the stored bearer token and recovers from access-token expiry the same way.

pub mod model;

mod clinical;
mod patients;
mod reference;
mod research;

pub use model::*;
pub use research::{ResearchFormat, ResearchQuery, ResearchResult};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	client::{ApiClient, ApiRequest},
	http::HttpTransport,
};

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) async fn fetch_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(request).await?.json()
	}
}
