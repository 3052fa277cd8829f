// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	api::{Patient, model::calendar_date},
	client::{ApiClient, ApiRequest},
	http::HttpTransport,
};

/// Output format of a research query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchFormat {
	/// Decoded patient list.
	#[default]
	Json,
	/// Raw CSV export.
	Csv,
}
impl ResearchFormat {
	/// Value sent in the `format` query parameter.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Csv => "csv",
		}
	}
}
impl Display for ResearchFormat {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Cohort filter for [`ApiClient::research_query`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchQuery {
	/// MKB diagnosis code the cohort must carry.
	pub diagnosis_mkb: Option<String>,
	/// Minimum age in years.
	pub age_min: Option<u32>,
	/// Maximum age in years.
	pub age_max: Option<u32>,
	/// Parameters whose observations are included; sent as repeated `param_codes`.
	pub param_codes: Vec<String>,
	/// Lower observation date bound.
	#[serde(with = "calendar_date::option")]
	pub start_date: Option<Date>,
	/// Upper observation date bound.
	#[serde(with = "calendar_date::option")]
	pub end_date: Option<Date>,
	/// Requested output format; the backend defaults to JSON when unset.
	pub format: Option<ResearchFormat>,
}
impl ResearchQuery {
	fn to_request(&self) -> ApiRequest {
		let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());
		let request = ApiRequest::get("research/query/")
			.query_opt("diagnosis_mkb", non_empty(&self.diagnosis_mkb))
			.query_opt("age_min", self.age_min)
			.query_opt("age_max", self.age_max)
			.query_opt("start_date", self.start_date)
			.query_opt("end_date", self.end_date)
			.query_opt("format", self.format);

		self.param_codes.iter().fold(request, |request, code| request.query("param_codes", code))
	}
}

/// Research query output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResearchResult {
	/// Matching patients, decoded from JSON.
	Patients(Vec<Patient>),
	/// CSV export, byte-for-byte as served.
	Csv(Vec<u8>),
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Runs a research query over the patient registry.
	pub async fn research_query(&self, query: &ResearchQuery) -> Result<ResearchResult> {
		let response = self.send(query.to_request()).await?;

		match query.format {
			Some(ResearchFormat::Csv) => Ok(ResearchResult::Csv(response.into_bytes())),
			_ => response.json().map(ResearchResult::Patients),
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;
	use crate::config::ClientConfig;

	#[test]
	fn query_skips_unset_filters_and_repeats_param_codes() {
		let query = ResearchQuery {
			diagnosis_mkb: Some("C71.0".into()),
			age_max: Some(60),
			param_codes: vec!["HB".into(), "WBC".into()],
			end_date: Some(date!(2024 - 12 - 31)),
			format: Some(ResearchFormat::Csv),
			..Default::default()
		};
		let url = query
			.to_request()
			.url(&ClientConfig::default())
			.expect("Research URL should resolve.");

		assert_eq!(
			url.as_str(),
			"http://localhost:8000/api/research/query/?diagnosis_mkb=C71.0&age_max=60&end_date=2024-12-31&format=csv&param_codes=HB&param_codes=WBC"
		);
	}
}
