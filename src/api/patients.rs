// self
use crate::{
	_prelude::*,
	api::{Observation, Patient, PatientDraft, RecordId},
	client::{ApiClient, ApiRequest},
	http::HttpTransport,
};

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Lists patients, optionally filtered by a free-text search term.
	pub async fn patients(&self, search: Option<&str>) -> Result<Vec<Patient>> {
		let search = search.filter(|term| !term.is_empty());

		self.fetch_json(ApiRequest::get("patients/").query_opt("search", search)).await
	}

	/// Fetches a single patient.
	pub async fn patient(&self, id: RecordId) -> Result<Patient> {
		self.fetch_json(ApiRequest::get(format!("patients/{id}/"))).await
	}

	/// Creates a patient.
	pub async fn create_patient(&self, draft: &PatientDraft) -> Result<Patient> {
		self.fetch_json(ApiRequest::post("patients/").json(draft)?).await
	}

	/// Partially updates a patient; unset draft fields are left untouched.
	pub async fn update_patient(&self, id: RecordId, draft: &PatientDraft) -> Result<Patient> {
		self.fetch_json(ApiRequest::patch(format!("patients/{id}/")).json(draft)?).await
	}

	/// Deletes a patient.
	pub async fn delete_patient(&self, id: RecordId) -> Result<()> {
		self.send(ApiRequest::delete(format!("patients/{id}/"))).await?;

		Ok(())
	}

	/// Returns the observation series of the requested parameters, for charting.
	pub async fn patient_dynamics(
		&self,
		id: RecordId,
		parameter_codes: &[&str],
	) -> Result<Vec<Observation>> {
		let request = parameter_codes
			.iter()
			.fold(ApiRequest::get(format!("patients/{id}/dynamics/")), |request, code| {
				request.query("param", code)
			});

		self.fetch_json(request).await
	}
}
