// self
use crate::{
	_prelude::*,
	api::{
		HospitalizationEpisode, MedicalTest, MedicalTestUpload, NewEpisode, NewObservation,
		Observation, ObservationQuery, RecordId,
	},
	client::{ApiClient, ApiRequest},
	http::{HttpTransport, MultipartField},
};

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Lists the hospitalization episodes of a patient.
	pub async fn patient_episodes(&self, patient_id: RecordId) -> Result<Vec<HospitalizationEpisode>> {
		self.fetch_json(ApiRequest::get("episodes/").query("patient_id", patient_id)).await
	}

	/// Opens a hospitalization episode.
	pub async fn create_episode(&self, episode: &NewEpisode) -> Result<HospitalizationEpisode> {
		self.fetch_json(ApiRequest::post("episodes/").json(episode)?).await
	}

	/// Lists observations matching `query`.
	pub async fn observations(&self, query: &ObservationQuery) -> Result<Vec<Observation>> {
		let request = ApiRequest::get("observations/")
			.query("patient_id", query.patient_id)
			.query_opt("parameter_code", query.parameter_code.as_deref())
			.query_opt("episode_id", query.episode_id);

		self.fetch_json(request).await
	}

	/// Records an observation.
	pub async fn create_observation(&self, observation: &NewObservation) -> Result<Observation> {
		self.fetch_json(ApiRequest::post("observations/").json(observation)?).await
	}

	/// Lists the medical tests uploaded for a patient.
	pub async fn patient_tests(&self, patient_id: RecordId) -> Result<Vec<MedicalTest>> {
		self.fetch_json(ApiRequest::get(format!("patients/{patient_id}/tests/"))).await
	}

	/// Uploads a medical test and its optional file as `multipart/form-data`.
	pub async fn upload_medical_test(&self, upload: MedicalTestUpload) -> Result<MedicalTest> {
		let MedicalTestUpload { patient, test_name, test_date, score, result_text, file } = upload;
		let mut fields = vec![
			MultipartField::text("patient", patient.to_string()),
			MultipartField::text("test_name", test_name),
			MultipartField::text("test_date", test_date.to_string()),
		];

		if let Some(score) = score {
			fields.push(MultipartField::text("score", score.to_string()));
		}
		if let Some(result_text) = result_text {
			fields.push(MultipartField::text("result_text", result_text));
		}
		if let Some(file) = file {
			fields.push(MultipartField::file(
				"uploaded_file",
				file.file_name,
				file.content_type,
				file.bytes,
			));
		}

		self.fetch_json(ApiRequest::post("medical-tests/").multipart(fields)).await
	}
}
