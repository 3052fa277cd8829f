//! Wire models exchanged with the backend.
//!
//! Calendar dates travel as `YYYY-MM-DD` and timestamps as RFC 3339, which is how the backend
//! serializes them.

// crates.io
use time::Date;
// self
use crate::_prelude::*;

time::serde::format_description!(pub(crate) calendar_date, Date, "[year]-[month]-[day]");

/// Identifier assigned by the backend to patients, episodes, observations, and tests.
pub type RecordId = u64;

/// ICD (MKB) diagnosis entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisMkb {
	/// Diagnosis code, e.g. `C71.0`.
	pub code: String,
	/// Human-readable diagnosis name.
	pub name: String,
}

/// Primary diagnosis as returned by the backend: either an expanded entry or a bare code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryDiagnosis {
	/// Expanded dictionary entry.
	Detailed(DiagnosisMkb),
	/// Bare diagnosis code.
	Code(String),
}
impl PrimaryDiagnosis {
	/// Returns the diagnosis code regardless of representation.
	pub fn code(&self) -> &str {
		match self {
			Self::Detailed(entry) => &entry.code,
			Self::Code(code) => code,
		}
	}
}

/// Patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
	/// Backend identifier.
	pub id: RecordId,
	/// Family name.
	pub last_name: String,
	/// Given name.
	pub first_name: String,
	/// Patronymic, when recorded.
	#[serde(default)]
	pub middle_name: Option<String>,
	/// Date of birth.
	#[serde(with = "calendar_date")]
	pub date_of_birth: Date,
	/// Clinic-local identifier, when recorded.
	#[serde(default)]
	pub clinic_id: Option<String>,
	/// Primary diagnosis.
	#[serde(default)]
	pub primary_diagnosis_mkb: Option<PrimaryDiagnosis>,
	/// Primary diagnosis name, when the backend sends it separately.
	#[serde(default)]
	pub primary_diagnosis_mkb_name: Option<String>,
	/// Creation timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Last update timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}

/// Fields accepted when creating or partially updating a patient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDraft {
	/// Family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Patronymic.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub middle_name: Option<String>,
	/// Date of birth.
	#[serde(default, skip_serializing_if = "Option::is_none", with = "calendar_date::option")]
	pub date_of_birth: Option<Date>,
	/// Clinic-local identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clinic_id: Option<String>,
	/// Primary diagnosis code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub primary_diagnosis_mkb: Option<String>,
}

/// Hospitalization episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalizationEpisode {
	/// Backend identifier.
	pub id: RecordId,
	/// Owning patient.
	pub patient: RecordId,
	/// Patient display name.
	#[serde(default)]
	pub patient_display: Option<String>,
	/// Admission date.
	#[serde(with = "calendar_date")]
	pub start_date: Date,
	/// Discharge date, absent while the episode is open.
	#[serde(default, with = "calendar_date::option")]
	pub end_date: Option<Date>,
	/// Creation timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

/// Fields accepted when opening an episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEpisode {
	/// Owning patient.
	pub patient: RecordId,
	/// Admission date.
	#[serde(with = "calendar_date")]
	pub start_date: Date,
	/// Discharge date.
	#[serde(default, skip_serializing_if = "Option::is_none", with = "calendar_date::option")]
	pub end_date: Option<Date>,
}

/// Reference entry describing a measurable parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterCode {
	/// Unique code, e.g. `HB`.
	pub code: String,
	/// Display name.
	pub name: String,
	/// Measurement unit.
	#[serde(default)]
	pub unit: Option<String>,
	/// Free-form description.
	#[serde(default)]
	pub description: Option<String>,
}

/// Clinical observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
	/// Backend identifier.
	pub id: RecordId,
	/// Owning patient.
	pub patient: RecordId,
	/// Parameter code.
	pub parameter: String,
	/// Parameter display name.
	#[serde(default)]
	pub parameter_display: Option<String>,
	/// Value as entered.
	pub value: String,
	/// Numeric interpretation of [`Self::value`], when it has one.
	#[serde(default)]
	pub value_numeric: Option<f64>,
	/// Measurement timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	/// Linked episode.
	#[serde(default)]
	pub episode: Option<RecordId>,
	/// Episode display string.
	#[serde(default)]
	pub episode_display: Option<String>,
	/// Recording user.
	#[serde(default)]
	pub recorded_by: Option<RecordId>,
	/// Recording user display name.
	#[serde(default)]
	pub recorded_by_display: Option<String>,
}

/// Fields accepted when recording an observation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewObservation {
	/// Owning patient.
	pub patient: RecordId,
	/// Parameter code.
	pub parameter: String,
	/// Value as entered.
	pub value: String,
	/// Measurement timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	/// Linked episode.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub episode: Option<RecordId>,
}

/// Filters for listing a patient's observations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservationQuery {
	/// Patient whose observations are listed.
	pub patient_id: RecordId,
	/// Restrict to one parameter code.
	pub parameter_code: Option<String>,
	/// Restrict to one episode.
	pub episode_id: Option<RecordId>,
}
impl ObservationQuery {
	/// Lists every observation of `patient_id`.
	pub fn for_patient(patient_id: RecordId) -> Self {
		Self { patient_id, parameter_code: None, episode_id: None }
	}

	/// Restricts the listing to one parameter code.
	pub fn parameter(mut self, code: impl Into<String>) -> Self {
		self.parameter_code = Some(code.into());

		self
	}

	/// Restricts the listing to one episode.
	pub fn episode(mut self, episode_id: RecordId) -> Self {
		self.episode_id = Some(episode_id);

		self
	}
}

/// Uploaded medical test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedicalTest {
	/// Backend identifier.
	pub id: RecordId,
	/// Owning patient.
	pub patient: RecordId,
	/// Patient display name.
	#[serde(default)]
	pub patient_display: Option<String>,
	/// Test name.
	pub test_name: String,
	/// Test date.
	#[serde(with = "calendar_date")]
	pub test_date: Date,
	/// Numeric score.
	#[serde(default)]
	pub score: Option<f64>,
	/// Free-form result.
	#[serde(default)]
	pub result_text: Option<String>,
	/// Server-side file path.
	#[serde(default)]
	pub uploaded_file: Option<String>,
	/// Absolute download URL.
	#[serde(default)]
	pub file_url: Option<String>,
	/// Original file name.
	#[serde(default)]
	pub file_name: Option<String>,
	/// Uploading user.
	#[serde(default)]
	pub uploaded_by: Option<serde_json::Value>,
	/// Uploading user display name.
	#[serde(default)]
	pub uploaded_by_display: Option<String>,
	/// Creation timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

/// File attached to a [`MedicalTestUpload`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestFile {
	/// File name reported to the backend.
	pub file_name: String,
	/// MIME type, when known.
	pub content_type: Option<String>,
	/// File contents.
	pub bytes: Vec<u8>,
}

/// Medical test submission, sent as `multipart/form-data`.
#[derive(Clone, Debug, PartialEq)]
pub struct MedicalTestUpload {
	/// Owning patient.
	pub patient: RecordId,
	/// Test name.
	pub test_name: String,
	/// Test date.
	pub test_date: Date,
	/// Numeric score.
	pub score: Option<f64>,
	/// Free-form result.
	pub result_text: Option<String>,
	/// Attached file.
	pub file: Option<TestFile>,
}
