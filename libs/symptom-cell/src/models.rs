// libs/symptom-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::{Domain, Severity, Urgency};

// ==============================================================================
// SYMPTOM INTAKE MODELS
// ==============================================================================

/// Symptom check form as submitted by a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomForm {
    pub main_symptom: String,
    #[serde(default)]
    pub duration: String,
    pub severity: Severity,
    #[serde(default)]
    pub additional_symptoms: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub consent_given: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomReport {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub main_symptom: String,
    pub duration: String,
    pub severity: Severity,
    pub additional_symptoms: String,
    pub medical_history: String,
    pub medications: String,
    pub allergies: String,
    pub consent_given: bool,
    pub domain: Domain,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// DIAGNOSIS REPORT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub primary: String,
    pub confidence: String,
    pub differential: Vec<String>,
}

/// Output of the rule-based report generator, before it is tied to a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedReport {
    pub diagnosis: Diagnosis,
    pub recommendations: Vec<String>,
    pub urgency: Urgency,
    pub follow_up: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub symptom_report_id: Uuid,
    pub owner_id: Uuid,
    pub domain: Domain,
    pub diagnosis: Diagnosis,
    pub recommendations: Vec<String>,
    pub urgency: Urgency,
    pub follow_up: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn from_generated(symptom_report: &SymptomReport, generated: GeneratedReport, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            symptom_report_id: symptom_report.id,
            owner_id: symptom_report.owner_id,
            domain: symptom_report.domain,
            diagnosis: generated.diagnosis,
            recommendations: generated.recommendations,
            urgency: generated.urgency,
            follow_up: generated.follow_up,
            created_at,
        }
    }
}

/// What a successful symptom check hands back to the patient: the stored
/// records plus where to browse doctors next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomSubmission {
    pub symptom_report: SymptomReport,
    pub report: Report,
    pub next_step: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SymptomError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Report not found")]
    ReportNotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SymptomError> for AppError {
    fn from(err: SymptomError) -> Self {
        match err {
            SymptomError::ValidationError(msg) => AppError::ValidationError(msg),
            SymptomError::ReportNotFound => AppError::NotFound("Report not found".to_string()),
            SymptomError::Forbidden(msg) => AppError::Forbidden(msg),
            SymptomError::Store(e) => e.into(),
        }
    }
}
