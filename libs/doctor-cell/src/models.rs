use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::Domain;

// ==============================================================================
// DOCTOR PROFILE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorProfile {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub specialty: Option<Domain>,
    #[serde(default)]
    pub qualifications: String,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_true")]
    pub accepting_new_patients: bool,
    #[serde(default)]
    pub availability: Availability,
    pub consultation_fee: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl DoctorProfile {
    /// Profile written when a doctor account is first bootstrapped.
    pub fn new_default(user_id: Uuid, name: &str, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            specialty: None,
            qualifications: String::new(),
            experience: 0,
            bio: String::new(),
            accepting_new_patients: true,
            availability: Availability::default(),
            consultation_fee: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_name(&self) -> String {
        if self.name.starts_with("Dr.") {
            self.name.clone()
        } else {
            format!("Dr. {}", self.name)
        }
    }
}

/// Weekly availability: working days plus the shifts offered on them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub morning_shift: bool,
    pub afternoon_shift: bool,
    pub evening_shift: bool,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            morning_shift: true,
            afternoon_shift: true,
            evening_shift: false,
        }
    }
}

impl Availability {
    pub fn working_days(&self) -> usize {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
        .iter()
        .filter(|day| **day)
        .count()
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Settings form update. Absent fields are left untouched; an empty
/// `specialty` clears it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub qualifications: Option<String>,
    pub experience: Option<u32>,
    pub bio: Option<String>,
    pub accepting_new_patients: Option<bool>,
    pub availability: Option<Availability>,
    pub consultation_fee: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub domain: Option<String>,
    pub search: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Unauthorized access to doctor data")]
    UnauthorizedAccess,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::UnauthorizedAccess => AppError::Forbidden("Unauthorized access to doctor data".to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::Store(e) => e.into(),
        }
    }
}
