use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::{DoctorError, DoctorProfile};
use shared_database::StoreError;
use shared_models::auth::Role;
use shared_models::error::AppError;

// ==============================================================================
// RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub uid: Uuid,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: UserRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorProfile>,
}

#[derive(Debug, Deserialize)]
pub struct GuardQuery {
    pub route: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ValidationError(msg) => AppError::ValidationError(msg),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
            AuthError::Doctor(e) => e.into(),
            AuthError::Store(e) => e.into(),
        }
    }
}
