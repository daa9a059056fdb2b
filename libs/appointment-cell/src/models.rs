// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::Domain;

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub doctor_name: Option<String>,
    pub doctor_specialty: Option<String>,
    pub domain: Domain,
    pub report_id: Uuid,
    #[serde(default)]
    pub reason: String,
    pub status: AppointmentStatus,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub scheduled_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_pending(&self) -> bool {
        self.status == AppointmentStatus::Pending
    }

    /// Unclaimed request waiting in its domain queue.
    pub fn is_domain_pending(&self) -> bool {
        self.is_pending() && self.doctor_id.is_none()
    }

    pub fn is_assigned_to(&self, doctor_id: Uuid) -> bool {
        self.doctor_id == Some(doctor_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Accepted => write!(f, "accepted"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Doctor details written onto an appointment when a doctor is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorAssignment {
    pub doctor_id: Uuid,
    pub doctor_name: Option<String>,
    pub doctor_specialty: Option<String>,
}

// ==============================================================================
// CALENDAR QUEUE MODELS
// ==============================================================================

/// Hand-off record consumed by the external scheduling portal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarQueueEntry {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub domain: Domain,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Scheduled,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub domain: Domain,
    pub report_id: Uuid,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleAppointmentRequest {
    pub scheduled_date: DateTime<Utc>,
    pub scheduled_time: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Appointment is assigned to another doctor")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::InvalidReference(msg) => AppError::InvalidReference(msg),
            AppointmentError::InvalidStatusTransition(status) => {
                AppError::InvalidTransition(format!("Appointment is already {}", status))
            }
            // The caller is authenticated, just not the assigned doctor.
            AppointmentError::Unauthorized => {
                AppError::Forbidden("Appointment is assigned to another doctor".to_string())
            }
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::Store(e) => e.into(),
        }
    }
}
