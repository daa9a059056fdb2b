use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use appointment_cell::{Appointment, AppointmentError};
use shared_database::StoreError;
use shared_models::error::AppError;
use symptom_cell::Report;

// ==============================================================================
// PATIENT VIEW
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PatientDashboard {
    pub upcoming: Vec<Appointment>,
    pub pending: Vec<Appointment>,
    pub past: Vec<Appointment>,
    pub recent_reports: Vec<Report>,
    pub counts: PatientCounts,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PatientCounts {
    pub upcoming: usize,
    pub pending: usize,
    pub past: usize,
    pub reports: usize,
}

// ==============================================================================
// DOCTOR VIEW
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDashboard {
    pub pending_requests: Vec<Appointment>,
    pub todays_appointments: Vec<Appointment>,
    pub upcoming_appointments: Vec<Appointment>,
    pub stats: DoctorStats,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DoctorStats {
    pub pending_requests: usize,
    pub todays_appointments: usize,
    pub unique_patients: usize,
    /// Every pending request carries one report to review.
    pub pending_reports: usize,
}

/// One row of a doctor's patient roster.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientSummary {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub appointment_count: usize,
    pub next_appointment: Option<DateTime<Utc>>,
    pub last_appointment: Option<DateTime<Utc>>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Appointments(#[from] AppointmentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Forbidden(msg) => AppError::Forbidden(msg),
            DashboardError::Appointments(e) => e.into(),
            DashboardError::Store(e) => e.into(),
        }
    }
}
