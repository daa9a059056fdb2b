// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State, Extension},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::{build_doctor_store, DoctorStore};
use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use symptom_cell::{build_report_store, ReportStore};

use crate::models::{CreateAppointmentRequest, ScheduleAppointmentRequest};
use crate::services::appointment::AppointmentService;
use crate::services::store::{build_appointment_store, AppointmentStore};

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub reports: Arc<dyn ReportStore>,
    pub doctors: Arc<dyn DoctorStore>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        appointments: Arc<dyn AppointmentStore>,
        reports: Arc<dyn ReportStore>,
        doctors: Arc<dyn DoctorStore>,
    ) -> Self {
        Self { config, appointments, reports, doctors }
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            appointments: build_appointment_store(&config),
            reports: build_report_store(&config),
            doctors: build_doctor_store(&config),
            config,
        }
    }

    fn service(&self) -> AppointmentService {
        AppointmentService::new(self.appointments.clone(), self.reports.clone(), self.doctors.clone())
    }
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn request_appointment(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.service().request_appointment(&session, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment request sent"
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.service().for_patient(&session).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.service().mine(&session).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_domain_pending(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.service().domain_pending(&session).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_pending_requests(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.service().pending_for_doctor(&session).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn accept_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.service().accept(&session, appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment accepted and queued for scheduling"
    })))
}

#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.service().reject(&session, appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reconcile_calendar_queue(
    State(state): State<AppointmentState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let created = state.service().reconcile_calendar_queue(&session).await?;

    Ok(Json(json!({
        "success": true,
        "enqueued": created,
        "total": created.len()
    })))
}

// ==============================================================================
// SHARED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.service().get_appointment(&session, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment_report(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let report = state.service().appointment_report(&session, appointment_id).await?;
    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn schedule_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(session): Extension<Session>,
    Json(request): Json<ScheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.service().schedule(&session, appointment_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}
