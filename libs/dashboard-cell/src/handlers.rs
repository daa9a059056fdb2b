use std::sync::Arc;

use axum::{
    extract::{State, Extension},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use appointment_cell::{build_appointment_store, AppointmentStore};
use doctor_cell::{build_doctor_store, DoctorStore};
use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use symptom_cell::{build_report_store, ReportStore};

use crate::services::DashboardService;

#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<AppConfig>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub reports: Arc<dyn ReportStore>,
    pub doctors: Arc<dyn DoctorStore>,
}

impl DashboardState {
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

    fn service(&self) -> DashboardService {
        DashboardService::new(self.appointments.clone(), self.reports.clone(), self.doctors.clone())
    }
}

#[axum::debug_handler]
pub async fn get_patient_dashboard(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let dashboard = state.service().patient_dashboard(&session).await?;
    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn get_doctor_dashboard(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let dashboard = state.service().doctor_dashboard(&session, Utc::now()).await?;
    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn get_patient_roster(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let patients = state.service().patient_roster(&session, Utc::now()).await?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}
