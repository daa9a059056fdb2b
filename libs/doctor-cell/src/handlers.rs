use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::{DoctorSearchQuery, UpdateDoctorRequest};
use crate::services::doctor::DoctorService;
use crate::services::store::{build_doctor_store, DoctorStore};

#[derive(Clone)]
pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorStore>,
}

impl DoctorState {
    pub fn new(config: Arc<AppConfig>, doctors: Arc<dyn DoctorStore>) -> Self {
        Self { config, doctors }
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let doctors = build_doctor_store(&config);
        Self { config, doctors }
    }

    fn service(&self) -> DoctorService {
        DoctorService::new(self.doctors.clone())
    }
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<DoctorState>,
    Query(query): Query<DoctorSearchQuery>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.service().search_doctors(&query, &session.access_token).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len(),
        "domain": query.domain,
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let doctor = state.service().get_doctor(doctor_id, &session.access_token).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<DoctorState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let profile = state.service().ensure_profile(&session).await?;
    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_my_profile(
    State(state): State<DoctorState>,
    Extension(session): Extension<Session>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = state.service().update_profile(&session, request).await?;

    Ok(Json(json!({
        "success": true,
        "doctor": profile
    })))
}
