use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::SymptomForm;
use crate::services::intake::SymptomIntakeService;
use crate::services::store::{build_report_store, ReportStore};

#[derive(Clone)]
pub struct SymptomState {
    pub config: Arc<AppConfig>,
    pub reports: Arc<dyn ReportStore>,
}

impl SymptomState {
    pub fn new(config: Arc<AppConfig>, reports: Arc<dyn ReportStore>) -> Self {
        Self { config, reports }
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let reports = build_report_store(&config);
        Self { config, reports }
    }

    fn intake(&self) -> SymptomIntakeService {
        SymptomIntakeService::new(self.reports.clone())
    }
}

#[axum::debug_handler]
pub async fn submit_symptoms(
    State(state): State<SymptomState>,
    Extension(session): Extension<Session>,
    Json(form): Json<SymptomForm>,
) -> Result<Json<Value>, AppError> {
    let submission = state.intake().submit(&session, form).await?;

    Ok(Json(json!({
        "success": true,
        "symptom_report": submission.symptom_report,
        "report": submission.report,
        "next_step": submission.next_step
    })))
}

#[axum::debug_handler]
pub async fn list_reports(
    State(state): State<SymptomState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let reports = state.intake().list_reports(&session).await?;

    Ok(Json(json!({
        "reports": reports,
        "total": reports.len()
    })))
}

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<SymptomState>,
    Path(report_id): Path<Uuid>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let report = state.intake().get_report(&session, report_id).await?;
    Ok(Json(json!(report)))
}
