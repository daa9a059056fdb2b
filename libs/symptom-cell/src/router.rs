use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, role_guard, AllowedRoles};

use crate::handlers::{self, SymptomState};

const REPORT_READERS: AllowedRoles = AllowedRoles(&[Role::Patient, Role::Admin]);

pub fn symptom_routes(state: SymptomState) -> Router {
    let submission_routes = Router::new()
        .route("/symptoms", post(handlers::submit_symptoms))
        .layer(middleware::from_fn_with_state(AllowedRoles::PATIENT, role_guard));

    let report_routes = Router::new()
        .route("/reports", get(handlers::list_reports))
        .route("/reports/{report_id}", get(handlers::get_report))
        .layer(middleware::from_fn_with_state(REPORT_READERS, role_guard));

    Router::new()
        .merge(submission_routes)
        .merge(report_routes)
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
