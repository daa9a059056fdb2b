use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_utils::extractor::{auth_middleware, role_guard, AllowedRoles};

use crate::handlers::{self, DashboardState};

pub fn dashboard_routes(state: DashboardState) -> Router {
    let patient_routes = Router::new()
        .route("/dashboard/patient", get(handlers::get_patient_dashboard))
        .layer(middleware::from_fn_with_state(AllowedRoles::PATIENT, role_guard));

    let doctor_routes = Router::new()
        .route("/dashboard/doctor", get(handlers::get_doctor_dashboard))
        .route("/dashboard/doctor/patients", get(handlers::get_patient_roster))
        .layer(middleware::from_fn_with_state(AllowedRoles::DOCTOR, role_guard));

    Router::new()
        .merge(patient_routes)
        .merge(doctor_routes)
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
