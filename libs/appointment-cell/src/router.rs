// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post, patch},
    middleware,
};

use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, role_guard, AllowedRoles};

use crate::handlers::{self, AppointmentState};

const SCHEDULERS: AllowedRoles = AllowedRoles(&[Role::Doctor, Role::Admin]);

pub fn appointment_routes(state: AppointmentState) -> Router {
    let patient_routes = Router::new()
        .route("/appointments", post(handlers::request_appointment).get(handlers::get_patient_appointments))
        .layer(middleware::from_fn_with_state(AllowedRoles::PATIENT, role_guard));

    let doctor_routes = Router::new()
        .route("/appointments/mine", get(handlers::get_my_appointments))
        .route("/appointments/domain-pending", get(handlers::get_domain_pending))
        .route("/appointments/pending", get(handlers::get_pending_requests))
        .route("/appointments/{appointment_id}/accept", post(handlers::accept_appointment))
        .route("/appointments/{appointment_id}/reject", post(handlers::reject_appointment))
        .route("/appointments/calendar-queue/reconcile", post(handlers::reconcile_calendar_queue))
        .layer(middleware::from_fn_with_state(AllowedRoles::DOCTOR, role_guard));

    // Scheduling portal write-back
    let scheduling_routes = Router::new()
        .route("/appointments/{appointment_id}/schedule", patch(handlers::schedule_appointment))
        .layer(middleware::from_fn_with_state(SCHEDULERS, role_guard));

    let shared_routes = Router::new()
        .route("/appointments/{appointment_id}", get(handlers::get_appointment))
        .route("/appointments/{appointment_id}/report", get(handlers::get_appointment_report))
        .layer(middleware::from_fn_with_state(AllowedRoles::ANY, role_guard));

    Router::new()
        .merge(patient_routes)
        .merge(doctor_routes)
        .merge(scheduling_routes)
        .merge(shared_routes)
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
