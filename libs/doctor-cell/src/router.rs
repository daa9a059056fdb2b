use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_utils::extractor::{auth_middleware, role_guard, AllowedRoles};

use crate::handlers::{self, DoctorState};

pub fn doctor_routes(state: DoctorState) -> Router {
    // Directory browsing, any signed-in role
    let directory_routes = Router::new()
        .route("/doctors", get(handlers::search_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .layer(middleware::from_fn_with_state(AllowedRoles::ANY, role_guard));

    // The doctor's own profile and settings
    let profile_routes = Router::new()
        .route("/doctors/me", get(handlers::get_my_profile).put(handlers::update_my_profile))
        .layer(middleware::from_fn_with_state(AllowedRoles::DOCTOR, role_guard));

    Router::new()
        .merge(directory_routes)
        .merge(profile_routes)
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
