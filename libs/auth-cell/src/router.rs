use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_utils::extractor::{auth_middleware, role_guard, AllowedRoles};

use crate::handlers::{self, AuthState};

pub fn auth_routes(state: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/auth/validate", post(handlers::validate_token))
        .route("/auth/verify", post(handlers::verify_token))
        .route("/auth/guard", get(handlers::check_route));

    let protected_routes = Router::new()
        .route("/auth/session", get(handlers::get_session))
        .route("/auth/register", post(handlers::register))
        .layer(middleware::from_fn_with_state(AllowedRoles::ANY, role_guard))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
