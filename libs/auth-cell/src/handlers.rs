use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Json, Query, State},
    http::Request,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use doctor_cell::{build_doctor_store, DoctorStore};
use shared_config::AppConfig;
use shared_models::auth::{Session, TokenResponse};
use shared_models::error::AppError;
use shared_utils::extractor::session_from_request;
use shared_utils::jwt;

use crate::guard::{authorize, home_for, GuardDecision};
use crate::models::{GuardQuery, RegisterRequest};
use crate::services::registration::RegistrationService;
use crate::services::store::{build_user_store, UserStore};

#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub doctors: Arc<dyn DoctorStore>,
}

impl AuthState {
    pub fn new(config: Arc<AppConfig>, users: Arc<dyn UserStore>, doctors: Arc<dyn DoctorStore>) -> Self {
        Self { config, users, doctors }
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            users: build_user_store(&config),
            doctors: build_doctor_store(&config),
            config,
        }
    }
}

pub async fn validate_token(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let user = jwt::validate_token(auth.token(), &state.config.supabase_jwt_secret)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify_token(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Json<Value> {
    debug!("Verifying token");

    let valid = jwt::validate_token(auth.token(), &state.config.supabase_jwt_secret).is_ok();
    Json(json!({ "valid": valid }))
}

#[axum::debug_handler]
pub async fn get_session(Extension(session): Extension<Session>) -> Json<Value> {
    let home = home_for(session.role);

    Json(json!({
        "session": session,
        "dashboard": home.dashboard,
        "nav": home.nav
    }))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AuthState>,
    Extension(session): Extension<Session>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let registration = RegistrationService::new(state.users.clone(), state.doctors.clone())
        .register(&session, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "registration": registration,
        "dashboard": home_for(registration.user.role).dashboard
    })))
}

/// Answers whether the caller may enter `route`. A missing or unusable
/// token counts as no session.
pub async fn check_route(
    State(state): State<AuthState>,
    Query(query): Query<GuardQuery>,
    request: Request<Body>,
) -> Json<Value> {
    let session = match session_from_request(&request, &state.config) {
        Ok(session) => session,
        Err(e) => {
            debug!("Guard check without a usable session: {}", e);
            None
        }
    };

    match authorize(&query.route, session.as_ref()) {
        GuardDecision::Authorized => Json(json!({
            "route": query.route,
            "authorized": true
        })),
        GuardDecision::Redirect(to) => Json(json!({
            "route": query.route,
            "authorized": false,
            "redirect": to
        })),
    }
}
