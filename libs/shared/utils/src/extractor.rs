use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_config::AppConfig;
use shared_models::auth::{Role, Session};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Pulls the bearer token out of an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Result<&str, AppError> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

/// Resolves the session for a request, if it carries a valid token.
pub fn session_from_request<B>(request: &Request<B>, config: &AppConfig) -> Result<Option<Session>, AppError> {
    let Some(auth_header) = request.headers().get("Authorization") else {
        return Ok(None);
    };

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header format".to_string()))?;
    let token = bearer_token(auth_value)?;

    let user = validate_token(token, &config.supabase_jwt_secret)?;
    Session::from_user(&user, token).map(Some)
}

// Authenticates the request and stores both the token user and the session
// in the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_value = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header format".to_string()))?
        .to_string();

    let token = bearer_token(&auth_value)?;
    let user = validate_token(token, &config.supabase_jwt_secret)?;
    let session = Session::from_user(&user, token)?;

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Roles allowed through [`role_guard`].
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Role]);

impl AllowedRoles {
    pub const PATIENT: AllowedRoles = AllowedRoles(&[Role::Patient]);
    pub const DOCTOR: AllowedRoles = AllowedRoles(&[Role::Doctor]);
    pub const ADMIN: AllowedRoles = AllowedRoles(&[Role::Admin]);
    pub const ANY: AllowedRoles = AllowedRoles(&[Role::Patient, Role::Doctor, Role::Admin]);

    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

// Must run after `auth_middleware`.
pub async fn role_guard(
    State(allowed): State<AllowedRoles>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = request
        .extensions()
        .get::<Session>()
        .ok_or_else(|| AppError::Unauthorized("Session not found in request extensions".to_string()))?;

    if !allowed.permits(session.role) {
        return Err(AppError::Forbidden(format!(
            "Role {} may not access this resource",
            session.role
        )));
    }

    Ok(next.run(request).await)
}
