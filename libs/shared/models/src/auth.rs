use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub app_metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unrecognized role: {}", other)),
        }
    }
}

/// Authenticated caller, built per request from the validated token.
///
/// The session also carries the raw bearer token so that store calls run
/// under the caller's row-level security.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub uid: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    #[serde(skip)]
    pub access_token: String,
}

impl Session {
    /// Builds a session from the token user. The application role comes from
    /// `app_metadata.role`, which only the service can write, then from
    /// `user_metadata.role` (set at sign-up) and finally the top-level `role`
    /// claim.
    pub fn from_user(user: &User, access_token: &str) -> Result<Self, AppError> {
        let uid = Uuid::parse_str(&user.id)
            .map_err(|_| AppError::Unauthorized("Token subject is not a valid user id".to_string()))?;

        let role = role_in(user.app_metadata.as_ref())
            .or_else(|| role_in(user.metadata.as_ref()))
            .or_else(|| user.role.as_deref().and_then(|r| r.parse::<Role>().ok()))
            .ok_or_else(|| AppError::Unauthorized("No recognized role on session".to_string()))?;

        let display_name = user.metadata.as_ref().and_then(|m| {
            m.get("full_name")
                .or_else(|| m.get("display_name"))
                .and_then(|n| n.as_str())
                .map(str::to_string)
        });

        Ok(Self {
            uid,
            email: user.email.clone(),
            display_name,
            role,
            access_token: access_token.to_string(),
        })
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }

    /// Ensures the caller has the given role.
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("This action requires the {} role", role)))
        }
    }
}

fn role_in(metadata: Option<&serde_json::Value>) -> Option<Role> {
    metadata
        .and_then(|m| m.get("role"))
        .and_then(|r| r.as_str())
        .and_then(|r| r.parse::<Role>().ok())
}
