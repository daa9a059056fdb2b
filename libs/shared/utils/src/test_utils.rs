use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, DataBackend};
use shared_models::auth::{Role, Session, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub data_backend: DataBackend,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            data_backend: DataBackend::Memory,
        }
    }
}

impl TestConfig {
    /// Config pointing the Supabase client at a mock server.
    pub fn with_supabase(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            data_backend: DataBackend::Supabase,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            data_backend: self.data_backend,
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "Test User", Role::Patient)
    }
}

impl TestUser {
    pub fn new(email: &str, name: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "Dr. Test", Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "Test Patient", Role::Patient)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "Test Admin", Role::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: Some(self.email.clone()),
            role: Some("authenticated".to_string()),
            metadata: Some(json!({ "role": self.role, "full_name": self.name })),
            app_metadata: Some(json!({ "provider": "email", "role": self.role })),
            created_at: Some(Utc::now()),
        }
    }

    pub fn session(&self) -> Session {
        Session {
            uid: self.id,
            email: Some(self.email.clone()),
            display_name: Some(self.name.clone()),
            role: self.role,
            access_token: "test-access-token".to_string(),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "app_metadata": { "provider": "email", "role": user.role },
            "user_metadata": { "role": user.role, "full_name": user.name },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        Self::sign_claims(&payload, secret)
    }

    /// Signs arbitrary claims with HS256, for tokens the helpers above
    /// cannot express.
    pub fn sign_claims(claims: &serde_json::Value, secret: &str) -> String {
        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row shapes as PostgREST returns them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_profile_response(user_id: Uuid, name: &str, specialty: &str) -> serde_json::Value {
        json!({
            "user_id": user_id,
            "name": name,
            "email": "doctor@example.com",
            "specialty": specialty,
            "qualifications": "MBBS",
            "experience": 10,
            "bio": "",
            "accepting_new_patients": true,
            "availability": {
                "monday": true, "tuesday": true, "wednesday": true, "thursday": true,
                "friday": true, "saturday": false, "sunday": false,
                "morning_shift": true, "afternoon_shift": true, "evening_shift": false
            },
            "consultation_fee": 80.0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: Uuid,
        patient_id: Uuid,
        doctor_id: Option<Uuid>,
        domain: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "patient_name": "Test Patient",
            "patient_email": "patient@example.com",
            "doctor_id": doctor_id,
            "doctor_name": null,
            "doctor_specialty": null,
            "domain": domain,
            "report_id": Uuid::new_v4(),
            "reason": "Follow up on my report",
            "status": status,
            "scheduled_date": null,
            "scheduled_time": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.data_backend, DataBackend::Memory);
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_session_matches_token_user() {
        let user = TestUser::doctor("doc@example.com");
        let session = user.session();
        let from_user = Session::from_user(&user.to_user(), "token").unwrap();

        assert_eq!(session.uid, from_user.uid);
        assert_eq!(session.role, from_user.role);
        assert_eq!(from_user.display_name.as_deref(), Some("Dr. Test"));
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
