use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use chrono::{TimeZone, Utc};
use tracing::debug;

use shared_models::auth::{JwtClaims, User};
use shared_models::error::AppError;

type HmacSha256 = Hmac<Sha256>;

fn invalid(reason: &str) -> AppError {
    AppError::Unauthorized(reason.to_string())
}

/// Verifies an HS256 token issued by the identity provider and returns the
/// user it describes.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, AppError> {
    if jwt_secret.is_empty() {
        return Err(invalid("JWT secret is not set"));
    }

    let mut parts = token.split('.');
    let (header_b64, claims_b64, signature_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(c), Some(s), None) => (h, c, s),
        _ => return Err(invalid("Invalid token format")),
    };

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        invalid("Invalid signature encoding")
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| invalid("Failed to create HMAC"))?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(invalid("Invalid token signature"));
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| invalid("Invalid claims encoding"))?;

    let claims: JwtClaims = serde_json::from_slice(&claims_bytes).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        invalid("Invalid claims format")
    })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err(invalid("Token expired"));
        }
    }

    let created_at = claims
        .iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        app_metadata: claims.app_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};
    use assert_matches::assert_matches;
    use chrono::Duration;
    use serde_json::json;
    use shared_models::auth::{Role, Session};

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn accepts_a_signed_token() {
        let user = TestUser::doctor("doc@example.com");
        let token = JwtTestUtils::create_test_token(&user, SECRET, Some(1));

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.id, user.id.to_string());
        assert_eq!(validated.metadata.unwrap()["role"], "doctor");
    }

    #[test]
    fn rejects_expired_and_forged_tokens() {
        let user = TestUser::patient("pat@example.com");

        let expired = JwtTestUtils::create_expired_token(&user, SECRET);
        assert_matches!(validate_token(&expired, SECRET), Err(AppError::Unauthorized(msg)) if msg == "Token expired");

        let forged = JwtTestUtils::create_invalid_signature_token(&user);
        assert_matches!(validate_token(&forged, SECRET), Err(AppError::Unauthorized(_)));

        let malformed = JwtTestUtils::create_malformed_token();
        assert_matches!(validate_token(&malformed, SECRET), Err(AppError::Unauthorized(_)));
    }

    #[test]
    fn self_edited_user_metadata_does_not_change_the_role() {
        let user = TestUser::patient("pat@example.com");
        let claims = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "app_metadata": { "provider": "email", "role": "patient" },
            "user_metadata": { "role": "doctor", "full_name": "Self Promoted" },
            "exp": (Utc::now() + Duration::hours(1)).timestamp()
        });
        let token = JwtTestUtils::sign_claims(&claims, SECRET);

        let validated = validate_token(&token, SECRET).unwrap();
        let session = Session::from_user(&validated, &token).unwrap();
        assert_eq!(session.role, Role::Patient);
    }
}
