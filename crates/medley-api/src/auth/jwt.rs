//! HS256 JWT signing and verification.
//!
//! Claims carry the subject id plus an email/role snapshot. The snapshot is a
//! cache hint only - authorization always re-reads the user row (see
//! [`crate::auth::middleware`]), so a token issued before a role downgrade or
//! account removal cannot retain elevated access.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use medley_core::models::User;
use medley_core::AppError;
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// JWT service with symmetric signing (HS256)
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a token for a user (login).
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate and decode a token. Fails on malformed input, a bad
    /// signature, or expiry; never on claim content.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthenticated("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::Unauthenticated("Invalid token signature".to_string())
                    }
                    _ => AppError::Unauthenticated(format!("Invalid token: {}", e)),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medley_core::models::{UserRole, UserStatus};

    fn test_user() -> User {
        User {
            id: 42,
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            password_hash: "irrelevant".to_string(),
            role: UserRole::Admin,
            status: UserStatus::Active,
            profile_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_service() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", 24)
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let service = test_service();
        let token = service.issue(&test_user()).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = test_service().issue(&test_user()).unwrap();
        let other = JwtService::new("another-secret-another-secret-xx", 24);
        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_verify_rejects_malformed_token() {
        let err = test_service().verify("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let service = test_service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            email: "ada@example.com".to_string(),
            role: "admin".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .unwrap();

        let err = service.verify(&token).unwrap_err();
        match err {
            AppError::Unauthenticated(msg) => assert_eq!(msg, "Token has expired"),
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let service = test_service();
        let token = service.issue(&test_user()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        // Swap in a forged payload while keeping the original signature.
        parts[1] = parts[1].chars().rev().collect();
        let tampered = parts.join(".");
        assert!(service.verify(&tampered).is_err());
    }
}
