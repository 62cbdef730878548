//! JWT issuance/validation and password hashing.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::config::JwtConfig;
use crate::models::User;

/// Bearer-token claims. `sub` carries the user id consumed by the ledger as
/// `created_by`/`changed_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// HS256 token service.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            token_expiry_hours: config.token_expiry_hours,
        }
    }

    /// Issue a bearer token for an authenticated user.
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.to_string(),
            username: user.username.clone(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a bearer token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Hash a password with argon2 and a fresh salt.
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::AuthError(anyhow!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored argon2 hash.
    pub fn verify_password(hash: &str, password: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::AuthError(anyhow!("Invalid stored password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_service() -> AuthService {
        AuthService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry_hours: 24,
        })
    }

    fn test_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            is_active: true,
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let service = test_service();
        let user = test_user();

        let token = service.issue_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.user_id.to_string());
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let service = test_service();
        let other = AuthService::new(&JwtConfig {
            secret: "different-secret".to_string(),
            token_expiry_hours: 24,
        });

        let token = other.issue_token(&test_user()).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = AuthService::hash_password("hunter2!").unwrap();
        assert!(AuthService::verify_password(&hash, "hunter2!").unwrap());
        assert!(!AuthService::verify_password(&hash, "wrong").unwrap());
    }
}
