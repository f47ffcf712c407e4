//! # Authentication
//!
//! JWT issuance/validation and Argon2 password hashing, plus the
//! `AuthUser` extractor that handlers use to require a valid bearer token.
//!
//! ## Token Flow
//! ```text
//! POST /auth/login ──► verify password ──► JwtManager::issue
//!                                               │
//!                     Authorization: Bearer ◄───┘
//!                                               │
//! protected handler ──► AuthUser extractor ──► JwtManager::validate
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use store_core::Role;

use crate::error::ApiError;
use crate::AppState;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {e}")))
}

/// Verifies a password against a stored Argon2 hash.
///
/// A malformed stored hash counts as a failed verification rather than an
/// internal error; either way the caller gets a uniform 401.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Authorization role, checked by `require_admin`.
    pub role: Role,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and validates HS256 access tokens.
#[derive(Clone)]
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl JwtManager {
    /// Creates a manager from the shared HMAC secret.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issues a token for the given user.
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: Utc::now().timestamp() + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Token encoding failed: {e}")))
    }

    /// Validates a token and returns its claims.
    ///
    /// Expired or tampered tokens are a 401, never a 500.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated principal, extracted from the Authorization header.
///
/// ## Example
/// ```rust,ignore
/// async fn me(auth: AuthUser, State(state): State<AppState>) -> ApiResult<Json<User>> {
///     let user = state.db.users().get_by_id(&auth.user_id).await?;
///     Ok(Json(user))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    /// Fails with 403 unless the principal is an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected bearer token".to_string()))?;

        let claims = state.jwt.validate(token)?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-real-hash"));
    }

    #[test]
    fn token_roundtrip_preserves_claims() {
        let jwt = JwtManager::new("test-secret", 3600);

        let token = jwt.issue("user-123", Role::Admin).unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtManager::new("test-secret", -3600);

        let token = jwt.issue("user-123", Role::User).unwrap();
        assert!(jwt.validate(&token).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);

        let token = issuer.issue("user-123", Role::User).unwrap();
        assert!(verifier.validate(&token).is_err());
    }
}
