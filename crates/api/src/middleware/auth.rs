//! Bearer-token authentication middleware and extractors.
//!
//! Tokens are HS256 JWTs carrying `{id, username, role}`. Verification is
//! purely cryptographic: no storage lookup happens per request, so a role
//! change only takes effect once the old token expires. Failure is a terminal
//! per-request rejection, never retried.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use ecostore_core::{Role, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// Errors from signing or verifying bearer tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token is missing, malformed, expired, or has a bad signature.
    #[error("invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Signed token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Username at issue time.
    pub username: String,
    /// Role at issue time. Authoritative for the token's lifetime.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: UserId::new(claims.sub),
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Keys and settings for signing and verifying bearer tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    /// Build keys from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if encoding fails.
    pub fn sign(&self, id: UserId, username: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: id.as_i32(),
            username: username.to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the signature is wrong or the token expired.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verify the request's bearer token against the app state.
fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::Unauthorized("Access denied. Token missing.".to_owned()))?;

    let claims = state
        .tokens()
        .verify(token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_owned()))?;

    Ok(AuthUser::from(claims))
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("hello, {}", user.username)
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

/// Extractor that additionally requires the `admin` role.
///
/// Rejection happens before the handler body runs, so admin-only mutations
/// are refused before any storage access.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Access denied. Admin only.".to_owned()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new(&SecretString::from("k9#mP2$vX8@qL5!wR3^nT7&zB4*jF6%d"), 24)
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let keys = keys();
        let token = keys.sign(UserId::new(7), "eve", Role::Admin).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "eve");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = keys().sign(UserId::new(1), "bob", Role::User).unwrap();
        let other = TokenKeys::new(&SecretString::from("a different 32+ char signing key!!"), 24);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        // Negative TTL backdates the expiry past the default leeway
        let expired = TokenKeys::new(&SecretString::from("k9#mP2$vX8@qL5!wR3^nT7&zB4*jF6%d"), -2);
        let token = expired.sign(UserId::new(1), "bob", Role::User).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(keys().verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_auth_user_from_claims() {
        let claims = Claims {
            sub: 3,
            username: "mallory".to_owned(),
            role: Role::User,
            iat: 0,
            exp: 0,
        };
        let user = AuthUser::from(claims);
        assert_eq!(user.id, UserId::new(3));
        assert!(!user.role.is_admin());
    }
}
