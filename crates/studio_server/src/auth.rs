//! Bearer-token and admin-key authentication.
//!
//! Users authenticate with an HS256 JWT whose `sub` claim is their account
//! email. Admin routes require the `X-Admin-Key` header; the configured key is
//! kept as a SHA-256 digest and compared in constant time.

use crate::ApiState;
use crate::error::ApiError;
use crate::secrets::JWT_SECRET;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use studio_core::AccountProfile;
use studio_error::{ConfigError, ServerError, ServerErrorKind, StudioResult};
use subtle::ConstantTimeEq;
use tracing::debug;

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issue time, seconds since the epoch
    pub iat: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish()
    }
}

impl TokenIssuer {
    /// Create an issuer for `secret` with tokens valid for `ttl_minutes`.
    pub fn new(secret: &[u8], ttl_minutes: i64) -> StudioResult<Self> {
        if secret.is_empty() {
            return Err(ConfigError::for_key(JWT_SECRET, "must not be empty").into());
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(ttl_minutes.max(1)),
        })
    }

    /// Mint a token for `email`.
    pub fn issue(&self, email: &str) -> StudioResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            ServerError::new(ServerErrorKind::Internal(format!("token signing failed: {e}"))).into()
        })
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ServerError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                ServerError::new(ServerErrorKind::Unauthorized)
            })
    }
}

/// Digest of the configured admin key.
#[derive(Clone)]
pub struct AdminKey {
    digest: [u8; 32],
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminKey(..)")
    }
}

impl AdminKey {
    /// Wrap the plain key.
    pub fn new(key: &str) -> Self {
        Self {
            digest: Sha256::digest(key.as_bytes()).into(),
        }
    }

    /// Constant-time comparison against a provided key.
    pub fn matches(&self, provided: &str) -> bool {
        let provided = Sha256::digest(provided.as_bytes());
        bool::from(provided.as_slice().ct_eq(&self.digest))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub AccountProfile);

#[async_trait]
impl FromRequestParts<ApiState> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| ServerError::new(ServerErrorKind::Unauthorized))?;
        let claims = state.tokens().verify(token)?;

        let profile = state
            .accounts()
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| ServerError::new(ServerErrorKind::Unauthorized))?;

        Ok(CurrentAccount(profile))
    }
}

/// Proof that the request carried the admin key.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<ApiState> for AdminGuard {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServerError::new(ServerErrorKind::Unauthorized))?;

        match state.admin_key() {
            Some(key) if key.matches(provided) => Ok(AdminGuard),
            _ => Err(ServerError::new(ServerErrorKind::Forbidden).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_carries_email() {
        let issuer = TokenIssuer::new(b"test-secret", 30).unwrap();
        let token = issuer.issue("ada@example.com").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "ada@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let issuer = TokenIssuer::new(b"one", 30).unwrap();
        let other = TokenIssuer::new(b"two", 30).unwrap();
        let token = other.issue("ada@example.com").unwrap();
        assert!(issuer.verify(&token).is_err());
        assert!(issuer.verify("not-a-jwt").is_err());
    }

    #[test]
    fn empty_secret_rejected() {
        assert!(TokenIssuer::new(b"", 30).is_err());
    }

    #[test]
    fn admin_key_comparison() {
        let key = AdminKey::new("s3cret");
        assert!(key.matches("s3cret"));
        assert!(!key.matches("s3cre"));
        assert!(!key.matches(""));
    }
}
