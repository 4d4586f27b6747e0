pub mod idp;
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::{Role, User};

pub use idp::{IdpClaims, IdpVerifier};
pub use password::{
    hash_password, hash_password_async, verify_password, verify_password_async, EXTERNAL_AUTH_MARKER,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token could not be decoded")]
    InvalidTokenFormat,

    #[error("token is invalid")]
    InvalidToken,

    #[error("JWT secret not configured")]
    SecretNotConfigured,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

/// Claims of the tokens this service issues at login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalClaims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub org_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl LocalClaims {
    pub fn new(id: Uuid, email: String, role: Role, org_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id,
            email,
            role,
            org_id,
            iat: now.timestamp(),
            exp,
        }
    }

    pub fn for_user(user: &User, expiry_hours: u64) -> Self {
        Self::new(user.id, user.email.clone(), user.role, user.organization_id, expiry_hours)
    }
}

pub fn encode_local(claims: &LocalClaims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify a token signed with the local secret
pub fn verify_local(token: &str, secret: &str) -> Result<LocalClaims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<LocalClaims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Local token verification failed: {}", e);
            AuthError::InvalidToken
        })
}

/// Issue a session token for a user using the configured secret and expiry
pub fn issue_token(user: &User) -> Result<String, AuthError> {
    let security = &config::config().security;
    let claims = LocalClaims::for_user(user, security.jwt_expiry_hours);
    encode_local(&claims, &security.jwt_secret)
}
