// Verification of tokens issued by the external identity provider.
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use super::AuthError;
use crate::config::SecurityConfig;
use crate::database::models::Role;

/// Profile fields the identity provider stores at sign-up
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdpClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl IdpClaims {
    /// Role requested by the provider; anything unrecognised is a plain user
    pub fn role(&self) -> Role {
        self.user_metadata
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }

    pub fn first_name(&self) -> &str {
        self.user_metadata.first_name.as_deref().unwrap_or("User")
    }

    pub fn last_name(&self) -> &str {
        self.user_metadata.last_name.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct IdpVerifier<'a> {
    secret: Option<&'a str>,
    audience: Option<&'a str>,
    allow_unverified: bool,
}

impl<'a> IdpVerifier<'a> {
    pub fn new(secret: Option<&'a str>, audience: Option<&'a str>, allow_unverified: bool) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            audience,
            allow_unverified,
        }
    }

    pub fn from_config(security: &'a SecurityConfig) -> Self {
        Self::new(
            security.idp_jwt_secret.as_deref(),
            security.idp_audience.as_deref(),
            security.allow_unverified_idp_tokens,
        )
    }

    /// Verify (or, when permitted, just decode) a provider token.
    ///
    /// With a secret configured the token must carry a valid HMAC signature;
    /// HS256 is tried first, then the HMAC algorithm named in the header.
    /// Without a secret, or when verification fails, the claims are decoded
    /// unverified only if `allow_unverified` is set.
    pub fn verify(&self, token: &str) -> Result<IdpClaims, AuthError> {
        let claims = match self.secret {
            Some(secret) => match self.verify_signed(token, secret) {
                Ok(claims) => claims,
                Err(e) => {
                    if !self.allow_unverified {
                        tracing::warn!("Identity provider token verification failed: {}", e);
                        return Err(AuthError::InvalidToken);
                    }
                    tracing::warn!("Identity provider token verification failed, falling back to decode: {}", e);
                    decode_unverified(token).ok_or(AuthError::InvalidTokenFormat)?
                }
            },
            None => {
                if !self.allow_unverified {
                    return Err(AuthError::InvalidToken);
                }
                decode_unverified(token).ok_or(AuthError::InvalidToken)?
            }
        };

        match claims.sub.as_deref() {
            Some(sub) if !sub.is_empty() => Ok(claims),
            _ => Err(AuthError::InvalidToken),
        }
    }

    fn verify_signed(&self, token: &str, secret: &str) -> Result<IdpClaims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(secret.as_bytes());

        match decode::<IdpClaims>(token, &key, &self.validation(Algorithm::HS256)) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::InvalidAlgorithm) => {
                let header = decode_header(token)?;
                if !matches!(header.alg, Algorithm::HS384 | Algorithm::HS512) {
                    return Err(e);
                }
                decode::<IdpClaims>(token, &key, &self.validation(header.alg)).map(|data| data.claims)
            }
            Err(e) => Err(e),
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        // exp is checked when present but not required
        validation.required_spec_claims.clear();
        match self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

/// Read claims without checking the signature or expiry
fn decode_unverified(token: &str) -> Option<IdpClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<IdpClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}
