use super::AuthError;

/// bcrypt work factor
const HASH_COST: u32 = 10;

/// Stored in place of a hash for accounts that authenticate through the
/// identity provider. It is not a valid bcrypt string, so it never verifies.
pub const EXTERNAL_AUTH_MARKER: &str = "external-idp";

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, HASH_COST).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Compare a plain text password against a stored hash.
///
/// Malformed hashes (including the external-auth marker) count as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!("Password verification against malformed hash: {}", e);
            false
        }
    }
}

/// `hash_password` on the blocking pool; bcrypt is deliberately slow
pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

/// `verify_password` on the blocking pool
pub async fn verify_password_async(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}
