// handlers/validation.rs - Shared request parsing helpers
use uuid::Uuid;

use crate::error::ApiError;

/// Trimmed, non-empty value of a required body field
pub fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::field_error(field, format!("{field} is required"))),
    }
}

/// Optional body field that must not be blank when present
pub fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) => required(field, Some(v)).map(Some),
    }
}

/// Path id; anything that is not a UUID cannot name an existing row
pub fn path_id(raw: &str, not_found: &'static str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(not_found))
}

/// Body reference to another row
pub fn body_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::field_error(field, format!("{field} must be a valid id")))
}
